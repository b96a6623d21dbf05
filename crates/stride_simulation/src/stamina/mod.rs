//! Stamina: ресурс который гейтит бег (и опционально прыжок)
//!
//! - Drain пока выполняется drain condition (bitmask IS_RUNNING / PRESSING_RUN)
//! - Regen только после `regen_wait` секунд без drain
//! - Два regen rate: стоя на месте и в движении
//!
//! Побочных эффектов нет: MovementEngine читает `current_stamina()`.

use serde::{Deserialize, Serialize};

#[cfg(test)]
mod stamina_tests;

/// Bitmask условий drain'а: drain идёт только если выполнены ВСЕ биты маски
///
/// Пустая маска = stamina никогда не тратится на бег.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrainCondition(u8);

impl DrainCondition {
    pub const NONE: Self = Self(0);
    pub const IS_RUNNING: Self = Self(1);
    pub const PRESSING_RUN: Self = Self(1 << 1);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(&self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Все требуемые под-условия выполнены?
    pub fn holds(&self, inputs: &StaminaInputs) -> bool {
        if self.is_empty() {
            return false;
        }
        (!self.contains(Self::IS_RUNNING) || inputs.is_running)
            && (!self.contains(Self::PRESSING_RUN) || inputs.pressing_run)
    }
}

impl Default for DrainCondition {
    fn default() -> Self {
        Self::IS_RUNNING
    }
}

/// Что StaminaModel читает из movement за кадр
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StaminaInputs {
    pub is_running: bool,
    pub pressing_run: bool,
    /// Модуль текущей скорости персонажа
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaConfig {
    pub enabled: bool,
    pub max_stamina: f32,
    /// Units per second
    pub drain_rate: f32,
    pub drain_condition: DrainCondition,
    /// Секунды без drain'а до начала regen
    pub regen_wait: f32,
    pub regen_rate_standing: f32,
    pub regen_rate_moving: f32,
    /// Скорость ниже которой персонаж считается стоящим
    pub standing_threshold: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_stamina: 100.0,
            drain_rate: 20.0,
            drain_condition: DrainCondition::IS_RUNNING,
            regen_wait: 1.0,
            regen_rate_standing: 25.0,
            regen_rate_moving: 15.0,
            standing_threshold: 0.1,
        }
    }
}

/// Stamina персонажа
///
/// Инвариант: 0 ≤ current_stamina ≤ max_stamina, 0 ≤ current_regen_wait ≤ regen_wait
#[derive(Debug, Clone, PartialEq)]
pub struct StaminaModel {
    config: StaminaConfig,
    current_stamina: f32,
    current_regen_wait: f32,
}

impl Default for StaminaModel {
    fn default() -> Self {
        Self::new(StaminaConfig::default())
    }
}

impl StaminaModel {
    pub fn new(mut config: StaminaConfig) -> Self {
        config.max_stamina = config.max_stamina.abs();
        config.regen_wait = config.regen_wait.abs();
        Self {
            current_stamina: config.max_stamina,
            current_regen_wait: config.regen_wait,
            config,
        }
    }

    pub fn update(&mut self, delta: f32, inputs: StaminaInputs) {
        if !self.config.enabled || delta <= 0.0 {
            return;
        }

        if self.config.drain_condition.holds(&inputs) {
            self.current_stamina -= self.config.drain_rate.abs() * delta;
            self.current_regen_wait = 0.0;
        } else if self.current_regen_wait < self.config.regen_wait {
            self.current_regen_wait += delta;
        } else {
            let rate = if inputs.speed < self.config.standing_threshold {
                self.config.regen_rate_standing
            } else {
                self.config.regen_rate_moving
            };
            self.current_stamina += rate.abs() * delta;
        }

        self.clamp();
    }

    pub fn can_afford(&self, cost: f32) -> bool {
        !self.config.enabled || self.current_stamina >= cost
    }

    /// Разовая трата (прыжок); сбрасывает regen wait
    pub fn consume(&mut self, amount: f32) {
        if !self.config.enabled || amount <= 0.0 {
            return;
        }
        self.current_stamina -= amount;
        self.current_regen_wait = 0.0;
        self.clamp();
    }

    fn clamp(&mut self) {
        self.current_stamina = crate::math::sanitize(self.current_stamina, 0.0)
            .clamp(0.0, self.config.max_stamina);
        self.current_regen_wait = crate::math::sanitize(self.current_regen_wait, 0.0)
            .clamp(0.0, self.config.regen_wait);
    }

    /// Бег разрешён? (выключенная stamina ничего не гейтит)
    pub fn has_stamina(&self) -> bool {
        !self.config.enabled || self.current_stamina > 0.0
    }

    pub fn current_stamina(&self) -> f32 {
        self.current_stamina
    }

    pub fn current_regen_wait(&self) -> f32 {
        self.current_regen_wait
    }

    pub fn max_stamina(&self) -> f32 {
        self.config.max_stamina
    }

    /// 0..1 для HUD
    pub fn fraction(&self) -> f32 {
        if self.config.max_stamina <= 0.0 {
            0.0
        } else {
            self.current_stamina / self.config.max_stamina
        }
    }

    pub fn config(&self) -> &StaminaConfig {
        &self.config
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn set_max_stamina(&mut self, max_stamina: f32) {
        self.config.max_stamina = max_stamina.abs();
        self.clamp();
    }

    pub fn set_regen_wait(&mut self, regen_wait: f32) {
        self.config.regen_wait = regen_wait.abs();
        self.clamp();
    }

    pub fn set_drain_rate(&mut self, drain_rate: f32) {
        self.config.drain_rate = drain_rate.abs();
    }

    pub fn set_drain_condition(&mut self, condition: DrainCondition) {
        self.config.drain_condition = condition;
    }

    pub fn set_regen_rates(&mut self, standing: f32, moving: f32) {
        self.config.regen_rate_standing = standing.abs();
        self.config.regen_rate_moving = moving.abs();
    }

    pub fn set_standing_threshold(&mut self, threshold: f32) {
        self.config.standing_threshold = threshold.abs();
    }

    /// Прямая установка (debug / scripted events)
    pub fn set_current_stamina(&mut self, value: f32) {
        self.current_stamina = value;
        self.clamp();
    }
}
