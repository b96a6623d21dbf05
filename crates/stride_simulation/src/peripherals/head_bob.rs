//! Head bob: осцилляция головы по циклу шагов + lean spring
//!
//! Cycle (0..1) продвигается горизонтальной скоростью, один полный цикл =
//! два шага (`stride_length` метров). Пересечение 0.5 и wrap → footstep.
//!
//! Lean: пружина, которую раскачивает ИЗМЕНЕНИЕ скорости (strafe старт/стоп).
//! Вход (velocity delta) клампится, выход проверяется: non-finite состояние
//! откатывается к последнему валидному.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::math::{move_towards, sanitize};

use super::MovementView;

/// Предел velocity delta за кадр для lean spring (м/с)
const MAX_VELOCITY_DELTA: f32 = 20.0;
/// Предел скорости, двигающей cycle (м/с)
const MAX_BOB_SPEED: f32 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadBobConfig {
    pub enabled: bool,
    /// Метров на полный цикл (два шага)
    pub stride_length: f32,
    pub vertical_amplitude: f32,
    pub lateral_amplitude: f32,
    pub run_amplitude_scale: f32,
    pub crouch_amplitude_scale: f32,
    /// Ниже этой скорости персонаж считается стоящим
    pub min_speed: f32,
    /// Скорость появления/затухания bob (weight в секунду)
    pub blend_speed: f32,
    /// Градусы наклона на 1 м/с боковой скорости
    pub lean_per_velocity: f32,
    /// Толчок пружины на 1 м/с изменения боковой скорости
    pub lean_impulse: f32,
    pub lean_stiffness: f32,
    pub lean_damping: f32,
    pub max_lean: f32,
}

impl Default for HeadBobConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stride_length: 1.6,
            vertical_amplitude: 0.05,
            lateral_amplitude: 0.03,
            run_amplitude_scale: 1.4,
            crouch_amplitude_scale: 0.5,
            min_speed: 0.1,
            blend_speed: 6.0,
            lean_per_velocity: 0.6,
            lean_impulse: 4.0,
            lean_stiffness: 80.0,
            lean_damping: 12.0,
            max_lean: 4.0,
        }
    }
}

/// Результат кадра
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BobStep {
    pub footstep: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadBob {
    config: HeadBobConfig,
    cycle: f32,
    weight: f32,
    offset: Vec3,
    lean: f32,
    lean_velocity: f32,
    last_lateral_velocity: f32,
    /// Последнее валидное (lean, lean_velocity)
    last_good: (f32, f32),
}

impl HeadBob {
    pub fn new(config: HeadBobConfig) -> Self {
        Self {
            config,
            cycle: 0.0,
            weight: 0.0,
            offset: Vec3::ZERO,
            lean: 0.0,
            lean_velocity: 0.0,
            last_lateral_velocity: 0.0,
            last_good: (0.0, 0.0),
        }
    }

    pub fn update(&mut self, view: &MovementView, delta: f32) -> BobStep {
        if !self.config.enabled || delta <= 0.0 {
            return BobStep::default();
        }

        let speed = sanitize(view.horizontal_speed(), 0.0).min(MAX_BOB_SPEED);
        let moving = view.is_grounded && speed > self.config.min_speed;

        let mut step = BobStep::default();
        if moving {
            let previous = self.cycle;
            let advance = speed * delta / self.config.stride_length.max(0.01);
            self.cycle = sanitize((self.cycle + advance).fract(), 0.0);
            step.footstep = (previous < 0.5 && self.cycle >= 0.5) || self.cycle < previous;
        }

        let target_weight = if moving { 1.0 } else { 0.0 };
        self.weight = move_towards(self.weight, target_weight, self.config.blend_speed * delta);

        let scale = if view.is_crouching {
            self.config.crouch_amplitude_scale
        } else if view.is_running {
            self.config.run_amplitude_scale
        } else {
            1.0
        };
        let amplitude = self.weight * scale;
        self.offset = Vec3::new(
            (self.cycle * TAU).sin() * self.config.lateral_amplitude * amplitude,
            (self.cycle * 2.0 * TAU).sin() * self.config.vertical_amplitude * amplitude,
            0.0,
        );

        self.update_lean(view, delta);
        step
    }

    fn update_lean(&mut self, view: &MovementView, delta: f32) {
        let lateral = view.local_velocity().x;
        let (lateral, velocity_delta) = if lateral.is_finite() {
            let velocity_delta = (lateral - self.last_lateral_velocity)
                .clamp(-MAX_VELOCITY_DELTA, MAX_VELOCITY_DELTA);
            (lateral.clamp(-MAX_BOB_SPEED, MAX_BOB_SPEED), velocity_delta)
        } else {
            (self.last_lateral_velocity, 0.0)
        };
        self.last_lateral_velocity = lateral;

        let max_lean = self.config.max_lean.abs();
        // Наклон в сторону strafe (+ = вправо)
        let target = (lateral * self.config.lean_per_velocity).clamp(-max_lean, max_lean);

        self.lean_velocity -= velocity_delta * self.config.lean_impulse;
        self.lean_velocity += (self.config.lean_stiffness * (target - self.lean)
            - self.config.lean_damping * self.lean_velocity)
            * delta;
        self.lean = (self.lean + self.lean_velocity * delta).clamp(-max_lean, max_lean);

        if self.lean.is_finite() && self.lean_velocity.is_finite() {
            self.last_good = (self.lean, self.lean_velocity);
        } else {
            (self.lean, self.lean_velocity) = self.last_good;
        }
    }

    /// Сброс в rest (телепорт, respawn)
    pub fn reset(&mut self) {
        self.cycle = 0.0;
        self.weight = 0.0;
        self.offset = Vec3::ZERO;
        self.lean = 0.0;
        self.lean_velocity = 0.0;
        self.last_lateral_velocity = 0.0;
        self.last_good = (0.0, 0.0);
    }

    /// Local offset головы (x = вбок, y = вверх)
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Наклон (roll) головы в градусах
    pub fn lean(&self) -> f32 {
        self.lean
    }

    /// Roll поворот для head transform (+ lean = вправо)
    pub fn lean_rotation(&self) -> Quat {
        Quat::from_rotation_z(-self.lean.to_radians())
    }

    pub fn cycle(&self) -> f32 {
        self.cycle
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn config(&self) -> &HeadBobConfig {
        &self.config
    }
}
