//! Movement configuration
//!
//! Поля с производными кэшами (`real_jump_height`, ray buffer, speeds max)
//! приватные: меняются только через setter'ы, которые сразу пересчитывают
//! кэш. После serde → `rebuild_caches()`.
//!
//! Stamina и платформы конфигурируются отдельно (`StaminaConfig`,
//! `PlatformConfig`): единственный владелец в runtime: сами модели.

use serde::{Deserialize, Serialize};

use crate::math::Easing;
use crate::physics::LayerMask;
use crate::time::TimeBase;

use super::ground::GroundCheck;
use super::speeds::MovementSpeeds;

/// Как кнопка бега превращается в намерение бежать
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunPolicy {
    /// Бег пока кнопка удерживается
    #[default]
    Hold,
    /// Нажатие переключает
    Toggle,
    /// Включается нажатием, выключается когда input = 0
    UntilNoInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrouchPolicy {
    #[default]
    Hold,
    Toggle,
}

/// Дополнительные условия прыжка (конъюнктивные, порядок не важен)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpGates {
    /// Прыжок только при stamina > 0 (и ≥ jump cost)
    pub require_stamina: bool,
    /// Нельзя прыгать из присяда
    pub block_while_crouched: bool,
}

impl Default for JumpGates {
    fn default() -> Self {
        Self {
            require_stamina: false,
            block_while_crouched: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub time_base: TimeBase,

    pub walking_speeds: MovementSpeeds,
    pub run_speeds: MovementSpeeds,
    pub crouch_speeds: MovementSpeeds,
    /// Время сглаживания input (critically damped); 0 = мгновенно
    pub acceleration: f32,

    gravity: f32,
    ground_stick: f32,
    pub stick_to_ground: bool,

    pub can_jump: bool,
    jump_height: f32,
    jump_height_multiplier: f32,
    #[serde(skip)]
    real_jump_height: f32,
    pub jump_gates: JumpGates,
    pub jump_stamina_cost: f32,
    /// Дополнительные прыжки в воздухе после наземного
    pub air_jumps_amount: i32,
    /// Прыжок вскоре после схода с края (coyote time)
    pub allow_air_jump: bool,
    pub air_jump_time: f32,
    pub air_jump_direction_change: bool,
    /// 0 = инерция, 1 = полный контроль в воздухе
    pub air_control: f32,

    pub can_run: bool,
    pub run_policy: RunPolicy,

    pub can_crouch: bool,
    pub crouch_policy: CrouchPolicy,
    pub standing_height: f32,
    pub crouch_height: f32,
    pub radius: f32,
    /// Высота camera head над ногами
    pub standing_head_offset: f32,
    pub crouch_head_offset: f32,
    pub crouch_time: f32,
    pub stand_up_time: f32,
    pub crouch_easing: Easing,
    pub stand_up_easing: Easing,

    pub ground_check: GroundCheck,
    pub ground_layers: LayerMask,
    /// С чем сталкивается capsule (по конвенции без слоя самого персонажа)
    pub collision_mask: LayerMask,
}

impl Default for MovementConfig {
    fn default() -> Self {
        let mut config = Self {
            time_base: TimeBase::Scaled,
            walking_speeds: MovementSpeeds::new(3.0, 2.5, 2.0),
            run_speeds: MovementSpeeds::new(7.0, 5.5, 5.0),
            crouch_speeds: MovementSpeeds::new(2.0, 1.5, 1.5),
            acceleration: 0.1,
            gravity: 20.0,
            ground_stick: 1.0,
            stick_to_ground: true,
            can_jump: true,
            jump_height: 2.0,
            jump_height_multiplier: 1.0,
            real_jump_height: 0.0,
            jump_gates: JumpGates::default(),
            jump_stamina_cost: 0.0,
            air_jumps_amount: 0,
            allow_air_jump: true,
            air_jump_time: 0.1,
            air_jump_direction_change: true,
            air_control: 0.5,
            can_run: true,
            run_policy: RunPolicy::Hold,
            can_crouch: true,
            crouch_policy: CrouchPolicy::Hold,
            standing_height: 2.0,
            crouch_height: 1.25,
            radius: 0.5,
            standing_head_offset: 1.6,
            crouch_head_offset: 1.0,
            crouch_time: 0.25,
            stand_up_time: 0.25,
            crouch_easing: Easing::EaseInOut,
            stand_up_easing: Easing::EaseInOut,
            ground_check: GroundCheck::default(),
            ground_layers: LayerMask::ALL,
            collision_mask: LayerMask::ALL,
        };
        config.rebuild_caches();
        config
    }
}

impl MovementConfig {
    /// Нормализация + пересчёт всех производных значений
    pub fn rebuild_caches(&mut self) {
        self.gravity = self.gravity.abs();
        self.ground_stick = self.ground_stick.abs();
        self.jump_height = self.jump_height.abs();
        self.jump_height_multiplier = self.jump_height_multiplier.abs();
        self.air_control = self.air_control.clamp(0.0, 1.0);
        self.air_jump_time = self.air_jump_time.abs();
        self.radius = self.radius.abs();
        self.crouch_height = self.crouch_height.abs().max(self.radius * 2.0);
        self.standing_height = self.standing_height.abs().max(self.crouch_height);
        self.real_jump_height = (2.0 * self.jump_height * self.jump_height_multiplier * self.gravity).sqrt();
        self.ground_check.rebuild_caches();
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Отрицательная гравитация нормализуется через abs()
    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
        self.rebuild_caches();
    }

    pub fn ground_stick(&self) -> f32 {
        self.ground_stick
    }

    pub fn set_ground_stick(&mut self, ground_stick: f32) {
        self.ground_stick = ground_stick;
        self.rebuild_caches();
    }

    pub fn jump_height(&self) -> f32 {
        self.jump_height
    }

    pub fn set_jump_height(&mut self, jump_height: f32) {
        self.jump_height = jump_height;
        self.rebuild_caches();
    }

    pub fn jump_height_multiplier(&self) -> f32 {
        self.jump_height_multiplier
    }

    pub fn set_jump_height_multiplier(&mut self, multiplier: f32) {
        self.jump_height_multiplier = multiplier;
        self.rebuild_caches();
    }

    /// Стартовая вертикальная скорость прыжка: sqrt(2 * h * multiplier * g)
    pub fn real_jump_height(&self) -> f32 {
        self.real_jump_height
    }

    pub fn set_ground_check(&mut self, ground_check: GroundCheck) {
        self.ground_check = ground_check;
        self.ground_check.rebuild_caches();
    }
}
