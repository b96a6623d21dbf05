//! Moving platforms
//!
//! Цикл за кадр:
//! 1. `update()` ДО движения персонажа: нет платформы → короткий ray вниз;
//!    есть → сравниваем сохранённую local point с текущим transform
//!    платформы, yaw carry = поворот самой платформы с прошлого snapshot
//! 2. `late_update()` ПОСЛЕ движения: re-probe и re-snapshot local point
//!
//! Платформа не принадлежит модели: `ColliderId` weak handle, удалённая
//! платформа просто сбрасывает состояние.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::math::{sanitize_vec3, yaw_of, yaw_rotation};
use crate::math::smoothing::delta_angle;
use crate::physics::{Capsule, ColliderId, LayerMask, PhysicsWorld};

#[cfg(test)]
mod platform_tests;

/// Ray стартует чуть выше ног (ноги могут быть на поверхности)
const PROBE_START_OFFSET: f32 = 0.05;
const MOTION_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub enabled: bool,
    pub layer_mask: LayerMask,
    /// Насколько ниже ног ищем платформу
    pub probe_distance: f32,
    /// Градусы; круче: персонаж не цепляется к платформе
    max_slope_angle: f32,
    /// Delta меньше порога присваивается напрямую, мимо capsule sweep
    ///
    /// Убирает sub-pixel дрожание, но в эти кадры коллизии не проверяются.
    pub direct_small_moves: bool,
    pub small_move_threshold: f32,
    #[serde(skip)]
    min_normal_y: f32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        let mut config = Self {
            enabled: true,
            layer_mask: LayerMask::ALL,
            probe_distance: 0.1,
            max_slope_angle: 45.0,
            direct_small_moves: true,
            small_move_threshold: 0.001,
            min_normal_y: 0.0,
        };
        config.rebuild_caches();
        config
    }
}

impl PlatformConfig {
    /// Пересчёт кэшей (после десериализации)
    pub fn rebuild_caches(&mut self) {
        self.max_slope_angle = self.max_slope_angle.abs().min(90.0);
        self.min_normal_y = self.max_slope_angle.to_radians().cos();
    }

    pub fn max_slope_angle(&self) -> f32 {
        self.max_slope_angle
    }

    pub fn set_max_slope_angle(&mut self, degrees: f32) {
        self.max_slope_angle = degrees;
        self.rebuild_caches();
    }

    /// cos(max_slope_angle)
    pub fn min_normal_y(&self) -> f32 {
        self.min_normal_y
    }
}

/// Что платформа сделала с персонажем за кадр
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformCarry {
    pub displacement: Vec3,
    /// Yaw-only поворот, применяется слева к rotation персонажа
    pub rotation: Quat,
}

impl Default for PlatformCarry {
    fn default() -> Self {
        Self {
            displacement: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovingPlatformModel {
    config: PlatformConfig,
    current_platform: Option<ColliderId>,
    local_point: Vec3,
    /// Rotation платформы на момент snapshot
    platform_rotation: Quat,
    is_moving: bool,
    last_carry: PlatformCarry,
}

impl Default for MovingPlatformModel {
    fn default() -> Self {
        Self::new(PlatformConfig::default())
    }
}

impl MovingPlatformModel {
    pub fn new(mut config: PlatformConfig) -> Self {
        config.rebuild_caches();
        Self {
            config,
            current_platform: None,
            local_point: Vec3::ZERO,
            platform_rotation: Quat::IDENTITY,
            is_moving: false,
            last_carry: PlatformCarry::default(),
        }
    }

    /// Перед движением персонажа: детект или carry
    pub fn update(
        &mut self,
        physics: &dyn PhysicsWorld,
        capsule: &Capsule,
        collision_mask: LayerMask,
    ) -> PlatformCarry {
        self.is_moving = false;
        self.last_carry = PlatformCarry::default();

        if !self.config.enabled {
            self.clear();
            return self.last_carry;
        }

        let Some(platform) = self.current_platform else {
            if let Some(found) = self.probe(physics, capsule.base) {
                self.snapshot(physics, found, capsule.base);
            }
            return self.last_carry;
        };

        let Some((platform_position, platform_rotation)) = physics.collider_transform(platform) else {
            // Платформа удалена
            self.clear();
            return self.last_carry;
        };

        let target_point = platform_position + platform_rotation * self.local_point;
        let delta = sanitize_vec3(target_point - capsule.base, Vec3::ZERO);
        // Только собственный поворот платформы; yaw от look персонажа не трогаем
        let turn = platform_rotation * self.platform_rotation.inverse();
        let yaw_delta = delta_angle(0.0, yaw_of(turn));

        if delta.length() <= MOTION_EPSILON && yaw_delta.abs() <= MOTION_EPSILON {
            return self.last_carry;
        }
        self.is_moving = true;

        let position = if self.config.direct_small_moves && delta.length() < self.config.small_move_threshold {
            capsule.base + delta
        } else {
            physics.move_capsule(capsule, delta, collision_mask).position
        };

        self.last_carry = PlatformCarry {
            displacement: position - capsule.base,
            rotation: if yaw_delta.is_finite() {
                yaw_rotation(yaw_delta)
            } else {
                Quat::IDENTITY
            },
        };
        self.last_carry
    }

    /// После движения персонажа: re-probe + re-snapshot
    pub fn late_update(&mut self, physics: &dyn PhysicsWorld, feet: Vec3) {
        if !self.config.enabled {
            self.clear();
            return;
        }
        match self.probe(physics, feet) {
            Some(platform) => self.snapshot(physics, platform, feet),
            None => self.clear(),
        }
    }

    fn probe(&self, physics: &dyn PhysicsWorld, feet: Vec3) -> Option<ColliderId> {
        let origin = feet + Vec3::Y * PROBE_START_OFFSET;
        let hit = physics.raycast(
            origin,
            Vec3::NEG_Y,
            PROBE_START_OFFSET + self.config.probe_distance.abs(),
            self.config.layer_mask,
            true,
        )?;
        // Слишком крутая поверхность: не платформа
        (hit.normal.y >= self.config.min_normal_y).then_some(hit.collider)
    }

    fn snapshot(&mut self, physics: &dyn PhysicsWorld, platform: ColliderId, feet: Vec3) {
        let Some((platform_position, platform_rotation)) = physics.collider_transform(platform) else {
            self.clear();
            return;
        };
        let inverse = platform_rotation.inverse();
        self.current_platform = Some(platform);
        self.local_point = inverse * (feet - platform_position);
        self.platform_rotation = platform_rotation;
    }

    pub fn clear(&mut self) {
        self.current_platform = None;
        self.local_point = Vec3::ZERO;
        self.platform_rotation = Quat::IDENTITY;
        self.is_moving = false;
    }

    pub fn current_platform(&self) -> Option<ColliderId> {
        self.current_platform
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn last_carry(&self) -> PlatformCarry {
        self.last_carry
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PlatformConfig {
        &mut self.config
    }
}
