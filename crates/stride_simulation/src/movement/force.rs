//! External force impulses (взрывы, knockback)

use bevy::prelude::*;

use crate::math::sanitize_vec3;

/// Ниже этой величины impulse не подмешивается в движение
pub const FORCE_THRESHOLD: f32 = 0.2;
/// Скорость затухания: lerp(force, 0, min(DECAY_RATE * dt, 1))
pub const FORCE_DECAY_RATE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForceImpact {
    value: Vec3,
}

impl ForceImpact {
    /// Возвращает true если impulse направлен вверх
    pub fn add(&mut self, direction: Vec3, magnitude: f32) -> bool {
        let mut direction = direction.normalize_or_zero();
        // Force никогда не толкает сквозь пол
        if direction.y < 0.0 {
            direction.y = -direction.y;
        }
        self.value = sanitize_vec3(self.value + direction * magnitude, Vec3::ZERO);
        direction.y > 0.0 && magnitude > 0.0
    }

    pub fn decay(&mut self, delta: f32) {
        let t = (FORCE_DECAY_RATE * delta).clamp(0.0, 1.0);
        self.value = sanitize_vec3(self.value.lerp(Vec3::ZERO, t), Vec3::ZERO);
    }

    pub fn is_active(&self) -> bool {
        self.value.length() > FORCE_THRESHOLD
    }

    /// Вклад в движение в этом кадре
    pub fn contribution(&self) -> Vec3 {
        if self.is_active() {
            self.value
        } else {
            Vec3::ZERO
        }
    }

    pub fn value(&self) -> Vec3 {
        self.value
    }

    pub fn clear(&mut self) {
        self.value = Vec3::ZERO;
    }
}
