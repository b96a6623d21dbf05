//! Camera shake: Perlin jitter с линейным затуханием

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::math::perlin_1d;

/// Разнос seed'ов в noise domain (три независимых канала)
const SEED_RANGE: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraShake {
    seeds: Vec3,
    frequency: f32,
    magnitude: f32,
    duration: f32,
    remaining: f32,
    time: f32,
    is_shaking: bool,
    /// Углы (градусы) pitch/yaw/roll текущего кадра
    angles: Vec3,
}

/// Edge за кадр
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShakeEdge {
    None,
    Began,
    Ended,
}

impl CameraShake {
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let seeds = Vec3::new(
            rng.gen_range(0.0..SEED_RANGE),
            rng.gen_range(0.0..SEED_RANGE),
            rng.gen_range(0.0..SEED_RANGE),
        );
        Self {
            seeds,
            frequency: 0.0,
            magnitude: 0.0,
            duration: 0.0,
            remaining: 0.0,
            time: 0.0,
            is_shaking: false,
            angles: Vec3::ZERO,
        }
    }

    /// Запуск (или перезапуск) тряски; edge обрабатывается в `advance`
    pub fn start(&mut self, frequency: f32, magnitude: f32, duration: f32) {
        self.frequency = frequency.abs();
        self.magnitude = magnitude.abs();
        self.duration = duration.max(0.0);
        self.remaining = self.duration;
        self.time = 0.0;
    }

    pub fn stop(&mut self) {
        self.remaining = 0.0;
    }

    pub fn advance(&mut self, delta: f32) -> ShakeEdge {
        let active = self.remaining > 0.0;
        let mut edge = ShakeEdge::None;

        if active && !self.is_shaking {
            self.is_shaking = true;
            edge = ShakeEdge::Began;
        }

        if !active {
            self.angles = Vec3::ZERO;
            if self.is_shaking {
                self.is_shaking = false;
                return ShakeEdge::Ended;
            }
            return edge;
        }

        self.time += delta;
        self.remaining = (self.remaining - delta).max(0.0);
        let strength = if self.duration > 0.0 {
            self.magnitude * (self.remaining / self.duration)
        } else {
            0.0
        };

        let phase = self.time * self.frequency;
        let angles = Vec3::new(
            perlin_1d(self.seeds.x + phase),
            perlin_1d(self.seeds.y + phase),
            perlin_1d(self.seeds.z + phase),
        ) * strength;

        if angles.is_finite() {
            self.angles = angles;
        } else {
            // Rest state
            self.angles = Vec3::ZERO;
            self.remaining = 0.0;
        }
        edge
    }

    /// Поворот тряски (pitch/yaw/roll)
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.angles.y.to_radians(),
            self.angles.x.to_radians(),
            self.angles.z.to_radians(),
        )
    }

    pub fn angles(&self) -> Vec3 {
        self.angles
    }

    pub fn is_shaking(&self) -> bool {
        self.is_shaking
    }

    pub fn seeds(&self) -> Vec3 {
        self.seeds
    }

    pub fn current_magnitude(&self) -> f32 {
        if self.duration > 0.0 {
            self.magnitude * (self.remaining / self.duration)
        } else {
            0.0
        }
    }
}
