//! Ground probes
//!
//! Движок видит только `GroundProbe` → bool. Варианты выбираются
//! конфигом (`GroundCheck`), а не флагами внутри update loop.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ControllerError;
use crate::physics::{Capsule, LayerMask, PhysicsWorld};

/// Капабилити "стоит ли персонаж на земле"
pub trait GroundProbe {
    fn is_grounded(
        &self,
        physics: &dyn PhysicsWorld,
        capsule: &Capsule,
        mask: LayerMask,
    ) -> Result<bool, ControllerError>;
}

/// Overlap sphere у основания capsule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereProbe {
    /// Радиус сферы; не больше 95% радиуса capsule (иначе цепляет стены)
    pub radius: f32,
    /// Насколько низ сферы уходит ниже ног
    pub distance: f32,
}

impl Default for SphereProbe {
    fn default() -> Self {
        Self {
            radius: 0.45,
            distance: 0.08,
        }
    }
}

impl GroundProbe for SphereProbe {
    fn is_grounded(
        &self,
        physics: &dyn PhysicsWorld,
        capsule: &Capsule,
        mask: LayerMask,
    ) -> Result<bool, ControllerError> {
        let radius = self.radius.abs().min(capsule.radius * 0.95);
        let center = capsule.base + Vec3::Y * (radius - self.distance.abs());
        Ok(physics.overlap_sphere(center, radius, mask, true))
    }
}

/// Круг лучей вниз + центральный луч
///
/// Offsets: preallocated буфер на `ray_count + 1` луч, пересобирается
/// в `set_ray_count`/`rebuild()`. После десериализации буфер пустой до
/// `rebuild()`; probe с несовпадающим буфером возвращает ошибку.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RayFanProbe {
    ray_count: usize,
    radius: f32,
    /// Старт лучей над ногами
    pub ray_height: f32,
    /// Полная длина луча (от старта)
    pub ray_length: f32,
    #[serde(skip)]
    offsets: Vec<Vec3>,
}

impl Default for RayFanProbe {
    fn default() -> Self {
        Self::new(8, 0.4)
    }
}

impl RayFanProbe {
    pub fn new(ray_count: usize, radius: f32) -> Self {
        let mut probe = Self {
            ray_count,
            radius: radius.abs(),
            ray_height: 0.1,
            ray_length: 0.2,
            offsets: Vec::new(),
        };
        probe.rebuild();
        probe
    }

    pub fn rebuild(&mut self) {
        self.offsets.clear();
        self.offsets.reserve(self.ray_count + 1);
        self.offsets.push(Vec3::ZERO);
        for i in 0..self.ray_count {
            let angle = std::f32::consts::TAU * i as f32 / self.ray_count as f32;
            self.offsets
                .push(Vec3::new(angle.cos() * self.radius, 0.0, angle.sin() * self.radius));
        }
    }

    pub fn ray_count(&self) -> usize {
        self.ray_count
    }

    pub fn set_ray_count(&mut self, ray_count: usize) {
        self.ray_count = ray_count;
        self.rebuild();
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.abs();
        self.rebuild();
    }

    pub fn offsets(&self) -> &[Vec3] {
        &self.offsets
    }
}

impl GroundProbe for RayFanProbe {
    fn is_grounded(
        &self,
        physics: &dyn PhysicsWorld,
        capsule: &Capsule,
        mask: LayerMask,
    ) -> Result<bool, ControllerError> {
        let expected = self.ray_count + 1;
        if self.offsets.len() != expected {
            return Err(ControllerError::RayBufferMismatch {
                expected,
                actual: self.offsets.len(),
            });
        }

        let start = capsule.base + Vec3::Y * self.ray_height;
        Ok(self.offsets.iter().any(|offset| {
            physics
                .raycast(start + *offset, Vec3::NEG_Y, self.ray_length, mask, true)
                .is_some()
        }))
    }
}

/// Выбор ground probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroundCheck {
    Sphere(SphereProbe),
    RayFan(RayFanProbe),
}

impl Default for GroundCheck {
    fn default() -> Self {
        Self::Sphere(SphereProbe::default())
    }
}

impl GroundCheck {
    pub fn rebuild_caches(&mut self) {
        if let Self::RayFan(probe) = self {
            probe.rebuild();
        }
    }
}

impl GroundProbe for GroundCheck {
    fn is_grounded(
        &self,
        physics: &dyn PhysicsWorld,
        capsule: &Capsule,
        mask: LayerMask,
    ) -> Result<bool, ControllerError> {
        match self {
            Self::Sphere(probe) => probe.is_grounded(physics, capsule, mask),
            Self::RayFan(probe) => probe.is_grounded(physics, capsule, mask),
        }
    }
}
