//! Peripherals: read-only потребители состояния движения
//!
//! Запускаются ПОСЛЕ movement и camera в том же кадре и никогда не пишут
//! в их состояние: получают копию флагов (`MovementView`) и `&PlayerCamera`.
//!
//! - HeadBob: осцилляция головы + lean spring
//! - FovKick: аддитивный FOV offset во время бега
//! - MovementAudio: audio cues (footstep/jump/land), без playback

pub mod audio;
pub mod fov_kick;
pub mod head_bob;


pub use audio::{AudioConfig, AudioCue, MovementAudio};
pub use fov_kick::{FovKick, FovKickConfig};
pub use head_bob::{BobStep, HeadBob, HeadBobConfig};

use bevy::prelude::*;

use crate::movement::PlayerMovement;

/// Снимок состояния движения за кадр
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MovementView {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub is_grounded: bool,
    pub is_falling: bool,
    pub is_jumping: bool,
    pub is_crouching: bool,
    pub is_running: bool,
    pub head_offset: f32,
}

impl MovementView {
    /// Горизонтальная скорость (м/с)
    pub fn horizontal_speed(&self) -> f32 {
        Vec2::new(self.velocity.x, self.velocity.z).length()
    }

    /// Скорость в локальных осях тела (x = вправо, z = назад)
    pub fn local_velocity(&self) -> Vec3 {
        self.rotation.inverse() * self.velocity
    }
}

impl From<&PlayerMovement> for MovementView {
    fn from(movement: &PlayerMovement) -> Self {
        Self {
            position: movement.position(),
            rotation: movement.rotation(),
            velocity: movement.velocity(),
            is_grounded: movement.is_grounded(),
            is_falling: movement.is_falling(),
            is_jumping: movement.is_jumping(),
            is_crouching: movement.is_crouching(),
            is_running: movement.is_running(),
            head_offset: movement.head_offset(),
        }
    }
}
