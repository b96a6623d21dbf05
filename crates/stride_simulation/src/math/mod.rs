//! Math helpers общие для movement/camera/peripherals
//!
//! - smoothing: critically damped smooth_damp (input, camera look)
//! - easing: кривые для crouch/zoom/fov kick
//! - noise: 1D Perlin для camera shake

pub mod easing;
pub mod noise;
pub mod smoothing;


pub use easing::Easing;
pub use noise::perlin_1d;
pub use smoothing::{smooth_damp, smooth_damp_angle};

use bevy::prelude::*;

/// Non-finite значение → fallback
///
/// Все интеграторы прогоняют выход через sanitize: один плохой кадр
/// не должен распространить NaN по состоянию персонажа.
pub fn sanitize(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

pub fn sanitize_vec3(value: Vec3, fallback: Vec3) -> Vec3 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Поворот только вокруг мировой вертикали (yaw в градусах, + = вправо)
///
/// Конвенция: forward = -Z, поэтому yaw вправо = отрицательный угол вокруг +Y.
pub fn yaw_rotation(yaw_degrees: f32) -> Quat {
    Quat::from_rotation_y(-yaw_degrees.to_radians())
}

/// Yaw (градусы) из произвольного поворота через его forward
pub fn yaw_of(rotation: Quat) -> f32 {
    let forward = rotation * Vec3::NEG_Z;
    if forward.x.abs() < f32::EPSILON && forward.z.abs() < f32::EPSILON {
        return 0.0;
    }
    forward.x.atan2(-forward.z).to_degrees()
}

/// Pitch (градусы, + = вверх) из forward
pub fn pitch_of(rotation: Quat) -> f32 {
    let forward = rotation * Vec3::NEG_Z;
    forward.y.clamp(-1.0, 1.0).asin().to_degrees()
}

/// Move towards без overshoot
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}
