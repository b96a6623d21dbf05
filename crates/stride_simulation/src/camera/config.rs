//! Camera configuration

use serde::{Deserialize, Serialize};

use crate::math::Easing;
use crate::time::TimeBase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub can_look: bool,
    /// Градусы на единицу look input
    pub sensitivity_x: f32,
    pub sensitivity_y: f32,
    pub invert_x: bool,
    pub invert_y: bool,
    /// Время сглаживания взгляда (critically damped); 0 = без сглаживания
    pub damping: f32,
    /// Пределы pitch в градусах (+ = вверх)
    minimum_x: f32,
    maximum_x: f32,
    /// Yaw крутит только камеру, body transform не трогается
    pub rotate_camera_only: bool,

    pub field_of_view: f32,
    pub can_zoom: bool,
    pub zoom_field_of_view: f32,
    pub zoom_in_time: f32,
    pub zoom_out_time: f32,
    pub zoom_in_easing: Easing,
    pub zoom_out_easing: Easing,

    pub look_time_base: TimeBase,
    pub shake_time_base: TimeBase,
    pub zoom_time_base: TimeBase,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            can_look: true,
            sensitivity_x: 2.0,
            sensitivity_y: 2.0,
            invert_x: false,
            invert_y: false,
            damping: 0.0,
            minimum_x: -90.0,
            maximum_x: 90.0,
            rotate_camera_only: false,
            field_of_view: 60.0,
            can_zoom: true,
            zoom_field_of_view: 40.0,
            zoom_in_time: 0.2,
            zoom_out_time: 0.2,
            zoom_in_easing: Easing::EaseOut,
            zoom_out_easing: Easing::EaseOut,
            look_time_base: TimeBase::Scaled,
            shake_time_base: TimeBase::Scaled,
            zoom_time_base: TimeBase::Scaled,
        }
    }
}

impl CameraConfig {
    pub fn minimum_x(&self) -> f32 {
        self.minimum_x
    }

    pub fn maximum_x(&self) -> f32 {
        self.maximum_x
    }

    /// Пределы pitch; перевёрнутые границы меняются местами
    pub fn set_pitch_limits(&mut self, minimum_x: f32, maximum_x: f32) {
        self.minimum_x = minimum_x.min(maximum_x).clamp(-90.0, 90.0);
        self.maximum_x = maximum_x.max(minimum_x).clamp(-90.0, 90.0);
    }

    pub fn rebuild_caches(&mut self) {
        self.set_pitch_limits(self.minimum_x, self.maximum_x);
        self.damping = self.damping.max(0.0);
    }

    pub fn clamp_pitch(&self, pitch: f32) -> f32 {
        pitch.clamp(self.minimum_x, self.maximum_x)
    }
}
