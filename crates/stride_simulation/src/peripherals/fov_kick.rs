//! FOV kick: аддитивный offset к FOV камеры во время бега
//!
//! Камера остаётся единственным writer'ом своего FOV; итоговое значение
//! собирает `FirstPersonCharacter::effective_field_of_view`.

use serde::{Deserialize, Serialize};

use crate::camera::{Zoom, ZoomLeg};
use crate::math::Easing;
use crate::time::TimeBase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FovKickConfig {
    pub enabled: bool,
    /// Градусы сверх базового FOV
    pub kick_amount: f32,
    pub increase_time: f32,
    pub decrease_time: f32,
    pub increase_easing: Easing,
    pub decrease_easing: Easing,
    pub time_base: TimeBase,
}

impl Default for FovKickConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kick_amount: 10.0,
            increase_time: 0.3,
            decrease_time: 0.3,
            increase_easing: Easing::EaseOut,
            decrease_easing: Easing::EaseInOut,
            time_base: TimeBase::Scaled,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FovKick {
    config: FovKickConfig,
    /// Тот же eased переход что у zoom, но вокруг нуля
    transition: Zoom,
}

impl FovKick {
    pub fn new(config: FovKickConfig) -> Self {
        Self {
            config,
            transition: Zoom::new(0.0),
        }
    }

    pub fn update(&mut self, is_running: bool, delta: f32) {
        let kicking = self.config.enabled && is_running;
        let leg = if kicking {
            ZoomLeg {
                target_fov: self.config.kick_amount,
                duration: self.config.increase_time,
                easing: self.config.increase_easing,
            }
        } else {
            ZoomLeg {
                target_fov: 0.0,
                duration: self.config.decrease_time,
                easing: self.config.decrease_easing,
            }
        };
        self.transition.advance(kicking, leg, delta);
    }

    /// Текущий offset в градусах
    pub fn offset(&self) -> f32 {
        self.transition.field_of_view()
    }

    pub fn is_kicking(&self) -> bool {
        self.transition.is_zooming()
    }

    pub fn config(&self) -> &FovKickConfig {
        &self.config
    }
}
