//! Crouch easing: camera head offset между стоя/присев

use crate::math::{sanitize, Easing};

/// Таймер 0→1 сбрасывается на каждом переходе crouch/stand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrouchEase {
    timer: f32,
    start_offset: f32,
    target_offset: f32,
    current_offset: f32,
}

impl CrouchEase {
    pub fn new(offset: f32) -> Self {
        Self {
            timer: 1.0,
            start_offset: offset,
            target_offset: offset,
            current_offset: offset,
        }
    }

    /// Новый переход из текущего offset'а (даже если прошлый не закончился)
    pub fn begin(&mut self, target_offset: f32) {
        self.timer = 0.0;
        self.start_offset = self.current_offset;
        self.target_offset = target_offset;
    }

    pub fn advance(&mut self, delta: f32, duration: f32, easing: Easing) -> f32 {
        if duration <= 0.0 {
            self.timer = 1.0;
        } else {
            self.timer = (self.timer + delta / duration).min(1.0);
        }

        let t = easing.evaluate(self.timer);
        let offset = self.start_offset + (self.target_offset - self.start_offset) * t;
        // Не-конечный offset → сразу в target
        self.current_offset = sanitize(offset, self.target_offset);
        if !self.timer.is_finite() {
            self.timer = 1.0;
        }
        self.current_offset
    }

    pub fn is_finished(&self) -> bool {
        self.timer >= 1.0
    }

    pub fn current_offset(&self) -> f32 {
        self.current_offset
    }
}
