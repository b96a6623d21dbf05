//! Zoom: FOV lerp с отдельными in/out длительностями

use crate::math::{sanitize, Easing};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    was_zooming: bool,
    timer: f32,
    start_fov: f32,
    current_fov: f32,
}

/// Параметры одного направления (in или out)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLeg {
    pub target_fov: f32,
    pub duration: f32,
    pub easing: Easing,
}

impl Zoom {
    pub fn new(field_of_view: f32) -> Self {
        Self {
            was_zooming: false,
            timer: 1.0,
            start_fov: field_of_view,
            current_fov: field_of_view,
        }
    }

    /// Возвращает true если на этом кадре был toggle (таймер перезапущен)
    pub fn advance(&mut self, zooming: bool, leg: ZoomLeg, delta: f32) -> bool {
        let toggled = zooming != self.was_zooming;
        if toggled {
            self.was_zooming = zooming;
            self.timer = 0.0;
            self.start_fov = self.current_fov;
        }

        self.timer = if leg.duration <= 0.0 {
            1.0
        } else {
            (self.timer + delta / leg.duration).min(1.0)
        };

        let t = leg.easing.evaluate(self.timer);
        let fov = self.start_fov + (leg.target_fov - self.start_fov) * t;
        self.current_fov = sanitize(fov, leg.target_fov);
        toggled
    }

    /// Прямая установка (вне zoom transition)
    pub fn snap(&mut self, field_of_view: f32) {
        self.start_fov = field_of_view;
        self.current_fov = field_of_view;
        self.timer = 1.0;
    }

    pub fn field_of_view(&self) -> f32 {
        self.current_fov
    }

    pub fn is_zooming(&self) -> bool {
        self.was_zooming
    }

    /// 0..1 прогресс текущего перехода
    pub fn progress(&self) -> f32 {
        self.timer
    }
}
