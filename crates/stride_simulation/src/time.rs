//! Frame time: scaled + unscaled delta
//!
//! Подсистемы могут жить на разных time base внутри одного кадра
//! (например camera shake на unscaled во время slow-mo), поэтому update
//! принимает явную пару, а не ambient clock.

use serde::{Deserialize, Serialize};

/// Какой delta использует подсистема
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeBase {
    #[default]
    Scaled,
    Unscaled,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    pub scaled: f32,
    pub unscaled: f32,
}

impl FrameTime {
    pub fn new(scaled: f32, unscaled: f32) -> Self {
        Self { scaled, unscaled }
    }

    /// Одинаковый delta для обоих time base (time scale = 1)
    pub fn fixed(delta: f32) -> Self {
        Self::new(delta, delta)
    }

    /// Delta для выбранного time base
    ///
    /// Отрицательный или non-finite delta → 0 (кадр ничего не интегрирует).
    pub fn delta(&self, base: TimeBase) -> f32 {
        let delta = match base {
            TimeBase::Scaled => self.scaled,
            TimeBase::Unscaled => self.unscaled,
        };
        if delta.is_finite() && delta > 0.0 {
            delta
        } else {
            0.0
        }
    }
}
