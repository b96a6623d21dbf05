//! Recoil: pitch offset вверх, линейно гаснет за decay time

use crate::math::{move_towards, sanitize};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Recoil {
    /// Градусы вверх
    amount: f32,
    /// Градусы в секунду
    decay_rate: f32,
}

impl Recoil {
    pub fn apply(&mut self, amount: f32, decay_time: f32) {
        if decay_time <= 0.0 {
            // Мгновенное восстановление: отдачи не видно
            return;
        }
        self.amount += amount;
        self.decay_rate = self.amount.abs() / decay_time;
    }

    pub fn advance(&mut self, delta: f32) -> f32 {
        self.amount = sanitize(move_towards(self.amount, 0.0, self.decay_rate * delta), 0.0);
        if self.amount == 0.0 {
            self.decay_rate = 0.0;
        }
        self.amount
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }
}
