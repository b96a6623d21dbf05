//! Speed triplet (forward / backwards / sideways)

use serde::{Deserialize, Serialize};

/// Скорости движения (м/с) с кэшированным максимумом
///
/// `max` пересчитывается в setter'ах и при десериализации,
/// никогда лениво при чтении.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SpeedValues", into = "SpeedValues")]
pub struct MovementSpeeds {
    forward: f32,
    backwards: f32,
    sideways: f32,
    max: f32,
}

#[derive(Serialize, Deserialize)]
struct SpeedValues {
    forward: f32,
    backwards: f32,
    sideways: f32,
}

impl From<SpeedValues> for MovementSpeeds {
    fn from(values: SpeedValues) -> Self {
        Self::new(values.forward, values.backwards, values.sideways)
    }
}

impl From<MovementSpeeds> for SpeedValues {
    fn from(speeds: MovementSpeeds) -> Self {
        Self {
            forward: speeds.forward,
            backwards: speeds.backwards,
            sideways: speeds.sideways,
        }
    }
}

impl Default for MovementSpeeds {
    fn default() -> Self {
        Self::new(3.0, 2.5, 2.0)
    }
}

impl MovementSpeeds {
    pub fn new(forward: f32, backwards: f32, sideways: f32) -> Self {
        let mut speeds = Self {
            forward: forward.abs(),
            backwards: backwards.abs(),
            sideways: sideways.abs(),
            max: 0.0,
        };
        speeds.recompute_max();
        speeds
    }

    fn recompute_max(&mut self) {
        self.max = self.forward.max(self.backwards).max(self.sideways);
    }

    pub fn forward(&self) -> f32 {
        self.forward
    }

    pub fn backwards(&self) -> f32 {
        self.backwards
    }

    pub fn sideways(&self) -> f32 {
        self.sideways
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn set_forward(&mut self, value: f32) {
        self.forward = value.abs();
        self.recompute_max();
    }

    pub fn set_backwards(&mut self, value: f32) {
        self.backwards = value.abs();
        self.recompute_max();
    }

    pub fn set_sideways(&mut self, value: f32) {
        self.sideways = value.abs();
        self.recompute_max();
    }
}
