//! Movement domain: first-person движение персонажа
//!
//! Содержит:
//! - PlayerMovement (gravity, jump, crouch, run, platforms, force impulses)
//! - MovementConfig + политики RunPolicy / CrouchPolicy / JumpGates
//! - Ground probes (sphere / ray fan)
//! - MovementSpeeds

pub mod config;
pub mod crouch;
pub mod engine;
pub mod force;
pub mod ground;
pub mod speeds;

#[cfg(test)]
mod engine_tests;
#[cfg(test)]
mod ground_tests;

pub use config::{CrouchPolicy, JumpGates, MovementConfig, RunPolicy};
pub use engine::{MovementEvent, MovementSignals, PlayerMovement};
pub use force::ForceImpact;
pub use ground::{GroundCheck, GroundProbe, RayFanProbe, SphereProbe};
pub use speeds::MovementSpeeds;
