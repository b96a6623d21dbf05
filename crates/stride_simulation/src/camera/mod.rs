//! Camera domain: first-person look
//!
//! - PlayerCamera: mouse look (pitch/yaw), damping, force-look
//! - CameraShake: Perlin jitter
//! - Zoom: FOV transitions
//! - Recoil: pitch kick вверх с линейным возвратом

pub mod config;
pub mod recoil;
pub mod rig;
pub mod shake;
pub mod zoom;


pub use config::CameraConfig;
pub use recoil::Recoil;
pub use rig::{CameraEvent, CameraFrame, CameraSignals, LookTarget, PlayerCamera};
pub use shake::{CameraShake, ShakeEdge};
pub use zoom::{Zoom, ZoomLeg};
