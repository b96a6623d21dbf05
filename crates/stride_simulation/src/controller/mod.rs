//! Bevy integration: CharacterControllerPlugin
//!
//! ECS ответственность:
//! - CharacterController component (владеет FirstPersonCharacter)
//! - FixedUpdate drive system (один update на тик)
//! - Sync body/head Transform из состояния симуляции
//! - Bevy events из CharacterEvent
//!
//! Physics backend выбирается при сборке plugin'а:
//! - Headless: `HeadlessPhysics` resource (аналитический мир, тесты/сервер)
//! - Rapier: `ReadRapierContext` (host сам добавляет RapierPhysicsPlugin)

use bevy::prelude::*;

pub mod events;
pub mod spawn;
pub mod systems;

pub use events::{
    AudioCueEmitted, CameraShakeStateChanged, CharacterEventWriters, CrouchStateChanged, PlayerJumped,
    PlayerLanded, RunStateChanged,
};
pub use spawn::spawn_first_person_character;
pub use systems::{drive_characters_headless, drive_characters_rapier, sync_camera_heads};

use crate::character::FirstPersonCharacter;
use crate::physics::HeadlessWorld;

/// Physics backend для drive system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhysicsBackend {
    #[default]
    Headless,
    Rapier,
}

/// Персонаж на body entity
#[derive(Component, Debug)]
pub struct CharacterController {
    pub character: FirstPersonCharacter,
    /// Child entity с camera head (None = без head)
    pub head: Option<Entity>,
    /// Child entity с rapier capsule collider (исключается из запросов)
    pub collider: Option<Entity>,
}

/// Camera head entity: FOV для рендера (base + kick)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CameraHead {
    pub field_of_view: f32,
}

/// Мир для Headless backend
#[derive(Resource, Debug, Clone, Default, Deref, DerefMut)]
pub struct HeadlessPhysics(pub HeadlessWorld);

/// Порядок систем контроллера внутри FixedUpdate
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacterControllerSet;

/// Character controller plugin
///
/// Порядок в FixedUpdate:
/// 1. drive_characters_*: movement → camera → peripherals, sync body Transform
/// 2. sync_camera_heads: head Transform + FOV
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterControllerPlugin {
    pub backend: PhysicsBackend,
}

impl Plugin for CharacterControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerJumped>()
            .add_event::<PlayerLanded>()
            .add_event::<CrouchStateChanged>()
            .add_event::<RunStateChanged>()
            .add_event::<CameraShakeStateChanged>()
            .add_event::<AudioCueEmitted>();

        match self.backend {
            PhysicsBackend::Headless => {
                app.init_resource::<HeadlessPhysics>();
                app.add_systems(
                    FixedUpdate,
                    (drive_characters_headless, sync_camera_heads)
                        .chain()
                        .in_set(CharacterControllerSet),
                );
            }
            PhysicsBackend::Rapier => {
                app.add_systems(
                    FixedUpdate,
                    (drive_characters_rapier, sync_camera_heads)
                        .chain()
                        .in_set(CharacterControllerSet),
                );
            }
        }
    }
}
