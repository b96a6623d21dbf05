//! STRIDE Simulation Core
//!
//! First-person character controller на Bevy 0.16.
//!
//! Слои:
//! - Core (без ECS): PlayerMovement, PlayerCamera, StaminaModel,
//!   MovingPlatformModel, peripherals, FirstPersonCharacter
//! - Collaborators: PhysicsWorld (headless / rapier), InputSource
//! - ECS integration: CharacterControllerPlugin (FixedUpdate 60Hz)
//!
//! Один update на тик, порядок movement → camera → peripherals.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy::transform::TransformPlugin;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod camera;
pub mod character;
pub mod controller;
pub mod error;
pub mod input;
pub mod logger;
pub mod math;
pub mod movement;
pub mod peripherals;
pub mod physics;
pub mod platform;
pub mod signal;
pub mod stamina;
pub mod time;

// Re-export основных типов
pub use camera::{CameraConfig, CameraEvent, LookTarget, PlayerCamera};
pub use character::{CharacterConfig, CharacterEvent, FirstPersonCharacter};
pub use controller::{
    spawn_first_person_character, AudioCueEmitted, CameraHead, CameraShakeStateChanged, CharacterController,
    CharacterControllerPlugin, CrouchStateChanged, HeadlessPhysics, PhysicsBackend, PlayerJumped, PlayerLanded,
    RunStateChanged,
};
pub use error::ControllerError;
pub use input::{actions, ActionBindings, InputAction, InputSource, InputState, NoInput};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use movement::{MovementConfig, MovementEvent, MovementSpeeds, PlayerMovement};
pub use peripherals::{AudioCue, MovementView};
pub use physics::{HeadlessWorld, LayerMask, PhysicsWorld};
pub use platform::{MovingPlatformModel, PlatformConfig};
pub use stamina::{StaminaConfig, StaminaModel};
pub use time::{FrameTime, TimeBase};

/// Частота FixedUpdate
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции (headless backend по умолчанию)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .add_plugins(CharacterControllerPlugin::default());

        // Детерминистичный RNG (seed по умолчанию), если host не поставил свой
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Раздаёт seed'ы персонажам (camera shake noise).
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed для следующего персонажа
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает вручную: каждый `app.update()` = ровно один FixedUpdate тик.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, TransformPlugin))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / SIMULATION_HZ,
        )));

    app
}

/// Snapshot состояния всех персонажей для сравнения детерминизма
///
/// Отсортирован по Entity index; float'ы побитово.
pub fn character_snapshot(world: &mut World) -> Vec<u8> {
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &CharacterController)>();
    let mut characters: Vec<_> = query.iter(world).collect();
    characters.sort_by_key(|(entity, _)| entity.index());

    for (entity, controller) in characters {
        let character = &controller.character;
        let movement = character.movement();
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        for value in movement
            .position()
            .to_array()
            .into_iter()
            .chain(movement.rotation().to_array())
            .chain(movement.velocity().to_array())
            .chain(character.head_local_rotation().to_array())
            .chain([character.effective_field_of_view(), movement.stamina().current_stamina()])
        {
            snapshot.extend_from_slice(&value.to_bits().to_le_bytes());
        }
        snapshot.push(u8::from(movement.is_grounded()) | (u8::from(movement.is_crouching()) << 1));
    }

    snapshot
}
