//! FirstPersonCharacter: composition root одного персонажа
//!
//! Порядок внутри кадра фиксирован: movement → camera → peripherals.
//! Каждое состояние имеет одного writer'а:
//! - PlayerMovement пишет position/rotation тела
//! - PlayerCamera пишет head rotation, FOV и yaw тела (инкрементально)
//! - peripherals только читают (`MovementView`, `&PlayerCamera`)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::{CameraConfig, CameraEvent, CameraFrame, PlayerCamera};
use crate::input::{ActionBindings, InputSource};
use crate::movement::{MovementConfig, MovementEvent, PlayerMovement};
use crate::peripherals::{
    AudioConfig, AudioCue, FovKick, FovKickConfig, HeadBob, HeadBobConfig, MovementAudio, MovementView,
};
use crate::physics::PhysicsWorld;
use crate::platform::PlatformConfig;
use crate::stamina::StaminaConfig;
use crate::time::FrameTime;

const MAX_EVENTS_PER_FRAME: usize = 16;

/// Полная конфигурация персонажа (загружается через serde)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CharacterConfig {
    pub movement: MovementConfig,
    pub stamina: StaminaConfig,
    pub platform: PlatformConfig,
    pub camera: CameraConfig,
    pub head_bob: HeadBobConfig,
    pub fov_kick: FovKickConfig,
    pub audio: AudioConfig,
    /// Резолвится кодом (`rebind_*`), в файлы конфигурации не попадает
    #[serde(skip)]
    pub bindings: ActionBindings,
}

impl CharacterConfig {
    /// После deserialize: пересчитать кэши всех подсистем
    pub fn rebuild_caches(&mut self) {
        self.movement.rebuild_caches();
        self.platform.rebuild_caches();
        self.camera.rebuild_caches();
    }
}

/// Всё что случилось с персонажем за кадр (в порядке возникновения)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CharacterEvent {
    Jumped { height: f32 },
    Landed { fall_height: f32 },
    CrouchChanged { crouching: bool },
    RunChanged { running: bool },
    CameraShakeChanged { shaking: bool },
    Audio(AudioCue),
}

impl From<MovementEvent> for CharacterEvent {
    fn from(event: MovementEvent) -> Self {
        match event {
            MovementEvent::Jumped { height } => Self::Jumped { height },
            MovementEvent::Landed { fall_height } => Self::Landed { fall_height },
            MovementEvent::BeginCrouch => Self::CrouchChanged { crouching: true },
            MovementEvent::EndCrouch => Self::CrouchChanged { crouching: false },
            MovementEvent::BeginRun => Self::RunChanged { running: true },
            MovementEvent::EndRun => Self::RunChanged { running: false },
        }
    }
}

impl From<CameraEvent> for CharacterEvent {
    fn from(event: CameraEvent) -> Self {
        Self::CameraShakeChanged {
            shaking: event == CameraEvent::BeginShake,
        }
    }
}

#[derive(Debug)]
pub struct FirstPersonCharacter {
    movement: PlayerMovement,
    camera: PlayerCamera,
    head_bob: HeadBob,
    fov_kick: FovKick,
    audio: MovementAudio,
    bindings: ActionBindings,
    events: Vec<CharacterEvent>,
}

impl FirstPersonCharacter {
    pub fn new(mut config: CharacterConfig, seed: u64) -> Self {
        config.rebuild_caches();
        let CharacterConfig {
            movement,
            stamina,
            platform,
            camera,
            head_bob,
            fov_kick,
            audio,
            bindings,
        } = config;

        Self {
            movement: PlayerMovement::new(movement)
                .with_stamina(stamina)
                .with_platform(platform),
            camera: PlayerCamera::new(camera, seed),
            head_bob: HeadBob::new(head_bob),
            fov_kick: FovKick::new(fov_kick),
            audio: MovementAudio::new(audio),
            bindings,
            events: Vec::with_capacity(MAX_EVENTS_PER_FRAME),
        }
    }

    /// `head_rotation`: исходная local rotation camera head (None = нет head)
    pub fn initialize(&mut self, position: Vec3, rotation: Quat, head_rotation: Option<Quat>) {
        self.movement.initialize(position, rotation);
        self.camera.initialize(head_rotation);
        self.head_bob.reset();
        self.events.clear();
    }

    /// Один шаг симуляции
    ///
    /// `resolve_target` отдаёт мировую позицию entity для force-look.
    pub fn update(
        &mut self,
        physics: &dyn PhysicsWorld,
        input: &dyn InputSource,
        time: FrameTime,
        resolve_target: &dyn Fn(Entity) -> Option<Vec3>,
    ) {
        self.events.clear();

        let facing = self.camera.facing(self.movement.rotation());
        self.movement
            .update(physics, input, &self.bindings, time, facing);

        let eye = self.movement.position() + Vec3::Y * self.movement.head_offset();
        let frame = CameraFrame {
            input,
            bindings: &self.bindings,
            time,
            eye,
            resolve_target,
        };
        self.camera.update(&frame, self.movement.rotation_mut());

        let view = self.view();
        let bob_delta = time.delta(self.movement.config().time_base);
        let step = self.head_bob.update(&view, bob_delta);
        self.fov_kick
            .update(view.is_running, time.delta(self.fov_kick.config().time_base));
        self.audio
            .update(step.footstep, view.is_crouching, self.movement.events());

        self.collect_events();
    }

    fn collect_events(&mut self) {
        let movement = self.movement.events().iter().copied().map(CharacterEvent::from);
        let camera = self.camera.events().iter().copied().map(CharacterEvent::from);
        let audio = self.audio.cues().iter().copied().map(CharacterEvent::Audio);

        for event in movement.chain(camera).chain(audio) {
            if self.events.len() < MAX_EVENTS_PER_FRAME {
                self.events.push(event);
            }
        }
    }

    /// События последнего кадра; буфер остаётся выделенным
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, CharacterEvent> {
        self.events.drain(..)
    }

    pub fn events(&self) -> &[CharacterEvent] {
        &self.events
    }

    pub fn view(&self) -> MovementView {
        MovementView::from(&self.movement)
    }

    /// Камера + FOV kick (камера остаётся единственным writer'ом базового FOV)
    pub fn effective_field_of_view(&self) -> f32 {
        self.camera.field_of_view() + self.fov_kick.offset()
    }

    /// Local translation camera head относительно ног
    pub fn head_local_translation(&self) -> Vec3 {
        Vec3::Y * self.movement.head_offset() + self.head_bob.offset()
    }

    /// Local rotation camera head (look + shake + recoil + lean)
    pub fn head_local_rotation(&self) -> Quat {
        self.camera.head_rotation() * self.head_bob.lean_rotation()
    }

    pub fn movement(&self) -> &PlayerMovement {
        &self.movement
    }

    pub fn movement_mut(&mut self) -> &mut PlayerMovement {
        &mut self.movement
    }

    pub fn camera(&self) -> &PlayerCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PlayerCamera {
        &mut self.camera
    }

    pub fn head_bob(&self) -> &HeadBob {
        &self.head_bob
    }

    pub fn fov_kick(&self) -> &FovKick {
        &self.fov_kick
    }

    pub fn audio(&self) -> &MovementAudio {
        &self.audio
    }

    pub fn bindings(&self) -> &ActionBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut ActionBindings {
        &mut self.bindings
    }
}
