//! Bevy events персонажа
//!
//! Дублируют `CharacterEvent` для ECS-потребителей (UI, audio, VFX).
//! Пишутся системой drive после update каждого персонажа.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::character::CharacterEvent;
use crate::peripherals::AudioCue;

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlayerJumped {
    pub entity: Entity,
    pub height: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlayerLanded {
    pub entity: Entity,
    /// От точки отрыва от земли (прыжок или сход с края)
    pub fall_height: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrouchStateChanged {
    pub entity: Entity,
    pub crouching: bool,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStateChanged {
    pub entity: Entity,
    pub running: bool,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraShakeStateChanged {
    pub entity: Entity,
    pub shaking: bool,
}

/// Host проигрывает звук в `position` (ноги персонажа)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AudioCueEmitted {
    pub entity: Entity,
    pub cue: AudioCue,
    pub position: Vec3,
}

/// Все writer'ы персонажа одним параметром (общие для обоих backend'ов)
#[derive(SystemParam)]
pub struct CharacterEventWriters<'w> {
    jumped: EventWriter<'w, PlayerJumped>,
    landed: EventWriter<'w, PlayerLanded>,
    crouch: EventWriter<'w, CrouchStateChanged>,
    run: EventWriter<'w, RunStateChanged>,
    shake: EventWriter<'w, CameraShakeStateChanged>,
    audio: EventWriter<'w, AudioCueEmitted>,
}

impl CharacterEventWriters<'_> {
    pub fn forward(&mut self, entity: Entity, position: Vec3, event: CharacterEvent) {
        match event {
            CharacterEvent::Jumped { height } => {
                self.jumped.write(PlayerJumped { entity, height });
            }
            CharacterEvent::Landed { fall_height } => {
                self.landed.write(PlayerLanded { entity, fall_height });
            }
            CharacterEvent::CrouchChanged { crouching } => {
                self.crouch.write(CrouchStateChanged { entity, crouching });
            }
            CharacterEvent::RunChanged { running } => {
                self.run.write(RunStateChanged { entity, running });
            }
            CharacterEvent::CameraShakeChanged { shaking } => {
                self.shake.write(CameraShakeStateChanged { entity, shaking });
            }
            CharacterEvent::Audio(cue) => {
                self.audio.write(AudioCueEmitted { entity, cue, position });
            }
        }
    }
}
