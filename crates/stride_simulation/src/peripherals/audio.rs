//! Movement audio cues
//!
//! Только решает КОГДА звучать; playback делает host
//! (Bevy event `AudioCueEmitted` или `FirstPersonCharacter::drain_events`).

use serde::{Deserialize, Serialize};

use crate::movement::MovementEvent;

const MAX_CUES_PER_FRAME: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    Footstep,
    Jump,
    Land,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    pub footsteps: bool,
    pub footsteps_while_crouching: bool,
    pub jump: bool,
    pub land: bool,
    /// Сход с меньшей высоты приземляется молча (после прыжка звук есть всегда)
    pub min_land_height: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            footsteps: true,
            footsteps_while_crouching: false,
            jump: true,
            land: true,
            min_land_height: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovementAudio {
    config: AudioConfig,
    cues: Vec<AudioCue>,
    /// Текущий полёт начался прыжком
    airborne_from_jump: bool,
}

impl MovementAudio {
    pub fn new(config: AudioConfig) -> Self {
        Self {
            config,
            cues: Vec::with_capacity(MAX_CUES_PER_FRAME),
            airborne_from_jump: false,
        }
    }

    /// `footstep`: edge от head bob, `events`: события движения за кадр
    pub fn update(&mut self, footstep: bool, is_crouching: bool, events: &[MovementEvent]) {
        self.cues.clear();

        for event in events {
            match *event {
                MovementEvent::Jumped { .. } => {
                    self.airborne_from_jump = true;
                    if self.config.enabled && self.config.jump {
                        self.push(AudioCue::Jump);
                    }
                }
                MovementEvent::Landed { fall_height } => {
                    let audible = self.airborne_from_jump || fall_height >= self.config.min_land_height;
                    self.airborne_from_jump = false;
                    if self.config.enabled && self.config.land && audible {
                        self.push(AudioCue::Land);
                    }
                }
                _ => {}
            }
        }

        if !self.config.enabled {
            return;
        }

        if footstep && self.config.footsteps && (!is_crouching || self.config.footsteps_while_crouching) {
            self.push(AudioCue::Footstep);
        }
    }

    fn push(&mut self, cue: AudioCue) {
        if self.cues.len() < MAX_CUES_PER_FRAME {
            self.cues.push(cue);
        }
    }

    pub fn cues(&self) -> &[AudioCue] {
        &self.cues
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }
}
