//! Spawn helper: body + camera head + rapier capsule collider
//!
//! Иерархия:
//! - body (CharacterController, InputState, Transform в ногах)
//!   - head (CameraHead, Transform на высоте глаз)
//!   - collider (Collider::capsule_y, Transform в центре capsule)
//!
//! Collider инертен без RapierPhysicsPlugin, поэтому headless backend
//! использует тот же helper.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;

use crate::character::{CharacterConfig, FirstPersonCharacter};
use crate::input::InputState;

use super::{CameraHead, CharacterController};

pub fn spawn_first_person_character(
    commands: &mut Commands,
    position: Vec3,
    config: CharacterConfig,
    seed: u64,
) -> Entity {
    let height = config.movement.standing_height;
    let radius = config.movement.radius;
    let head_offset = config.movement.standing_head_offset;
    let field_of_view = config.camera.field_of_view;

    let mut character = FirstPersonCharacter::new(config, seed);
    character.initialize(position, Quat::IDENTITY, Some(Quat::IDENTITY));

    let head = commands
        .spawn((
            Transform::from_xyz(0.0, head_offset, 0.0),
            CameraHead { field_of_view },
        ))
        .id();

    let half_segment = (height * 0.5 - radius).max(0.0);
    let collider = commands
        .spawn((
            Transform::from_xyz(0.0, height * 0.5, 0.0),
            Collider::capsule_y(half_segment, radius),
        ))
        .id();

    commands
        .spawn((
            Transform::from_translation(position),
            InputState::new(),
            CharacterController {
                character,
                head: Some(head),
                collider: Some(collider),
            },
        ))
        .add_children(&[head, collider])
        .id()
}
