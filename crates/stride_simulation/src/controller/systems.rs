//! FixedUpdate системы контроллера
//!
//! drive: update персонажа → body Transform → Bevy events.
//! Backend отличается только источником `PhysicsWorld`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::ReadRapierContext;

use crate::input::InputState;
use crate::physics::{PhysicsWorld, RapierPhysics};
use crate::time::FrameTime;

use super::{CameraHead, CharacterController, CharacterEventWriters, HeadlessPhysics};

/// Scaled delta тика + unscaled (без time scale виртуальных часов)
fn frame_time(time: &Time, virtual_time: &Time<Virtual>) -> FrameTime {
    let scaled = time.delta_secs();
    let speed = virtual_time.effective_speed();
    let unscaled = if speed > 0.0 { scaled / speed } else { scaled };
    FrameTime::new(scaled, unscaled)
}

/// Общее для обоих backend'ов
struct DriveContext<'a> {
    physics: &'a dyn PhysicsWorld,
    time: FrameTime,
    resolve_target: &'a dyn Fn(Entity) -> Option<Vec3>,
}

fn step_character(
    entity: Entity,
    controller: &mut CharacterController,
    input: &mut InputState,
    transform: &mut Transform,
    context: &DriveContext,
    writers: &mut CharacterEventWriters,
) {
    let character = &mut controller.character;
    character.update(context.physics, &*input, context.time, context.resolve_target);
    // Edge-флаги (down/up) потреблены этим тиком
    input.end_frame();

    let position = character.movement().position();
    transform.translation = position;
    transform.rotation = character.movement().rotation();

    for event in character.drain_events() {
        writers.forward(entity, position, event);
    }
}

/// Drive system (Headless backend)
pub fn drive_characters_headless(
    time: Res<Time>,
    virtual_time: Res<Time<Virtual>>,
    physics: Res<HeadlessPhysics>,
    targets: Query<&GlobalTransform>,
    mut characters: Query<(Entity, &mut CharacterController, &mut InputState, &mut Transform)>,
    mut writers: CharacterEventWriters,
) {
    let resolve_target = |entity: Entity| targets.get(entity).ok().map(GlobalTransform::translation);
    let context = DriveContext {
        physics: &physics.0,
        time: frame_time(&time, &virtual_time),
        resolve_target: &resolve_target,
    };

    for (entity, mut controller, mut input, mut transform) in characters.iter_mut() {
        step_character(
            entity,
            &mut controller,
            &mut input,
            &mut transform,
            &context,
            &mut writers,
        );
    }
}

/// Drive system (Rapier backend)
///
/// Платформы резолвятся через GlobalTransform их collider entity.
pub fn drive_characters_rapier(
    time: Res<Time>,
    virtual_time: Res<Time<Virtual>>,
    rapier: ReadRapierContext,
    globals: Query<&GlobalTransform>,
    mut characters: Query<(Entity, &mut CharacterController, &mut InputState, &mut Transform)>,
    mut writers: CharacterEventWriters,
) {
    let Ok(rapier_context) = rapier.single() else {
        return;
    };

    let resolve_target = |entity: Entity| globals.get(entity).ok().map(GlobalTransform::translation);
    let resolve_transform = |entity: Entity| {
        globals.get(entity).ok().map(|global| {
            let (_, rotation, translation) = global.to_scale_rotation_translation();
            (translation, rotation)
        })
    };
    let time = frame_time(&time, &virtual_time);

    for (entity, mut controller, mut input, mut transform) in characters.iter_mut() {
        let physics = RapierPhysics::new(&rapier_context, &resolve_transform, controller.collider);
        let context = DriveContext {
            physics: &physics,
            time,
            resolve_target: &resolve_target,
        };
        step_character(
            entity,
            &mut controller,
            &mut input,
            &mut transform,
            &context,
            &mut writers,
        );
    }
}

/// Head Transform (bob + look + lean) и FOV (camera + kick)
pub fn sync_camera_heads(
    characters: Query<&CharacterController>,
    mut heads: Query<(&mut Transform, &mut CameraHead), Without<CharacterController>>,
) {
    for controller in characters.iter() {
        let Some(head) = controller.head else {
            continue;
        };
        let Ok((mut transform, mut camera_head)) = heads.get_mut(head) else {
            continue;
        };
        transform.translation = controller.character.head_local_translation();
        transform.rotation = controller.character.head_local_rotation();
        camera_head.field_of_view = controller.character.effective_field_of_view();
    }
}
