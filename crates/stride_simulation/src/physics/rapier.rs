//! Rapier backend для PhysicsWorld
//!
//! Тонкий adapter над bevy_rapier3d `RapierContext`:
//! - move_capsule → rapier `KinematicCharacterController::move_shape`
//!   поверх scoped `with_query_pipeline`
//! - overlaps → `intersect_shape` (callback, стоп на первом хите)
//! - raycast → `cast_ray_and_get_normal`
//!
//! Собственный коллайдер персонажа исключается через `exclude`,
//! слои маппятся в `CollisionGroups` filter.

use bevy::prelude::*;
use bevy_rapier3d::parry::shape::Shape;
use bevy_rapier3d::prelude::{Collider, CollisionGroups, Group, QueryFilter, RapierContext};
use bevy_rapier3d::rapier::control::{CharacterLength, KinematicCharacterController};
use bevy_rapier3d::rapier::math::{Isometry, Vector};

use super::{Capsule, ColliderId, CollisionFlags, LayerMask, MoveResult, PhysicsWorld, RaycastHit};

/// Резолвер transform'ов entity (платформы): обычно Query<&GlobalTransform>
pub type TransformResolver<'a> = dyn Fn(Entity) -> Option<(Vec3, Quat)> + 'a;

pub struct RapierPhysics<'a> {
    context: &'a RapierContext<'a>,
    transforms: &'a TransformResolver<'a>,
    exclude: Option<Entity>,
}

impl<'a> RapierPhysics<'a> {
    pub fn new(
        context: &'a RapierContext<'a>,
        transforms: &'a TransformResolver<'a>,
        exclude: Option<Entity>,
    ) -> Self {
        Self {
            context,
            transforms,
            exclude,
        }
    }

    fn filter(&self, mask: LayerMask, ignore_triggers: bool) -> QueryFilter<'static> {
        let mut filter = QueryFilter::new().groups(CollisionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(mask.0),
        ));
        if ignore_triggers {
            filter = filter.exclude_sensors();
        }
        if let Some(entity) = self.exclude {
            filter = filter.exclude_collider(entity);
        }
        filter
    }

    fn intersects(&self, position: Vec3, rotation: Quat, shape: &dyn Shape, filter: QueryFilter<'static>) -> bool {
        let mut hit = false;
        self.context.intersect_shape(position, rotation, shape, filter, |_| {
            hit = true;
            false
        });
        hit
    }
}

pub fn collider_id(entity: Entity) -> ColliderId {
    ColliderId(entity.to_bits())
}

pub fn collider_entity(id: ColliderId) -> Entity {
    Entity::from_bits(id.0)
}

fn capsule_collider(capsule: &Capsule) -> Collider {
    let half_segment = (capsule.height * 0.5 - capsule.radius).max(0.0);
    Collider::capsule_y(half_segment, capsule.radius)
}

/// Slope/step/snap решает движок персонажа, Rapier только скользит по препятствиям
fn character_controller() -> KinematicCharacterController {
    KinematicCharacterController {
        offset: CharacterLength::Absolute(0.01),
        snap_to_ground: None,
        ..Default::default()
    }
}

impl PhysicsWorld for RapierPhysics<'_> {
    fn move_capsule(&self, capsule: &Capsule, displacement: Vec3, mask: LayerMask) -> MoveResult {
        let shape = capsule_collider(capsule);
        let center = capsule.center();
        let start = Isometry::translation(center.x, center.y, center.z);
        let desired = Vector::new(displacement.x, displacement.y, displacement.z);
        let dt = self.context.simulation.integration_parameters.dt;
        let controller = character_controller();

        let movement = self
            .context
            .with_query_pipeline(self.filter(mask, true), |query_pipeline| {
                controller.move_shape(
                    dt,
                    &query_pipeline.query_pipeline,
                    shape.raw.as_ref(),
                    &start,
                    desired,
                    |_| {},
                )
            });

        let applied = Vec3::new(
            movement.translation.x,
            movement.translation.y,
            movement.translation.z,
        );
        let mut flags = CollisionFlags::NONE;
        if movement.grounded {
            flags.insert(CollisionFlags::BELOW);
        }
        // Rapier не отдаёт "above" напрямую: вертикальный ход вверх съеден → потолок
        if displacement.y > 1e-4 && applied.y < displacement.y * 0.5 {
            flags.insert(CollisionFlags::ABOVE);
        }
        let horizontal = Vec2::new(displacement.x, displacement.z);
        let applied_horizontal = Vec2::new(applied.x, applied.z);
        if horizontal.length() > 1e-4 && applied_horizontal.length() < horizontal.length() * 0.99 {
            flags.insert(CollisionFlags::SIDES);
        }

        MoveResult {
            position: capsule.base + applied,
            flags,
        }
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask, ignore_triggers: bool) -> bool {
        let ball = Collider::ball(radius);
        self.intersects(center, Quat::IDENTITY, ball.raw.as_ref(), self.filter(mask, ignore_triggers))
    }

    fn overlap_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        mask: LayerMask,
        ignore_triggers: bool,
    ) -> bool {
        let half = half_extents.abs();
        let cuboid = Collider::cuboid(half.x, half.y, half.z);
        self.intersects(center, rotation, cuboid.raw.as_ref(), self.filter(mask, ignore_triggers))
    }

    fn overlap_capsule(&self, a: Vec3, b: Vec3, radius: f32, mask: LayerMask, ignore_triggers: bool) -> bool {
        let capsule = Collider::capsule(a, b, radius);
        self.intersects(Vec3::ZERO, Quat::IDENTITY, capsule.raw.as_ref(), self.filter(mask, ignore_triggers))
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        ignore_triggers: bool,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        let (entity, intersection) = self.context.cast_ray_and_get_normal(
            origin,
            direction,
            max_distance,
            true,
            self.filter(mask, ignore_triggers),
        )?;

        Some(RaycastHit {
            collider: collider_id(entity),
            point: intersection.point,
            normal: intersection.normal,
            distance: intersection.time_of_impact,
        })
    }

    fn collider_transform(&self, id: ColliderId) -> Option<(Vec3, Quat)> {
        (self.transforms)(collider_entity(id))
    }
}
