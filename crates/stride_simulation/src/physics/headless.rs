//! Headless physics world (без Rapier)
//!
//! Аналитический мир из oriented boxes: пол, стены, потолки, платформы.
//! Используется headless симуляцией и тестами: детерминированный,
//! без broadphase (коллайдеров единицы-десятки).
//!
//! Capsule sweep: покомпонентное движение (x → z → y) с разбиением на шаги
//! не длиннее половины радиуса (без tunneling через тонкие стены).
//! Шаг блокируется только если он УВЕЛИЧИВАЕТ penetration: персонаж
//! стоящий на полу свободно скользит по нему горизонтально.

use bevy::prelude::*;

use super::{Capsule, ColliderId, CollisionFlags, LayerMask, MoveResult, PhysicsWorld, RaycastHit};

/// Итерации binary search при блокировке шага
const SWEEP_ITERATIONS: usize = 12;
/// Итерации alternating projection segment ↔ box
const PROJECTION_ITERATIONS: usize = 8;
/// Допуск на float noise при сравнении penetration
const PENETRATION_EPSILON: f32 = 1e-5;

/// Oriented box коллайдер
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessCollider {
    pub id: ColliderId,
    pub center: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
    /// Индекс слоя 0..31
    pub layer: u8,
    pub is_trigger: bool,
}

impl HeadlessCollider {
    fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.center)
    }

    fn to_world(&self, local: Vec3) -> Vec3 {
        self.center + self.rotation * local
    }

    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let local = self.to_local(point);
        self.to_world(local.clamp(-self.half_extents, self.half_extents))
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let local = self.to_local(point);
        local.abs().cmple(self.half_extents).all()
    }

    fn passes(&self, mask: LayerMask, ignore_triggers: bool) -> bool {
        mask.contains(self.layer) && !(ignore_triggers && self.is_trigger)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessWorld {
    colliders: Vec<HeadlessCollider>,
    next_id: u64,
}

impl HeadlessWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Статический box на слое 0
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3) -> ColliderId {
        self.add_collider(center, Quat::IDENTITY, half_extents, 0, false)
    }

    /// Горизонтальный пол: верхняя грань на высоте `top_y`
    pub fn add_floor(&mut self, top_y: f32, half_size: f32) -> ColliderId {
        self.add_box(
            Vec3::new(0.0, top_y - 0.5, 0.0),
            Vec3::new(half_size, 0.5, half_size),
        )
    }

    pub fn add_collider(
        &mut self,
        center: Vec3,
        rotation: Quat,
        half_extents: Vec3,
        layer: u8,
        is_trigger: bool,
    ) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.colliders.push(HeadlessCollider {
            id,
            center,
            rotation,
            half_extents: half_extents.abs(),
            layer: layer & 31,
            is_trigger,
        });
        id
    }

    pub fn set_transform(&mut self, id: ColliderId, center: Vec3, rotation: Quat) -> bool {
        match self.colliders.iter_mut().find(|collider| collider.id == id) {
            Some(collider) => {
                collider.center = center;
                collider.rotation = rotation;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: ColliderId) -> bool {
        let before = self.colliders.len();
        self.colliders.retain(|collider| collider.id != id);
        before != self.colliders.len()
    }

    pub fn get(&self, id: ColliderId) -> Option<&HeadlessCollider> {
        self.colliders.iter().find(|collider| collider.id == id)
    }

    pub fn colliders(&self) -> &[HeadlessCollider] {
        &self.colliders
    }

    /// Шаг разрешён если ни с одним solid коллайдером penetration не выросла
    fn step_allowed(&self, from: &Capsule, to: &Capsule, mask: LayerMask) -> bool {
        let (a_from, b_from) = (from.bottom_center(), from.top_center());
        let (a_to, b_to) = (to.bottom_center(), to.top_center());

        for collider in &self.colliders {
            if collider.is_trigger || !mask.contains(collider.layer) {
                continue;
            }
            let before = from.radius - segment_box_distance(a_from, b_from, collider);
            let after = to.radius - segment_box_distance(a_to, b_to, collider);
            if after > before.max(0.0) + PENETRATION_EPSILON {
                return false;
            }
        }
        true
    }

    /// Сдвиг вдоль одной оси с binary search при блокировке
    fn sweep_axis(&self, capsule: &mut Capsule, delta: Vec3, mask: LayerMask) -> bool {
        if delta == Vec3::ZERO {
            return false;
        }

        let target = capsule.with_base(capsule.base + delta);
        if self.step_allowed(capsule, &target, mask) {
            *capsule = target;
            return false;
        }

        let mut low = 0.0;
        let mut high = 1.0;
        for _ in 0..SWEEP_ITERATIONS {
            let mid = (low + high) * 0.5;
            let probe = capsule.with_base(capsule.base + delta * mid);
            if self.step_allowed(capsule, &probe, mask) {
                low = mid;
            } else {
                high = mid;
            }
        }
        *capsule = capsule.with_base(capsule.base + delta * low);
        true
    }
}

impl PhysicsWorld for HeadlessWorld {
    fn move_capsule(&self, capsule: &Capsule, displacement: Vec3, mask: LayerMask) -> MoveResult {
        let mut flags = CollisionFlags::NONE;
        if !displacement.is_finite() {
            return MoveResult {
                position: capsule.base,
                flags,
            };
        }

        let max_step = (capsule.radius * 0.5).max(0.01);
        let steps = (displacement.length() / max_step).ceil().clamp(1.0, 256.0) as usize;
        let step = displacement / steps as f32;

        let mut current = *capsule;
        for _ in 0..steps {
            if self.sweep_axis(&mut current, Vec3::new(step.x, 0.0, 0.0), mask) {
                flags.insert(CollisionFlags::SIDES);
            }
            if self.sweep_axis(&mut current, Vec3::new(0.0, 0.0, step.z), mask) {
                flags.insert(CollisionFlags::SIDES);
            }
            if self.sweep_axis(&mut current, Vec3::new(0.0, step.y, 0.0), mask) {
                if step.y > 0.0 {
                    flags.insert(CollisionFlags::ABOVE);
                } else {
                    flags.insert(CollisionFlags::BELOW);
                }
            }
        }

        MoveResult {
            position: current.base,
            flags,
        }
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask, ignore_triggers: bool) -> bool {
        self.colliders.iter().any(|collider| {
            collider.passes(mask, ignore_triggers)
                && collider.closest_point(center).distance_squared(center) < radius * radius
        })
    }

    fn overlap_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        mask: LayerMask,
        ignore_triggers: bool,
    ) -> bool {
        let probe = HeadlessCollider {
            id: ColliderId(u64::MAX),
            center,
            rotation,
            half_extents: half_extents.abs(),
            layer: 0,
            is_trigger: false,
        };
        self.colliders
            .iter()
            .any(|collider| collider.passes(mask, ignore_triggers) && boxes_overlap(&probe, collider))
    }

    fn overlap_capsule(&self, a: Vec3, b: Vec3, radius: f32, mask: LayerMask, ignore_triggers: bool) -> bool {
        self.colliders.iter().any(|collider| {
            collider.passes(mask, ignore_triggers) && segment_box_distance(a, b, collider) < radius
        })
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
        if direction == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let mut best: Option<RaycastHit> = None;
        for collider in &self.colliders {
            if !collider.passes(mask, ignore_triggers) || collider.contains(origin) {
                continue;
            }
            let Some((distance, local_normal)) = ray_box(collider, origin, direction) else {
                continue;
            };
            if distance > max_distance || best.is_some_and(|hit| hit.distance <= distance) {
                continue;
            }
            best = Some(RaycastHit {
                collider: collider.id,
                point: origin + direction * distance,
                normal: collider.rotation * local_normal,
                distance,
            });
        }
        best
    }

    fn collider_transform(&self, id: ColliderId) -> Option<(Vec3, Quat)> {
        self.get(id).map(|collider| (collider.center, collider.rotation))
    }
}

fn closest_point_on_segment(a: Vec3, b: Vec3, point: Vec3) -> Vec3 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared <= f32::EPSILON {
        return a;
    }
    let t = ((point - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    a + ab * t
}

/// Расстояние segment ↔ box через alternating projection (оба множества выпуклые)
fn segment_box_distance(a: Vec3, b: Vec3, collider: &HeadlessCollider) -> f32 {
    let mut on_segment = closest_point_on_segment(a, b, collider.center);
    let mut on_box = collider.closest_point(on_segment);
    for _ in 0..PROJECTION_ITERATIONS {
        on_segment = closest_point_on_segment(a, b, on_box);
        on_box = collider.closest_point(on_segment);
    }
    on_segment.distance(on_box)
}

/// Slab test в local space; возвращает distance и local normal грани входа
fn ray_box(collider: &HeadlessCollider, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
    let local_origin = collider.to_local(origin);
    let local_direction = collider.rotation.inverse() * direction;

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut normal = Vec3::ZERO;

    for axis in 0..3 {
        let o = local_origin[axis];
        let d = local_direction[axis];
        let h = collider.half_extents[axis];

        if d.abs() < 1e-8 {
            if o < -h || o > h {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (-h - o) * inv;
        let mut t1 = (h - o) * inv;
        let mut sign = -1.0;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
            sign = 1.0;
        }
        if t0 > t_min {
            t_min = t0;
            normal = Vec3::ZERO;
            normal[axis] = sign;
        }
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    if t_min < 0.0 {
        return None;
    }
    Some((t_min, normal))
}

/// SAT для двух OBB (15 осей)
fn boxes_overlap(first: &HeadlessCollider, second: &HeadlessCollider) -> bool {
    let axes_a = [first.rotation * Vec3::X, first.rotation * Vec3::Y, first.rotation * Vec3::Z];
    let axes_b = [second.rotation * Vec3::X, second.rotation * Vec3::Y, second.rotation * Vec3::Z];
    let offset = second.center - first.center;

    let separated_on = |axis: Vec3| -> bool {
        if axis.length_squared() < 1e-8 {
            return false;
        }
        let axis = axis.normalize();
        let project = |axes: &[Vec3; 3], half: Vec3| -> f32 {
            (0..3).map(|i| (axes[i].dot(axis) * half[i]).abs()).sum()
        };
        let reach = project(&axes_a, first.half_extents) + project(&axes_b, second.half_extents);
        offset.dot(axis).abs() > reach
    };

    for axis in axes_a.iter().chain(axes_b.iter()) {
        if separated_on(*axis) {
            return false;
        }
    }
    for a in &axes_a {
        for b in &axes_b {
            if separated_on(a.cross(*b)) {
                return false;
            }
        }
    }
    true
}
