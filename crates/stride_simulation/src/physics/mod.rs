//! Physics service: opaque контракт для контроллера
//!
//! Контроллер НЕ знает о backend'е: ему нужен capsule sweep, overlap'ы и
//! raycast. Реализации:
//! - `HeadlessWorld`: аналитический мир из oriented boxes (тесты, headless бинарь)
//! - `RapierPhysics`: adapter над bevy_rapier3d `RapierContext`
//!
//! Layer mask по конвенции исключает слой самого персонажа (не enforced).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod headless;
pub mod rapier;


pub use headless::{HeadlessCollider, HeadlessWorld};
pub use rapier::RapierPhysics;

/// Weak handle коллайдера (lifetime коллайдера: внешний)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(pub u64);

/// Bitmask слоёв (32 слоя)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    pub const fn layer(index: u8) -> Self {
        Self(1 << (index as u32 & 31))
    }

    pub fn contains(&self, layer: u8) -> bool {
        self.0 & (1 << (layer as u32 & 31)) != 0
    }

    pub fn without(self, layer: u8) -> Self {
        Self(self.0 & !(1 << (layer as u32 & 31)))
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Стороны с которыми столкнулся capsule sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionFlags(u8);

impl CollisionFlags {
    pub const NONE: Self = Self(0);
    pub const SIDES: Self = Self(1);
    pub const ABOVE: Self = Self(1 << 1);
    pub const BELOW: Self = Self(1 << 2);

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Вертикальный capsule персонажа в мировых координатах
///
/// `base`: нижняя точка (ноги), `height`: полная высота включая полусферы.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub base: Vec3,
    pub height: f32,
    pub radius: f32,
}

impl Capsule {
    pub fn new(base: Vec3, height: f32, radius: f32) -> Self {
        let radius = radius.abs();
        Self {
            base,
            height: height.abs().max(radius * 2.0),
            radius,
        }
    }

    /// Центр нижней полусферы
    pub fn bottom_center(&self) -> Vec3 {
        self.base + Vec3::Y * self.radius
    }

    /// Центр верхней полусферы
    pub fn top_center(&self) -> Vec3 {
        self.base + Vec3::Y * (self.height - self.radius)
    }

    pub fn center(&self) -> Vec3 {
        self.base + Vec3::Y * (self.height * 0.5)
    }

    pub fn with_base(&self, base: Vec3) -> Self {
        Self { base, ..*self }
    }
}

/// Результат capsule sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    /// Новая позиция `base`
    pub position: Vec3,
    pub flags: CollisionFlags,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub collider: ColliderId,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Контракт physics backend'а
pub trait PhysicsWorld {
    /// Sweep capsule на `displacement` с разрешением коллизий (slide)
    fn move_capsule(&self, capsule: &Capsule, displacement: Vec3, mask: LayerMask) -> MoveResult;

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask, ignore_triggers: bool) -> bool;

    fn overlap_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        mask: LayerMask,
        ignore_triggers: bool,
    ) -> bool;

    /// Capsule между центрами полусфер `a` и `b`
    fn overlap_capsule(&self, a: Vec3, b: Vec3, radius: f32, mask: LayerMask, ignore_triggers: bool) -> bool;

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        ignore_triggers: bool,
    ) -> Option<RaycastHit>;

    /// Текущий transform коллайдера (для moving platforms); None если удалён
    fn collider_transform(&self, id: ColliderId) -> Option<(Vec3, Quat)>;
}
