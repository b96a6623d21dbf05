//! Tests for ground probes.

#[cfg(test)]
mod tests {
    use crate::error::ControllerError;
    use crate::movement::*;
    use crate::physics::*;
    use bevy::prelude::*;

    fn floor_world() -> HeadlessWorld {
        let mut world = HeadlessWorld::new();
        world.add_floor(0.0, 20.0);
        world
    }

    fn capsule_at(y: f32) -> Capsule {
        Capsule::new(Vec3::new(0.0, y, 0.0), 2.0, 0.5)
    }

    #[test]
    fn test_sphere_probe_detects_floor_within_distance() {
        let world = floor_world();
        let probe = SphereProbe::default();

        assert_eq!(probe.is_grounded(&world, &capsule_at(0.0), LayerMask::ALL), Ok(true));
        assert_eq!(probe.is_grounded(&world, &capsule_at(0.05), LayerMask::ALL), Ok(true));
        assert_eq!(probe.is_grounded(&world, &capsule_at(0.3), LayerMask::ALL), Ok(false));
    }

    #[test]
    fn test_sphere_probe_ignores_adjacent_wall() {
        let mut world = HeadlessWorld::new();
        // Стена вплотную к capsule, пола нет
        world.add_box(Vec3::new(1.0, 1.0, 0.0), Vec3::new(0.5, 3.0, 3.0));
        let probe = SphereProbe::default();

        assert_eq!(probe.is_grounded(&world, &capsule_at(0.0), LayerMask::ALL), Ok(false));
    }

    #[test]
    fn test_ray_fan_detects_ledge_under_edge() {
        let mut world = HeadlessWorld::new();
        // Узкий уступ только под краем fan'а
        world.add_box(Vec3::new(0.4, -0.5, 0.0), Vec3::new(0.05, 0.5, 0.05));
        let probe = RayFanProbe::new(8, 0.4);

        assert_eq!(probe.offsets().len(), 9);
        assert_eq!(probe.is_grounded(&world, &capsule_at(0.0), LayerMask::ALL), Ok(true));
        assert_eq!(probe.is_grounded(&world, &capsule_at(0.5), LayerMask::ALL), Ok(false));
    }

    #[test]
    fn test_ray_fan_setter_rebuilds_buffer() {
        let mut probe = RayFanProbe::new(4, 0.3);
        probe.set_ray_count(12);

        assert_eq!(probe.offsets().len(), 13);
        assert_eq!(probe.offsets()[0], Vec3::ZERO);
        assert!(probe.offsets()[1..]
            .iter()
            .all(|offset| (offset.length() - 0.3).abs() < 1e-5));
    }

    #[test]
    fn test_deserialized_ray_fan_reports_mismatch_until_rebuilt() {
        let world = floor_world();
        let mut probe: RayFanProbe = toml::from_str("ray_count = 6\nradius = 0.3\n").expect("valid toml");

        // Буфер не пересобран под ray_count из файла
        let result = probe.is_grounded(&world, &capsule_at(0.0), LayerMask::ALL);
        assert!(
            matches!(result, Err(ControllerError::RayBufferMismatch { expected: 7, .. })),
            "{:?}",
            result
        );

        probe.rebuild();
        assert_eq!(probe.is_grounded(&world, &capsule_at(0.0), LayerMask::ALL), Ok(true));
    }

    #[test]
    fn test_probe_respects_layer_mask() {
        let mut world = HeadlessWorld::new();
        world.add_collider(Vec3::new(0.0, -0.5, 0.0), Quat::IDENTITY, Vec3::new(5.0, 0.5, 5.0), 4, false);
        let check = GroundCheck::default();

        assert_eq!(check.is_grounded(&world, &capsule_at(0.0), LayerMask::ALL), Ok(true));
        assert_eq!(check.is_grounded(&world, &capsule_at(0.0), LayerMask::ALL.without(4)), Ok(false));
    }
}
