//! Tests for moving platform tracking.

#[cfg(test)]
mod tests {
    use crate::math::yaw_of;
    use crate::physics::*;
    use crate::platform::*;
    use bevy::prelude::*;

    const PLATFORM_HALF: Vec3 = Vec3::new(3.0, 0.25, 3.0);

    fn world_with_platform(top_y: f32) -> (HeadlessWorld, ColliderId) {
        let mut world = HeadlessWorld::new();
        let platform = world.add_box(Vec3::new(0.0, top_y - PLATFORM_HALF.y, 0.0), PLATFORM_HALF);
        (world, platform)
    }

    /// Платформа едет по X со скоростью `speed`, персонаж стоит на ней
    fn ride(delta: f32, seconds: f32, speed: f32) -> Vec3 {
        let (mut world, platform) = world_with_platform(1.0);
        let mut model = MovingPlatformModel::default();
        let mut feet = Vec3::new(0.0, 1.0, 0.0);

        model.late_update(&world, feet);
        assert_eq!(model.current_platform(), Some(platform));

        let frames = (seconds / delta).round() as usize;
        let mut platform_x = 0.0;
        for _ in 0..frames {
            platform_x += speed * delta;
            world.set_transform(platform, Vec3::new(platform_x, 1.0 - PLATFORM_HALF.y, 0.0), Quat::IDENTITY);

            let capsule = Capsule::new(feet, 2.0, 0.5);
            let carry = model.update(&world, &capsule, LayerMask::ALL);
            feet += carry.displacement;
            model.late_update(&world, feet);
        }
        feet
    }

    #[test]
    fn test_carry_is_frame_rate_independent() {
        let at_30 = ride(1.0 / 30.0, 1.0, 2.0);
        let at_60 = ride(1.0 / 60.0, 1.0, 2.0);

        assert!((at_30.x - 2.0).abs() < 1e-3, "30 Hz: {:?}", at_30);
        assert!((at_60.x - 2.0).abs() < 1e-3, "60 Hz: {:?}", at_60);
        assert!((at_30 - at_60).length() < 1e-3);
    }

    #[test]
    fn test_first_contact_snapshots_without_carry() {
        let (world, platform) = world_with_platform(0.0);
        let mut model = MovingPlatformModel::default();
        let capsule = Capsule::new(Vec3::ZERO, 2.0, 0.5);

        let carry = model.update(&world, &capsule, LayerMask::ALL);

        assert_eq!(carry, PlatformCarry::default());
        assert_eq!(model.current_platform(), Some(platform));
        assert!(!model.is_moving());
    }

    #[test]
    fn test_rotating_platform_turns_character() {
        let (mut world, platform) = world_with_platform(0.0);
        let mut model = MovingPlatformModel::default();
        let feet = Vec3::new(1.0, 0.0, 0.0);
        model.late_update(&world, feet);

        // Платформа повернулась на 10° вправо (yaw)
        let turn = crate::math::yaw_rotation(10.0);
        world.set_transform(platform, Vec3::new(0.0, -PLATFORM_HALF.y, 0.0), turn);
        let carry = model.update(&world, &Capsule::new(feet, 2.0, 0.5), LayerMask::ALL);

        assert!(model.is_moving());
        assert!((yaw_of(carry.rotation) - 10.0).abs() < 1e-3);
        // Точка на радиусе 1 описывает дугу вокруг оси платформы
        let expected = turn * Vec3::new(1.0, 0.0, 0.0);
        assert!((feet + carry.displacement - expected).length() < 1e-3);
    }

    #[test]
    fn test_steep_surface_is_not_a_platform() {
        let mut world = HeadlessWorld::new();
        let tilt = Quat::from_rotation_z(60f32.to_radians());
        world.add_collider(Vec3::new(0.0, -0.5, 0.0), tilt, Vec3::new(3.0, 0.5, 3.0), 0, false);
        let mut model = MovingPlatformModel::default();

        // Луч из точки над центром склона
        let top = world.raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 10.0, LayerMask::ALL, true).map(|hit| hit.point);
        let feet = top.unwrap_or(Vec3::ZERO);
        model.late_update(&world, feet);

        assert_eq!(model.current_platform(), None);
    }

    #[test]
    fn test_slope_setter_recomputes_cache() {
        let mut config = PlatformConfig::default();
        config.set_max_slope_angle(60.0);

        assert!((config.min_normal_y() - 0.5).abs() < 1e-5);
        config.set_max_slope_angle(-30.0);
        assert_eq!(config.max_slope_angle(), 30.0);
    }

    #[test]
    fn test_removed_platform_clears_state() {
        let (mut world, platform) = world_with_platform(0.0);
        let mut model = MovingPlatformModel::default();
        model.late_update(&world, Vec3::ZERO);

        world.remove(platform);
        let carry = model.update(&world, &Capsule::new(Vec3::ZERO, 2.0, 0.5), LayerMask::ALL);

        assert_eq!(carry, PlatformCarry::default());
        assert_eq!(model.current_platform(), None);
    }

    #[test]
    fn test_leaving_platform_clears_on_late_update() {
        let (world, _platform) = world_with_platform(0.0);
        let mut model = MovingPlatformModel::default();
        model.late_update(&world, Vec3::ZERO);

        // Прыжок: ноги на 1 м выше
        model.late_update(&world, Vec3::new(0.0, 1.0, 0.0));

        assert_eq!(model.current_platform(), None);
    }
}
