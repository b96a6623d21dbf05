//! Critically damped smoothing (SmoothDamp)
//!
//! Closed-form аппроксимация критически задемпфированной пружины
//! (Game Programming Gems 4, 1.10). Без overshoot, стабильна при
//! больших dt: в отличие от явной интеграции stiffness/damping.

/// Сгладить `current` к `target` за ~`smooth_time` секунд
///
/// `velocity`: состояние пружины, хранится вызывающим между кадрами.
/// `smooth_time <= 0` → мгновенный snap (velocity сбрасывается).
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, delta: f32) -> f32 {
    if delta <= 0.0 {
        return current;
    }
    if smooth_time <= 0.0 {
        *velocity = 0.0;
        return target;
    }

    let omega = 2.0 / smooth_time.max(0.0001);
    let x = omega * delta;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * delta;
    *velocity = (*velocity - omega * temp) * exp;

    let mut output = target + (change + temp) * exp;

    // Не перелетаем target
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }

    if !output.is_finite() || !velocity.is_finite() {
        *velocity = 0.0;
        return target;
    }

    output
}

/// То же для углов в градусах (кратчайший путь через 360)
pub fn smooth_damp_angle(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, delta: f32) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, delta)
}

/// Кратчайшая разница углов в градусах, [-180, 180]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut diff = (target - current) % 360.0;
    if diff > 180.0 {
        diff -= 360.0;
    } else if diff < -180.0 {
        diff += 360.0;
    }
    diff
}
