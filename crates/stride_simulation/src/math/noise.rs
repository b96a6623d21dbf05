//! 1D gradient (Perlin) noise для camera shake
//!
//! Детерминированная: одинаковый x → одинаковый результат на всех платформах
//! (integer hash, без таблицы перестановок).

/// Integer hash → градиент в [-1, 1]
fn gradient(cell: i32) -> f32 {
    let mut h = cell as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    (h as f32 / u32::MAX as f32) * 2.0 - 1.0
}

fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Perlin noise, результат в [-1, 1]
///
/// На целых x значение 0 (свойство gradient noise), между узлами плавно.
pub fn perlin_1d(x: f32) -> f32 {
    if !x.is_finite() {
        return 0.0;
    }
    let cell = x.floor();
    let t = x - cell;
    let i0 = cell as i32;
    let i1 = i0.wrapping_add(1);

    let v0 = gradient(i0) * t;
    let v1 = gradient(i1) * (t - 1.0);

    // Максимум |v0 + (v1 - v0) * f| для 1D gradient noise = 0.5 → масштаб x2
    let value = (v0 + (v1 - v0) * fade(t)) * 2.0;
    value.clamp(-1.0, 1.0)
}
