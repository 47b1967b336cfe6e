pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Normalized position of sample `i` out of `count` evenly spaced samples over `[0, 1]`.
pub(crate) fn unit_step(i: usize, count: usize) -> f64 {
    if count < 2 {
        return 0.0;
    }
    i as f64 / (count - 1) as f64
}

/// Clamp a signed intermediate into the `u8` range.
pub(crate) fn saturate_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
