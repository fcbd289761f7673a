//! Deterministic lattice value noise.
//!
//! A multiply-xor hash assigns every integer lattice point a value in `[0, 1]`.
//! [`value_noise3`] blends the eight surrounding lattice values with
//! smoothstep easing and maps the result to `[-1, 1]`. The same input always
//! produces the same output on every platform.

/// Hash an integer lattice point to `[0, 1]`.
///
/// All arithmetic wraps in 32-bit signed integers.
#[inline]
pub fn lattice_hash(x: i32, y: i32, z: i32) -> f64 {
    let mut h = x
        .wrapping_mul(374_761_393)
        .wrapping_add(y.wrapping_mul(668_265_263))
        .wrapping_add(z.wrapping_mul(1_274_126_177));
    h = (h ^ (h >> 13)).wrapping_mul(1_103_515_245);
    ((h ^ (h >> 16)) & 0x7fff_ffff) as f64 / 0x7fff_ffff as f64
}

#[inline]
fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Sample 3D value noise in `[-1, 1]`.
pub fn value_noise3(x: f64, y: f64, z: f64) -> f64 {
    let (fx, fy, fz) = (x.floor(), y.floor(), z.floor());
    let (ix, iy, iz) = (fx as i32, fy as i32, fz as i32);
    let sx = smoothstep(x - fx);
    let sy = smoothstep(y - fy);
    let sz = smoothstep(z - fz);

    let corner = |dx: i32, dy: i32, dz: i32| {
        lattice_hash(
            ix.wrapping_add(dx),
            iy.wrapping_add(dy),
            iz.wrapping_add(dz),
        )
    };

    let x0 = lerp(corner(0, 0, 0), corner(1, 0, 0), sx);
    let x1 = lerp(corner(0, 1, 0), corner(1, 1, 0), sx);
    let x2 = lerp(corner(0, 0, 1), corner(1, 0, 1), sx);
    let x3 = lerp(corner(0, 1, 1), corner(1, 1, 1), sx);
    let y0 = lerp(x0, x1, sy);
    let y1 = lerp(x2, x3, sy);

    lerp(y0, y1, sz) * 2.0 - 1.0
}
