//! Stratified sampling helpers.

use kdtrace_math::{Vec2, Vec3};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Uniform random number in `[0, 1)`.
#[inline]
pub fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// `n * n` points in the unit square `[0, 1)^2`, one per grid cell.
///
/// With `jitter` each point is placed uniformly at random inside its cell,
/// otherwise at the cell center. Points are listed row by row.
pub fn stratified_square(n: u32, jitter: bool, rng: &mut dyn RngCore) -> Vec<Vec2> {
    let n = n.max(1);
    let cell = 1.0 / f64::from(n);
    let mut points = Vec::with_capacity((n * n) as usize);
    for j in 0..n {
        for i in 0..n {
            let (du, dv) = if jitter {
                (gen_f64(rng), gen_f64(rng))
            } else {
                (0.5, 0.5)
            };
            points.push(Vec2::new(
                (f64::from(i) + du) * cell,
                (f64::from(j) + dv) * cell,
            ));
        }
    }
    points
}

/// Pair two equally long sample sets in random order.
///
/// Stratification of each set is kept while breaking the correlation between
/// their grid cells.
pub fn shuffled_pairs(first: &[Vec2], second: &[Vec2], rng: &mut dyn RngCore) -> Vec<(Vec2, Vec2)> {
    debug_assert_eq!(first.len(), second.len());
    let mut order: Vec<usize> = (0..second.len()).collect();
    order.shuffle(rng);
    first
        .iter()
        .zip(order)
        .map(|(&a, b)| (a, second[b]))
        .collect()
}

/// Offsets in the xz-plane spread over a square of half-width `radius`,
/// one per cell of an `n * n` grid.
pub fn light_displacements(n: u32, radius: f64, jitter: bool, rng: &mut dyn RngCore) -> Vec<Vec3> {
    stratified_square(n, jitter, rng)
        .into_iter()
        .map(|p| Vec3::new((2.0 * p.x - 1.0) * radius, 0.0, (2.0 * p.y - 1.0) * radius))
        .collect()
}
