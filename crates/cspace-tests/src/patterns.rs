//! Seeded client colors
//!
//! Values deliberately spill outside [0, 1] so restriction is exercised too.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// `count` colors of `n` components drawn from [-0.25, 1.25)
pub fn random_colors(seed: u64, n: usize, count: usize) -> Vec<Vec<f32>> {
    let mut rng = rng(seed);
    (0..count)
        .map(|_| (0..n).map(|_| rng.gen_range(-0.25f32..1.25)).collect())
        .collect()
}

/// Colors inside the unit cube, including its corners
pub fn unit_colors(seed: u64, n: usize, count: usize) -> Vec<Vec<f32>> {
    let mut rng = rng(seed);
    let mut out: Vec<Vec<f32>> = vec![vec![0.0; n], vec![1.0; n]];
    out.extend((0..count).map(|_| (0..n).map(|_| rng.r#gen::<f32>()).collect::<Vec<_>>()));
    out
}
