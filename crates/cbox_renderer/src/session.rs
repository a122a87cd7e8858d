//! Per-render random state.
//!
//! A session owns a seeded generator behind a mutex (supersampling jitter
//! and lens samples) and a precomputed table of uniform values in `[-1, 1)`
//! read through a shared rotating cursor (Gaussian offsets and path
//! directions). Worker threads share one session by reference.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use cbox_math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of precomputed uniform samples.
pub const DEFAULT_SAMPLE_TABLE_SIZE: usize = 1000;

pub struct RenderSession {
    rng: Mutex<StdRng>,
    table: Vec<f32>,
    cursor: AtomicUsize,
}

impl RenderSession {
    pub fn new(seed: u64) -> Self {
        Self::with_table_size(seed, DEFAULT_SAMPLE_TABLE_SIZE)
    }

    pub fn with_table_size(seed: u64, size: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let table = (0..size.max(3)).map(|_| rng.gen_range(-1.0..1.0)).collect();

        Self {
            rng: Mutex::new(rng),
            table,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Draw a uniform value from the shared generator.
    pub fn uniform(&self, range: Range<f32>) -> f32 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(range)
    }

    /// Polar sample on the unit disk: `(sqrt(U[0,1)), U[0,2pi))`.
    pub fn disk_sample(&self) -> (f32, f32) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let r: f32 = rng.gen_range(0.0..1.0);
        let theta = rng.gen_range(0.0..std::f32::consts::TAU);
        (r.sqrt(), theta)
    }

    /// Next value from the sample table.
    ///
    /// Concurrent callers interleave on the cursor, so the sequence each
    /// thread sees depends on scheduling.
    pub fn next_sample(&self) -> f32 {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.table.len();
        self.table[i]
    }

    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    /// Unit direction in the hemisphere around `normal`.
    ///
    /// Table triples are rejected until one falls inside the unit ball, then
    /// flipped to the normal's side. Falls back to `normal` if the table
    /// yields no usable triple after a full pass.
    pub fn hemisphere_direction(&self, normal: Vec3) -> Vec3 {
        for _ in 0..self.table.len() {
            let v = Vec3::new(self.next_sample(), self.next_sample(), self.next_sample());
            let len_sq = v.length_squared();
            if len_sq > 1.0 || len_sq < 1e-8 {
                continue;
            }

            let v = if v.dot(normal) < 0.0 { -v } else { v };
            return v.normalize();
        }

        normal
    }
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("table_len", &self.table.len())
            .field("cursor", &self.cursor.load(Ordering::Relaxed))
            .finish()
    }
}
