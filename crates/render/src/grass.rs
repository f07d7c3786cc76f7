use crate::mesh::FLOOR_HALF_EXTENT;
use glam::{Quat, Vec3};
use meadow_common::Transform;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::FRAC_PI_2;

/// Blades requested for the default meadow. The grid rounds this down to a
/// square, so 300 gives 17 x 17 = 289.
pub const DEFAULT_GRASS_COUNT: usize = 300;

/// Max offset from the cell centre, as a fraction of the cell size.
const JITTER: f32 = 0.4;
const MIN_HEIGHT: f32 = 0.1;
const HEIGHT_RANGE: f32 = 0.4;

/// One decorative blade rooted on the floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrassBlade {
    pub root: Vec3,
    pub height: f32,
}

impl GrassBlade {
    /// Model transforms of the two crossed quads (0° and 90° about Y).
    pub fn transforms(&self) -> [Transform; 2] {
        let upright = Transform {
            position: self.root,
            rotation: Quat::IDENTITY,
            scale: Vec3::new(1.0, self.height, 1.0),
        };
        let crossed = Transform {
            rotation: Quat::from_rotation_y(FRAC_PI_2),
            ..upright
        };
        [upright, crossed]
    }
}

/// Grass scattered once at startup on a jittered square grid.
///
/// The layout is a pure function of `(seed, requested, half_extent)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GrassField {
    seed: u64,
    blades: Vec<GrassBlade>,
}

impl GrassField {
    /// The default meadow: [`DEFAULT_GRASS_COUNT`] blades over the floor.
    pub fn new(seed: u64) -> Self {
        Self::scatter(seed, DEFAULT_GRASS_COUNT, FLOOR_HALF_EXTENT)
    }

    pub fn empty() -> Self {
        Self {
            seed: 0,
            blades: Vec::new(),
        }
    }

    /// Place `floor(sqrt(requested))^2` blades over `[-half_extent, half_extent]^2`,
    /// one per grid cell, each offset from its cell centre by up to
    /// ±`JITTER` of a cell on X and Z.
    pub fn scatter(seed: u64, requested: usize, half_extent: f32) -> Self {
        let per_side = (requested as f64).sqrt().floor() as usize;
        let mut blades = Vec::with_capacity(per_side * per_side);
        if per_side > 0 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let cell = 2.0 * half_extent / per_side as f32;
            for i in 0..per_side {
                for j in 0..per_side {
                    let cx = -half_extent + (i as f32 + 0.5) * cell;
                    let cz = -half_extent + (j as f32 + 0.5) * cell;
                    let x = cx + rng.gen_range(-JITTER..JITTER) * cell;
                    let z = cz + rng.gen_range(-JITTER..JITTER) * cell;
                    let height = MIN_HEIGHT + rng.gen_range(0.0..HEIGHT_RANGE);
                    blades.push(GrassBlade {
                        root: Vec3::new(x, 0.0, z),
                        height,
                    });
                }
            }
        }
        tracing::debug!(seed, blades = blades.len(), "grass scattered");
        Self { seed, blades }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn blades(&self) -> &[GrassBlade] {
        &self.blades
    }

    pub fn len(&self) -> usize {
        self.blades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blades.is_empty()
    }

    /// Every quad transform, two per blade.
    pub fn transforms(&self) -> impl Iterator<Item = Transform> + '_ {
        self.blades.iter().flat_map(GrassBlade::transforms)
    }
}
