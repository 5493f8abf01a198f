//! Codebook initializers

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::error::{HotsError, Result};
use crate::processor::ClustererInitializer;
use crate::surface::TimeSurface;

/// Picks `clusters` distinct sampled surfaces uniformly at random.
///
/// Seeded, so repeated training runs start from the same codebook.
#[derive(Clone, Debug)]
pub struct UniformInitializer {
    clusters: usize,
    rng: StdRng,
}

impl UniformInitializer {
    pub fn new(clusters: usize, seed: u64) -> Self {
        Self {
            clusters,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn clusters(&self) -> usize {
        self.clusters
    }
}

impl ClustererInitializer for UniformInitializer {
    fn initialize(&mut self, surfaces: &[TimeSurface]) -> Result<Vec<TimeSurface>> {
        if self.clusters == 0 {
            return Err(HotsError::Initializer("need at least one cluster".into()));
        }
        if surfaces.len() < self.clusters {
            return Err(HotsError::Initializer(format!(
                "{} clusters requested from {} surfaces",
                self.clusters,
                surfaces.len()
            )));
        }

        let mut picks = index::sample(&mut self.rng, surfaces.len(), self.clusters).into_vec();
        picks.sort_unstable();
        Ok(picks.into_iter().map(|i| surfaces[i].clone()).collect())
    }
}
