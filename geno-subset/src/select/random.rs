use anyhow::{ensure, Result};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use geno_data::genotype::GenotypeMatrix;

/// Choose `num_samples` individuals uniformly at random without
/// replacement. Indices are sorted so the retained samples keep their
/// order in the dataset. Deterministic for a fixed seed.
pub fn choose_subset(geno: GenotypeMatrix, num_samples: usize, seed: u64) -> Result<GenotypeMatrix> {
    let n = geno.num_individuals();
    ensure!(
        num_samples <= n,
        "requested {} samples but only {} are available",
        num_samples,
        n
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = rand::seq::index::sample(&mut rng, n, num_samples).into_vec();
    indices.sort_unstable();

    info!("chose {} of {} samples (seed {})", num_samples, n, seed);

    geno.subset_individuals(&indices)
}
