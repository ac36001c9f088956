use anyhow::{ensure, Result};
use log::info;
use std::collections::HashSet;

use geno_data::genotype::GenotypeMatrix;

/// Subset to an explicit list of sample IDs. The list must be a subset
/// of the dataset's samples; retained samples keep dataset order.
pub fn filter_to_keep_list(geno: GenotypeMatrix, keep: &[String]) -> Result<GenotypeMatrix> {
    let sample_map = geno.sample_index_map();

    let num_missing = keep
        .iter()
        .filter(|id| !sample_map.contains_key(id.as_str()))
        .count();
    ensure!(
        num_missing == 0,
        "{} individuals in the sample list are missing from the dataset to filter",
        num_missing
    );

    let keep_set: HashSet<&str> = keep.iter().map(String::as_str).collect();
    let indices: Vec<usize> = geno
        .sample_ids
        .iter()
        .enumerate()
        .filter_map(|(i, id)| keep_set.contains(id.as_str()).then_some(i))
        .collect();

    info!(
        "keep list: retained {} of {} samples",
        indices.len(),
        geno.num_individuals()
    );

    geno.subset_individuals(&indices)
}
