use anyhow::{ensure, Result};
use log::info;
use std::collections::HashMap;

use geno_data::genotype::GenotypeMatrix;

/// Keep only the individuals whose ancestry-table label matches
/// `ancestry`. The label `all` keeps everyone without consulting the
/// table; samples absent from the table are dropped.
pub fn filter_to_ancestry(
    geno: GenotypeMatrix,
    table: &HashMap<String, String>,
    ancestry: &str,
) -> Result<GenotypeMatrix> {
    if ancestry == "all" {
        return Ok(geno);
    }

    let indices: Vec<usize> = geno
        .sample_ids
        .iter()
        .enumerate()
        .filter_map(|(i, id)| {
            (table.get(id).map(String::as_str) == Some(ancestry)).then_some(i)
        })
        .collect();

    ensure!(
        !indices.is_empty(),
        "no samples with ancestry '{}' in the dataset",
        ancestry
    );

    info!(
        "ancestry '{}': kept {} of {} samples",
        ancestry,
        indices.len(),
        geno.num_individuals()
    );

    geno.subset_individuals(&indices)
}
