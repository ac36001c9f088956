//! Kinship-based unrelated-set selection
//!
//! Pairs with kinship above the cutoff, restricted to samples present
//! in the dataset, form the edges of a relatedness graph. The samples
//! to drop are the complement of a maximal independent set, found by
//! greedily deleting a vertex of maximum degree until no edges remain —
//! the fewest removals needed to leave an unrelated sample set.

use anyhow::{ensure, Result};
use log::info;
use std::collections::{HashMap, HashSet};

use geno_data::genotype::GenotypeMatrix;
use geno_data::tables::KinshipPair;

/// Midpoint in log space between 3rd- and 4th-degree relatives
/// (2^-4.5), so 1st/2nd/3rd-degree relatives count as related.
pub const DEFAULT_KINSHIP_CUTOFF: f64 = 0.044194173824159216;

/// Drop the fewest individuals needed to leave no pair with kinship
/// above `cutoff`.
pub fn filter_to_unrelated(
    geno: GenotypeMatrix,
    pairs: &[KinshipPair],
    cutoff: f64,
) -> Result<GenotypeMatrix> {
    ensure!(
        (0.0..=0.5).contains(&cutoff),
        "kinship cutoff must be in the interval [0, 0.5], got {}",
        cutoff
    );

    let present: HashSet<&str> = geno.sample_ids.iter().map(String::as_str).collect();
    let to_remove = related_to_remove(pairs, &present, cutoff);

    info!(
        "removing {} of {} samples to obtain an unrelated set",
        to_remove.len(),
        geno.num_individuals()
    );

    let indices: Vec<usize> = geno
        .sample_ids
        .iter()
        .enumerate()
        .filter_map(|(i, id)| (!to_remove.contains(id.as_str())).then_some(i))
        .collect();

    geno.subset_individuals(&indices)
}

/// Samples to remove: complement of a maximal independent set of the
/// relatedness graph. Ties on degree break toward the smallest sample
/// ID so the result is reproducible.
fn related_to_remove(
    pairs: &[KinshipPair],
    present: &HashSet<&str>,
    cutoff: f64,
) -> HashSet<String> {
    // adjacency over related pairs where both samples are in the dataset
    let mut adj: HashMap<&str, HashSet<&str>> = HashMap::new();
    for pair in pairs {
        if pair.kinship <= cutoff || pair.id1 == pair.id2 {
            continue;
        }
        if !present.contains(pair.id1.as_str()) || !present.contains(pair.id2.as_str()) {
            continue;
        }
        adj.entry(pair.id1.as_str()).or_default().insert(pair.id2.as_str());
        adj.entry(pair.id2.as_str()).or_default().insert(pair.id1.as_str());
    }

    let num_edges: usize = adj.values().map(HashSet::len).sum::<usize>() / 2;
    info!("{} related pairs among {} samples", num_edges, adj.len());

    let mut removed = HashSet::new();
    loop {
        let victim = adj
            .iter()
            .filter(|(_, nbrs)| !nbrs.is_empty())
            .map(|(&id, nbrs)| (nbrs.len(), id))
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))
            .map(|(_, id)| id);

        let Some(victim) = victim else {
            break;
        };

        let nbrs = adj.remove(victim).unwrap_or_default();
        for nbr in nbrs {
            if let Some(set) = adj.get_mut(nbr) {
                set.remove(victim);
            }
        }
        removed.insert(victim.to_string());
    }

    removed
}
