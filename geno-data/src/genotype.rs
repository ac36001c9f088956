use anyhow::{ensure, Result};
use nalgebra::DMatrix;
use std::collections::HashMap;

/// Genotype matrix with metadata
///
/// Rows are individuals, columns are variants. Entries are hard-call
/// dosages 0/1/2 counting copies of `allele1`; missing calls are NaN.
#[derive(Debug, Clone)]
pub struct GenotypeMatrix {
    pub genotypes: DMatrix<f32>,
    pub sample_ids: Vec<String>,
    pub variant_ids: Vec<String>,
    pub chromosomes: Vec<String>,
    pub positions: Vec<u64>,
    pub allele1: Vec<String>,
    pub allele2: Vec<String>,
}

impl GenotypeMatrix {
    pub fn num_individuals(&self) -> usize {
        self.genotypes.nrows()
    }

    pub fn num_variants(&self) -> usize {
        self.genotypes.ncols()
    }

    /// Check that metadata vectors line up with the matrix dimensions.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.sample_ids.len() == self.genotypes.nrows(),
            "{} sample ids != {} matrix rows",
            self.sample_ids.len(),
            self.genotypes.nrows()
        );
        let m = self.genotypes.ncols();
        ensure!(
            self.variant_ids.len() == m
                && self.chromosomes.len() == m
                && self.positions.len() == m
                && self.allele1.len() == m
                && self.allele2.len() == m,
            "variant metadata unmatched with {} matrix columns",
            m
        );
        Ok(())
    }

    /// Lookup table from sample ID to row index.
    pub fn sample_index_map(&self) -> HashMap<&str, usize> {
        self.sample_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect()
    }

    /// Keep only the individuals at the given row indices, in the given
    /// order. Variant metadata is untouched.
    pub fn subset_individuals(&self, indices: &[usize]) -> Result<GenotypeMatrix> {
        let n = self.num_individuals();
        for &i in indices {
            ensure!(i < n, "individual index {} out of range (n = {})", i, n);
        }

        Ok(GenotypeMatrix {
            genotypes: self.genotypes.select_rows(indices.iter()),
            sample_ids: indices.iter().map(|&i| self.sample_ids[i].clone()).collect(),
            variant_ids: self.variant_ids.clone(),
            chromosomes: self.chromosomes.clone(),
            positions: self.positions.clone(),
            allele1: self.allele1.clone(),
            allele2: self.allele2.clone(),
        })
    }
}
