//! PLINK BED/BIM/FAM reader
//!
//! Reads SNP-major v1.00 BED file sets into a dense `GenotypeMatrix`.
//! The 2-bit coding follows plink 1.9 with A1 as the counted allele:
//! 0b00 = 2 copies of A1, 0b10 = het, 0b11 = 0 copies, 0b01 = missing.

use anyhow::{bail, Context, Result};
use nalgebra::DMatrix;
use rayon::iter::ParallelBridge;
use rayon::iter::ParallelIterator;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::genotype::GenotypeMatrix;

const BED_MAGIC: [u8; 2] = [0x6C, 0x1B];
const BED_SNP_MAJOR: u8 = 0x01;
const BED_HEADER_LEN: usize = 3;

/// Dosage of A1 per 2-bit code (look-up index = code).
const CODE_TO_DOSAGE: [f32; 4] = [2.0, f32::NAN, 1.0, 0.0];

/// PLINK BED/BIM/FAM file set reader.
pub struct PlinkReader {
    bed_path: PathBuf,
    iid: Vec<String>,
    sid: Vec<String>,
    chromosome: Vec<String>,
    bp_position: Vec<u64>,
    allele1: Vec<String>,
    allele2: Vec<String>,
}

impl PlinkReader {
    /// Open a PLINK file set from prefix (e.g. "data" -> data.bed, data.bim, data.fam).
    pub fn open(prefix: &str) -> Result<Self> {
        let bed_path = PathBuf::from(format!("{}.bed", prefix));
        let fam_path = PathBuf::from(format!("{}.fam", prefix));
        let bim_path = PathBuf::from(format!("{}.bim", prefix));

        check_bed_header(&bed_path)?;

        // .fam fields: FID(0) IID(1) father(2) mother(3) sex(4) pheno(5)
        let fam = read_six_field_table(&fam_path)?;
        let iid = fam.into_iter().map(|row| row[1].clone()).collect();

        // .bim fields: chr(0) sid(1) cm(2) bp(3) allele1(4) allele2(5)
        let bim = read_six_field_table(&bim_path)?;
        let mut chromosome = Vec::with_capacity(bim.len());
        let mut sid = Vec::with_capacity(bim.len());
        let mut bp_position = Vec::with_capacity(bim.len());
        let mut allele1 = Vec::with_capacity(bim.len());
        let mut allele2 = Vec::with_capacity(bim.len());

        for (line_no, row) in bim.into_iter().enumerate() {
            let bp = row[3].parse::<u64>().with_context(|| {
                format!(
                    "{}:{}: invalid bp position '{}'",
                    bim_path.display(),
                    line_no + 1,
                    row[3]
                )
            })?;
            chromosome.push(row[0].clone());
            sid.push(row[1].clone());
            bp_position.push(bp);
            allele1.push(row[4].clone());
            allele2.push(row[5].clone());
        }

        Ok(Self {
            bed_path,
            iid,
            sid,
            chromosome,
            bp_position,
            allele1,
            allele2,
        })
    }

    pub fn num_individuals(&self) -> usize {
        self.iid.len()
    }

    pub fn num_variants(&self) -> usize {
        self.sid.len()
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.iid
    }

    /// Read the full genotype matrix (individuals x variants).
    ///
    /// Missing genotypes are `f32::NAN`.
    pub fn read(&self) -> Result<GenotypeMatrix> {
        let n = self.iid.len();
        let m = self.sid.len();
        if n == 0 {
            bail!("{}: no individuals in .fam file", self.bed_path.display());
        }
        let bytes_per_variant = n.div_ceil(4);

        let mut reader = check_bed_header(&self.bed_path)?;
        let mut packed = Vec::with_capacity(bytes_per_variant * m);
        reader.read_to_end(&mut packed)?;

        if packed.len() != bytes_per_variant * m {
            bail!(
                "BED file {} is ill-formed: expected {} data bytes for {} individuals x {} variants, got {}",
                self.bed_path.display(),
                bytes_per_variant * m,
                n,
                m,
                packed.len()
            );
        }

        // DMatrix is column-major, so each variant's packed bytes decode
        // straight into one contiguous chunk. Columns are independent.
        let mut out_data = vec![0.0f32; n * m];
        out_data
            .chunks_exact_mut(n)
            .zip(packed.chunks_exact(bytes_per_variant))
            .par_bridge()
            .for_each(|(col, bytes)| {
                for (i, x) in col.iter_mut().enumerate() {
                    let code = (bytes[i / 4] >> ((i % 4) * 2)) & 0x03;
                    *x = CODE_TO_DOSAGE[code as usize];
                }
            });

        Ok(GenotypeMatrix {
            genotypes: DMatrix::from_vec(n, m, out_data),
            sample_ids: self.iid.clone(),
            variant_ids: self.sid.clone(),
            chromosomes: self.chromosome.clone(),
            positions: self.bp_position.clone(),
            allele1: self.allele1.clone(),
            allele2: self.allele2.clone(),
        })
    }
}

/// Validate the 3-byte BED header and return a reader positioned after it.
fn check_bed_header(path: &Path) -> Result<BufReader<File>> {
    let mut reader = BufReader::new(
        File::open(path).with_context(|| format!("Cannot open BED file: {}", path.display()))?,
    );
    let mut header = [0u8; BED_HEADER_LEN];
    reader
        .read_exact(&mut header)
        .with_context(|| format!("BED file too short: {}", path.display()))?;
    if header[0..2] != BED_MAGIC {
        bail!("Invalid BED magic bytes in {}", path.display());
    }
    if header[2] != BED_SNP_MAJOR {
        bail!(
            "BED file {} is not SNP-major (mode byte 0x{:02X})",
            path.display(),
            header[2]
        );
    }
    Ok(reader)
}

/// Parse a whitespace-delimited 6-field metadata file (.fam or .bim).
fn read_six_field_table(path: &Path) -> Result<Vec<[String; 6]>> {
    let file = File::open(path).with_context(|| format!("Cannot open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut rows = vec![];
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 6 {
            bail!(
                "{}:{}: expected 6 fields, got {}",
                path.display(),
                line_no + 1,
                fields.len()
            );
        }
        rows.push(std::array::from_fn(|k| fields[k].to_string()));
    }
    Ok(rows)
}
