//! Text VCF reader/writer (plain or gzipped)
//!
//! Only biallelic sites are handled; multi-allelic records are skipped
//! with a warning. Dosages count the ALT allele, so on import ALT maps
//! to `allele1` (the counted allele) and REF to `allele2`.

use anyhow::{bail, Context, Result};
use log::warn;
use nalgebra::DMatrix;
use std::io::{BufRead, Write};

use crate::common_io::{open_buf_reader, open_buf_writer};
use crate::genotype::GenotypeMatrix;

const FIXED_FIELDS: usize = 9; // CHROM POS ID REF ALT QUAL FILTER INFO FORMAT

/// Read a VCF file into a dense `GenotypeMatrix`.
pub fn read_vcf(path: &str) -> Result<GenotypeMatrix> {
    let reader = open_buf_reader(path)?;

    let mut sample_ids: Option<Vec<String>> = None;
    let mut variant_ids = vec![];
    let mut chromosomes = vec![];
    let mut positions = vec![];
    let mut allele1 = vec![];
    let mut allele2 = vec![];
    let mut dosages: Vec<Vec<f32>> = vec![]; // one vector per variant
    let mut skipped_multiallelic = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with("##") {
            continue;
        }

        if line.starts_with("#CHROM") {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() <= FIXED_FIELDS {
                bail!("{}:{}: #CHROM header has no sample columns", path, line_no + 1);
            }
            sample_ids = Some(
                fields[FIXED_FIELDS..]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            );
            continue;
        }

        let samples = sample_ids
            .as_ref()
            .with_context(|| format!("{}:{}: record before #CHROM header", path, line_no + 1))?;

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != FIXED_FIELDS + samples.len() {
            bail!(
                "{}:{}: expected {} fields for {} samples, got {}",
                path,
                line_no + 1,
                FIXED_FIELDS + samples.len(),
                samples.len(),
                fields.len()
            );
        }

        let alt = fields[4];
        if alt.contains(',') {
            skipped_multiallelic += 1;
            continue;
        }

        let pos = fields[1]
            .parse::<u64>()
            .with_context(|| format!("{}:{}: invalid POS '{}'", path, line_no + 1, fields[1]))?;

        let gt_index = fields[8]
            .split(':')
            .position(|key| key == "GT")
            .with_context(|| format!("{}:{}: FORMAT has no GT field", path, line_no + 1))?;

        let mut row = Vec::with_capacity(samples.len());
        for call in &fields[FIXED_FIELDS..] {
            let gt = call.split(':').nth(gt_index).with_context(|| {
                format!("{}:{}: sample call missing GT: '{}'", path, line_no + 1, call)
            })?;
            row.push(parse_gt(gt).with_context(|| {
                format!("{}:{}: invalid GT '{}'", path, line_no + 1, gt)
            })?);
        }

        chromosomes.push(fields[0].to_string());
        positions.push(pos);
        variant_ids.push(fields[2].to_string());
        allele1.push(alt.to_string());
        allele2.push(fields[3].to_string());
        dosages.push(row);
    }

    let sample_ids = sample_ids.with_context(|| format!("{}: no #CHROM header line", path))?;

    if skipped_multiallelic > 0 {
        warn!(
            "skipped {} multi-allelic records in {}",
            skipped_multiallelic, path
        );
    }

    let n = sample_ids.len();
    let m = dosages.len();
    let genotypes = DMatrix::from_fn(n, m, |i, j| dosages[j][i]);

    Ok(GenotypeMatrix {
        genotypes,
        sample_ids,
        variant_ids,
        chromosomes,
        positions,
        allele1,
        allele2,
    })
}

/// Diploid GT string to ALT-allele dosage. Any missing allele makes the
/// whole call missing, as plink does when converting.
fn parse_gt(gt: &str) -> Result<f32> {
    let mut dosage = 0.0f32;
    for allele in gt.split(['/', '|']) {
        match allele {
            "0" => {}
            "1" => dosage += 1.0,
            "." => return Ok(f32::NAN),
            _ => bail!("unexpected allele '{}'", allele),
        }
    }
    Ok(dosage)
}

/// Write a `GenotypeMatrix` as a VCF file (gzipped if `path` ends in `.gz`).
///
/// Calls are unphased hard calls rebuilt from rounded dosages.
pub fn write_vcf(path: &str, geno: &GenotypeMatrix) -> Result<()> {
    let mut w = open_buf_writer(path)?;

    writeln!(w, "##fileformat=VCFv4.2")?;
    writeln!(w, "##source=geno-subset")?;
    writeln!(
        w,
        "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">"
    )?;
    write!(w, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT")?;
    for id in &geno.sample_ids {
        write!(w, "\t{}", id)?;
    }
    writeln!(w)?;

    for j in 0..geno.num_variants() {
        write!(
            w,
            "{}\t{}\t{}\t{}\t{}\t.\t.\t.\tGT",
            geno.chromosomes[j],
            geno.positions[j],
            geno.variant_ids[j],
            geno.allele2[j], // REF
            geno.allele1[j]  // ALT (the counted allele)
        )?;
        for i in 0..geno.num_individuals() {
            write!(w, "\t{}", format_gt(geno.genotypes[(i, j)]))?;
        }
        writeln!(w)?;
    }

    w.flush()?;
    Ok(())
}

fn format_gt(val: f32) -> &'static str {
    if val.is_nan() {
        "./."
    } else {
        match val.round() as i32 {
            2 => "1/1",
            1 => "0/1",
            _ => "0/0",
        }
    }
}
