use anyhow::Result;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::genotype::GenotypeMatrix;

const BED_HEADER: [u8; 3] = [0x6C, 0x1B, 0x01];

/// Write a `GenotypeMatrix` to PLINK BED/BIM/FAM files.
///
/// `prefix` is the path prefix; `{prefix}.bed`, `{prefix}.bim` and
/// `{prefix}.fam` will be created.
///
/// Encoding (SNP-major, A1 counted, matching the reader in `plink`):
///   2.0 -> 0b00, 1.0 -> 0b10, 0.0 -> 0b11, NaN -> 0b01
pub fn write_plink(prefix: &str, geno: &GenotypeMatrix) -> Result<()> {
    write_bed(prefix, geno)?;
    write_bim(prefix, geno)?;
    write_fam(prefix, geno)?;
    Ok(())
}

fn encode_genotype(val: f32) -> u8 {
    if val.is_nan() {
        0b01 // missing
    } else {
        match val.round() as i32 {
            2 => 0b00, // two copies of A1
            1 => 0b10, // het
            0 => 0b11, // zero copies of A1
            _ => 0b01, // out-of-range treated as missing
        }
    }
}

fn write_bed(prefix: &str, geno: &GenotypeMatrix) -> Result<()> {
    let mut w = BufWriter::new(File::create(format!("{}.bed", prefix))?);
    w.write_all(&BED_HEADER)?;

    let n = geno.num_individuals();
    let bytes_per_variant = n.div_ceil(4);

    for j in 0..geno.num_variants() {
        let mut buf = vec![0u8; bytes_per_variant];
        for i in 0..n {
            let bits = encode_genotype(geno.genotypes[(i, j)]);
            buf[i / 4] |= bits << ((i % 4) * 2);
        }
        w.write_all(&buf)?;
    }

    w.flush()?;
    Ok(())
}

fn write_bim(prefix: &str, geno: &GenotypeMatrix) -> Result<()> {
    let mut w = BufWriter::new(File::create(format!("{}.bim", prefix))?);

    for j in 0..geno.num_variants() {
        writeln!(
            w,
            "{}\t{}\t0\t{}\t{}\t{}",
            geno.chromosomes[j],
            geno.variant_ids[j],
            geno.positions[j],
            geno.allele1[j],
            geno.allele2[j]
        )?;
    }

    w.flush()?;
    Ok(())
}

fn write_fam(prefix: &str, geno: &GenotypeMatrix) -> Result<()> {
    let mut w = BufWriter::new(File::create(format!("{}.fam", prefix))?);

    // family ID and individual ID are both the sample ID
    for id in &geno.sample_ids {
        writeln!(w, "{}\t{}\t0\t0\t0\t-9", id, id)?;
    }

    w.flush()?;
    Ok(())
}
