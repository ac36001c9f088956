//! Read -> select -> write pipeline
//!
//! One pass over the dataset: read the input into a `GenotypeMatrix`,
//! apply exactly one of the three selection modes, write the result.

use anyhow::{bail, ensure, Context, Result};
use clap::{Args, ValueEnum};
use log::{info, warn};
use std::path::Path;

use geno_data::common_io::write_lines;
use geno_data::genotype::GenotypeMatrix;
use geno_data::plink::PlinkReader;
use geno_data::plink_writer::write_plink;
use geno_data::tables::{read_ancestry_table, read_kinship_table, read_sample_list};
use geno_data::vcf::{read_vcf, write_vcf};

use crate::select::{
    choose_subset, filter_to_ancestry, filter_to_keep_list, filter_to_unrelated,
    DEFAULT_KINSHIP_CUTOFF,
};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// PLINK BED/BIM/FAM file set (path is the prefix)
    Plink,
    /// Text VCF, plain or gzipped
    Vcf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    /// PLINK BED/BIM/FAM file set (path is the prefix)
    Plink,
    /// Text VCF, plain or gzipped
    Vcf,
    /// TSV sample list with header `s`
    Samples,
}

#[derive(Args, Debug, Clone)]
pub struct SubsetArgs {
    #[arg(long, help = "Path to the dataset to subset (PLINK prefix or VCF file)")]
    pub input_path: String,

    #[arg(long, value_enum, help = "Type of the input dataset")]
    pub input_type: InputType,

    #[arg(long, help = "Path to the output (PLINK prefix, VCF file, or sample list)")]
    pub output_path: String,

    #[arg(long, value_enum, help = "Type of the output dataset")]
    pub output_type: OutputType,

    #[arg(
        long,
        help = "Randomly choose samples (after optional ancestry/relatedness filters)"
    )]
    pub choose_samples: bool,

    #[arg(long, help = "Number of samples to subset")]
    pub num_samples: Option<usize>,

    #[arg(
        long,
        default_value = "all",
        help = "Ancestry label to keep ('all' disables the filter)"
    )]
    pub ancestry: String,

    #[arg(long, help = "Ancestry table with 's' and 'ancestry' columns")]
    pub ancestry_file: Option<String>,

    #[arg(long, help = "Do not remove related samples")]
    pub keep_related: bool,

    #[arg(long, help = "Kinship table with 'ID1', 'ID2' and 'Kinship' columns")]
    pub kinship_file: Option<String>,

    #[arg(
        long,
        default_value_t = DEFAULT_KINSHIP_CUTOFF,
        help = "Kinship coefficient above which a pair counts as related"
    )]
    pub kinship_cutoff: f64,

    #[arg(long, help = "Path to a sample list ('s' column) to subset to")]
    pub individuals_to_keep: Option<String>,

    #[arg(long, help = "Write the file with no sample filtering applied")]
    pub unfiltered: bool,

    #[arg(long, default_value = "42", help = "Random seed for --choose-samples")]
    pub seed: u64,
}

pub fn run(args: &SubsetArgs) -> Result<()> {
    let num_modes = args.choose_samples as usize
        + args.individuals_to_keep.is_some() as usize
        + args.unfiltered as usize;
    ensure!(
        num_modes == 1,
        "exactly one of --choose-samples, --individuals-to-keep and --unfiltered must be used"
    );

    let geno = read_input(args.input_type, &args.input_path)?;
    geno.validate()?;
    info!(
        "read {} samples x {} variants from {}",
        geno.num_individuals(),
        geno.num_variants(),
        args.input_path
    );

    let geno = if args.choose_samples {
        run_choose(args, geno)?
    } else if let Some(list_path) = &args.individuals_to_keep {
        warn_ignored_flags(args, "--individuals-to-keep");
        let keep = read_sample_list(list_path)?;
        filter_to_keep_list(geno, &keep).with_context(|| {
            format!(
                "sample list: {}, dataset to filter: {}",
                list_path, args.input_path
            )
        })?
    } else {
        warn_ignored_flags(args, "--unfiltered");
        warn!("file will be written without any filtering, due to use of --unfiltered");
        geno
    };

    write_output(args.output_type, &args.output_path, &geno)
}

fn run_choose(args: &SubsetArgs, geno: GenotypeMatrix) -> Result<GenotypeMatrix> {
    let geno = if args.ancestry == "all" {
        geno
    } else {
        let ancestry_file = args
            .ancestry_file
            .as_deref()
            .context("--ancestry requires --ancestry-file")?;
        let table = read_ancestry_table(ancestry_file)?;
        filter_to_ancestry(geno, &table, &args.ancestry)?
    };

    let geno = if args.keep_related {
        geno
    } else {
        let kinship_file = args
            .kinship_file
            .as_deref()
            .context("--kinship-file is required unless --keep-related is used")?;
        let pairs = read_kinship_table(kinship_file)?;
        filter_to_unrelated(geno, &pairs, args.kinship_cutoff)?
    };

    let num_samples = args
        .num_samples
        .context("--choose-samples requires --num-samples")?;
    choose_subset(geno, num_samples, args.seed)
}

fn warn_ignored_flags(args: &SubsetArgs, mode: &str) {
    if args.num_samples.is_some() || args.ancestry != "all" || args.keep_related {
        warn!(
            "{} makes --num-samples, --ancestry and --keep-related be ignored",
            mode
        );
    }
}

fn read_input(input_type: InputType, path: &str) -> Result<GenotypeMatrix> {
    match input_type {
        InputType::Plink => PlinkReader::open(path)?.read(),
        InputType::Vcf => read_vcf(path),
    }
}

fn write_output(output_type: OutputType, path: &str, geno: &GenotypeMatrix) -> Result<()> {
    match output_type {
        OutputType::Plink => {
            let file_name = Path::new(path)
                .file_name()
                .and_then(|x| x.to_str())
                .with_context(|| format!("invalid PLINK output prefix: {}", path))?;
            ensure!(
                !file_name.contains('.'),
                "PLINK output prefix should not contain '.' in the file name: {}",
                path
            );
            write_plink(path, geno)?;
            info!("wrote {}.bed, {}.bim, {}.fam", path, path, path);
        }
        OutputType::Vcf => {
            ensure!(
                path.ends_with(".vcf") || path.ends_with(".vcf.gz"),
                "VCF output path should end in .vcf or .vcf.gz: {}",
                path
            );
            write_vcf(path, geno)?;
            info!("wrote {}", path);
        }
        OutputType::Samples => {
            if Path::new(path).exists() {
                bail!("file already exists: {}", path);
            }
            let mut lines: Vec<&str> = vec!["s"];
            lines.extend(geno.sample_ids.iter().map(String::as_str));
            write_lines(&lines, path)?;
            info!("wrote {} sample ids to {}", geno.num_individuals(), path);
        }
    }
    Ok(())
}
