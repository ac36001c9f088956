use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use geno_subset::pipeline::{run, SubsetArgs};

const LOGO: &str = include_str!("../logo.txt");

const LONG_ABOUT: &str = "Export a subset of individuals from a genotype dataset.

For a multi-dataset cohort, first run once on a single chromosome with
--choose-samples, --num-samples <N> and --output-type samples. That writes a
tab-separated file with the randomly chosen sample list. Then run once per
chromosome (or per dataset), each job using --individuals-to-keep <FILE> with
the list written by the first step.

If only a single dataset needs subsetting, --choose-samples and
--num-samples <N> can write the subset directly in any output format.

To convert an entire dataset from one file format to another, use
--unfiltered to write the full dataset without any sample filtering.";

fn colorize_logo_line(line: &str) -> String {
    line.replace(':', &":".truecolor(210, 180, 120).to_string())
        .replace('.', &".".truecolor(180, 160, 110).to_string())
        .replace('(', &"(".truecolor(100, 180, 100).to_string())
        .replace(')', &")".truecolor(100, 180, 100).to_string())
        .replace('/', &"/".green().to_string())
        .replace('\\', &"\\".green().to_string())
        .replace('_', &"_".green().to_string())
        .replace('|', &"|".green().to_string())
}

fn print_logo() {
    for line in LOGO.lines() {
        println!("  {}", colorize_logo_line(line));
    }
    println!(" {}", "Genotype dataset subsetting and conversion".bold());
    println!();
}

/// Export a subset of individuals from a genotype dataset
#[derive(Parser, Debug)]
#[command(name = "geno-subset", version, about, long_about = LONG_ABOUT, term_width = 80)]
struct Cli {
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(flatten)]
    args: SubsetArgs,
}

fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--help" || arg == "-h") {
        print_logo();
    }

    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    run(&cli.args)
}
