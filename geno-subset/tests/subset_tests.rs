use nalgebra::DMatrix;
use std::collections::HashSet;
use std::path::Path;

use geno_data::common_io::{read_lines, write_lines};
use geno_data::genotype::GenotypeMatrix;
use geno_data::plink::PlinkReader;
use geno_data::plink_writer::write_plink;
use geno_data::vcf::read_vcf;
use geno_subset::pipeline::{run, InputType, OutputType, SubsetArgs};

/// 6 individuals x 4 variants, no missing calls.
fn cohort() -> GenotypeMatrix {
    let data = vec![
        2.0, 1.0, 0.0, 1.0, 2.0, 0.0, // v1
        0.0, 0.0, 2.0, 2.0, 1.0, 1.0, // v2
        1.0, 2.0, 1.0, 0.0, 0.0, 2.0, // v3
        0.0, 1.0, 1.0, 2.0, 1.0, 0.0, // v4
    ];
    GenotypeMatrix {
        genotypes: DMatrix::from_vec(6, 4, data),
        sample_ids: (1..=6).map(|i| format!("s{}", i)).collect(),
        variant_ids: (1..=4).map(|j| format!("v{}", j)).collect(),
        chromosomes: vec!["1".into(), "1".into(), "2".into(), "2".into()],
        positions: vec![100, 200, 300, 400],
        allele1: vec!["A".into(), "C".into(), "G".into(), "T".into()],
        allele2: vec!["T".into(), "G".into(), "A".into(), "C".into()],
    }
}

struct Fixture {
    dir: tempfile::TempDir,
    prefix: String,
    ancestry_file: String,
    kinship_file: String,
}

fn write_fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("cohort").to_str().unwrap().to_string();
    write_plink(&prefix, &cohort()).unwrap();

    // s1..s5 eur, s6 afr
    let ancestry_file = dir.path().join("ancestry.tsv").to_str().unwrap().to_string();
    write_lines(
        &[
            "s ancestry",
            "s1 eur",
            "s2 eur",
            "s3 eur",
            "s4 eur",
            "s5 eur",
            "s6 afr",
        ],
        &ancestry_file,
    )
    .unwrap();

    // one related pair (s1, s2); everything else below the cutoff
    let kinship_file = dir.path().join("kinship.dat").to_str().unwrap().to_string();
    write_lines(
        &[
            "ID1 ID2 HetHet IBS0 Kinship",
            "s1 s2 0.1 0.001 0.25",
            "s3 s4 0.05 0.01 0.001",
        ],
        &kinship_file,
    )
    .unwrap();

    Fixture {
        dir,
        prefix,
        ancestry_file,
        kinship_file,
    }
}

fn base_args(fx: &Fixture, output_path: &str, output_type: OutputType) -> SubsetArgs {
    SubsetArgs {
        input_path: fx.prefix.clone(),
        input_type: InputType::Plink,
        output_path: output_path.to_string(),
        output_type,
        choose_samples: false,
        num_samples: None,
        ancestry: "all".to_string(),
        ancestry_file: None,
        keep_related: false,
        kinship_file: None,
        kinship_cutoff: geno_subset::select::DEFAULT_KINSHIP_CUTOFF,
        individuals_to_keep: None,
        unfiltered: false,
        seed: 42,
    }
}

#[test]
fn choose_samples_writes_a_deterministic_sample_list() {
    let fx = write_fixture();
    let out1 = fx.dir.path().join("chosen1.tsv");
    let out2 = fx.dir.path().join("chosen2.tsv");

    let mut args = base_args(&fx, out1.to_str().unwrap(), OutputType::Samples);
    args.choose_samples = true;
    args.num_samples = Some(2);
    args.ancestry = "eur".to_string();
    args.ancestry_file = Some(fx.ancestry_file.clone());
    args.kinship_file = Some(fx.kinship_file.clone());
    run(&args).unwrap();

    let lines = read_lines(out1.to_str().unwrap()).unwrap();
    assert_eq!(lines[0].as_ref(), "s");
    assert_eq!(lines.len(), 3);

    // ancestry drops s6; the related pair (s1, s2) loses one member
    let eligible: HashSet<&str> = ["s1", "s2", "s3", "s4", "s5"].into_iter().collect();
    for id in &lines[1..] {
        assert!(eligible.contains(id.as_ref()), "unexpected sample {}", id);
        assert_ne!(id.as_ref(), "s6");
    }

    // same seed, same choice
    args.output_path = out2.to_str().unwrap().to_string();
    run(&args).unwrap();
    let again = read_lines(out2.to_str().unwrap()).unwrap();
    assert_eq!(lines, again);
}

#[test]
fn keep_list_subsets_plink_to_plink() {
    let fx = write_fixture();
    let keep_file = fx.dir.path().join("keep.tsv");
    write_lines(&["s", "s2", "s4"], keep_file.to_str().unwrap()).unwrap();

    let out_prefix = fx.dir.path().join("subset");
    let mut args = base_args(&fx, out_prefix.to_str().unwrap(), OutputType::Plink);
    args.individuals_to_keep = Some(keep_file.to_str().unwrap().to_string());
    run(&args).unwrap();

    let back = PlinkReader::open(out_prefix.to_str().unwrap())
        .unwrap()
        .read()
        .unwrap();
    assert_eq!(back.sample_ids, vec!["s2", "s4"]);
    assert_eq!(back.num_variants(), 4);

    let full = cohort();
    for (row, orig_row) in [1usize, 3].into_iter().enumerate() {
        for j in 0..4 {
            assert_eq!(back.genotypes[(row, j)], full.genotypes[(orig_row, j)]);
        }
    }
}

#[test]
fn keep_list_with_unknown_sample_fails() {
    let fx = write_fixture();
    let keep_file = fx.dir.path().join("keep.tsv");
    write_lines(&["s", "s2", "s99"], keep_file.to_str().unwrap()).unwrap();

    let mut args = base_args(&fx, "unused", OutputType::Samples);
    args.individuals_to_keep = Some(keep_file.to_str().unwrap().to_string());

    let err = run(&args).unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("missing from the dataset"), "got: {}", msg);
}

#[test]
fn unfiltered_converts_plink_to_vcf() {
    let fx = write_fixture();
    let out = fx.dir.path().join("cohort.vcf.gz");

    let mut args = base_args(&fx, out.to_str().unwrap(), OutputType::Vcf);
    args.unfiltered = true;
    run(&args).unwrap();

    let back = read_vcf(out.to_str().unwrap()).unwrap();
    let full = cohort();
    assert_eq!(back.sample_ids, full.sample_ids);
    assert_eq!(back.variant_ids, full.variant_ids);
    for i in 0..6 {
        for j in 0..4 {
            assert_eq!(back.genotypes[(i, j)], full.genotypes[(i, j)]);
        }
    }
}

#[test]
fn exactly_one_mode_is_required() {
    let fx = write_fixture();

    // no mode at all
    let args = base_args(&fx, "unused", OutputType::Samples);
    assert!(run(&args).is_err());

    // two modes at once
    let mut args = base_args(&fx, "unused", OutputType::Samples);
    args.choose_samples = true;
    args.num_samples = Some(2);
    args.unfiltered = true;
    assert!(run(&args).is_err());
}

#[test]
fn samples_output_refuses_to_overwrite() {
    let fx = write_fixture();
    let out = fx.dir.path().join("existing.tsv");
    write_lines(&["s"], out.to_str().unwrap()).unwrap();

    let mut args = base_args(&fx, out.to_str().unwrap(), OutputType::Samples);
    args.unfiltered = true;

    let err = run(&args).unwrap_err();
    assert!(format!("{:#}", err).contains("already exists"));
}

#[test]
fn plink_output_prefix_must_not_contain_a_dot() {
    let fx = write_fixture();
    let out = fx.dir.path().join("subset.out");

    let mut args = base_args(&fx, out.to_str().unwrap(), OutputType::Plink);
    args.unfiltered = true;

    let err = run(&args).unwrap_err();
    assert!(format!("{:#}", err).contains("should not contain '.'"));
    assert!(!Path::new(&format!("{}.bed", out.to_str().unwrap())).exists());
}

#[test]
fn choose_without_num_samples_fails() {
    let fx = write_fixture();
    let mut args = base_args(&fx, "unused", OutputType::Samples);
    args.choose_samples = true;
    args.keep_related = true;

    let err = run(&args).unwrap_err();
    assert!(format!("{:#}", err).contains("--num-samples"));
}

#[test]
fn choose_without_kinship_file_fails_unless_keep_related() {
    let fx = write_fixture();
    let out = fx.dir.path().join("chosen.tsv");

    let mut args = base_args(&fx, out.to_str().unwrap(), OutputType::Samples);
    args.choose_samples = true;
    args.num_samples = Some(3);
    assert!(run(&args).is_err());

    args.keep_related = true;
    run(&args).unwrap();
    let lines = read_lines(out.to_str().unwrap()).unwrap();
    assert_eq!(lines.len(), 4);
}
