pub mod common_io; // gzip-aware buffered file IO
pub mod genotype; // dense genotype matrix with sample/variant metadata
pub mod plink; // PLINK BED/BIM/FAM reader
pub mod plink_writer; // PLINK BED/BIM/FAM writer
pub mod tables; // keyed sample tables (ancestry, keep lists, kinship)
pub mod vcf; // text VCF reader/writer
