//! Genotype model: alleles, canonical multi-locus genotypes and the catalog
//! that enumerates and interns them.

mod allele;
pub mod catalog;
mod genotype;

pub use allele::{Allele, InvalidAllele, MAX_LOCI};
pub use catalog::{GenotypeCatalog, GenotypeId};
pub use genotype::{Genotype, InvalidGenotype, LocusPair};
