//! Enumeration and interning of every genotype in a loci/alleles space.
//!
//! Genotypes are interned to dense [`GenotypeId`]s when the catalog is built.
//! All per-genotype data (census records, fields, inheritance tables, mutation
//! distances) is stored in flat arrays indexed by that id.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::allele::{Allele, MAX_LOCI};
use super::genotype::{Genotype, LocusPair};
use crate::errors::{ConfigurationError, InvariantViolation};

/// Dense index of a genotype within its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenotypeId(usize);

impl GenotypeId {
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for GenotypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Number of unordered pairs with repetition drawn from `alleles` variants.
#[inline]
pub fn pairs_per_locus(alleles: usize) -> usize {
    alleles * (alleles + 1) / 2
}

/// Every canonical genotype for `loci` loci with `alleles` variants each.
///
/// Enumeration order is the cross product of per-locus pairs with the last
/// locus varying fastest; within a locus pairs are ordered
/// `(1,1), (1,2), ..., (1,n), (2,2), ...`. Two catalogs built from the same
/// inputs compare equal and enumerate identically.
#[derive(Debug, Clone)]
pub struct GenotypeCatalog {
    loci: usize,
    alleles: usize,
    pairs_per_locus: usize,
    genotypes: Vec<Genotype>,
    index: HashMap<Genotype, GenotypeId>,
    /// Variant indices of the canonical pair, `loci` entries per genotype.
    slots: Vec<[u16; 2]>,
}

impl GenotypeCatalog {
    /// Build the catalog.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::InvalidGenotypeSpace`] if `loci` or
    /// `alleles` is zero, and [`ConfigurationError::GenotypeSpaceTooLarge`]
    /// if there are more than [`MAX_LOCI`] loci, more alleles than fit a
    /// `u16` variant index, or more genotypes than fit a `usize`.
    pub fn new(loci: usize, alleles: usize) -> Result<Self, ConfigurationError> {
        if loci < 1 || alleles < 1 {
            return Err(ConfigurationError::InvalidGenotypeSpace { loci, alleles });
        }
        if loci > MAX_LOCI {
            return Err(ConfigurationError::GenotypeSpaceTooLarge {
                loci,
                alleles,
                reason: "too many loci",
            });
        }
        if alleles > usize::from(u16::MAX) + 1 {
            return Err(ConfigurationError::GenotypeSpaceTooLarge {
                loci,
                alleles,
                reason: "too many alleles",
            });
        }

        let per_locus = pairs_per_locus(alleles);
        let size = (0..loci)
            .try_fold(1usize, |acc, _| acc.checked_mul(per_locus))
            .ok_or(ConfigurationError::GenotypeSpaceTooLarge {
                loci,
                alleles,
                reason: "too many genotypes",
            })?;

        // Combinations with repetition, in enumeration order
        let locus_pairs: Vec<[u16; 2]> = (0..alleles)
            .flat_map(|a| (a..alleles).map(move |b| [a as u16, b as u16]))
            .collect();
        debug_assert_eq!(locus_pairs.len(), per_locus);

        let mut genotypes = Vec::with_capacity(size);
        let mut slots = Vec::with_capacity(size * loci);
        let mut digits = vec![0usize; loci];
        for _ in 0..size {
            let pairs = digits.iter().enumerate().map(|(locus, &digit)| {
                let [a, b] = locus_pairs[digit];
                LocusPair::new(
                    Allele::new(locus, a as usize),
                    Allele::new(locus, b as usize),
                )
            });
            genotypes.push(Genotype::new(pairs));
            slots.extend(digits.iter().map(|&digit| locus_pairs[digit]));

            // Advance the odometer, last locus fastest
            for digit in digits.iter_mut().rev() {
                *digit += 1;
                if *digit < per_locus {
                    break;
                }
                *digit = 0;
            }
        }

        let index = genotypes
            .iter()
            .enumerate()
            .map(|(i, g)| (g.clone(), GenotypeId(i)))
            .collect();

        Ok(Self {
            loci,
            alleles,
            pairs_per_locus: per_locus,
            genotypes,
            index,
            slots,
        })
    }

    /// Number of loci per genotype.
    #[inline]
    pub fn loci(&self) -> usize {
        self.loci
    }

    /// Number of allele variants per locus.
    #[inline]
    pub fn alleles_per_locus(&self) -> usize {
        self.alleles
    }

    /// Number of canonical pairs per locus.
    #[inline]
    pub fn pairs_per_locus(&self) -> usize {
        self.pairs_per_locus
    }

    /// Number of genotypes.
    #[inline]
    pub fn len(&self) -> usize {
        self.genotypes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genotypes.is_empty()
    }

    /// All genotypes in enumeration order.
    pub fn genotypes(&self) -> &[Genotype] {
        &self.genotypes
    }

    /// All ids in enumeration order.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = GenotypeId> {
        (0..self.genotypes.len()).map(GenotypeId)
    }

    /// Genotype for an id.
    ///
    /// # Panics
    /// Panics if `id` does not come from this catalog.
    #[inline]
    pub fn genotype(&self, id: GenotypeId) -> &Genotype {
        &self.genotypes[id.0]
    }

    /// Id of a genotype, if present.
    pub fn id_of(&self, genotype: &Genotype) -> Option<GenotypeId> {
        self.index.get(genotype).copied()
    }

    /// Id of a genotype, failing when it is not part of the catalog.
    pub fn require(&self, genotype: &Genotype) -> Result<GenotypeId, InvariantViolation> {
        self.id_of(genotype)
            .ok_or_else(|| InvariantViolation::UnknownGenotype(genotype.to_string()))
    }

    /// Variant indices of each locus pair of `id`, in locus order.
    #[inline]
    pub fn slots(&self, id: GenotypeId) -> &[[u16; 2]] {
        &self.slots[id.0 * self.loci..(id.0 + 1) * self.loci]
    }

    /// Id of the genotype whose locus pairs have the given variant indices.
    ///
    /// Pairs need not be sorted.
    pub fn compose(&self, pairs: impl IntoIterator<Item = (u16, u16)>) -> GenotypeId {
        let id = pairs.into_iter().fold(0usize, |acc, (a, b)| {
            acc * self.pairs_per_locus + self.pair_code(a, b)
        });
        GenotypeId(id)
    }

    /// Position of the pair `(a, b)` within one locus, in enumeration order.
    #[inline]
    pub fn pair_code(&self, a: u16, b: u16) -> usize {
        let (a, b) = (a.min(b) as usize, a.max(b) as usize);
        a * (2 * self.alleles - a + 1) / 2 + (b - a)
    }

    /// Alleles available at one locus.
    pub fn alleles_at(&self, locus: usize) -> impl Iterator<Item = Allele> + '_ {
        (0..self.alleles).map(move |variant| Allele::new(locus, variant))
    }

    /// Every allele of every locus, ordered by locus then variant.
    pub fn all_alleles(&self) -> impl Iterator<Item = Allele> + '_ {
        (0..self.loci).flat_map(move |locus| self.alleles_at(locus))
    }

    /// Number of allele slots that differ between two genotypes.
    pub fn distance(&self, a: GenotypeId, b: GenotypeId) -> usize {
        self.slots(a)
            .iter()
            .zip(self.slots(b))
            .map(|(x, y)| (x[0] != y[0]) as usize + (x[1] != y[1]) as usize)
            .sum()
    }
}

impl PartialEq for GenotypeCatalog {
    fn eq(&self, other: &Self) -> bool {
        self.loci == other.loci && self.alleles == other.alleles
    }
}

impl Eq for GenotypeCatalog {}
