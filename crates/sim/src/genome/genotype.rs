use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::allele::{Allele, InvalidAllele};

/// An unordered pair of alleles at one locus, stored sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocusPair {
    first: Allele,
    second: Allele,
}

impl LocusPair {
    /// Create a canonical pair; `(a, b)` and `(b, a)` produce the same value.
    pub fn new(a: Allele, b: Allele) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// The smaller allele of the pair.
    #[inline]
    pub fn first(&self) -> Allele {
        self.first
    }

    /// The larger allele of the pair.
    #[inline]
    pub fn second(&self) -> Allele {
        self.second
    }

    /// Both alleles, smaller first.
    #[inline]
    pub fn alleles(&self) -> [Allele; 2] {
        [self.first, self.second]
    }

    pub fn is_homozygous(&self) -> bool {
        self.first == self.second
    }

    /// Number of allele slots that differ between two canonical pairs.
    #[inline]
    pub fn mismatches(&self, other: &Self) -> usize {
        (self.first != other.first) as usize + (self.second != other.second) as usize
    }
}

impl fmt::Display for LocusPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

/// A canonical multi-locus genotype.
///
/// Locus order is fixed and significant; each locus pair is canonical, so two
/// genotypes are equal exactly when their canonical sequences are equal.
/// Genotypes render as space-separated pairs, e.g. `A1/A2 B1/B1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Genotype {
    loci: Box<[LocusPair]>,
}

/// Error returned when parsing a genotype label fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidGenotype {
    #[error("Empty genotype")]
    Empty,
    #[error("Locus '{0}' must be two alleles separated by '/'")]
    MalformedLocus(String),
    #[error(transparent)]
    Allele(#[from] InvalidAllele),
    #[error("Locus {position} holds alleles of locus {found}")]
    WrongLocus { position: usize, found: usize },
}

impl Genotype {
    /// Create a genotype from per-locus pairs, in locus order.
    pub fn new(loci: impl IntoIterator<Item = LocusPair>) -> Self {
        Self {
            loci: loci.into_iter().collect(),
        }
    }

    /// Create a genotype from per-locus allele pairs in any order.
    pub fn from_alleles(pairs: impl IntoIterator<Item = (Allele, Allele)>) -> Self {
        Self::new(pairs.into_iter().map(|(a, b)| LocusPair::new(a, b)))
    }

    /// Number of loci.
    #[inline]
    pub fn len(&self) -> usize {
        self.loci.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    /// All locus pairs in locus order.
    #[inline]
    pub fn loci(&self) -> &[LocusPair] {
        &self.loci
    }

    /// Pair at a specific locus.
    pub fn locus(&self, index: usize) -> Option<&LocusPair> {
        self.loci.get(index)
    }

    /// Every allele copy carried, two per locus.
    pub fn alleles(&self) -> impl Iterator<Item = Allele> + '_ {
        self.loci.iter().flat_map(|pair| pair.alleles())
    }

    /// Number of allele slots that differ from `other`, compared locus by locus.
    pub fn distance(&self, other: &Genotype) -> usize {
        self.loci
            .iter()
            .zip(other.loci.iter())
            .map(|(a, b)| a.mismatches(b))
            .sum()
    }

    pub fn is_homozygous(&self) -> bool {
        self.loci.iter().all(LocusPair::is_homozygous)
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pair) in self.loci.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{pair}")?;
        }
        Ok(())
    }
}

impl FromStr for Genotype {
    type Err = InvalidGenotype;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pairs = Vec::new();
        for (position, token) in s.split_whitespace().enumerate() {
            let (a, b) = token
                .split_once('/')
                .ok_or_else(|| InvalidGenotype::MalformedLocus(token.to_string()))?;
            let (a, b): (Allele, Allele) = (a.parse()?, b.parse()?);
            for allele in [a, b] {
                if allele.locus() != position {
                    return Err(InvalidGenotype::WrongLocus {
                        position,
                        found: allele.locus(),
                    });
                }
            }
            pairs.push(LocusPair::new(a, b));
        }
        if pairs.is_empty() {
            return Err(InvalidGenotype::Empty);
        }
        Ok(Self::new(pairs))
    }
}

impl From<Genotype> for String {
    fn from(genotype: Genotype) -> Self {
        genotype.to_string()
    }
}

impl TryFrom<String> for Genotype {
    type Error = InvalidGenotype;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
