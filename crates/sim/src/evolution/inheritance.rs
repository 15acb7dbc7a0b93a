//! Mendelian inheritance (Punnett squares).
//!
//! Each locus of a cross contributes the four pairings of one allele from
//! each parent. Loci assort independently, so the offspring distribution is
//! the product of the per-locus tallies over all loci.

use std::borrow::Cow;
use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::errors::InvariantViolation;
use crate::genome::{Genotype, GenotypeCatalog, GenotypeId, LocusPair};

/// Tolerance on the total probability mass of a cross.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Largest number of ordered parent pairs whose crosses are stored in full.
///
/// Bigger catalogs keep only the per-locus crosses and compose each row when
/// it is visited.
pub const DENSE_TABLE_LIMIT: usize = 1 << 18;

/// One offspring genotype of a cross and its probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offspring {
    pub genotype: GenotypeId,
    pub probability: f64,
}

/// Offspring genotype distribution of a cross between two genotypes.
///
/// # Errors
/// Returns [`InvariantViolation::LociMismatch`] if the parents have different
/// numbers of loci, and [`InvariantViolation::ProbabilityMass`] if the
/// resulting distribution does not sum to one.
pub fn punnett_square(
    a: &Genotype,
    b: &Genotype,
) -> Result<BTreeMap<Genotype, f64>, InvariantViolation> {
    if a.len() != b.len() {
        return Err(InvariantViolation::LociMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    // (partial offspring, probability)
    let mut partial: Vec<(Vec<LocusPair>, f64)> = vec![(Vec::with_capacity(a.len()), 1.0)];
    for (pa, pb) in a.loci().iter().zip(b.loci()) {
        let outcomes = tally_locus(pa.alleles(), pb.alleles(), LocusPair::new);
        partial = partial
            .into_iter()
            .flat_map(|(prefix, p)| {
                outcomes.iter().map(move |&(pair, k)| {
                    let mut next = prefix.clone();
                    next.push(pair);
                    (next, p * k)
                })
            })
            .collect();
    }

    let mut square = BTreeMap::new();
    for (loci, p) in partial {
        *square.entry(Genotype::new(loci)).or_insert(0.0) += p;
    }
    check_mass(square.values().copied())?;
    Ok(square)
}

/// Distinct canonical pairings of two parents' alleles at one locus, with
/// the fraction of the four pairings that produce each.
fn tally_locus<A: Copy, P: PartialEq + Copy>(
    a: [A; 2],
    b: [A; 2],
    pair: impl Fn(A, A) -> P,
) -> Vec<(P, f64)> {
    let mut outcomes: Vec<(P, f64)> = Vec::with_capacity(4);
    for x in a {
        for y in b {
            let p = pair(x, y);
            match outcomes.iter_mut().find(|(q, _)| *q == p) {
                Some((_, share)) => *share += 0.25,
                None => outcomes.push((p, 0.25)),
            }
        }
    }
    outcomes
}

fn check_mass(probabilities: impl Iterator<Item = f64>) -> Result<(), InvariantViolation> {
    let mass: f64 = probabilities.sum();
    if (mass - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(InvariantViolation::ProbabilityMass(mass));
    }
    Ok(())
}

/// Offspring distribution of a cross between two catalog genotypes, sorted
/// by offspring id.
pub fn cross(
    catalog: &GenotypeCatalog,
    a: GenotypeId,
    b: GenotypeId,
) -> Result<Vec<Offspring>, InvariantViolation> {
    let radix = catalog.pairs_per_locus();
    let mut partial: Vec<(usize, f64)> = vec![(0, 1.0)];
    for (sa, sb) in catalog.slots(a).iter().zip(catalog.slots(b)) {
        let outcomes = tally_locus(*sa, *sb, |x, y| catalog.pair_code(x, y));
        partial = partial
            .into_iter()
            .flat_map(|(prefix, p)| {
                outcomes
                    .iter()
                    .map(move |&(code, k)| (prefix * radix + code, p * k))
            })
            .collect();
    }

    let mut offspring: Vec<Offspring> = partial
        .into_iter()
        .map(|(id, probability)| Offspring {
            genotype: GenotypeId::new(id),
            probability,
        })
        .collect();
    offspring.sort_by_key(|o| o.genotype);
    check_mass(offspring.iter().map(|o| o.probability))?;
    Ok(offspring)
}

#[derive(Debug, Clone)]
enum Crosses {
    /// `size * size + 1` offsets into `entries`, row-major by (mother, father)
    Dense {
        offsets: Vec<usize>,
        entries: Vec<Offspring>,
    },
    /// Outcomes of every ordered pair of locus pair codes, sorted by code,
    /// plus the locus pair codes of every genotype.
    PerLocus {
        radix: usize,
        loci: usize,
        outcomes: Vec<Vec<(usize, f64)>>,
        codes: Vec<usize>,
    },
}

/// Offspring distributions for every ordered pair of catalog genotypes.
///
/// Built once per run. Catalogs up to [`DENSE_TABLE_LIMIT`] ordered pairs
/// store every row; larger ones store the per-locus crosses and compose rows
/// on demand. Either way [`InheritanceTable::for_each_offspring`] does not
/// allocate.
#[derive(Debug, Clone)]
pub struct InheritanceTable {
    size: usize,
    crosses: Crosses,
}

impl InheritanceTable {
    /// Precompute the crosses of `catalog`.
    pub fn new(catalog: &GenotypeCatalog) -> Result<Self, InvariantViolation> {
        let size = catalog.len();
        let crosses = match size.checked_mul(size) {
            Some(pairs) if pairs <= DENSE_TABLE_LIMIT => Self::dense(catalog)?,
            _ => Self::per_locus(catalog)?,
        };
        Ok(Self { size, crosses })
    }

    fn dense(catalog: &GenotypeCatalog) -> Result<Crosses, InvariantViolation> {
        let size = catalog.len();
        let rows: Vec<Vec<Offspring>> = (0..size * size)
            .into_par_iter()
            .map(|pair| {
                cross(
                    catalog,
                    GenotypeId::new(pair / size),
                    GenotypeId::new(pair % size),
                )
            })
            .collect::<Result<_, _>>()?;

        let mut offsets = Vec::with_capacity(rows.len() + 1);
        let mut entries = Vec::with_capacity(rows.iter().map(Vec::len).sum());
        offsets.push(0);
        for row in rows {
            entries.extend(row);
            offsets.push(entries.len());
        }
        Ok(Crosses::Dense { offsets, entries })
    }

    fn per_locus(catalog: &GenotypeCatalog) -> Result<Crosses, InvariantViolation> {
        let radix = catalog.pairs_per_locus();
        let alleles = catalog.alleles_per_locus();
        let pairs: Vec<[u16; 2]> = (0..alleles as u16)
            .flat_map(|a| (a..alleles as u16).map(move |b| [a, b]))
            .collect();

        let mut outcomes = Vec::with_capacity(radix * radix);
        for &pa in &pairs {
            for &pb in &pairs {
                let mut row = tally_locus(pa, pb, |x, y| catalog.pair_code(x, y));
                row.sort_by_key(|&(code, _)| code);
                check_mass(row.iter().map(|&(_, p)| p))?;
                outcomes.push(row);
            }
        }

        let codes = catalog
            .ids()
            .flat_map(|id| {
                catalog
                    .slots(id)
                    .iter()
                    .map(|&[x, y]| catalog.pair_code(x, y))
            })
            .collect();

        Ok(Crosses::PerLocus {
            radix,
            loci: catalog.loci(),
            outcomes,
            codes,
        })
    }

    /// Number of genotypes the table covers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether every row is stored rather than composed per visit.
    pub fn is_dense(&self) -> bool {
        matches!(self.crosses, Crosses::Dense { .. })
    }

    /// Visit the offspring of `a × b` in ascending genotype order.
    #[inline]
    pub fn for_each_offspring(&self, a: GenotypeId, b: GenotypeId, mut f: impl FnMut(Offspring)) {
        match &self.crosses {
            Crosses::Dense { offsets, entries } => {
                let pair = a.index() * self.size + b.index();
                entries[offsets[pair]..offsets[pair + 1]]
                    .iter()
                    .copied()
                    .for_each(f);
            }
            Crosses::PerLocus {
                radix,
                loci,
                outcomes,
                codes,
            } => {
                let ca = &codes[a.index() * loci..(a.index() + 1) * loci];
                let cb = &codes[b.index() * loci..(b.index() + 1) * loci];
                compose(outcomes, *radix, ca, cb, 0, 1.0, &mut f);
            }
        }
    }

    /// Offspring distribution of `a × b`, sorted by offspring id.
    pub fn offspring(&self, a: GenotypeId, b: GenotypeId) -> Cow<'_, [Offspring]> {
        match &self.crosses {
            Crosses::Dense { offsets, entries } => {
                let pair = a.index() * self.size + b.index();
                Cow::Borrowed(&entries[offsets[pair]..offsets[pair + 1]])
            }
            Crosses::PerLocus { .. } => {
                let mut row = Vec::new();
                self.for_each_offspring(a, b, |child| row.push(child));
                Cow::Owned(row)
            }
        }
    }
}

/// Depth-first product of per-locus outcomes; ids come out ascending because
/// each locus's outcomes are sorted and the first locus is most significant.
fn compose<F: FnMut(Offspring)>(
    outcomes: &[Vec<(usize, f64)>],
    radix: usize,
    a: &[usize],
    b: &[usize],
    prefix: usize,
    probability: f64,
    f: &mut F,
) {
    match (a.split_first(), b.split_first()) {
        (Some((&la, rest_a)), Some((&lb, rest_b))) => {
            for &(code, p) in &outcomes[la * radix + lb] {
                compose(
                    outcomes,
                    radix,
                    rest_a,
                    rest_b,
                    prefix * radix + code,
                    probability * p,
                    f,
                );
            }
        }
        _ => f(Offspring {
            genotype: GenotypeId::new(prefix),
            probability,
        }),
    }
}
