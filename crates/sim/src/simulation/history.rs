use std::ops::Index;

use crate::errors::InvariantViolation;
use crate::simulation::Census;

/// Append-only sequence of censuses indexed by generation number.
///
/// Generation 0 is the initial census. Entries are never modified once
/// appended.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationHistory {
    censuses: Vec<Census>,
}

impl GenerationHistory {
    /// Start a history from the generation-0 census.
    pub fn new(initial: Census) -> Self {
        Self {
            censuses: vec![initial],
        }
    }

    /// Append the census of the next generation.
    pub fn push(&mut self, census: Census) -> Result<(), InvariantViolation> {
        census.ensure_catalog(self.latest().catalog())?;
        self.censuses.push(census);
        Ok(())
    }

    /// Number of recorded generations, including generation 0.
    pub fn len(&self) -> usize {
        self.censuses.len()
    }

    /// Always false; a history holds at least the initial census.
    pub fn is_empty(&self) -> bool {
        self.censuses.is_empty()
    }

    /// Census of one generation.
    pub fn get(&self, generation: usize) -> Option<&Census> {
        self.censuses.get(generation)
    }

    /// Census of the most recent generation.
    pub fn latest(&self) -> &Census {
        // never empty: constructed with an initial census
        &self.censuses[self.censuses.len() - 1]
    }

    pub fn initial(&self) -> &Census {
        &self.censuses[0]
    }

    /// Censuses in generation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Census> {
        self.censuses.iter()
    }

    pub fn as_slice(&self) -> &[Census] {
        &self.censuses
    }

    /// Combine per-deme histories into one metapopulation history.
    ///
    /// Generation `t` of the result pools generation `t` of every input; the
    /// result is as long as the shortest input. Returns `None` for no input.
    pub fn pooled<'a>(
        histories: impl IntoIterator<Item = &'a GenerationHistory>,
    ) -> Result<Option<GenerationHistory>, InvariantViolation> {
        let histories: Vec<&GenerationHistory> = histories.into_iter().collect();
        let Some(generations) = histories.iter().map(|h| h.len()).min() else {
            return Ok(None);
        };

        let mut pooled = Vec::with_capacity(generations);
        for generation in 0..generations {
            if let Some(census) = Census::pooled(histories.iter().map(|h| &h[generation]))? {
                pooled.push(census);
            }
        }
        Ok(Some(Self { censuses: pooled }))
    }
}

impl Index<usize> for GenerationHistory {
    type Output = Census;

    fn index(&self, generation: usize) -> &Self::Output {
        &self.censuses[generation]
    }
}

impl<'a> IntoIterator for &'a GenerationHistory {
    type Item = &'a Census;
    type IntoIter = std::slice::Iter<'a, Census>;

    fn into_iter(self) -> Self::IntoIter {
        self.censuses.iter()
    }
}
