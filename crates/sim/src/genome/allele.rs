use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of loci; each locus is labelled by one letter.
pub const MAX_LOCI: usize = 26;

/// A symbolic allele variant at one locus.
///
/// Alleles render as the locus letter followed by a 1-based variant number
/// (`A1`, `A2`, `B1`, ...). Ordering is by locus, then variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Allele {
    locus: u8,
    variant: u16,
}

/// Error returned when parsing an allele label fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid allele label '{0}'")]
pub struct InvalidAllele(pub String);

impl Allele {
    /// Create the allele with 0-based `variant` at 0-based `locus`.
    ///
    /// # Panics
    /// Panics if `locus >= MAX_LOCI`.
    pub fn new(locus: usize, variant: usize) -> Self {
        assert!(locus < MAX_LOCI, "locus index {locus} exceeds {MAX_LOCI}");
        Self {
            locus: locus as u8,
            variant: variant as u16,
        }
    }

    /// 0-based locus index.
    #[inline]
    pub fn locus(self) -> usize {
        self.locus as usize
    }

    /// 0-based variant index within the locus.
    #[inline]
    pub fn variant(self) -> usize {
        self.variant as usize
    }

    /// Letter naming the locus.
    pub fn locus_letter(self) -> char {
        (b'A' + self.locus) as char
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.locus_letter(), self.variant as usize + 1)
    }
}

impl FromStr for Allele {
    type Err = InvalidAllele;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidAllele(s.to_string());
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        if !letter.is_ascii_uppercase() {
            return Err(invalid());
        }
        let number: usize = chars.as_str().parse().map_err(|_| invalid())?;
        if number == 0 || number > u16::MAX as usize {
            return Err(invalid());
        }
        Ok(Self::new((letter as u8 - b'A') as usize, number - 1))
    }
}
