//! Grid of demes.

use serde::{Deserialize, Serialize};

use crate::errors::InvariantViolation;
use crate::simulation::{Census, GenerationHistory};

/// Grid coordinates: column `x`, row `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`.
    #[inline]
    pub fn distance(self, other: Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// A local sub-population with its own capacity and history.
#[derive(Debug, Clone)]
pub struct Deme {
    position: Position,
    carrying_capacity: f64,
    history: GenerationHistory,
}

impl Deme {
    pub fn new(position: Position, carrying_capacity: f64, initial: Census) -> Self {
        Self {
            position,
            carrying_capacity,
            history: GenerationHistory::new(initial),
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn x(&self) -> usize {
        self.position.x
    }

    pub fn y(&self) -> usize {
        self.position.y
    }

    pub fn carrying_capacity(&self) -> f64 {
        self.carrying_capacity
    }

    /// Full census history of this deme.
    pub fn history(&self) -> &GenerationHistory {
        &self.history
    }

    /// Census of the latest completed generation.
    pub fn current(&self) -> &Census {
        self.history.latest()
    }

    pub(crate) fn push(&mut self, census: Census) -> Result<(), InvariantViolation> {
        self.history.push(census)
    }
}

/// Fixed-size rectangular arrangement of demes, stored row-major.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    demes: Vec<Deme>,
}

impl Grid {
    /// Build a grid, creating each deme with `make` in row-major order.
    pub fn new<E>(
        width: usize,
        height: usize,
        mut make: impl FnMut(Position) -> Result<Deme, E>,
    ) -> Result<Self, E> {
        let mut demes = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                demes.push(make(Position::new(x, y))?);
            }
        }
        Ok(Self {
            width,
            height,
            demes,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of demes.
    pub fn len(&self) -> usize {
        self.demes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.demes.is_empty()
    }

    /// Row-major index of a position, if in bounds.
    pub fn index_of(&self, position: Position) -> Option<usize> {
        (position.x < self.width && position.y < self.height)
            .then(|| position.y * self.width + position.x)
    }

    /// Deme at column `x`, row `y`.
    pub fn deme(&self, x: usize, y: usize) -> Option<&Deme> {
        self.index_of(Position::new(x, y)).map(|i| &self.demes[i])
    }

    /// All demes in row-major order.
    pub fn demes(&self) -> &[Deme] {
        &self.demes
    }

    pub(crate) fn demes_mut(&mut self) -> &mut [Deme] {
        &mut self.demes
    }

    /// In-bounds positions at Manhattan distance `1..=radius` from `origin`,
    /// with their distance.
    pub fn neighborhood(
        &self,
        origin: Position,
        radius: usize,
    ) -> impl Iterator<Item = (Position, usize)> + '_ {
        let x_end = origin.x.saturating_add(radius).min(self.width - 1);
        let y_end = origin.y.saturating_add(radius).min(self.height - 1);
        let x_range = origin.x.saturating_sub(radius)..=x_end;
        let y_range = origin.y.saturating_sub(radius)..=y_end;
        y_range
            .flat_map(move |y| x_range.clone().map(move |x| Position::new(x, y)))
            .map(move |p| (p, p.distance(origin)))
            .filter(move |&(_, d)| d >= 1 && d <= radius)
    }
}
