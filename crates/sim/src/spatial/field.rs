//! Read-only scalar maps over the grid.
//!
//! Fields are produced outside the simulation (carrying capacity,
//! per-genotype fitness, per-genotype dispersal distance) and consumed here.
//! Values are addressed by column `x` and row `y`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;
use crate::genome::{Genotype, GenotypeCatalog, GenotypeId};

/// A width x height array of reals, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct ScalarField {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl ScalarField {
    /// Build from rows, `rows[y][x]`.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::RaggedField`] if rows differ in length and
    /// [`ConfigurationError::MissingRequired`] if there are no values.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ConfigurationError> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(ConfigurationError::MissingRequired("scalar field values"));
        }
        let height = rows.len();
        let mut values = Vec::with_capacity(width * height);
        for (row, data) in rows.into_iter().enumerate() {
            if data.len() != width {
                return Err(ConfigurationError::RaggedField {
                    row,
                    len: data.len(),
                    width,
                });
            }
            values.extend(data);
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// A field holding `value` everywhere.
    pub fn uniform(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at column `x`, row `y`.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside field");
        self.values[y * self.width + x]
    }

    pub fn row(&self, y: usize) -> &[f64] {
        &self.values[y * self.width..(y + 1) * self.width]
    }

    /// Values in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Linearly map the field's range onto `[min, max]`.
    ///
    /// A constant field maps to `min`.
    pub fn normalized(&self, min: f64, max: f64) -> Self {
        let lo = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = hi - lo;
        let values = self
            .values
            .iter()
            .map(|&v| {
                if span > 0.0 {
                    (v - lo) / span * (max - min) + min
                } else {
                    min
                }
            })
            .collect();
        Self { values, ..*self }
    }

    /// Scale every value so the field sums to `total`. A zero-sum field is
    /// returned unchanged.
    pub fn rescaled_to_sum(&self, total: f64) -> Self {
        let current = self.sum();
        if current == 0.0 {
            return self.clone();
        }
        let factor = total / current;
        Self {
            values: self.values.iter().map(|v| v * factor).collect(),
            ..*self
        }
    }

    /// Check that the field covers a `width` x `height` grid.
    pub fn ensure_shape(
        &self,
        name: impl Into<String>,
        width: usize,
        height: usize,
    ) -> Result<(), ConfigurationError> {
        if self.width != width || self.height != height {
            return Err(ConfigurationError::FieldShape {
                name: name.into(),
                width,
                height,
                actual_width: self.width,
                actual_height: self.height,
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<f64>>> for ScalarField {
    type Error = ConfigurationError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<ScalarField> for Vec<Vec<f64>> {
    fn from(field: ScalarField) -> Self {
        field
            .values
            .chunks(field.width.max(1))
            .map(<[f64]>::to_vec)
            .collect()
    }
}

/// One scalar field per catalog genotype.
#[derive(Debug, Clone, PartialEq)]
pub struct GenotypeFields {
    fields: Vec<ScalarField>,
}

impl GenotypeFields {
    /// Fields in genotype-id order.
    ///
    /// # Errors
    /// Fails if the number of fields differs from the catalog size.
    pub fn new(
        catalog: &GenotypeCatalog,
        fields: Vec<ScalarField>,
    ) -> Result<Self, ConfigurationError> {
        if fields.len() != catalog.len() {
            return Err(ConfigurationError::GenotypeCount {
                expected: catalog.len(),
                actual: fields.len(),
            });
        }
        Ok(Self { fields })
    }

    /// Fields keyed by genotype; every catalog genotype must be present.
    pub fn from_map(
        catalog: &GenotypeCatalog,
        mut map: BTreeMap<Genotype, ScalarField>,
    ) -> Result<Self, ConfigurationError> {
        if let Some(unknown) = map.keys().find(|g| catalog.id_of(g).is_none()) {
            return Err(ConfigurationError::InvalidGenotype(unknown.to_string()));
        }
        let fields = catalog
            .genotypes()
            .iter()
            .map(|g| {
                map.remove(g)
                    .ok_or_else(|| ConfigurationError::InvalidGenotype(g.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    /// The same field for every genotype.
    pub fn shared(catalog: &GenotypeCatalog, field: ScalarField) -> Self {
        Self {
            fields: vec![field; catalog.len()],
        }
    }

    #[inline]
    pub fn field(&self, genotype: GenotypeId) -> &ScalarField {
        &self.fields[genotype.index()]
    }

    /// Every genotype's value at one location, in genotype order.
    pub fn at(&self, x: usize, y: usize) -> Vec<f64> {
        self.fields.iter().map(|f| f.get(x, y)).collect()
    }

    /// Check every field against the grid shape.
    pub fn ensure_shape(
        &self,
        name: &str,
        catalog: &GenotypeCatalog,
        width: usize,
        height: usize,
    ) -> Result<(), ConfigurationError> {
        for (genotype, field) in catalog.genotypes().iter().zip(&self.fields) {
            field.ensure_shape(format!("{name}[{genotype}]"), width, height)?;
        }
        Ok(())
    }
}
