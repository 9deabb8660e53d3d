//! Condition-aware assertion tolerances.
//!
//! The expected error of a finite-precision solve grows with the
//! condition number, so a fixed epsilon would fail correct
//! implementations on stiff inputs. Each [`ConditionBand`] maps to a
//! default epsilon; an explicit per-case override always wins.

use serde::{Deserialize, Serialize};

/// Upper edge (exclusive) of [`ConditionBand::WellConditioned`].
pub const WELL_CONDITIONED_LIMIT: f64 = 1e3;
/// Upper edge (exclusive) of [`ConditionBand::Moderate`].
pub const MODERATE_LIMIT: f64 = 1e6;
/// Upper edge (exclusive) of [`ConditionBand::IllConditioned`].
pub const ILL_CONDITIONED_LIMIT: f64 = 1e7;
/// At or above this the matrix is treated as numerically singular: fewer
/// than two significant digits of a solve survive, and SVD of an exactly
/// singular matrix lands here rather than at an exact zero.
pub const SINGULAR_LIMIT: f64 = 1e14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionBand {
    WellConditioned,
    Moderate,
    IllConditioned,
    Severe,
    Singular,
}

impl ConditionBand {
    pub const ALL: [Self; 5] = [
        Self::WellConditioned,
        Self::Moderate,
        Self::IllConditioned,
        Self::Severe,
        Self::Singular,
    ];

    #[must_use]
    pub fn classify(condition_number: f64) -> Self {
        if !condition_number.is_finite() || condition_number >= SINGULAR_LIMIT {
            Self::Singular
        } else if condition_number < WELL_CONDITIONED_LIMIT {
            Self::WellConditioned
        } else if condition_number < MODERATE_LIMIT {
            Self::Moderate
        } else if condition_number < ILL_CONDITIONED_LIMIT {
            Self::IllConditioned
        } else {
            Self::Severe
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WellConditioned => "well-conditioned",
            Self::Moderate => "moderately conditioned",
            Self::IllConditioned => "ill-conditioned",
            Self::Severe => "severely ill-conditioned",
            Self::Singular => "numerically singular",
        }
    }
}

/// `epsilon = clamp(condition_number × scale, floor, ceiling)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledRule {
    pub scale: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl ScaledRule {
    #[must_use]
    pub fn epsilon(&self, condition_number: f64) -> f64 {
        (condition_number * self.scale).clamp(self.floor, self.ceiling)
    }
}

/// Default epsilon per band.
///
/// | Band            | Rule                              |
/// |-----------------|-----------------------------------|
/// | WellConditioned | 1e-12                             |
/// | Moderate        | clamp(κ × 1e-13, 1e-10, 1e-8)     |
/// | IllConditioned  | clamp(κ × 1e-12, 1e-6, 1e-5)      |
/// | Severe          | clamp(κ × 1e-12, 1e-5, 1e-2)      |
/// | Singular        | 1e-10                             |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceTable {
    pub well_conditioned: f64,
    pub moderate: ScaledRule,
    pub ill_conditioned: ScaledRule,
    pub severe: ScaledRule,
    pub singular: f64,
}

impl Default for ToleranceTable {
    fn default() -> Self {
        Self {
            well_conditioned: 1e-12,
            moderate: ScaledRule {
                scale: 1e-13,
                floor: 1e-10,
                ceiling: 1e-8,
            },
            ill_conditioned: ScaledRule {
                scale: 1e-12,
                floor: 1e-6,
                ceiling: 1e-5,
            },
            severe: ScaledRule {
                scale: 1e-12,
                floor: 1e-5,
                ceiling: 1e-2,
            },
            singular: 1e-10,
        }
    }
}

impl ToleranceTable {
    /// Every epsilon the table can produce must be finite and positive.
    pub fn validate(&self) -> Result<(), ToleranceError> {
        check_epsilon(ConditionBand::WellConditioned, self.well_conditioned)?;
        check_epsilon(ConditionBand::Singular, self.singular)?;
        for (band, rule) in [
            (ConditionBand::Moderate, self.moderate),
            (ConditionBand::IllConditioned, self.ill_conditioned),
            (ConditionBand::Severe, self.severe),
        ] {
            check_epsilon(band, rule.floor)?;
            check_epsilon(band, rule.ceiling)?;
            if rule.floor > rule.ceiling || !(rule.scale.is_finite() && rule.scale >= 0.0) {
                return Err(ToleranceError::InvalidTable { band });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn epsilon_for(&self, band: ConditionBand, condition_number: f64) -> f64 {
        match band {
            ConditionBand::WellConditioned => self.well_conditioned,
            ConditionBand::Moderate => self.moderate.epsilon(condition_number),
            ConditionBand::IllConditioned => self.ill_conditioned.epsilon(condition_number),
            ConditionBand::Severe => self.severe.epsilon(condition_number),
            ConditionBand::Singular => self.singular,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToleranceSource {
    Table,
    Override,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub epsilon: f64,
    pub band: ConditionBand,
    pub source: ToleranceSource,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToleranceError {
    InvalidOverride { value: f64 },
    InvalidTable { band: ConditionBand },
}

impl std::fmt::Display for ToleranceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOverride { value } => {
                write!(f, "tolerance override must be finite and positive, got {value}")
            }
            Self::InvalidTable { band } => {
                write!(f, "tolerance table entry for {} is invalid", band.label())
            }
        }
    }
}

impl std::error::Error for ToleranceError {}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ToleranceSelector {
    table: ToleranceTable,
}

impl ToleranceSelector {
    pub fn new(table: ToleranceTable) -> Result<Self, ToleranceError> {
        table.validate()?;
        Ok(Self { table })
    }

    #[must_use]
    pub const fn table(&self) -> &ToleranceTable {
        &self.table
    }

    /// Pick the assertion epsilon for a case; `override_epsilon` takes
    /// precedence over the band table but the band is still reported.
    pub fn select(
        &self,
        condition_number: f64,
        override_epsilon: Option<f64>,
    ) -> Result<Tolerance, ToleranceError> {
        let band = ConditionBand::classify(condition_number);
        match override_epsilon {
            Some(value) if !(value.is_finite() && value > 0.0) => {
                Err(ToleranceError::InvalidOverride { value })
            }
            Some(epsilon) => Ok(Tolerance {
                epsilon,
                band,
                source: ToleranceSource::Override,
            }),
            None => Ok(Tolerance {
                epsilon: self.table.epsilon_for(band, condition_number),
                band,
                source: ToleranceSource::Table,
            }),
        }
    }
}

fn check_epsilon(band: ConditionBand, value: f64) -> Result<(), ToleranceError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ToleranceError::InvalidTable { band })
    }
}
