// Discrete decay-line selection for the 113Sn calibration source.
//
// Intensities are cumulative percentages taken from the evaluated decay data;
// the gamma and conversion-electron lines together sum to 100.7246%, so the
// sampling interval deliberately runs past 100.

use crate::error::SourceError;
use crate::particle::ParticleSpecies;
use crate::units::KEV;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Draws per percent: integer draws are divided by this to give a percentage.
pub const DRAWS_PER_PERCENT: u32 = 10_000;

/// One emission line with its cumulative upper bound in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayBranch {
    pub upper_bound: f64,
    pub species: ParticleSpecies,
    /// Kinetic energy in MeV
    pub energy: f64,
}

impl DecayBranch {
    pub const fn new(upper_bound: f64, species: ParticleSpecies, energy: f64) -> Self {
        Self {
            upper_bound,
            species,
            energy,
        }
    }
}

/// Ordered decay lines, selected by the first branch whose bound is `>= p`.
///
/// Integer draws run over `1..=max_draw`. By default that is exactly the
/// table total at [`DRAWS_PER_PERCENT`] resolution; a wider range leaves draws
/// that match no branch, which [`DecayTable::select`] reports as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DecayTableRepr", into = "DecayTableRepr")]
pub struct DecayTable {
    branches: Vec<DecayBranch>,
    max_draw: u32,
}

#[derive(Serialize, Deserialize)]
struct DecayTableRepr {
    branches: Vec<DecayBranch>,
    #[serde(default)]
    max_draw: Option<u32>,
}

impl TryFrom<DecayTableRepr> for DecayTable {
    type Error = SourceError;

    fn try_from(repr: DecayTableRepr) -> Result<Self, Self::Error> {
        let table = DecayTable::new(repr.branches)?;
        match repr.max_draw {
            Some(n) => table.with_max_draw(n),
            None => Ok(table),
        }
    }
}

impl From<DecayTable> for DecayTableRepr {
    fn from(table: DecayTable) -> Self {
        DecayTableRepr {
            branches: table.branches,
            max_draw: Some(table.max_draw),
        }
    }
}

impl DecayTable {
    /// Build a table, checking bounds are finite, strictly ascending and on the
    /// 0.0001 percent draw grid, and that the draw range fits a `u32`.
    pub fn new(branches: Vec<DecayBranch>) -> Result<Self, SourceError> {
        if branches.is_empty() {
            return Err(SourceError::InvalidDecayTable(
                "table has no branches".to_string(),
            ));
        }
        let mut previous = 0.0;
        for (i, branch) in branches.iter().enumerate() {
            if !branch.upper_bound.is_finite() || branch.upper_bound <= previous {
                return Err(SourceError::InvalidDecayTable(format!(
                    "branch {} bound {} does not exceed previous bound {}",
                    i, branch.upper_bound, previous
                )));
            }
            if !(branch.energy > 0.0) {
                return Err(SourceError::InvalidDecayTable(format!(
                    "branch {} has non-positive energy {}",
                    i, branch.energy
                )));
            }
            let scaled = branch.upper_bound * DRAWS_PER_PERCENT as f64;
            if (scaled - scaled.round()).abs() > 1e-6 * scaled.max(1.0) {
                return Err(SourceError::InvalidDecayTable(format!(
                    "branch {} bound {} is not a multiple of {}",
                    i,
                    branch.upper_bound,
                    1.0 / DRAWS_PER_PERCENT as f64
                )));
            }
            previous = branch.upper_bound;
        }
        let max_draw = (previous * DRAWS_PER_PERCENT as f64).round();
        if !(1.0..=u32::MAX as f64).contains(&max_draw) {
            return Err(SourceError::InvalidDecayTable(format!(
                "table total {} gives draw range {} outside 1..={}",
                previous,
                max_draw,
                u32::MAX
            )));
        }
        Ok(Self {
            branches,
            max_draw: max_draw as u32,
        })
    }

    /// Override the integer draw range.
    pub fn with_max_draw(mut self, max_draw: u32) -> Result<Self, SourceError> {
        if max_draw == 0 {
            return Err(SourceError::InvalidDecayTable(
                "draw range must be at least 1".to_string(),
            ));
        }
        self.max_draw = max_draw;
        Ok(self)
    }

    /// The six 113Sn lines: the 391.698 keV gamma and the K, L, M, N and O
    /// shell conversion electrons of the same transition.
    pub fn sn113() -> Self {
        use ParticleSpecies::{Electron, Gamma};
        Self {
            max_draw: 1_007_246,
            branches: vec![
                DecayBranch::new(64.97, Gamma, 391.698 * KEV),
                DecayBranch::new(93.77, Electron, 363.758 * KEV),
                DecayBranch::new(99.37, Electron, 387.461 * KEV),
                DecayBranch::new(100.507, Electron, 390.872 * KEV),
                DecayBranch::new(100.712, Electron, 391.576 * KEV),
                DecayBranch::new(100.7246, Electron, 391.697 * KEV),
            ],
        }
    }

    pub fn branches(&self) -> &[DecayBranch] {
        &self.branches
    }

    /// Upper end of the sampling interval in percent.
    pub fn total(&self) -> f64 {
        self.branches
            .last()
            .map(|b| b.upper_bound)
            .unwrap_or(0.0)
    }

    /// Largest integer draw; draws are uniform on `1..=max_draw()`.
    pub fn max_draw(&self) -> u32 {
        self.max_draw
    }

    /// Selection probability of branch `index`, normalised to the table total.
    pub fn probability(&self, index: usize) -> Option<f64> {
        let branch = self.branches.get(index)?;
        let lower = if index == 0 {
            0.0
        } else {
            self.branches[index - 1].upper_bound
        };
        Some((branch.upper_bound - lower) / self.total())
    }

    /// Branch for percentage `p`; bounds are inclusive above, exclusive below.
    pub fn select(&self, p: f64) -> Result<&DecayBranch, SourceError> {
        if !(p >= 0.0) {
            return Err(self.out_of_range(p));
        }
        self.branches
            .iter()
            .find(|b| p <= b.upper_bound)
            .ok_or_else(|| self.out_of_range(p))
    }

    /// Branch for an integer draw, scaled by [`DRAWS_PER_PERCENT`].
    pub fn select_draw(&self, draw: u32) -> Result<&DecayBranch, SourceError> {
        self.select(draw as f64 / DRAWS_PER_PERCENT as f64)
    }

    /// Draw uniformly on `1..=max_draw()` and select.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&DecayBranch, SourceError> {
        let draw = rng.gen_range(1..=self.max_draw());
        self.select_draw(draw)
    }

    fn out_of_range(&self, p: f64) -> SourceError {
        SourceError::SelectionOutOfRange {
            percentage: p,
            total: self.total(),
        }
    }
}

impl Default for DecayTable {
    fn default() -> Self {
        Self::sn113()
    }
}
