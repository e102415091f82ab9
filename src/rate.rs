//! Force-of-infection kernels.
//!
//! Each kernel maps the size of a susceptible compartment (uninfected, or
//! recovered for reinfection) and the current number of infected people to the
//! raw number of people exposed this tick, before the infection probability is
//! applied. A zero denominator always yields zero exposure.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RateFunction {
    /// `source`: exposure does not depend on how many are infected.
    #[default]
    Simple,
    /// `source * infected / (source + infected)`: mass-action style, saturating.
    Ratio,
    /// `source * erf(infected / source)`: smooth saturation bounded by `source`.
    Erf,
}

impl RateFunction {
    /// The raw exposure for a susceptible compartment of size `source`.
    #[must_use]
    pub fn exposure(self, source: u64, infected: u64) -> f64 {
        let source = source as f64;
        let infected = infected as f64;
        match self {
            RateFunction::Simple => source,
            RateFunction::Ratio => {
                let denominator = source + infected;
                if denominator == 0.0 {
                    0.0
                } else {
                    source * infected / denominator
                }
            }
            RateFunction::Erf => {
                if source == 0.0 {
                    0.0
                } else {
                    source * libm::erf(infected / source)
                }
            }
        }
    }
}

impl Display for RateFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            RateFunction::Simple => "simple",
            RateFunction::Ratio => "ratio",
            RateFunction::Erf => "erf",
        })
    }
}
