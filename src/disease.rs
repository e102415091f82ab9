//! Disease parameters and the shared research effort against them.
//!
//! A single [`Disease`] value is handed to every population that tracks it, so
//! research contributed by one city counts for all of them. Once the
//! accumulated progress reaches [`CURE_THRESHOLD`] the disease is cured: its
//! effective [`TransitionRates`] stop transmission and death and send every
//! infected person to recovery.

use log::info;
use serde::{Deserialize, Serialize};

/// Research progress at which a disease is fully researched.
pub const CURE_THRESHOLD: f64 = 100.0;

const DEFAULT_INFECTION_PROBABILITY: f64 = 0.01;
const DEFAULT_DEATH_PROBABILITY: f64 = 0.01;
const DEFAULT_RECOVERY_PROBABILITY: f64 = 0.01;
const DEFAULT_REINFECTION_PROBABILITY: f64 = 0.001;

/// Per-tick transition probabilities in effect for a disease.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionRates {
    pub infection: f64,
    pub reinfection: f64,
    pub recovery: f64,
    pub death: f64,
}

impl TransitionRates {
    /// The rates of a cured disease.
    pub const CURED: TransitionRates = TransitionRates {
        infection: 0.0,
        reinfection: 0.0,
        recovery: 1.0,
        death: 0.0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disease {
    name: String,
    #[serde(default = "default_infection_probability")]
    infection_probability: f64,
    #[serde(default = "default_death_probability")]
    death_probability: f64,
    #[serde(default = "default_recovery_probability")]
    recovery_probability: f64,
    #[serde(default = "default_reinfection_probability")]
    reinfection_probability: f64,
    #[serde(default)]
    research_progress: f64,
}

fn default_infection_probability() -> f64 {
    DEFAULT_INFECTION_PROBABILITY
}

fn default_death_probability() -> f64 {
    DEFAULT_DEATH_PROBABILITY
}

fn default_recovery_probability() -> f64 {
    DEFAULT_RECOVERY_PROBABILITY
}

fn default_reinfection_probability() -> f64 {
    DEFAULT_REINFECTION_PROBABILITY
}

impl Disease {
    /// Creates a disease with no research progress. Probabilities are taken
    /// as given; values outside `[0, 1]` are not rejected.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        infection_probability: f64,
        death_probability: f64,
        recovery_probability: f64,
        reinfection_probability: f64,
    ) -> Self {
        Disease {
            name: name.into(),
            infection_probability,
            death_probability,
            recovery_probability,
            reinfection_probability,
            research_progress: 0.0,
        }
    }

    /// A disease with the default probabilities.
    #[must_use]
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Disease::new(
            name,
            DEFAULT_INFECTION_PROBABILITY,
            DEFAULT_DEATH_PROBABILITY,
            DEFAULT_RECOVERY_PROBABILITY,
            DEFAULT_REINFECTION_PROBABILITY,
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn infection_probability(&self) -> f64 {
        self.infection_probability
    }

    #[must_use]
    pub fn death_probability(&self) -> f64 {
        self.death_probability
    }

    #[must_use]
    pub fn recovery_probability(&self) -> f64 {
        self.recovery_probability
    }

    #[must_use]
    pub fn reinfection_probability(&self) -> f64 {
        self.reinfection_probability
    }

    #[must_use]
    pub fn research_progress(&self) -> f64 {
        self.research_progress
    }

    /// Adds a population's research contribution and returns the new progress.
    ///
    /// Progress never decreases: negative or NaN contributions add nothing.
    pub fn apply_research(&mut self, contribution: f64) -> f64 {
        let was_researched = self.is_fully_researched();
        if contribution > 0.0 {
            self.research_progress += contribution;
        }
        if !was_researched && self.is_fully_researched() {
            info!(
                "{} fully researched (progress {:.2})",
                self.name, self.research_progress
            );
        }
        self.research_progress
    }

    #[must_use]
    pub fn is_fully_researched(&self) -> bool {
        self.research_progress >= CURE_THRESHOLD
    }

    /// The probabilities to use for the next computation. The configured
    /// probabilities are left untouched after a cure.
    #[must_use]
    pub fn rates(&self) -> TransitionRates {
        if self.is_fully_researched() {
            TransitionRates::CURED
        } else {
            TransitionRates {
                infection: self.infection_probability,
                reinfection: self.reinfection_probability,
                recovery: self.recovery_probability,
                death: self.death_probability,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{Disease, TransitionRates, CURE_THRESHOLD};

    #[test]
    fn research_accumulates() {
        let mut disease = Disease::with_defaults("flu");
        assert_eq!(disease.apply_research(2.5), 2.5);
        assert_eq!(disease.apply_research(0.5), 3.0);
        assert_eq!(disease.research_progress(), 3.0);
    }

    #[test]
    fn research_never_decreases() {
        let mut disease = Disease::with_defaults("flu");
        disease.apply_research(10.0);
        disease.apply_research(-4.0);
        disease.apply_research(f64::NAN);
        assert_eq!(disease.research_progress(), 10.0);
    }

    #[test]
    fn cured_at_threshold() {
        let mut disease = Disease::new("pox", 0.3, 0.2, 0.1, 0.05);
        disease.apply_research(CURE_THRESHOLD - 1.0);
        assert!(!disease.is_fully_researched());
        assert_eq!(disease.rates().infection, 0.3);

        disease.apply_research(1.0);
        assert!(disease.is_fully_researched());
        assert_eq!(disease.rates(), TransitionRates::CURED);
        // configured values survive the cure
        assert_eq!(disease.infection_probability(), 0.3);
    }

    #[test]
    fn defaults_match_single_city_model() {
        let disease = Disease::with_defaults("flu");
        assert_eq!(disease.infection_probability(), 0.01);
        assert_eq!(disease.death_probability(), 0.01);
        assert_eq!(disease.recovery_probability(), 0.01);
        assert_eq!(disease.reinfection_probability(), 0.001);
    }

    #[test]
    fn deserialize_fills_defaults() {
        let disease: Disease =
            serde_json::from_str(r#"{"name": "flu", "infection_probability": 0.2}"#).unwrap();
        assert_eq!(disease.infection_probability(), 0.2);
        assert_eq!(disease.death_probability(), 0.01);
        assert_eq!(disease.research_progress(), 0.0);
    }
}
