//! Simulation parameters read from a JSON file.
//!
//! ```json
//! {
//!   "seed": 42,
//!   "ticks": 300,
//!   "rate_function": "ratio",
//!   "connection_probability": 0.15,
//!   "diseases": [{ "name": "flu", "infection_probability": 0.05 }],
//!   "cities": [
//!     { "name": "esterpool", "research_rate": 0.4,
//!       "diseases": [{ "disease": "flu", "uninfected": 1000, "infected": 10 }] }
//!   ]
//! }
//! ```
//!
//! Everything except `diseases` and `cities` has a default. Cities without a
//! name get a generated one, and cities without a total take it from their
//! first disease's counts. A city's `research_rate` applies to each of its
//! diseases unless the disease entry sets its own.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::disease::Disease;
use crate::error::EpiError;
use crate::population::CompartmentCounts;
use crate::rate::RateFunction;

const DEFAULT_TICKS: usize = 300;
const DEFAULT_CONNECTION_PROBABILITY: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_ticks")]
    pub ticks: usize,
    #[serde(default)]
    pub rate_function: RateFunction,
    #[serde(default = "default_bidirectional")]
    pub bidirectional: bool,
    #[serde(default = "default_connection_probability")]
    pub connection_probability: f64,
    pub diseases: Vec<Disease>,
    pub cities: Vec<CityParameters>,
    /// Explicit edges. When absent, edges are generated at random.
    #[serde(default)]
    pub edges: Option<Vec<(String, String)>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityParameters {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub research_rate: f64,
    pub diseases: Vec<CityDiseaseParameters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDiseaseParameters {
    pub disease: String,
    /// Overrides the city's `research_rate` for this disease.
    #[serde(default)]
    pub research_rate: Option<f64>,
    #[serde(flatten)]
    pub counts: CompartmentCounts,
}

impl CityDiseaseParameters {
    /// This disease's research rate, falling back to the city's.
    #[must_use]
    pub fn resolved_research_rate(&self, city: &CityParameters) -> f64 {
        self.research_rate.unwrap_or(city.research_rate)
    }
}

fn default_ticks() -> usize {
    DEFAULT_TICKS
}

fn default_bidirectional() -> bool {
    true
}

fn default_connection_probability() -> f64 {
    DEFAULT_CONNECTION_PROBABILITY
}

impl CityParameters {
    /// The declared total, or the sum of the first disease's counts.
    ///
    /// # Errors
    ///
    /// Returns [`EpiError::ConfigurationError`] if neither is available.
    pub fn resolved_total(&self) -> Result<u64, EpiError> {
        if let Some(total) = self.total {
            return Ok(total);
        }
        self.diseases
            .first()
            .and_then(|entry| entry.counts.total())
            .ok_or_else(|| {
                EpiError::ConfigurationError(format!(
                    "city {} needs a total or at least one disease",
                    self.name.as_deref().unwrap_or("<unnamed>")
                ))
            })
    }
}

impl SimulationParameters {
    /// Parses parameters from a JSON string and validates them.
    ///
    /// # Errors
    ///
    /// Returns [`EpiError::JsonError`] for malformed input and
    /// [`EpiError::ConfigurationError`] if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, EpiError> {
        let parameters: SimulationParameters = serde_json::from_str(json)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Checks the parts of the parameters that can be checked without
    /// building populations: disease names are unique and every city refers
    /// only to declared diseases.
    ///
    /// # Errors
    ///
    /// Returns [`EpiError::ConfigurationError`] describing the first problem.
    pub fn validate(&self) -> Result<(), EpiError> {
        let mut names = HashSet::new();
        for disease in &self.diseases {
            if !names.insert(disease.name()) {
                return Err(EpiError::ConfigurationError(format!(
                    "disease {} is declared twice",
                    disease.name()
                )));
            }
        }
        for city in &self.cities {
            for entry in &city.diseases {
                if !names.contains(entry.disease.as_str()) {
                    return Err(EpiError::ConfigurationError(format!(
                        "city {} refers to undeclared disease {}",
                        city.name.as_deref().unwrap_or("<unnamed>"),
                        entry.disease
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Reads and validates parameters from a JSON file.
///
/// # Errors
///
/// Returns [`EpiError::IoError`] if the file cannot be opened, and see
/// [`SimulationParameters::from_json_str`].
pub fn load_parameters_from_json(file_path: &Path) -> Result<SimulationParameters, EpiError> {
    info!("loading simulation parameters from {}", file_path.display());
    let reader = BufReader::new(File::open(file_path)?);
    let parameters: SimulationParameters = serde_json::from_reader(reader)?;
    parameters.validate()?;
    Ok(parameters)
}
