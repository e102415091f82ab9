//! Recording simulation state over time.
//!
//! Every tick the driver produces one [`StatusRecord`] per (city, disease).
//! Records are kept in memory in a [`TimeSeries`] and can also be streamed to
//! a CSV file through a [`ReportWriter`].

use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

use csv::Writer;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::compartment::HealthStatus;
use crate::disease::Disease;
use crate::error::EpiError;
use crate::population::{CompartmentCounts, Population};

/// The observable state of one disease in one city after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub tick: usize,
    pub city: String,
    pub disease: String,
    pub uninfected: u64,
    pub infected: u64,
    pub recovered: u64,
    pub dead: u64,
    /// Empty for a city with no people.
    pub impact: Option<f64>,
    pub research_progress: f64,
}

impl StatusRecord {
    /// Captures `population`'s state for `disease`, or `None` if the
    /// population does not track it.
    #[must_use]
    pub fn capture(tick: usize, population: &Population, disease: &Disease) -> Option<Self> {
        let counts = population.status(disease.name())?;
        Some(StatusRecord {
            tick,
            city: population.name().to_string(),
            disease: disease.name().to_string(),
            uninfected: counts.uninfected,
            infected: counts.infected,
            recovered: counts.recovered,
            dead: counts.dead,
            impact: population.impact(disease.name()).ok(),
            research_progress: disease.research_progress(),
        })
    }

    #[must_use]
    pub fn counts(&self) -> CompartmentCounts {
        CompartmentCounts::new(self.uninfected, self.infected, self.recovered, self.dead)
    }
}

/// All records of a run, in the order they were produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    records: Vec<StatusRecord>,
}

impl TimeSeries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: StatusRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[StatusRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records for one city and disease, ordered by tick.
    pub fn series<'a>(
        &'a self,
        city: &'a str,
        disease: &'a str,
    ) -> impl Iterator<Item = &'a StatusRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.city == city && record.disease == disease)
    }

    /// One compartment's count at every recorded tick.
    #[must_use]
    pub fn column(&self, city: &str, disease: &str, status: HealthStatus) -> Vec<u64> {
        self.series(city, disease)
            .map(|record| record.counts().get(status))
            .collect()
    }

    /// The latest record for one city and disease.
    #[must_use]
    pub fn last(&self, city: &str, disease: &str) -> Option<&StatusRecord> {
        self.records
            .iter()
            .rev()
            .find(|record| record.city == city && record.disease == disease)
    }
}

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist.
fn generate_validate_filepath(path: &Path) -> Result<File, EpiError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            Ok(File::create(path)?)
        }
        _ => Err(EpiError::ReportError(format!(
            "report output files must be CSVs, got {}",
            path.display()
        ))),
    }
}

/// Streams serializable rows to a CSV file, one row per call.
pub struct ReportWriter {
    writer: Writer<File>,
}

impl ReportWriter {
    /// Creates (or truncates) the CSV file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EpiError::ReportError`] if the path does not end in `.csv`
    /// and [`EpiError::IoError`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, EpiError> {
        trace!("opening report {}", path.display());
        let file = generate_validate_filepath(path)?;
        Ok(ReportWriter {
            writer: Writer::from_writer(file),
        })
    }

    /// Writes one row and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be serialized or written.
    pub fn send<T: Serialize>(&mut self, row: &T) -> Result<(), EpiError> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        Ok(())
    }
}
