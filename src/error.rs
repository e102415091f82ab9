use std::fmt::{self, Display};
use std::io;

/// Provides `EpiError` and maps other errors to
/// convert to an `EpiError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpiError {
    /// Initial compartment counts that do not add up to the population total,
    /// or a parameter file that cannot be turned into a simulation.
    ConfigurationError(String),
    /// A network node with this name already exists.
    DuplicateNodeError(String),
    /// A ratio was requested against a zero denominator.
    DegenerateStateError(String),
    UnknownNodeError(String),
    UnknownDiseaseError(String),
    /// An edge from a node to itself was requested.
    SelfLoopError(String),
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    ReportError(String),
}

impl From<io::Error> for EpiError {
    fn from(error: io::Error) -> Self {
        EpiError::IoError(error)
    }
}

impl From<serde_json::Error> for EpiError {
    fn from(error: serde_json::Error) -> Self {
        EpiError::JsonError(error)
    }
}

impl From<csv::Error> for EpiError {
    fn from(error: csv::Error) -> Self {
        EpiError::CSVError(error)
    }
}

impl std::error::Error for EpiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpiError::IoError(error) => Some(error),
            EpiError::JsonError(error) => Some(error),
            EpiError::CSVError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for EpiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpiError::ConfigurationError(msg) => write!(f, "invalid configuration: {msg}"),
            EpiError::DuplicateNodeError(name) => {
                write!(f, "a node named `{name}` already exists")
            }
            EpiError::DegenerateStateError(msg) => write!(f, "degenerate state: {msg}"),
            EpiError::UnknownNodeError(name) => write!(f, "no node named `{name}`"),
            EpiError::UnknownDiseaseError(name) => write!(f, "no disease named `{name}`"),
            EpiError::SelfLoopError(name) => write!(f, "cannot connect `{name}` to itself"),
            EpiError::IoError(error) => write!(f, "io error: {error}"),
            EpiError::JsonError(error) => write!(f, "json error: {error}"),
            EpiError::CSVError(error) => write!(f, "csv error: {error}"),
            EpiError::ReportError(msg) => write!(f, "report error: {msg}"),
        }
    }
}
