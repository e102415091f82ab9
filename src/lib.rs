//! A compartmental epidemic engine for networks of connected cities.
//!
//! Every person in a city belongs to exactly one compartment per disease:
//! uninfected, infected, recovered or dead. Once per tick a city moves people
//! between compartments according to the disease's transition probabilities,
//! and contributes its research effort towards curing the disease. Cities are
//! nodes of a network, which advances all of them together.
//!
//! The pieces, leaves first:
//! * [`compartment`]: a count of people in one health state, with saturating
//!   transfers between compartments.
//! * [`disease`]: transition probabilities plus research progress shared by
//!   every city tracking the disease.
//! * [`rate`]: the selectable force-of-infection kernels.
//! * [`population`]: a city and its per-tick update (infect, recover, die,
//!   research).
//! * [`network`]: cities connected by random or explicit edges.
//! * [`simulation`], [`report`], [`config`] and [`runner`]: the driver loop,
//!   time-series recording, JSON parameters and the command line.
//!
//! ```rust
//! use epigraph::prelude::*;
//!
//! let mut network = Network::new(true);
//! for name in ["esterpool", "brightwater"] {
//!     let city = Population::new(name, 1010)
//!         .with_disease("flu", CompartmentCounts::new(1000, 10, 0, 0), 0.5)
//!         .unwrap();
//!     network.add_node(city).unwrap();
//! }
//! network.add_edge("esterpool", "brightwater").unwrap();
//!
//! let mut flu = Disease::new("flu", 0.01, 0.01, 0.01, 0.001);
//! network.step(&mut flu);
//!
//! let esterpool = network.node("esterpool").unwrap();
//! assert_eq!(esterpool.status("flu").unwrap().infected, 20);
//! assert_eq!(flu.research_progress(), 1.0);
//! ```
pub mod compartment;
pub mod config;
pub mod disease;
pub mod error;
pub mod log;
pub mod names;
pub mod network;
pub mod population;
pub mod rate;
pub mod report;
pub mod runner;
pub mod simulation;

pub mod prelude {
    pub use crate::compartment::{Compartment, HealthStatus};
    pub use crate::disease::{Disease, TransitionRates, CURE_THRESHOLD};
    pub use crate::error::EpiError;
    pub use crate::network::Network;
    pub use crate::population::{CompartmentCounts, Population, Transitions};
    pub use crate::rate::RateFunction;
    pub use crate::report::{StatusRecord, TimeSeries};
    pub use crate::simulation::Simulation;
}
