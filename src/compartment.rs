//! Compartments are the boxes of a compartmental model. Each one holds the
//! number of people in a single health state, and people only ever move
//! between compartments through [`Compartment::transfer`], which is what keeps
//! a population's total fixed.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The health states tracked for every disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Uninfected,
    Infected,
    Recovered,
    Dead,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 4] = [
        HealthStatus::Uninfected,
        HealthStatus::Infected,
        HealthStatus::Recovered,
        HealthStatus::Dead,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Uninfected => "uninfected",
            HealthStatus::Infected => "infected",
            HealthStatus::Recovered => "recovered",
            HealthStatus::Dead => "dead",
        }
    }
}

impl Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All the people of one population in one health state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compartment {
    kind: HealthStatus,
    count: u64,
}

impl Compartment {
    #[must_use]
    pub fn new(kind: HealthStatus, count: u64) -> Self {
        Compartment { kind, count }
    }

    #[must_use]
    pub fn kind(&self) -> HealthStatus {
        self.kind
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Moves up to `amount` people into `destination` and returns how many
    /// actually moved.
    ///
    /// The request saturates: negative amounts move nobody and amounts larger
    /// than this compartment move everyone in it. Whatever leaves `self`
    /// arrives in `destination`.
    pub fn transfer(&mut self, amount: i64, destination: &mut Compartment) -> u64 {
        let moved = u64::try_from(amount).unwrap_or(0).min(self.count);
        self.count -= moved;
        destination.count += moved;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::{Compartment, HealthStatus};

    fn pair(source: u64, destination: u64) -> (Compartment, Compartment) {
        (
            Compartment::new(HealthStatus::Uninfected, source),
            Compartment::new(HealthStatus::Infected, destination),
        )
    }

    #[test]
    fn transfer_moves_requested_amount() {
        let (mut source, mut destination) = pair(100, 5);
        assert_eq!(source.transfer(30, &mut destination), 30);
        assert_eq!(source.count(), 70);
        assert_eq!(destination.count(), 35);
    }

    #[test]
    fn transfer_caps_at_available() {
        let (mut source, mut destination) = pair(12, 0);
        assert_eq!(source.transfer(50, &mut destination), 12);
        assert_eq!(source.count(), 0);
        assert_eq!(destination.count(), 12);
    }

    #[test]
    fn negative_transfer_moves_nobody() {
        let (mut source, mut destination) = pair(12, 3);
        assert_eq!(source.transfer(-4, &mut destination), 0);
        assert_eq!(source.count(), 12);
        assert_eq!(destination.count(), 3);
    }

    #[test]
    fn transfer_from_empty_compartment() {
        let (mut source, mut destination) = pair(0, 3);
        assert_eq!(source.transfer(i64::MAX, &mut destination), 0);
        assert_eq!(destination.count(), 3);
    }

    #[test]
    fn kind_is_kept() {
        let compartment = Compartment::new(HealthStatus::Dead, 0);
        assert_eq!(compartment.kind(), HealthStatus::Dead);
        assert_eq!(compartment.kind().to_string(), "dead");
    }
}
