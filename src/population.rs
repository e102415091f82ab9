//! Populations (cities) and the per-tick compartmental update.
//!
//! A [`Population`] is a closed group of `total` people. For every disease it
//! tracks it keeps one [`Compartment`] per [`HealthStatus`], and those four
//! counts always sum to `total`. A call to [`Population::update_status`]
//! advances one disease by one tick:
//!
//! 1. **infect**: uninfected and recovered people become infected, at a rate
//!    given by the population's [`RateFunction`];
//! 2. **recover**: a share of the infected recover;
//! 3. **die**: a share of the remaining infected die;
//! 4. **research**: the population's research rate is added to the disease.
//!
//! Transfer sizes are rounded to whole people before they are committed, and
//! every change goes through [`Compartment::transfer`], so rounding can never
//! create or destroy people.

use indexmap::IndexMap;
use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::compartment::{Compartment, HealthStatus};
use crate::disease::{Disease, TransitionRates};
use crate::error::EpiError;
use crate::rate::RateFunction;

/// Compartment sizes for one disease in one population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompartmentCounts {
    pub uninfected: u64,
    pub infected: u64,
    #[serde(default)]
    pub recovered: u64,
    #[serde(default)]
    pub dead: u64,
}

impl CompartmentCounts {
    #[must_use]
    pub fn new(uninfected: u64, infected: u64, recovered: u64, dead: u64) -> Self {
        CompartmentCounts {
            uninfected,
            infected,
            recovered,
            dead,
        }
    }

    /// The sum of all four counts, or `None` on overflow.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.uninfected
            .checked_add(self.infected)?
            .checked_add(self.recovered)?
            .checked_add(self.dead)
    }

    #[must_use]
    pub fn get(&self, status: HealthStatus) -> u64 {
        match status {
            HealthStatus::Uninfected => self.uninfected,
            HealthStatus::Infected => self.infected,
            HealthStatus::Recovered => self.recovered,
            HealthStatus::Dead => self.dead,
        }
    }
}

/// How many people each sub-step moved during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transitions {
    pub newly_infected: u64,
    pub reinfected: u64,
    pub recovered: u64,
    pub died: u64,
    /// Research progress of the disease after this population contributed.
    pub research_progress: f64,
}

impl Transitions {
    /// Adds the moves of a later update. Research progress is cumulative on
    /// the disease, so the later value replaces the earlier one.
    pub fn absorb(&mut self, later: &Transitions) {
        self.newly_infected += later.newly_infected;
        self.reinfected += later.reinfected;
        self.recovered += later.recovered;
        self.died += later.died;
        self.research_progress = later.research_progress;
    }
}

/// The compartments one population keeps for one disease.
#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseState {
    uninfected: Compartment,
    infected: Compartment,
    recovered: Compartment,
    dead: Compartment,
    research_rate: f64,
}

impl DiseaseState {
    fn new(counts: CompartmentCounts, research_rate: f64) -> Self {
        DiseaseState {
            uninfected: Compartment::new(HealthStatus::Uninfected, counts.uninfected),
            infected: Compartment::new(HealthStatus::Infected, counts.infected),
            recovered: Compartment::new(HealthStatus::Recovered, counts.recovered),
            dead: Compartment::new(HealthStatus::Dead, counts.dead),
            research_rate,
        }
    }

    #[must_use]
    pub fn counts(&self) -> CompartmentCounts {
        CompartmentCounts {
            uninfected: self.uninfected.count(),
            infected: self.infected.count(),
            recovered: self.recovered.count(),
            dead: self.dead.count(),
        }
    }

    #[must_use]
    pub fn compartment(&self, status: HealthStatus) -> &Compartment {
        match status {
            HealthStatus::Uninfected => &self.uninfected,
            HealthStatus::Infected => &self.infected,
            HealthStatus::Recovered => &self.recovered,
            HealthStatus::Dead => &self.dead,
        }
    }

    #[must_use]
    pub fn research_rate(&self) -> f64 {
        self.research_rate
    }

    /// Returns `(newly_infected, reinfected)`. Both amounts are computed from
    /// the counts before either transfer happens.
    fn infect(&mut self, rates: &TransitionRates, rate_function: RateFunction) -> (u64, u64) {
        let infected = self.infected.count();
        let new_infections =
            round_people(rates.infection * rate_function.exposure(self.uninfected.count(), infected));
        let reinfections = round_people(
            rates.reinfection * rate_function.exposure(self.recovered.count(), infected),
        );

        let newly_infected = self.uninfected.transfer(new_infections, &mut self.infected);
        let reinfected = self.recovered.transfer(reinfections, &mut self.infected);
        (newly_infected, reinfected)
    }

    fn recover(&mut self, rates: &TransitionRates) -> u64 {
        let amount = round_people(rates.recovery * self.infected.count() as f64);
        self.infected.transfer(amount, &mut self.recovered)
    }

    fn die(&mut self, rates: &TransitionRates) -> u64 {
        let amount = round_people(rates.death * self.infected.count() as f64);
        self.infected.transfer(amount, &mut self.dead)
    }
}

/// Rounds a continuous transfer size to the nearest whole person. NaN maps to
/// zero and out-of-range values saturate; the transfer itself clamps further.
#[allow(clippy::cast_possible_truncation)]
fn round_people(amount: f64) -> i64 {
    amount.round() as i64
}

/// A closed population of fixed size, tracked for one or more diseases.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    name: String,
    total: u64,
    rate_function: RateFunction,
    diseases: IndexMap<String, DiseaseState>,
}

impl Population {
    /// Creates a population that does not track any disease yet.
    #[must_use]
    pub fn new(name: impl Into<String>, total: u64) -> Self {
        Population {
            name: name.into(),
            total,
            rate_function: RateFunction::default(),
            diseases: IndexMap::new(),
        }
    }

    /// Builder form of [`Population::add_disease`].
    ///
    /// # Errors
    ///
    /// See [`Population::add_disease`].
    pub fn with_disease(
        mut self,
        disease: &str,
        counts: CompartmentCounts,
        research_rate: f64,
    ) -> Result<Self, EpiError> {
        self.add_disease(disease, counts, research_rate)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_rate_function(mut self, rate_function: RateFunction) -> Self {
        self.rate_function = rate_function;
        self
    }

    /// Starts tracking `disease` with the given initial compartment sizes.
    ///
    /// # Errors
    ///
    /// Returns [`EpiError::ConfigurationError`] if the counts do not sum to
    /// this population's total or the disease is already tracked.
    pub fn add_disease(
        &mut self,
        disease: &str,
        counts: CompartmentCounts,
        research_rate: f64,
    ) -> Result<(), EpiError> {
        if self.diseases.contains_key(disease) {
            return Err(EpiError::ConfigurationError(format!(
                "{} already tracks {}",
                self.name, disease
            )));
        }
        if counts.total() != Some(self.total) {
            return Err(EpiError::ConfigurationError(format!(
                "{} compartments for {} sum to {} but the population is {}",
                self.name,
                disease,
                counts
                    .total()
                    .map_or_else(|| "more than u64::MAX".to_string(), |t| t.to_string()),
                self.total
            )));
        }
        self.diseases
            .insert(disease.to_string(), DiseaseState::new(counts, research_rate));
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn rate_function(&self) -> RateFunction {
        self.rate_function
    }

    pub fn set_rate_function(&mut self, rate_function: RateFunction) {
        self.rate_function = rate_function;
    }

    #[must_use]
    pub fn tracks(&self, disease: &str) -> bool {
        self.diseases.contains_key(disease)
    }

    /// Names of the tracked diseases, in the order they were added.
    pub fn diseases(&self) -> impl Iterator<Item = &str> {
        self.diseases.keys().map(String::as_str)
    }

    #[must_use]
    pub fn disease_state(&self, disease: &str) -> Option<&DiseaseState> {
        self.diseases.get(disease)
    }

    #[must_use]
    pub fn status(&self, disease: &str) -> Option<CompartmentCounts> {
        self.diseases.get(disease).map(DiseaseState::counts)
    }

    #[must_use]
    pub fn count(&self, disease: &str, status: HealthStatus) -> Option<u64> {
        self.diseases
            .get(disease)
            .map(|state| state.compartment(status).count())
    }

    /// Advances `disease` by one tick using this population's rate function.
    pub fn update_status(&mut self, disease: &mut Disease) -> Transitions {
        self.update_status_with(disease, self.rate_function)
    }

    /// Advances `disease` by one tick with the given rate function and the
    /// disease's current rates.
    pub fn update_status_with(
        &mut self,
        disease: &mut Disease,
        rate_function: RateFunction,
    ) -> Transitions {
        let rates = disease.rates();
        self.update_status_with_rates(disease, &rates, rate_function)
    }

    /// Advances `disease` by one tick: infect, recover, die, then research.
    ///
    /// Transfers use `rates`, not `disease.rates()`. Research is still added
    /// to `disease`.
    ///
    /// A disease this population does not track is left alone and nothing
    /// moves.
    pub fn update_status_with_rates(
        &mut self,
        disease: &mut Disease,
        rates: &TransitionRates,
        rate_function: RateFunction,
    ) -> Transitions {
        let Some(state) = self.diseases.get_mut(disease.name()) else {
            warn!("{} does not track {}; skipping update", self.name, disease.name());
            return Transitions {
                research_progress: disease.research_progress(),
                ..Transitions::default()
            };
        };

        let (newly_infected, reinfected) = state.infect(rates, rate_function);
        let recovered = state.recover(rates);
        let died = state.die(rates);
        let research_progress = disease.apply_research(state.research_rate);

        trace!(
            "{}/{}: +{} infected, +{} reinfected, +{} recovered, +{} dead, research {:.3}",
            self.name,
            disease.name(),
            newly_infected,
            reinfected,
            recovered,
            died,
            research_progress
        );
        debug_assert_eq!(state.counts().total(), Some(self.total));

        Transitions {
            newly_infected,
            reinfected,
            recovered,
            died,
            research_progress,
        }
    }

    /// Share of the population that is infected or dead.
    ///
    /// # Errors
    ///
    /// Returns [`EpiError::UnknownDiseaseError`] if `disease` is not tracked
    /// and [`EpiError::DegenerateStateError`] if the population is empty.
    pub fn impact(&self, disease: &str) -> Result<f64, EpiError> {
        let counts = self
            .status(disease)
            .ok_or_else(|| EpiError::UnknownDiseaseError(disease.to_string()))?;
        if self.total == 0 {
            return Err(EpiError::DegenerateStateError(format!(
                "impact of {} on {} is undefined for an empty population",
                disease, self.name
            )));
        }
        Ok((counts.dead + counts.infected) as f64 / self.total as f64)
    }

    /// A human-readable report of the compartments for `disease`.
    #[must_use]
    pub fn summary(&self, disease: &Disease) -> Option<String> {
        let counts = self.status(disease.name())?;
        Some(format!(
            "{} ({})\n  uninfected: {}\n  infected: {}\n  recovered: {}\n  dead: {}\n  research for {}: {:.2}",
            self.name,
            disease.name(),
            counts.uninfected,
            counts.infected,
            counts.recovered,
            counts.dead,
            disease.name(),
            disease.research_progress()
        ))
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{CompartmentCounts, Population};
    use crate::compartment::HealthStatus;
    use crate::disease::{Disease, CURE_THRESHOLD};
    use crate::error::EpiError;
    use crate::rate::RateFunction;

    fn city(counts: CompartmentCounts, research_rate: f64) -> Population {
        Population::new("esterpool", counts.total().unwrap())
            .with_disease("flu", counts, research_rate)
            .unwrap()
    }

    #[test]
    fn counts_must_sum_to_total() {
        let result = Population::new("esterpool", 100).with_disease(
            "flu",
            CompartmentCounts::new(90, 5, 0, 0),
            0.0,
        );
        assert!(matches!(result, Err(EpiError::ConfigurationError(_))));
    }

    #[test]
    fn disease_cannot_be_added_twice() {
        let mut population = city(CompartmentCounts::new(90, 10, 0, 0), 0.0);
        let result = population.add_disease("flu", CompartmentCounts::new(90, 10, 0, 0), 0.0);
        assert!(matches!(result, Err(EpiError::ConfigurationError(_))));
    }

    #[test]
    fn single_tick_simple() {
        let mut population = city(CompartmentCounts::new(1000, 10, 0, 0), 0.0);
        let mut disease = Disease::new("flu", 0.01, 0.01, 0.01, 0.001);

        let transitions = population.update_status(&mut disease);

        assert_eq!(transitions.newly_infected, 10);
        assert_eq!(transitions.reinfected, 0);
        assert_eq!(transitions.recovered, 0);
        assert_eq!(transitions.died, 0);
        assert_eq!(
            population.status("flu"),
            Some(CompartmentCounts::new(990, 20, 0, 0))
        );
    }

    #[test]
    fn sub_steps_run_in_order() {
        // infect first, so recover and die see the new infections
        let mut population = city(CompartmentCounts::new(100, 0, 0, 0), 0.0);
        let mut disease = Disease::new("flu", 0.5, 0.5, 0.5, 0.0);

        let transitions = population.update_status(&mut disease);

        assert_eq!(transitions.newly_infected, 50);
        assert_eq!(transitions.recovered, 25);
        // 0.5 * 25 rounds half away from zero
        assert_eq!(transitions.died, 13);
        assert_eq!(
            population.status("flu"),
            Some(CompartmentCounts::new(50, 12, 25, 13))
        );
    }

    #[test]
    fn reinfection_draws_from_recovered() {
        let mut population = city(CompartmentCounts::new(0, 10, 100, 0), 0.0);
        let mut disease = Disease::new("flu", 0.0, 0.0, 0.0, 0.1);

        let transitions = population.update_status(&mut disease);

        assert_eq!(transitions.reinfected, 10);
        assert_eq!(population.count("flu", HealthStatus::Recovered), Some(90));
        assert_eq!(population.count("flu", HealthStatus::Infected), Some(20));
    }

    #[test]
    fn ratio_rate_function() {
        let mut population = city(CompartmentCounts::new(90, 10, 0, 0), 0.0)
            .with_rate_function(RateFunction::Ratio);
        let mut disease = Disease::new("flu", 1.0, 0.0, 0.0, 0.0);

        // 1.0 * 90 * 10 / 100
        assert_eq!(population.update_status(&mut disease).newly_infected, 9);
    }

    #[test]
    fn erf_rate_function_rounds_exact_value() {
        let mut population = city(CompartmentCounts::new(1924, 3848, 0, 0), 0.0)
            .with_rate_function(RateFunction::Erf);
        let mut disease = Disease::new("flu", 0.5, 0.0, 0.0, 0.0);

        // 0.5 * 1924 * erf(2) = 957.50002
        assert_eq!(population.update_status(&mut disease).newly_infected, 958);
    }

    #[test]
    fn zero_infected_with_ratio_and_erf_is_safe() {
        for rate_function in [RateFunction::Ratio, RateFunction::Erf] {
            let mut population = city(CompartmentCounts::new(0, 0, 0, 50), 0.0);
            let mut disease = Disease::new("flu", 0.9, 0.9, 0.9, 0.9);
            let transitions = population.update_status_with(&mut disease, rate_function);
            assert_eq!(transitions.newly_infected, 0);
            assert_eq!(transitions.reinfected, 0);
            assert_eq!(
                population.status("flu"),
                Some(CompartmentCounts::new(0, 0, 0, 50))
            );
        }
    }

    #[test]
    fn oversized_probabilities_saturate() {
        let mut population = city(CompartmentCounts::new(10, 10, 10, 0), 0.0);
        let mut disease = Disease::new("flu", 7.0, 3.0, -2.0, 5.0);

        population.update_status(&mut disease);

        let counts = population.status("flu").unwrap();
        assert_eq!(counts.total(), Some(30));
        assert_eq!(counts, CompartmentCounts::new(0, 0, 0, 30));
    }

    #[test]
    fn research_is_contributed_last() {
        let mut population = city(CompartmentCounts::new(90, 10, 0, 0), 2.5);
        let mut disease = Disease::with_defaults("flu");
        let transitions = population.update_status(&mut disease);
        assert_eq!(transitions.research_progress, 2.5);
        assert_eq!(disease.research_progress(), 2.5);
    }

    #[test]
    fn cured_disease_recovers_everyone() {
        let mut population = city(CompartmentCounts::new(50, 40, 10, 0), 0.0);
        let mut disease = Disease::new("flu", 0.5, 0.5, 0.1, 0.5);
        disease.apply_research(CURE_THRESHOLD);

        let transitions = population.update_status(&mut disease);

        assert_eq!(transitions.newly_infected, 0);
        assert_eq!(transitions.reinfected, 0);
        assert_eq!(transitions.recovered, 40);
        assert_eq!(transitions.died, 0);
        assert_eq!(
            population.status("flu"),
            Some(CompartmentCounts::new(50, 0, 50, 0))
        );
    }

    #[test]
    fn untracked_disease_is_a_no_op() {
        let mut population = city(CompartmentCounts::new(90, 10, 0, 0), 1.0);
        let mut measles = Disease::with_defaults("measles");
        let transitions = population.update_status(&mut measles);
        assert_eq!(transitions.newly_infected, 0);
        assert_eq!(measles.research_progress(), 0.0);
        assert_eq!(
            population.status("flu"),
            Some(CompartmentCounts::new(90, 10, 0, 0))
        );
    }

    #[test]
    fn diseases_are_tracked_independently() {
        let mut population = Population::new("esterpool", 100)
            .with_disease("flu", CompartmentCounts::new(90, 10, 0, 0), 0.0)
            .unwrap()
            .with_disease("pox", CompartmentCounts::new(100, 0, 0, 0), 0.0)
            .unwrap();
        let mut flu = Disease::new("flu", 0.5, 0.0, 0.0, 0.0);

        population.update_status(&mut flu);

        assert_eq!(population.count("flu", HealthStatus::Infected), Some(55));
        assert_eq!(population.count("pox", HealthStatus::Infected), Some(0));
        assert_eq!(population.diseases().collect::<Vec<_>>(), vec!["flu", "pox"]);
    }

    #[test]
    fn impact_is_infected_and_dead_share() {
        let population = city(CompartmentCounts::new(50, 20, 10, 20), 0.0);
        assert_eq!(population.impact("flu").unwrap(), 0.4);
        assert!(matches!(
            population.impact("pox"),
            Err(EpiError::UnknownDiseaseError(_))
        ));
    }

    #[test]
    fn impact_of_empty_population_fails() {
        let population = city(CompartmentCounts::default(), 0.0);
        assert!(matches!(
            population.impact("flu"),
            Err(EpiError::DegenerateStateError(_))
        ));
    }

    #[test]
    fn summary_lists_compartments() {
        let population = city(CompartmentCounts::new(990, 20, 0, 0), 0.0);
        let summary = population.summary(&Disease::with_defaults("flu")).unwrap();
        assert!(summary.starts_with("esterpool (flu)"));
        assert!(summary.contains("uninfected: 990"));
        assert!(summary.contains("infected: 20"));
        assert!(population
            .summary(&Disease::with_defaults("pox"))
            .is_none());
    }
}
