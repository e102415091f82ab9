//! The driver loop.
//!
//! A [`Simulation`] owns the diseases and the [`Network`] they spread over.
//! Each [`Simulation::tick`] advances every disease on every node once, then
//! records the state of every (city, disease) pair. The initial state is
//! recorded as tick 0 when the simulation is created.

use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::SimulationParameters;
use crate::disease::Disease;
use crate::error::EpiError;
use crate::names::generate_unique_city_name;
use crate::network::Network;
use crate::population::{Population, Transitions};
use crate::report::{ReportWriter, StatusRecord, TimeSeries};

pub struct Simulation {
    diseases: IndexMap<String, Disease>,
    network: Network,
    rng: SmallRng,
    current_tick: usize,
    time_series: TimeSeries,
    report: Option<ReportWriter>,
}

impl Simulation {
    /// Creates a simulation over an already built network.
    ///
    /// # Errors
    ///
    /// Returns [`EpiError::ConfigurationError`] if two diseases share a name.
    pub fn new(network: Network, diseases: Vec<Disease>, seed: u64) -> Result<Self, EpiError> {
        let mut by_name = IndexMap::new();
        for disease in diseases {
            let name = disease.name().to_string();
            if by_name.insert(name.clone(), disease).is_some() {
                return Err(EpiError::ConfigurationError(format!(
                    "disease {name} is declared twice"
                )));
            }
        }
        let mut simulation = Simulation {
            diseases: by_name,
            network,
            rng: SmallRng::seed_from_u64(seed),
            current_tick: 0,
            time_series: TimeSeries::new(),
            report: None,
        };
        simulation.record_current_state()?;
        Ok(simulation)
    }

    /// Builds populations, edges and diseases from loaded parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if a city's counts do not match its total, two cities
    /// share a name, or an explicit edge is invalid.
    pub fn from_parameters(parameters: &SimulationParameters) -> Result<Self, EpiError> {
        parameters.validate()?;
        let mut rng = SmallRng::seed_from_u64(parameters.seed);
        let mut network = Network::new(parameters.bidirectional);

        for city in &parameters.cities {
            let name = match &city.name {
                Some(name) => name.clone(),
                None => generate_unique_city_name(&mut rng, |candidate| {
                    network.contains_node(candidate)
                        || parameters
                            .cities
                            .iter()
                            .any(|other| other.name.as_deref() == Some(candidate))
                }),
            };
            let mut population = Population::new(name, city.resolved_total()?)
                .with_rate_function(parameters.rate_function);
            for entry in &city.diseases {
                population.add_disease(
                    &entry.disease,
                    entry.counts,
                    entry.resolved_research_rate(city),
                )?;
            }
            network.add_node(population)?;
        }

        match &parameters.edges {
            Some(edges) => {
                for (from, to) in edges {
                    network.add_edge(from, to)?;
                }
            }
            None => {
                network.generate_edges(parameters.connection_probability, &mut rng);
            }
        }

        info!(
            "built network of {} cities and {} edges for {} diseases",
            network.node_count(),
            network.edge_count(),
            parameters.diseases.len()
        );

        let mut simulation = Simulation::new(network, parameters.diseases.clone(), parameters.seed)?;
        simulation.rng = rng;
        Ok(simulation)
    }

    /// Streams every record, including those already produced, to a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the report file cannot be created or written.
    pub fn add_report(&mut self, path: &Path) -> Result<(), EpiError> {
        let mut writer = ReportWriter::create(path)?;
        for record in self.time_series.records() {
            writer.send(record)?;
        }
        self.report = Some(writer);
        Ok(())
    }

    /// Advances every disease on every node by one tick and records the
    /// result. Returns the moves of each disease summed over the network.
    ///
    /// # Errors
    ///
    /// Only fails if writing the CSV report fails. The state has advanced
    /// either way.
    pub fn tick(&mut self) -> Result<IndexMap<String, Transitions>, EpiError> {
        self.current_tick += 1;
        let mut moves = IndexMap::new();
        for (name, disease) in &mut self.diseases {
            let transitions = self.network.step(disease);
            debug!(
                "tick {} {}: +{} infected, +{} reinfected, +{} recovered, +{} dead, research {:.2}",
                self.current_tick,
                name,
                transitions.newly_infected,
                transitions.reinfected,
                transitions.recovered,
                transitions.died,
                transitions.research_progress
            );
            moves.insert(name.clone(), transitions);
        }
        self.record_current_state()?;
        Ok(moves)
    }

    /// Runs `ticks` ticks.
    ///
    /// # Errors
    ///
    /// See [`Simulation::tick`].
    pub fn run(&mut self, ticks: usize) -> Result<(), EpiError> {
        info!(
            "running {} ticks from tick {} over {} cities",
            ticks,
            self.current_tick,
            self.network.node_count()
        );
        for _ in 0..ticks {
            self.tick()?;
        }
        info!("finished at tick {}", self.current_tick);
        Ok(())
    }

    fn record_current_state(&mut self) -> Result<(), EpiError> {
        for population in self.network.nodes() {
            for disease in self.diseases.values() {
                if let Some(record) = StatusRecord::capture(self.current_tick, population, disease)
                {
                    if let Some(report) = self.report.as_mut() {
                        report.send(&record)?;
                    }
                    self.time_series.record(record);
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Mutable access for topology edits between ticks.
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    #[must_use]
    pub fn disease(&self, name: &str) -> Option<&Disease> {
        self.diseases.get(name)
    }

    /// Diseases in declaration order.
    pub fn diseases(&self) -> impl Iterator<Item = &Disease> {
        self.diseases.values()
    }

    #[must_use]
    pub fn time_series(&self) -> &TimeSeries {
        &self.time_series
    }

    /// Regenerates the network's edges with the simulation's generator.
    pub fn regenerate_edges(&mut self, connection_probability: f64) -> usize {
        self.network
            .generate_edges(connection_probability, &mut self.rng)
    }
}
