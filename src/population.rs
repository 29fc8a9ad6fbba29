//! The grid of agents and the two-phase tick that drives it.
//!
//! Each tick first copies every agent's committed state into a [`CellView`] buffer. Phase 1
//! then lets every agent compute its next state against that buffer, on as many rayon
//! workers as are available. Phase 2 starts only once phase 1 has joined, and commits every
//! agent. No agent can observe another's half-finished tick.
use log::{info, trace};
use rand::Rng;
use rayon::prelude::*;
use std::time::Instant;

use crate::agent::{Agent, AgentId, CellView};
use crate::behavior::{Behavior, BehaviorKind, BehaviorMix, DEFAULT_INTROVERT_AVOIDANCE};
use crate::demographics::Demographics;
use crate::error::SirError;
use crate::random::{BehaviorRng, InitialStatusRng, RandomSource, TopologyRng, TransitionRng};
use crate::snapshot::PopulationSnapshot;
use crate::status::InfectionStatus;
use crate::topology::{build_topology, grid_index};

/// Everything needed to generate a [`Population`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PopulationConfig {
    /// Cells per side.
    pub size: usize,
    /// Probability that a cell starts out infectious.
    pub initial_infected_fraction: f64,
    pub infection_rate: f64,
    pub recovery_rate: f64,
    pub mix: BehaviorMix,
    /// Probability that an introvert drops each candidate neighbour.
    pub introvert_avoidance: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig {
            size: 1,
            initial_infected_fraction: 0.0,
            infection_rate: 0.0,
            recovery_rate: 0.0,
            mix: BehaviorMix::default(),
            introvert_avoidance: DEFAULT_INTROVERT_AVOIDANCE,
        }
    }
}

pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<(), SirError> {
    if value.is_nan() || !(0.0..=1.0).contains(&value) {
        return Err(SirError::configuration(
            name,
            value,
            "must be a probability in [0, 1]",
        ));
    }
    Ok(())
}

impl PopulationConfig {
    /// Rejects any rate or fraction outside `[0, 1]`, an empty grid, and a grid whose cell
    /// count does not fit in a `usize`.
    ///
    /// # Errors
    ///
    /// Returns [`SirError::ConfigurationError`] naming the first offending value.
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<(), SirError> {
        if self.size == 0 {
            return Err(SirError::configuration(
                "grid_size",
                self.size as f64,
                "must be positive",
            ));
        }
        if self.size.checked_mul(self.size).is_none() {
            return Err(SirError::configuration(
                "grid_size",
                self.size as f64,
                "is too large: the cell count overflows",
            ));
        }
        check_probability("initial_infected_fraction", self.initial_infected_fraction)?;
        check_probability("infection_rate", self.infection_rate)?;
        check_probability("recovery_rate", self.recovery_rate)?;
        check_probability("contact_tracing_fraction", self.mix.contact_tracing)?;
        check_probability("quarantine_fraction", self.mix.quarantine)?;
        check_probability("masked_fraction", self.mix.masked)?;
        check_probability("introvert_fraction", self.mix.introvert)?;
        check_probability("introvert_avoidance", self.introvert_avoidance)?;
        Ok(())
    }
}

/// A square grid of agents, stored row-major.
#[derive(Clone, Debug)]
pub struct Population {
    size: usize,
    agents: Vec<Agent>,
    ticks: u64,
}

impl Population {
    /// Generates a population: an initial status per cell, then a behavior per cell, then
    /// the topology. Each step draws from its own stream in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`SirError::ConfigurationError`] if `config` does not validate. Nothing is
    /// generated in that case.
    pub fn generate(config: &PopulationConfig, random: &RandomSource) -> Result<Self, SirError> {
        config.validate()?;
        config.mix.warn_if_oversubscribed();

        let cells = config.size * config.size;
        let mut status_rng = random.get_rng(InitialStatusRng);
        let mut behavior_rng = random.get_rng(BehaviorRng);

        let agents: Vec<Agent> = (0..cells)
            .map(|_| {
                let status = if status_rng.random::<f64>() < config.initial_infected_fraction {
                    InfectionStatus::Infectious
                } else {
                    InfectionStatus::Susceptible
                };
                let kind = config.mix.assign(behavior_rng.random::<f64>());
                Agent::new(
                    status,
                    config.infection_rate,
                    config.recovery_rate,
                    Behavior::new(kind, config.introvert_avoidance),
                )
            })
            .collect();

        let population = Population::from_agents(config.size, agents, random);
        info!(
            "generated {size}x{size} population: {demographics}; behaviors {counts:?}",
            size = config.size,
            demographics = population.demographics(),
            counts = population.behavior_counts()
        );
        Ok(population)
    }

    /// Builds a population from explicitly constructed agents, in row-major order, and
    /// wires up their topology.
    ///
    /// # Panics
    ///
    /// Panics if `agents` does not hold exactly `size * size` agents.
    pub fn from_agents(size: usize, mut agents: Vec<Agent>, random: &RandomSource) -> Self {
        let mut topology_rng = random.get_rng(TopologyRng);
        build_topology(&mut agents, size, &mut topology_rng);
        Population {
            size,
            agents,
            ticks: 0,
        }
    }

    /// Advances every agent by one day.
    ///
    /// Phase 1 reads only the committed state captured at the start of the call. Phase 2
    /// begins after every phase-1 write has completed. Both phases run on the current rayon
    /// pool, and agent `i` on day `d` always draws from the same stream, so the result does
    /// not depend on the number of workers.
    pub fn tick(&mut self, random: &RandomSource) {
        let start = Instant::now();
        let day = self.ticks;
        let snapshot: Vec<CellView> = self.agents.iter().map(Agent::view).collect();

        self.agents
            .par_iter_mut()
            .enumerate()
            .for_each(|(index, agent)| {
                let mut rng = random.agent_rng(TransitionRng, day, index);
                agent.compute_next_state(&snapshot, &mut rng);
            });
        let computed = start.elapsed();

        self.agents.par_iter_mut().for_each(Agent::commit);
        self.ticks += 1;

        trace!(
            "tick {day}: compute {computed:?}, commit {:?}",
            start.elapsed().saturating_sub(computed)
        );
    }

    /// Counts per status.
    ///
    /// # Panics
    ///
    /// Panics if the counts do not add up to `size²`, which means the population's storage
    /// has been corrupted.
    pub fn demographics(&self) -> Demographics {
        let demographics =
            Demographics::from_statuses(self.agents.iter().map(Agent::current_state));
        assert_eq!(
            demographics.total(),
            self.size * self.size,
            "demographics {demographics:?} do not cover a {0}x{0} grid",
            self.size
        );
        demographics
    }

    pub fn infectious_count(&self) -> usize {
        self.agents
            .iter()
            .filter(|agent| agent.current_state().is_infectious())
            .count()
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of ticks completed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Agent> {
        if row < self.size && col < self.size {
            self.agent(grid_index(self.size, row, col))
        } else {
            None
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// A copy of the committed state of every cell.
    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot::new(self.size, self.agents.iter().map(Agent::view).collect())
    }

    /// Number of agents per behavior, in [`BehaviorKind::ALL`] order.
    pub fn behavior_counts(&self) -> Vec<(BehaviorKind, usize)> {
        BehaviorKind::ALL
            .iter()
            .map(|&kind| {
                let count = self
                    .agents
                    .iter()
                    .filter(|agent| agent.behavior().kind() == kind)
                    .count();
                (kind, count)
            })
            .collect()
    }
}
