//! A single cell of the automaton.
//!
//! An [`Agent`] owns its committed status (`current`), the status it will move to at the end
//! of the tick (`next`), its fixed rates, its neighbour list and its behavior policy. Other
//! agents never look at an `Agent` directly during a tick. They read a [`CellView`] from the
//! committed snapshot, which is what makes the update synchronous.
use rand::Rng;
use std::fmt::{self, Display};

use crate::behavior::{Behavior, BehaviorKind};
use crate::random::SimRng;
use crate::status::InfectionStatus;
use crate::topology::Neighborhood;

/// Index of an agent in its population's row-major storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(usize);

impl AgentId {
    pub fn new(index: usize) -> Self {
        AgentId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What one agent exposes to the rest of the population for the duration of a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellView {
    pub status: InfectionStatus,
    /// The rate advertised to susceptible neighbours, after behavior modifiers.
    pub transmission_rate: f64,
    pub behavior: BehaviorKind,
    pub quarantined: bool,
}

#[derive(Clone, Debug)]
pub struct Agent {
    current: InfectionStatus,
    next: InfectionStatus,
    infection_rate: f64,
    recovery_rate: f64,
    neighbors: Neighborhood,
    behavior: Behavior,
}

impl Agent {
    pub fn new(
        status: InfectionStatus,
        infection_rate: f64,
        recovery_rate: f64,
        behavior: Behavior,
    ) -> Self {
        Agent {
            current: status,
            next: status,
            infection_rate,
            recovery_rate,
            neighbors: Neighborhood::default(),
            behavior,
        }
    }

    pub fn current_state(&self) -> InfectionStatus {
        self.current
    }

    pub fn next_state(&self) -> InfectionStatus {
        self.next
    }

    pub fn infection_rate(&self) -> f64 {
        self.infection_rate
    }

    pub fn recovery_rate(&self) -> f64 {
        self.recovery_rate
    }

    pub fn neighbors(&self) -> &Neighborhood {
        &self.neighbors
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn is_quarantined(&self) -> bool {
        self.behavior.is_quarantined()
    }

    pub fn effective_transmission_rate(&self) -> f64 {
        self.behavior.transmission_rate(self.infection_rate)
    }

    pub fn reception_multiplier(&self) -> f64 {
        self.behavior.reception_multiplier()
    }

    pub fn view(&self) -> CellView {
        CellView {
            status: self.current,
            transmission_rate: self.effective_transmission_rate(),
            behavior: self.behavior.kind(),
            quarantined: self.is_quarantined(),
        }
    }

    /// Installs the neighbour list, letting the behavior drop candidates. Topology is built
    /// once; calling this again replaces the list.
    pub fn accept_neighbors(&mut self, candidates: Neighborhood, rng: &mut SimRng) {
        self.neighbors = self.behavior.filter_neighbors(candidates, rng);
    }

    /// Phase 1: decides `next` from the committed `snapshot` of the whole population, which
    /// is indexed by [`AgentId`].
    ///
    /// A susceptible agent draws once per infectious neighbour, in neighbour order, and is
    /// infected if any draw falls under that neighbour's advertised rate times this agent's
    /// reception multiplier. An infectious agent draws once against its recovery rate.
    /// Recovered agents never change.
    pub fn compute_next_state<R: Rng>(&mut self, snapshot: &[CellView], rng: &mut R) {
        let mut next = self.current;
        let mut infectious_neighbor = false;

        match self.current {
            InfectionStatus::Susceptible => {
                let reception = self.reception_multiplier();
                for neighbor in &self.neighbors {
                    let view = &snapshot[neighbor.index()];
                    if view.status.is_infectious() {
                        infectious_neighbor = true;
                        let draw: f64 = rng.random();
                        if draw < view.transmission_rate * reception {
                            next = InfectionStatus::Infectious;
                        }
                    }
                }
            }
            InfectionStatus::Infectious => {
                let draw: f64 = rng.random();
                if draw < self.recovery_rate {
                    next = InfectionStatus::Recovered;
                }
            }
            InfectionStatus::Recovered => {}
        }

        if self.behavior.traces_contacts() && !self.current.is_susceptible() {
            infectious_neighbor = self
                .neighbors
                .iter()
                .any(|neighbor| snapshot[neighbor.index()].status.is_infectious());
        }

        self.next = next;
        self.behavior.observe(self.current, next, infectious_neighbor);
    }

    /// Phase 2: makes `next` the committed status and settles behavior state.
    pub fn commit(&mut self) {
        self.current = self.next;
        self.behavior.commit(self.current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{QuarantineStatus, DEFAULT_INTROVERT_AVOIDANCE};
    use crate::random::{RandomSource, TransitionRng};
    use approx::assert_relative_eq;

    fn behavior(kind: BehaviorKind) -> Behavior {
        Behavior::new(kind, DEFAULT_INTROVERT_AVOIDANCE)
    }

    /// Agent 0 is the subject; agents 1..=n are its neighbours with the given views.
    fn subject_with_neighbors(subject: &mut Agent, neighbors: &[CellView]) -> Vec<CellView> {
        let mut neighborhood = Neighborhood::default();
        for index in 1..=neighbors.len() {
            neighborhood.push(AgentId::new(index));
        }
        let mut rng = RandomSource::new(0).get_rng(TransitionRng);
        subject.accept_neighbors(neighborhood, &mut rng);
        let mut snapshot = vec![subject.view()];
        snapshot.extend_from_slice(neighbors);
        snapshot
    }

    fn infectious_view(rate: f64) -> CellView {
        CellView {
            status: InfectionStatus::Infectious,
            transmission_rate: rate,
            behavior: BehaviorKind::Baseline,
            quarantined: false,
        }
    }

    fn susceptible_view() -> CellView {
        CellView {
            status: InfectionStatus::Susceptible,
            transmission_rate: 0.5,
            behavior: BehaviorKind::Baseline,
            quarantined: false,
        }
    }

    fn recovered_view() -> CellView {
        CellView {
            status: InfectionStatus::Recovered,
            transmission_rate: 0.5,
            behavior: BehaviorKind::Baseline,
            quarantined: false,
        }
    }

    #[test]
    fn certain_infection() {
        let mut agent = Agent::new(
            InfectionStatus::Susceptible,
            0.0,
            0.0,
            behavior(BehaviorKind::Baseline),
        );
        let snapshot = subject_with_neighbors(&mut agent, &[infectious_view(1.0)]);
        let mut rng = RandomSource::new(1).agent_rng(TransitionRng, 0, 0);
        agent.compute_next_state(&snapshot, &mut rng);
        assert_eq!(agent.next_state(), InfectionStatus::Infectious);
        // Not visible until commit.
        assert_eq!(agent.current_state(), InfectionStatus::Susceptible);
        agent.commit();
        assert_eq!(agent.current_state(), InfectionStatus::Infectious);
    }

    #[test]
    fn zero_rate_neighbors_never_infect() {
        let mut agent = Agent::new(
            InfectionStatus::Susceptible,
            0.0,
            0.0,
            behavior(BehaviorKind::Baseline),
        );
        let snapshot = subject_with_neighbors(&mut agent, &[infectious_view(0.0); 8]);
        let source = RandomSource::new(2);
        for day in 0..500 {
            let mut rng = source.agent_rng(TransitionRng, day, 0);
            agent.compute_next_state(&snapshot, &mut rng);
            agent.commit();
            assert_eq!(agent.current_state(), InfectionStatus::Susceptible);
        }
    }

    #[test]
    fn non_infectious_neighbors_are_ignored() {
        let mut agent = Agent::new(
            InfectionStatus::Susceptible,
            1.0,
            0.0,
            behavior(BehaviorKind::Baseline),
        );
        let snapshot =
            subject_with_neighbors(&mut agent, &[susceptible_view(), recovered_view()]);
        let mut rng = RandomSource::new(3).agent_rng(TransitionRng, 0, 0);
        agent.compute_next_state(&snapshot, &mut rng);
        assert_eq!(agent.next_state(), InfectionStatus::Susceptible);
    }

    #[test]
    fn recovered_is_absorbing() {
        let mut agent = Agent::new(
            InfectionStatus::Recovered,
            1.0,
            1.0,
            behavior(BehaviorKind::Baseline),
        );
        let snapshot = subject_with_neighbors(&mut agent, &[infectious_view(1.0); 8]);
        let source = RandomSource::new(4);
        for day in 0..100 {
            let mut rng = source.agent_rng(TransitionRng, day, 0);
            agent.compute_next_state(&snapshot, &mut rng);
            agent.commit();
            assert_eq!(agent.current_state(), InfectionStatus::Recovered);
        }
    }

    #[test]
    fn isolated_agent_recovers_after_one_tick() {
        let mut agent = Agent::new(
            InfectionStatus::Infectious,
            1.0,
            1.0,
            behavior(BehaviorKind::Baseline),
        );
        let snapshot = vec![agent.view()];
        let mut rng = RandomSource::new(5).agent_rng(TransitionRng, 0, 0);
        agent.compute_next_state(&snapshot, &mut rng);
        agent.commit();
        assert_eq!(agent.current_state(), InfectionStatus::Recovered);
    }

    #[test]
    fn zero_recovery_rate_never_recovers() {
        let mut agent = Agent::new(
            InfectionStatus::Infectious,
            1.0,
            0.0,
            behavior(BehaviorKind::Baseline),
        );
        let source = RandomSource::new(6);
        for day in 0..100 {
            let snapshot = vec![agent.view()];
            let mut rng = source.agent_rng(TransitionRng, day, 0);
            agent.compute_next_state(&snapshot, &mut rng);
            agent.commit();
            assert_eq!(agent.current_state(), InfectionStatus::Infectious);
        }
    }

    #[test]
    fn masked_agent_rates() {
        let agent = Agent::new(
            InfectionStatus::Infectious,
            0.4,
            0.1,
            behavior(BehaviorKind::Masked),
        );
        assert_relative_eq!(agent.effective_transmission_rate(), 0.3 * 0.4);
        assert_relative_eq!(agent.reception_multiplier(), 0.8);
        assert_relative_eq!(agent.view().transmission_rate, 0.3 * 0.4);
    }

    #[test]
    fn masked_reception_scales_infection_probability() {
        // With a 1.0 advertised rate a masked agent is infected with probability 0.8.
        let source = RandomSource::new(7);
        let trials = 20_000;
        let mut infected = 0;
        for trial in 0..trials {
            let mut agent = Agent::new(
                InfectionStatus::Susceptible,
                0.0,
                0.0,
                behavior(BehaviorKind::Masked),
            );
            let snapshot = subject_with_neighbors(&mut agent, &[infectious_view(1.0)]);
            let mut rng = source.agent_rng(TransitionRng, trial, 0);
            agent.compute_next_state(&snapshot, &mut rng);
            if agent.next_state().is_infectious() {
                infected += 1;
            }
        }
        let observed = f64::from(infected) / trials as f64;
        assert_relative_eq!(observed, 0.8, epsilon = 0.02);
    }

    #[test]
    fn quarantine_agent_silenced_after_commit() {
        let mut agent = Agent::new(
            InfectionStatus::Infectious,
            0.7,
            0.0,
            behavior(BehaviorKind::Quarantine),
        );
        // Freshly infectious: not yet quarantined, so it still transmits.
        assert_relative_eq!(agent.effective_transmission_rate(), 0.7);

        let snapshot = vec![agent.view()];
        let mut rng = RandomSource::new(8).agent_rng(TransitionRng, 0, 0);
        agent.compute_next_state(&snapshot, &mut rng);
        agent.commit();
        assert!(agent.is_quarantined());
        assert_relative_eq!(agent.effective_transmission_rate(), 0.0);
    }

    #[test]
    fn quarantine_agent_reverts_after_recovery() {
        let mut agent = Agent::new(
            InfectionStatus::Infectious,
            0.7,
            1.0,
            behavior(BehaviorKind::Quarantine),
        );
        let source = RandomSource::new(9);
        let snapshot = vec![agent.view()];
        agent.compute_next_state(&snapshot, &mut source.agent_rng(TransitionRng, 0, 0));
        agent.commit();
        assert_eq!(agent.current_state(), InfectionStatus::Recovered);
        assert!(!agent.is_quarantined());
        assert_relative_eq!(agent.effective_transmission_rate(), 0.7);
    }

    #[test]
    fn contact_tracing_quarantines_while_susceptible() {
        let mut agent = Agent::new(
            InfectionStatus::Susceptible,
            0.5,
            0.0,
            behavior(BehaviorKind::ContactTracing),
        );
        let snapshot = subject_with_neighbors(&mut agent, &[infectious_view(0.0)]);
        let mut rng = RandomSource::new(10).agent_rng(TransitionRng, 0, 0);
        agent.compute_next_state(&snapshot, &mut rng);
        agent.commit();
        assert_eq!(agent.current_state(), InfectionStatus::Susceptible);
        assert!(agent.is_quarantined());
        assert_relative_eq!(agent.effective_transmission_rate(), 0.0);
    }

    #[test]
    fn quarantined_contact_tracer_can_still_be_infected() {
        let mut agent = Agent::new(
            InfectionStatus::Susceptible,
            0.5,
            0.0,
            Behavior::ContactTracing {
                status: QuarantineStatus::Quarantined,
                next: QuarantineStatus::Quarantined,
            },
        );
        let snapshot = subject_with_neighbors(&mut agent, &[infectious_view(1.0)]);
        let mut rng = RandomSource::new(11).agent_rng(TransitionRng, 0, 0);
        agent.compute_next_state(&snapshot, &mut rng);
        agent.commit();
        assert_eq!(agent.current_state(), InfectionStatus::Infectious);
        assert!(agent.is_quarantined());
    }

    #[test]
    fn contact_tracer_stays_while_neighbor_infectious_after_recovery() {
        let mut agent = Agent::new(
            InfectionStatus::Infectious,
            0.5,
            1.0,
            Behavior::ContactTracing {
                status: QuarantineStatus::Quarantined,
                next: QuarantineStatus::Quarantined,
            },
        );
        let snapshot = subject_with_neighbors(&mut agent, &[infectious_view(0.5)]);
        let mut rng = RandomSource::new(12).agent_rng(TransitionRng, 0, 0);
        agent.compute_next_state(&snapshot, &mut rng);
        agent.commit();
        assert_eq!(agent.current_state(), InfectionStatus::Recovered);
        assert!(agent.is_quarantined());

        // Next day the neighbour has recovered too; the agent walks free.
        let snapshot = vec![agent.view(), recovered_view()];
        let mut rng = RandomSource::new(12).agent_rng(TransitionRng, 1, 0);
        agent.compute_next_state(&snapshot, &mut rng);
        agent.commit();
        assert!(!agent.is_quarantined());
    }

    #[test]
    fn contact_tracer_starting_infectious_quarantines_on_first_tick() {
        let mut agent = Agent::new(
            InfectionStatus::Infectious,
            0.5,
            0.0,
            behavior(BehaviorKind::ContactTracing),
        );
        assert!(!agent.is_quarantined());
        let snapshot = vec![agent.view()];
        let mut rng = RandomSource::new(13).agent_rng(TransitionRng, 0, 0);
        agent.compute_next_state(&snapshot, &mut rng);
        agent.commit();
        assert!(agent.is_quarantined());
    }

    #[test]
    fn same_stream_same_outcome() {
        let run = || {
            let mut agent = Agent::new(
                InfectionStatus::Susceptible,
                0.0,
                0.0,
                behavior(BehaviorKind::Baseline),
            );
            let snapshot = subject_with_neighbors(&mut agent, &[infectious_view(0.5); 4]);
            let source = RandomSource::new(14);
            (0..32)
                .map(|day| {
                    let mut probe = agent.clone();
                    probe.compute_next_state(
                        &snapshot,
                        &mut source.agent_rng(TransitionRng, day, 0),
                    );
                    probe.next_state()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
