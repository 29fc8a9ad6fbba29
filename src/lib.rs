//! A synchronous SIR cellular automaton
//!
//! Every cell of a square grid holds one agent that is Susceptible, Infectious or Recovered.
//! Agents only interact with their Moore neighbours. Each simulated day is a tick with two
//! phases: every agent first computes its next state from the committed state of the whole
//! grid, then every agent commits. The result of a tick is therefore independent of the order
//! in which agents are visited, and of how many worker threads visit them.
//!
//! Agents carry one of five behavior policies:
//! * Baseline: full transmission and reception.
//! * Masked: transmits at 0.3× and receives at 0.8×.
//! * Quarantine: stops transmitting while infectious.
//! * Contact-tracing: stops transmitting while it or any neighbour is infectious.
//! * Introvert: ignores a random subset of its neighbours, chosen once.
//!
//! The crate is organized leaves first:
//! * [`random`]: seeded, named random streams, including one stream per agent per day.
//! * [`agent`] and [`behavior`]: the per-cell transition rules.
//! * [`topology`]: Moore neighbourhoods and the one-time neighbour filtering.
//! * [`population`]: generation and the two-phase tick.
//! * [`simulation`], [`report`], [`render`] and [`runner`]: the day loop, CSV output, text
//!   frames and the command line around the engine.
pub mod agent;
pub mod behavior;
pub mod demographics;
pub mod error;
pub mod execution_stats;
pub mod hashing;
pub mod log;
pub mod parameters;
pub mod population;
#[cfg(feature = "progress_bar")]
pub mod progress;
pub mod random;
pub mod render;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod snapshot;
pub mod status;
pub mod topology;

pub mod prelude;

pub use agent::{Agent, AgentId, CellView};
pub use behavior::{Behavior, BehaviorKind, BehaviorMix, QuarantineStatus};
pub use demographics::Demographics;
pub use error::SirError;
pub use parameters::Parameters;
pub use population::{Population, PopulationConfig};
pub use random::RandomSource;
pub use runner::{run_with_args, run_with_custom_args, BaseArgs, SimulationArgs};
pub use simulation::{RunSummary, Simulation};
pub use snapshot::PopulationSnapshot;
pub use status::InfectionStatus;
