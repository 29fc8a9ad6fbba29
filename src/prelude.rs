pub use crate::agent::{Agent, AgentId, CellView};
pub use crate::behavior::{Behavior, BehaviorKind, BehaviorMix};
pub use crate::demographics::Demographics;
pub use crate::error::SirError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::parameters::Parameters;
pub use crate::population::{Population, PopulationConfig};
pub use crate::random::{RandomSource, RngId};
pub use crate::render::render_text;
pub use crate::report::{DemographicsReport, ReportOptions};
pub use crate::runner::{run_with_args, run_with_custom_args, BaseArgs, SimulationArgs};
pub use crate::simulation::{RunSummary, Simulation};
pub use crate::snapshot::PopulationSnapshot;
pub use crate::status::InfectionStatus;
pub use crate::define_rng;
