//! Behavior policies layered on top of the SIR rules.
//!
//! The set of policies is closed. [`BehaviorKind`] is the bare tag used for configuration,
//! population mixing and display; [`Behavior`] carries the per-agent state a policy needs
//! (quarantine flags, avoidance probability). Every policy answers the same questions:
//!
//! * what rate it advertises to susceptible neighbours ([`Behavior::transmission_rate`]),
//! * what it multiplies a neighbour's advertised rate by ([`Behavior::reception_multiplier`]),
//! * which Moore neighbours it keeps ([`Behavior::filter_neighbors`]),
//! * how its private state moves during a tick ([`Behavior::observe`] in phase 1 and
//!   [`Behavior::commit`] in phase 2).
use log::warn;
use rand::Rng;
use serde_derive::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::random::SimRng;
use crate::status::InfectionStatus;
use crate::topology::Neighborhood;

/// Masks cut outbound transmission by 70%.
pub const MASK_TRANSMISSION_FACTOR: f64 = 0.3;
/// Masks cut inbound risk by 20%.
pub const MASK_RECEPTION_FACTOR: f64 = 0.8;
/// Chance that an introvert drops any one of its Moore neighbours.
pub const DEFAULT_INTROVERT_AVOIDANCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BehaviorKind {
    Baseline,
    Masked,
    Quarantine,
    ContactTracing,
    Introvert,
}

impl BehaviorKind {
    pub const ALL: [BehaviorKind; 5] = [
        BehaviorKind::Baseline,
        BehaviorKind::Masked,
        BehaviorKind::Quarantine,
        BehaviorKind::ContactTracing,
        BehaviorKind::Introvert,
    ];

    /// Order in which the population mix is partitioned. Baseline takes the remainder.
    pub const PRIORITY: [BehaviorKind; 4] = [
        BehaviorKind::ContactTracing,
        BehaviorKind::Quarantine,
        BehaviorKind::Masked,
        BehaviorKind::Introvert,
    ];

    /// Single character marker used by the text renderer.
    pub fn flag(self) -> char {
        match self {
            BehaviorKind::Baseline => ' ',
            BehaviorKind::Masked => '`',
            BehaviorKind::Quarantine => '=',
            BehaviorKind::ContactTracing => '~',
            BehaviorKind::Introvert => '\\',
        }
    }
}

impl Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            BehaviorKind::Baseline => "baseline",
            BehaviorKind::Masked => "masked",
            BehaviorKind::Quarantine => "quarantine",
            BehaviorKind::ContactTracing => "contact-tracing",
            BehaviorKind::Introvert => "introvert",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QuarantineStatus {
    #[default]
    Free,
    Quarantined,
}

impl QuarantineStatus {
    fn from_flag(quarantined: bool) -> Self {
        if quarantined {
            QuarantineStatus::Quarantined
        } else {
            QuarantineStatus::Free
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behavior {
    Baseline,
    Masked,
    /// Quarantined exactly while the committed status is `Infectious`.
    Quarantine { status: QuarantineStatus },
    /// `next` is decided in phase 1 and becomes `status` at commit.
    ContactTracing {
        status: QuarantineStatus,
        next: QuarantineStatus,
    },
    /// Each Moore neighbour is dropped with probability `avoidance`, once.
    Introvert { avoidance: f64 },
}

impl Behavior {
    /// Creates the policy for `kind` in its initial state. Quarantine-capable policies
    /// always start free, even for a cell that starts infectious.
    pub fn new(kind: BehaviorKind, introvert_avoidance: f64) -> Self {
        match kind {
            BehaviorKind::Baseline => Behavior::Baseline,
            BehaviorKind::Masked => Behavior::Masked,
            BehaviorKind::Quarantine => Behavior::Quarantine {
                status: QuarantineStatus::Free,
            },
            BehaviorKind::ContactTracing => Behavior::ContactTracing {
                status: QuarantineStatus::Free,
                next: QuarantineStatus::Free,
            },
            BehaviorKind::Introvert => Behavior::Introvert {
                avoidance: introvert_avoidance,
            },
        }
    }

    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::Baseline => BehaviorKind::Baseline,
            Behavior::Masked => BehaviorKind::Masked,
            Behavior::Quarantine { .. } => BehaviorKind::Quarantine,
            Behavior::ContactTracing { .. } => BehaviorKind::ContactTracing,
            Behavior::Introvert { .. } => BehaviorKind::Introvert,
        }
    }

    pub fn quarantine_status(&self) -> Option<QuarantineStatus> {
        match self {
            Behavior::Quarantine { status } | Behavior::ContactTracing { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn is_quarantined(&self) -> bool {
        self.quarantine_status() == Some(QuarantineStatus::Quarantined)
    }

    /// Whether phase 1 must look at neighbour states even when the agent itself cannot be
    /// infected.
    pub fn traces_contacts(&self) -> bool {
        matches!(self, Behavior::ContactTracing { .. })
    }

    /// The probability advertised to susceptible neighbours, given the agent's own
    /// infection rate.
    pub fn transmission_rate(&self, infection_rate: f64) -> f64 {
        if self.is_quarantined() {
            return 0.0;
        }
        match self {
            Behavior::Masked => infection_rate * MASK_TRANSMISSION_FACTOR,
            _ => infection_rate,
        }
    }

    pub fn reception_multiplier(&self) -> f64 {
        match self {
            Behavior::Masked => MASK_RECEPTION_FACTOR,
            _ => 1.0,
        }
    }

    /// Decides which of the Moore candidates the agent will perceive. Called once, while the
    /// topology is built.
    pub fn filter_neighbors(&self, mut candidates: Neighborhood, rng: &mut SimRng) -> Neighborhood {
        if let Behavior::Introvert { avoidance } = *self {
            candidates.retain(|_| rng.random::<f64>() > avoidance);
        }
        candidates
    }

    /// Phase 1 hook. `current` is the committed status, `next` the status just computed,
    /// `infectious_neighbor` whether any perceived neighbour is infectious in the committed
    /// snapshot. Only the pending quarantine flag may change here.
    ///
    /// Neighbours are judged on the committed snapshot, so a neighbour infected during this
    /// tick is only noticed on the next one.
    pub fn observe(
        &mut self,
        current: InfectionStatus,
        next: InfectionStatus,
        infectious_neighbor: bool,
    ) {
        if let Behavior::ContactTracing { status, next: pending } = self {
            *pending = match status {
                QuarantineStatus::Quarantined => {
                    QuarantineStatus::from_flag(next.is_infectious() || infectious_neighbor)
                }
                QuarantineStatus::Free => {
                    QuarantineStatus::from_flag(current.is_infectious() || infectious_neighbor)
                }
            };
        }
    }

    /// Phase 2 hook, called after the agent's status has been committed.
    pub fn commit(&mut self, committed: InfectionStatus) {
        match self {
            Behavior::Quarantine { status } => {
                *status = QuarantineStatus::from_flag(committed.is_infectious());
            }
            Behavior::ContactTracing { status, next } => {
                *status = *next;
            }
            _ => {}
        }
    }
}

/// Fractions of the population assigned to each non-baseline policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorMix {
    pub contact_tracing: f64,
    pub quarantine: f64,
    pub masked: f64,
    pub introvert: f64,
}

impl BehaviorMix {
    pub fn fraction(&self, kind: BehaviorKind) -> f64 {
        match kind {
            BehaviorKind::ContactTracing => self.contact_tracing,
            BehaviorKind::Quarantine => self.quarantine,
            BehaviorKind::Masked => self.masked,
            BehaviorKind::Introvert => self.introvert,
            BehaviorKind::Baseline => (1.0 - self.total()).max(0.0),
        }
    }

    pub fn total(&self) -> f64 {
        self.contact_tracing + self.quarantine + self.masked + self.introvert
    }

    /// Maps a uniform draw in `[0, 1)` to a policy: the first cumulative cutoff the draw
    /// falls under wins, in [`BehaviorKind::PRIORITY`] order.
    pub fn assign(&self, draw: f64) -> BehaviorKind {
        let mut cutoff = 0.0;
        for kind in BehaviorKind::PRIORITY {
            cutoff += self.fraction(kind);
            if draw < cutoff {
                return kind;
            }
        }
        BehaviorKind::Baseline
    }

    /// Policies that can never be assigned because earlier ones already cover `[0, 1)`.
    pub fn starved(&self) -> Vec<BehaviorKind> {
        let mut starved = Vec::new();
        let mut cutoff = 0.0;
        for kind in BehaviorKind::PRIORITY {
            if cutoff >= 1.0 {
                starved.push(kind);
            }
            cutoff += self.fraction(kind);
        }
        if cutoff >= 1.0 {
            starved.push(BehaviorKind::Baseline);
        }
        starved
    }

    /// Logs a warning when the fractions add up to more than the whole population.
    pub fn warn_if_oversubscribed(&self) {
        if self.total() > 1.0 {
            let starved: Vec<String> = self.starved().iter().map(ToString::to_string).collect();
            warn!(
                "behavior fractions sum to {:.3}; assignment prioritizes contact-tracing, \
                 quarantine, masked, then introvert. No cells will be: {}",
                self.total(),
                starved.join(", ")
            );
        }
    }
}
