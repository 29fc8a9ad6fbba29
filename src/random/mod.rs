//! Seeded random number streams.
//!
//! There is no process-wide generator. A [`RandomSource`] holds only the base seed and hands
//! out independent streams keyed by an [`RngId`] type:
//!
//! * [`RandomSource::get_rng`] returns the sequential stream for an id. It is used during
//!   population generation, where draws happen in a fixed row-major order.
//! * [`RandomSource::agent_rng`] returns the stream for one agent on one day. Phase 1 of a
//!   tick runs on many workers at once; giving every agent its own stream per day keeps the
//!   outcome of a tick a function of the seed alone, whatever the worker partitioning.
mod macros;

pub use macros::define_rng;

use log::trace;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::hashing::{hash_stream_key, hash_str};

/// The generator type handed out by a [`RandomSource`].
pub type SimRng = SmallRng;

pub trait RngId: Copy + Clone {
    fn get_name() -> &'static str;
}

define_rng!(pub InitialStatusRng);
define_rng!(pub BehaviorRng);
define_rng!(pub TopologyRng);
define_rng!(pub TransitionRng);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomSource {
    base_seed: u64,
}

impl RandomSource {
    pub fn new(base_seed: u64) -> Self {
        trace!("initializing random source with base seed {base_seed}");
        RandomSource { base_seed }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    fn stream_seed<R: RngId>(&self) -> u64 {
        self.base_seed.wrapping_add(hash_str(R::get_name()))
    }

    /// Creates the sequential stream associated with the given [`RngId`]. Every call starts
    /// the stream from its beginning, so callers keep the returned generator for as long as
    /// they need draws.
    pub fn get_rng<R: RngId>(&self, _rng_id: R) -> SimRng {
        trace!(
            "creating new RNG (seed={}) for {}",
            self.base_seed,
            R::get_name()
        );
        SimRng::seed_from_u64(self.stream_seed::<R>())
    }

    /// Creates the stream for agent `index` on `day`.
    pub fn agent_rng<R: RngId>(&self, _rng_id: R, day: u64, index: usize) -> SimRng {
        SimRng::seed_from_u64(hash_stream_key(
            self.stream_seed::<R>(),
            day,
            index as u64,
        ))
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        RandomSource::new(0)
    }
}
