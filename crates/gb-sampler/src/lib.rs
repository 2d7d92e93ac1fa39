//! Multi-chain posterior sampling on top of the `nuts-rs` engine.
//!
//! Callers implement [`LogDensity`] (log density plus gradient over an
//! unconstrained vector) and receive one [`Chain`] of retained draws per
//! independent chain. Trajectory building, step-size and mass-matrix
//! adaptation all belong to `nuts-rs`; this crate owns settings
//! validation, jittered start points, seeding and the draw bookkeeping.
//!
//! Chains run in parallel on the rayon pool, each with its own
//! jump-separated xoshiro stream, so results depend only on the seed.

mod chain;
mod density;
mod error;
mod settings;

pub use chain::{sample, Chain, DrawStats, TuningSummary};
pub use density::{LogDensity, NonFiniteDensity};
pub use error::{SamplerError, SamplerResult};
pub use settings::NutsSettings;
