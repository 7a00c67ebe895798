//! Sweep driver: enumerate combinations, skip what is unsupported or already
//! conducted, launch the rest through an external runner and store results.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌───────────────┐
//! │  SweepPlan  │────▶│  SweepRunner │────▶│  Launcher     │
//! │  (product)  │     │  (skip, run) │     │  (external)   │
//! └─────────────┘     └──────┬───────┘     └───────────────┘
//!                            │
//!                            ▼
//!                     ┌──────────────┐
//!                     │  ResultStore │
//!                     │  (local/hub) │
//!                     └──────────────┘
//! ```

pub mod errors;
pub mod hub;
pub mod launcher;
pub mod plan;
pub mod runner;
pub mod skip;
pub mod store;

pub use errors::{report_failure, FailureKind};
pub use hub::{HubError, HubStore};
pub use launcher::{Launcher, ProcessLauncher};
pub use plan::{Combination, SweepPlan};
pub use runner::{Outcome, SweepRunner, SweepSummary};
pub use skip::{is_experiment_conducted, is_experiment_not_supported, SkipReason};
pub use store::{LocalStore, ResultStore};
