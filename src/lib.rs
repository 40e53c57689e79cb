//! Simulated neural-network training dashboard.
//!
//! A [`TrainingDriver`] advances a synthetic training run on a timer and reports
//! every state change to a [`TrainingListener`]. [`Visuals`] is the listener that
//! keeps the dashboard panels up to date; host surfaces (the headless runner, the
//! terminal UI) only draw what it holds.

pub mod config;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod network;
pub mod prefs;
pub mod scheduler;
pub mod topology;
pub mod visualizers;

pub use config::DashboardConfig;
pub use driver::{RunState, Snapshot, TrainingDriver, TrainingEvent, TrainingListener};
pub use error::{DashboardError, Result};
pub use metrics::{EpochRecord, MetricsGenerator};
pub use scheduler::{IntervalScheduler, ManualScheduler, Scheduler};
pub use topology::{layers_for, Topology, Variant};
pub use visualizers::Visuals;
