//! Plotline Simulator
//!
//! Seeded random-operation testing for the outline engine, plus a checker
//! for persisted story snapshots. Both back the `plotline-sim` binary.

#![allow(missing_docs)]

pub mod check;
pub mod simulator;

pub use check::{check_snapshot, StorySummary};
pub use simulator::{
    run_simulator, ExpectedResult, SimulatedOperation, SimulatorConfig, SimulatorReport,
    SimulatorStats, Violation,
};
