//! OpenZWave to Z-Wave JS reconciliation engine
//!
//! The engine correlates the device/entity graphs of the two integrations by
//! physical node id, decides a rename target for every Z-Wave JS entity and
//! drives the rename sequence against the registry.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ RegistryApi  │──▶│ graph        │──▶│ planner      │──▶│ orchestrator │
//! │ (zwm-client) │   │ node maps    │   │ RenamePlan   │   │ RunReport    │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────┬───────┘
//!        ▲                                                        │
//!        └────────────────────────── renames ─────────────────────┘
//! ```

mod error;
pub mod extract;
pub mod graph;
pub mod orchestrator;
pub mod planner;
pub mod report;

pub use error::{EngineError, EngineResult, GraphError};
pub use extract::{DelimitedKey, ExtractError, Integration, NodeIdExtractor, OZW, ZWAVE_JS};
pub use graph::{build_node_map, devices_for, entities_for, fold_node_map};
pub use orchestrator::{MigrationOptions, Migrator};
pub use planner::{plan_renames, NodePlan, PlanEntry, RenamePlan, Resolution};
pub use report::{
    render_override_table, Decision, Outcome, Reporter, RunReport, RunSummary, Stage,
    TracingReporter,
};
