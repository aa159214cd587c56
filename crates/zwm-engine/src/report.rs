//! Run decisions, tallies and the final report

use std::fmt;
use std::fmt::Write as _;

use tracing::{error, info, warn};
use zwm_config::{RunMode, PLACEHOLDER};
use zwm_core::NodeId;

use crate::planner::{PlanEntry, RenamePlan, Resolution};

/// Phase of a run, announced before its decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Moving OpenZWave entities to their suffixed ids
    Shadow,
    /// Renaming Z-Wave JS entities onto OpenZWave ids
    Rename,
    /// Restoring suffixed OpenZWave entities
    Rollback,
}

/// One decision, reported as soon as it is made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<'a> {
    /// OpenZWave entity moved out of the way
    Shadow { from: &'a str, to: &'a str },
    /// OpenZWave entity already carries the suffix
    AlreadyShadowed { entity_id: &'a str },
    /// Z-Wave JS entity renamed onto an OpenZWave id
    Rename { entry: &'a PlanEntry, to: &'a str },
    /// Z-Wave JS entity already has its target id
    AlreadyInPlace { entry: &'a PlanEntry },
    /// No safe target for a Z-Wave JS entity
    Unresolved { entry: &'a PlanEntry },
    /// Suffixed OpenZWave entity restored
    Restore { from: &'a str, to: &'a str },
    /// The registry did not accept a rename
    RenameFailed { from: &'a str, to: &'a str },
}

/// Receives decisions while a run progresses
pub trait Reporter {
    fn stage(&mut self, stage: Stage);
    fn decision(&mut self, decision: &Decision<'_>);
}

/// Logs every decision; level encodes urgency
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn stage(&mut self, stage: Stage) {
        match stage {
            Stage::Shadow => info!(
                "Suffixing OpenZWave entities with {}",
                zwm_core::SHADOW_SUFFIX
            ),
            Stage::Rename => info!("Renaming Z-Wave JS entities"),
            Stage::Rollback => info!("Removing {} from OpenZWave entities", zwm_core::SHADOW_SUFFIX),
        }
    }

    fn decision(&mut self, decision: &Decision<'_>) {
        match decision {
            Decision::Shadow { from, to } | Decision::Restore { from, to } => {
                info!("{} -> {}", from, to)
            }
            Decision::AlreadyShadowed { entity_id } => {
                warn!("Entity {} already has suffix, skipping", entity_id)
            }
            Decision::Rename { entry, to } => info!(
                node = %entry.node_id,
                resolution = entry.resolution.label(),
                "{} -> {}",
                entry.source,
                to
            ),
            Decision::AlreadyInPlace { entry } => {
                info!(node = %entry.node_id, "{} already renamed", entry.source)
            }
            Decision::Unresolved { entry } => warn!(
                node = %entry.node_id,
                "Could not resolve {}{}",
                entry.source,
                candidates_note(entry)
            ),
            Decision::RenameFailed { from, to } => error!("Error renaming {} -> {}", from, to),
        }
    }
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Renames decided, whether or not they were issued
    pub planned: usize,
    /// Renames the registry accepted
    pub renamed: usize,
    /// Renames the registry rejected or never answered
    pub errors: usize,
    /// Z-Wave JS entities left without a target
    pub not_renamed: usize,
    /// OpenZWave entities that already carried the suffix
    pub skipped: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Renamed {} entities ({} errors) and skipped {} entities",
            self.renamed, self.errors, self.not_renamed
        )
    }
}

/// How the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// No Z-Wave JS nodes were found; nothing was touched
    NothingToMigrate,
}

/// Everything a run decided and did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub mode: RunMode,
    pub commit: bool,
    pub outcome: Outcome,
    pub summary: RunSummary,
    /// Empty for rollback runs
    pub plan: RenamePlan,
    /// Z-Wave JS nodes that ended the run without any entity renamed
    pub nodes_without_renames: Vec<NodeId>,
}

impl RunReport {
    pub(crate) fn new(mode: RunMode, commit: bool) -> Self {
        Self {
            mode,
            commit,
            outcome: Outcome::Completed,
            summary: RunSummary::default(),
            plan: RenamePlan::default(),
            nodes_without_renames: Vec::new(),
        }
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &PlanEntry> {
        self.plan.unresolved()
    }

    pub fn has_unresolved(&self) -> bool {
        self.unresolved().next().is_some()
    }

    /// Final tally line
    pub fn tally(&self) -> String {
        match (self.mode, self.commit) {
            (RunMode::Rollback, true) => format!(
                "Rolled back {} entities ({} errors)",
                self.summary.renamed, self.summary.errors
            ),
            (RunMode::Rollback, false) => format!(
                "Dry run: would roll back {} entities; pass --commit to apply",
                self.summary.planned
            ),
            (RunMode::Migrate, true) => self.summary.to_string(),
            (RunMode::Migrate, false) => format!(
                "Dry run: would rename {} entities and skip {} entities; pass --commit to apply",
                self.summary.planned, self.summary.not_renamed
            ),
        }
    }
}

/// Unresolved entities as an override file the operator can fill in
///
/// Every target is the [`PLACEHOLDER`], which the override loader skips, so
/// the output can be passed back with `--overrides` as soon as some of the
/// placeholders are replaced.
pub fn render_override_table(plan: &RenamePlan) -> String {
    let mut out = String::new();
    for entry in plan.unresolved() {
        let _ = writeln!(
            out,
            "{}: \"{}\"  # Node {}{}",
            entry.source,
            PLACEHOLDER,
            entry.node_id,
            candidates_note(entry)
        );
    }
    out
}

fn candidates_note(entry: &PlanEntry) -> String {
    match &entry.resolution {
        Resolution::Unresolved { candidates } if !candidates.is_empty() => {
            format!(" entities: {}", candidates.join(", "))
        }
        _ => String::new(),
    }
}
