//! Migration run sequencing
//!
//! Forward migration: build both node maps, shadow every OpenZWave entity
//! with the suffix, then rename Z-Wave JS entities onto the freed ids.
//! Rollback: strip the suffix again. Every decision is reported whether or
//! not `commit` is set; only a committing run calls the registry's rename.

use std::collections::HashSet;

use tracing::{debug, info};
use zwm_client::RegistryApi;
use zwm_config::{OverrideTable, RunMode, Settings};
use zwm_core::{bare_id, is_shadowed, shadow_id, unshadow_id, NodeEntityMap, NodeId};

use crate::error::EngineResult;
use crate::extract::{Integration, OZW, ZWAVE_JS};
use crate::graph::build_node_map;
use crate::planner::{plan_renames, PlanEntry};
use crate::report::{Decision, Outcome, Reporter, RunReport, RunSummary, Stage};

/// Switches for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MigrationOptions {
    pub mode: RunMode,
    pub commit: bool,
    /// Send the OpenZWave display name along with each Z-Wave JS rename
    pub copy_names: bool,
}

impl From<&Settings> for MigrationOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            mode: settings.mode,
            commit: settings.commit,
            copy_names: settings.copy_names,
        }
    }
}

/// Runs a migration or rollback against a registry
pub struct Migrator {
    options: MigrationOptions,
    overrides: OverrideTable,
    old: Integration,
    new: Integration,
}

impl Migrator {
    pub fn new(options: MigrationOptions, overrides: OverrideTable) -> Self {
        Self {
            options,
            overrides,
            old: OZW,
            new: ZWAVE_JS,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(MigrationOptions::from(settings), settings.overrides.clone())
    }

    /// Run the configured mode to completion
    ///
    /// Only registry inconsistencies abort; failed renames are counted in
    /// the report.
    pub async fn run<A, R>(&self, api: &mut A, reporter: &mut R) -> EngineResult<RunReport>
    where
        A: RegistryApi + ?Sized,
        R: Reporter + ?Sized,
    {
        match self.options.mode {
            RunMode::Rollback => self.rollback(api, reporter).await,
            RunMode::Migrate => self.migrate(api, reporter).await,
        }
    }

    async fn rollback<A, R>(&self, api: &mut A, reporter: &mut R) -> EngineResult<RunReport>
    where
        A: RegistryApi + ?Sized,
        R: Reporter + ?Sized,
    {
        let mut report = RunReport::new(RunMode::Rollback, self.options.commit);
        let old_nodes = build_node_map(api, &self.old).await?;

        reporter.stage(Stage::Rollback);
        for entity_id in old_nodes.entity_ids() {
            let Some(original) = unshadow_id(entity_id) else {
                debug!("{} is not suffixed, leaving it", entity_id);
                continue;
            };
            reporter.decision(&Decision::Restore {
                from: entity_id,
                to: original,
            });
            self.rename(api, reporter, &mut report.summary, entity_id, original, None)
                .await;
        }

        Ok(report)
    }

    async fn migrate<A, R>(&self, api: &mut A, reporter: &mut R) -> EngineResult<RunReport>
    where
        A: RegistryApi + ?Sized,
        R: Reporter + ?Sized,
    {
        let mut report = RunReport::new(RunMode::Migrate, self.options.commit);

        let old_nodes = build_node_map(api, &self.old).await?;
        let new_nodes = build_node_map(api, &self.new).await?;
        if new_nodes.is_empty() {
            info!("Didn't find any Z-Wave JS nodes, nothing to migrate");
            report.outcome = Outcome::NothingToMigrate;
            return Ok(report);
        }
        info!(
            "Found {} OpenZWave and {} Z-Wave JS nodes",
            old_nodes.len(),
            new_nodes.len()
        );

        self.shadow(api, reporter, &old_nodes, &mut report.summary)
            .await;

        // Targets are the pre-shadow ids, also for entities a previous run shadowed
        let bare_old_nodes = old_nodes.map_entity_ids(|id| bare_id(id).to_string());
        report.plan = plan_renames(&new_nodes, &bare_old_nodes, &self.overrides);

        reporter.stage(Stage::Rename);
        let mut renamed_nodes: HashSet<NodeId> = HashSet::new();
        for entry in report.plan.entries() {
            let Some(target) = entry.target() else {
                report.summary.not_renamed += 1;
                reporter.decision(&Decision::Unresolved { entry });
                continue;
            };

            if entry.source == target {
                reporter.decision(&Decision::AlreadyInPlace { entry });
                renamed_nodes.insert(entry.node_id.clone());
                continue;
            }

            reporter.decision(&Decision::Rename { entry, to: target });
            let name = self.carried_name(&bare_old_nodes, entry);
            if self
                .rename(api, reporter, &mut report.summary, &entry.source, target, name)
                .await
            {
                renamed_nodes.insert(entry.node_id.clone());
            }
        }

        report.nodes_without_renames = new_nodes
            .node_ids()
            .filter(|node_id| !renamed_nodes.contains(*node_id))
            .cloned()
            .collect();

        Ok(report)
    }

    /// Move every OpenZWave entity to its suffixed id
    async fn shadow<A, R>(
        &self,
        api: &mut A,
        reporter: &mut R,
        old_nodes: &NodeEntityMap,
        summary: &mut RunSummary,
    ) where
        A: RegistryApi + ?Sized,
        R: Reporter + ?Sized,
    {
        reporter.stage(Stage::Shadow);
        for entity_id in old_nodes.entity_ids() {
            if is_shadowed(entity_id) {
                summary.skipped += 1;
                reporter.decision(&Decision::AlreadyShadowed { entity_id });
                continue;
            }
            let shadowed = shadow_id(entity_id);
            reporter.decision(&Decision::Shadow {
                from: entity_id,
                to: &shadowed,
            });
            self.rename(api, reporter, summary, entity_id, &shadowed, None)
                .await;
        }
    }

    fn carried_name<'a>(&self, old_nodes: &'a NodeEntityMap, entry: &PlanEntry) -> Option<&'a str> {
        if !self.options.copy_names {
            return None;
        }
        let target = entry.target()?;
        old_nodes
            .get(&entry.node_id)
            .and_then(|entities| entities.get(target))
            .and_then(|name| name.as_deref())
            .or_else(|| old_nodes.display_name(target))
    }

    /// Count a decided rename and issue it when committing
    ///
    /// Returns whether the rename counts as done: always in a dry run,
    /// otherwise only when the registry accepted it.
    async fn rename<A, R>(
        &self,
        api: &mut A,
        reporter: &mut R,
        summary: &mut RunSummary,
        from: &str,
        to: &str,
        name: Option<&str>,
    ) -> bool
    where
        A: RegistryApi + ?Sized,
        R: Reporter + ?Sized,
    {
        summary.planned += 1;
        if !self.options.commit {
            return true;
        }

        if api.rename_entity(from, to, name).await {
            summary.renamed += 1;
            true
        } else {
            summary.errors += 1;
            reporter.decision(&Decision::RenameFailed { from, to });
            false
        }
    }
}
