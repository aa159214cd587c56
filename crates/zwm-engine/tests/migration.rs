//! End-to-end migration runs against an in-memory registry

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use zwm_client::RegistryApi;
use zwm_config::{OverrideTable, RunMode};
use zwm_core::{DeviceEntry, DeviceIdentifier, EntityEntry, NodeId};
use zwm_engine::{
    Decision, EngineError, GraphError, MigrationOptions, Migrator, Outcome, Reporter, Resolution,
    Stage,
};

/// Registry that applies renames the way Home Assistant does
#[derive(Default)]
struct MockRegistry {
    devices: Vec<DeviceEntry>,
    entities: Vec<EntityEntry>,
    /// (from, to, name) of every rename call
    renames: Vec<(String, String, Option<String>)>,
    /// Entity ids whose rename the registry refuses
    reject: HashSet<String>,
}

impl MockRegistry {
    fn device(&mut self, id: &str, integration: &str, key: &str) -> &mut Self {
        self.devices
            .push(DeviceEntry::new(id, vec![DeviceIdentifier::new(integration, key)]));
        self
    }

    fn entity(&mut self, entity_id: &str, device_id: &str, platform: &str, name: Option<&str>) -> &mut Self {
        self.entities
            .push(EntityEntry::new(entity_id, Some(device_id), platform, name));
        self
    }

    fn entity_ids(&self, platform: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entities
            .iter()
            .filter(|e| e.platform == platform)
            .map(|e| e.entity_id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Two nodes known to both integrations
    fn home() -> Self {
        let mut registry = Self::default();
        registry
            .device("zjs-47", "zwave_js", "3672945806-47")
            .device("zjs-12", "zwave_js", "3672945806-12")
            .device("ozw-47", "ozw", "1.47.1")
            .device("ozw-12", "ozw", "1.12.1")
            .entity("light.motionlight", "zjs-47", "zwave_js", None)
            .entity("sensor.multisensor_temperature", "zjs-12", "zwave_js", None)
            .entity("sensor.multisensor_humidity", "zjs-12", "zwave_js", None)
            .entity(
                "light.master_bathroom_light",
                "ozw-47",
                "ozw",
                Some("Master Bathroom Light"),
            )
            .entity("sensor.attic_temperature", "ozw-12", "ozw", None)
            .entity("sensor.attic_humidity", "ozw-12", "ozw", None);
        registry
    }
}

#[async_trait]
impl RegistryApi for MockRegistry {
    async fn list_devices(&mut self) -> Option<Vec<DeviceEntry>> {
        Some(self.devices.clone())
    }

    async fn list_entities(&mut self) -> Option<Vec<EntityEntry>> {
        Some(self.entities.clone())
    }

    async fn rename_entity(&mut self, entity_id: &str, new_entity_id: &str, name: Option<&str>) -> bool {
        self.renames.push((
            entity_id.to_string(),
            new_entity_id.to_string(),
            name.map(String::from),
        ));
        if self.reject.contains(entity_id) || self.entities.iter().any(|e| e.entity_id == new_entity_id) {
            return false;
        }
        match self.entities.iter_mut().find(|e| e.entity_id == entity_id) {
            Some(entity) => {
                entity.entity_id = new_entity_id.to_string();
                if let Some(name) = name {
                    entity.name = Some(name.to_string());
                }
                true
            }
            None => false,
        }
    }
}

#[derive(Default)]
struct RecordingReporter {
    stages: Vec<Stage>,
    lines: Vec<String>,
}

impl Reporter for RecordingReporter {
    fn stage(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    fn decision(&mut self, decision: &Decision<'_>) {
        let line = match decision {
            Decision::Shadow { from, to } => format!("shadow {} -> {}", from, to),
            Decision::AlreadyShadowed { entity_id } => format!("skip {}", entity_id),
            Decision::Rename { entry, to } => format!("rename {} -> {}", entry.source, to),
            Decision::AlreadyInPlace { entry } => format!("in-place {}", entry.source),
            Decision::Unresolved { entry } => format!("unresolved {}", entry.source),
            Decision::Restore { from, to } => format!("restore {} -> {}", from, to),
            Decision::RenameFailed { from, to } => format!("failed {} -> {}", from, to),
        };
        self.lines.push(line);
    }
}

fn migrator(mode: RunMode, commit: bool) -> Migrator {
    Migrator::new(
        MigrationOptions {
            mode,
            commit,
            copy_names: false,
        },
        OverrideTable::new(),
    )
}

#[tokio::test]
async fn test_dry_run_displays_plan_without_renaming() {
    let mut registry = MockRegistry::home();
    let mut reporter = RecordingReporter::default();

    let report = migrator(RunMode::Migrate, false)
        .run(&mut registry, &mut reporter)
        .await
        .unwrap();

    assert!(registry.renames.is_empty());
    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(reporter.stages, vec![Stage::Shadow, Stage::Rename]);
    assert!(reporter
        .lines
        .contains(&"shadow light.master_bathroom_light -> light.master_bathroom_light_ozwmigration".to_string()));
    assert!(reporter
        .lines
        .contains(&"rename light.motionlight -> light.master_bathroom_light".to_string()));

    // 3 shadows + 1 resolved rename
    assert_eq!(report.summary.planned, 4);
    assert_eq!(report.summary.renamed, 0);
    assert_eq!(report.summary.not_renamed, 2);
    assert_eq!(report.nodes_without_renames, vec![NodeId::from("12")]);

    let unresolved: Vec<&str> = report.unresolved().map(|e| e.source.as_str()).collect();
    assert_eq!(
        unresolved,
        vec!["sensor.multisensor_temperature", "sensor.multisensor_humidity"]
    );
}

#[tokio::test]
async fn test_dry_runs_are_repeatable() {
    let mut registry = MockRegistry::home();
    let migrator = migrator(RunMode::Migrate, false);

    let first = migrator
        .run(&mut registry, &mut RecordingReporter::default())
        .await
        .unwrap();
    let second = migrator
        .run(&mut registry, &mut RecordingReporter::default())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert!(registry.renames.is_empty());
}

#[tokio::test]
async fn test_commit_shadows_then_renames() {
    let mut registry = MockRegistry::home();
    let mut reporter = RecordingReporter::default();

    let report = migrator(RunMode::Migrate, true)
        .run(&mut registry, &mut reporter)
        .await
        .unwrap();

    assert_eq!(report.summary.renamed, 4);
    assert_eq!(report.summary.errors, 0);
    assert_eq!(
        registry.entity_ids("ozw"),
        vec![
            "light.master_bathroom_light_ozwmigration",
            "sensor.attic_humidity_ozwmigration",
            "sensor.attic_temperature_ozwmigration",
        ]
    );
    assert!(registry
        .entity_ids("zwave_js")
        .contains(&"light.master_bathroom_light".to_string()));

    // Shadowing happens before any Z-Wave JS rename
    let first_zjs = registry
        .renames
        .iter()
        .position(|(from, _, _)| from == "light.motionlight")
        .unwrap();
    assert_eq!(first_zjs, 3);
}

#[tokio::test]
async fn test_rerun_after_commit_is_a_no_op() {
    let mut registry = MockRegistry::home();
    let migrator = migrator(RunMode::Migrate, true);
    migrator
        .run(&mut registry, &mut RecordingReporter::default())
        .await
        .unwrap();
    registry.renames.clear();

    let mut reporter = RecordingReporter::default();
    let report = migrator.run(&mut registry, &mut reporter).await.unwrap();

    assert!(registry.renames.is_empty());
    assert_eq!(report.summary.skipped, 3);
    assert_eq!(report.summary.renamed, 0);
    assert!(reporter
        .lines
        .contains(&"skip light.master_bathroom_light_ozwmigration".to_string()));
    assert!(reporter
        .lines
        .contains(&"in-place light.master_bathroom_light".to_string()));
    assert_eq!(report.nodes_without_renames, vec![NodeId::from("12")]);
}

#[tokio::test]
async fn test_shadow_then_rollback_restores_exact_ids() {
    let mut registry = MockRegistry::default();
    registry
        .device("ozw-4", "ozw", "1.4.1")
        .device("zjs-4", "zwave_js", "99-4")
        .entity("light.foo", "ozw-4", "ozw", None)
        .entity("sensor.node-4.air_temp", "ozw-4", "ozw", None)
        .entity("switch.plug-2", "ozw-4", "ozw", None)
        .entity("light.zjs_foo", "zjs-4", "zwave_js", None);
    let original = registry.entity_ids("ozw");

    migrator(RunMode::Migrate, true)
        .run(&mut registry, &mut RecordingReporter::default())
        .await
        .unwrap();
    assert!(registry
        .entity_ids("ozw")
        .iter()
        .all(|id| id.ends_with("_ozwmigration")));

    // The operator removes Z-Wave JS before rolling back
    registry.entities.retain(|e| e.platform == "ozw");

    let mut reporter = RecordingReporter::default();
    let report = migrator(RunMode::Rollback, true)
        .run(&mut registry, &mut reporter)
        .await
        .unwrap();

    assert_eq!(registry.entity_ids("ozw"), original);
    assert_eq!(report.summary.renamed, 3);
    assert_eq!(reporter.stages, vec![Stage::Rollback]);
    assert!(reporter
        .lines
        .contains(&"restore light.foo_ozwmigration -> light.foo".to_string()));
    assert!(report.plan.nodes.is_empty());
}

#[tokio::test]
async fn test_rollback_dry_run_touches_nothing() {
    let mut registry = MockRegistry::default();
    registry
        .device("ozw-4", "ozw", "1.4.1")
        .entity("light.foo_ozwmigration", "ozw-4", "ozw", None)
        .entity("light.bar", "ozw-4", "ozw", None);

    let mut reporter = RecordingReporter::default();
    let report = migrator(RunMode::Rollback, false)
        .run(&mut registry, &mut reporter)
        .await
        .unwrap();

    assert!(registry.renames.is_empty());
    assert_eq!(report.summary.planned, 1);
    assert_eq!(
        reporter.lines,
        vec!["restore light.foo_ozwmigration -> light.foo".to_string()]
    );
}

#[tokio::test]
async fn test_no_zwave_js_nodes_means_nothing_to_migrate() {
    let mut registry = MockRegistry::default();
    registry
        .device("ozw-47", "ozw", "1.47.1")
        .entity("light.master_bathroom_light", "ozw-47", "ozw", None);

    let mut reporter = RecordingReporter::default();
    let report = migrator(RunMode::Migrate, true)
        .run(&mut registry, &mut reporter)
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::NothingToMigrate);
    assert_eq!(report.summary.planned, 0);
    assert!(registry.renames.is_empty());
    assert!(reporter.stages.is_empty());
}

#[tokio::test]
async fn test_failed_rename_is_counted_and_run_continues() {
    let mut registry = MockRegistry::home();
    registry.reject.insert("light.motionlight".to_string());

    let mut reporter = RecordingReporter::default();
    let report = migrator(RunMode::Migrate, true)
        .run(&mut registry, &mut reporter)
        .await
        .unwrap();

    assert_eq!(report.summary.errors, 1);
    assert_eq!(report.summary.renamed, 3);
    assert!(reporter
        .lines
        .contains(&"failed light.motionlight -> light.master_bathroom_light".to_string()));
    assert_eq!(
        report.nodes_without_renames,
        vec![NodeId::from("47"), NodeId::from("12")]
    );
}

#[tokio::test]
async fn test_overrides_resolve_ambiguous_entities() {
    let mut registry = MockRegistry::home();
    let overrides = OverrideTable::from_yaml_str(
        "sensor.multisensor_temperature: sensor.attic_temperature\n\
         sensor.multisensor_humidity: sensor.attic_humidity\n\
         light.motionlight: light.hallway\n",
        Path::new("overrides.yaml"),
    )
    .unwrap();
    let migrator = Migrator::new(
        MigrationOptions {
            mode: RunMode::Migrate,
            commit: true,
            copy_names: false,
        },
        overrides,
    );

    let report = migrator
        .run(&mut registry, &mut RecordingReporter::default())
        .await
        .unwrap();

    assert!(!report.has_unresolved());
    assert!(report.nodes_without_renames.is_empty());
    let motion = report
        .plan
        .entries()
        .find(|e| e.source == "light.motionlight")
        .unwrap();
    assert_eq!(
        motion.resolution,
        Resolution::Manual {
            target: "light.hallway".to_string()
        }
    );
    assert_eq!(
        registry.entity_ids("zwave_js"),
        vec![
            "light.hallway",
            "sensor.attic_humidity",
            "sensor.attic_temperature",
        ]
    );
}

#[tokio::test]
async fn test_copy_names_carries_display_name() {
    let mut registry = MockRegistry::home();
    let migrator = Migrator::new(
        MigrationOptions {
            mode: RunMode::Migrate,
            commit: true,
            copy_names: true,
        },
        OverrideTable::new(),
    );

    migrator
        .run(&mut registry, &mut RecordingReporter::default())
        .await
        .unwrap();

    let (_, _, name) = registry
        .renames
        .iter()
        .find(|(from, _, _)| from == "light.motionlight")
        .unwrap();
    assert_eq!(name.as_deref(), Some("Master Bathroom Light"));

    // Shadow renames never set a name
    assert!(registry
        .renames
        .iter()
        .filter(|(_, to, _)| to.ends_with("_ozwmigration"))
        .all(|(_, _, name)| name.is_none()));
}

#[tokio::test]
async fn test_node_without_counterpart_is_unresolved() {
    let mut registry = MockRegistry::home();
    registry
        .device("zjs-80", "zwave_js", "3672945806-80")
        .entity("switch.new_plug", "zjs-80", "zwave_js", None);

    let report = migrator(RunMode::Migrate, false)
        .run(&mut registry, &mut RecordingReporter::default())
        .await
        .unwrap();

    let node = report.plan.node(&NodeId::from("80")).unwrap();
    assert!(node.counterpart_missing);
    assert_eq!(
        node.entries[0].resolution,
        Resolution::Unresolved { candidates: vec![] }
    );
    assert!(report.nodes_without_renames.contains(&NodeId::from("80")));
}

#[tokio::test]
async fn test_registry_inconsistency_aborts_before_renaming() {
    let mut registry = MockRegistry::home();
    registry.entity("light.orphan", "missing-device", "ozw", None);

    let err = migrator(RunMode::Migrate, true)
        .run(&mut registry, &mut RecordingReporter::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Graph(GraphError::UnknownDevice { ref entity_id, .. }) if entity_id == "light.orphan"
    ));
    assert!(registry.renames.is_empty());
}

#[tokio::test]
async fn test_half_shadowed_node_keeps_both_candidates() {
    let mut registry = MockRegistry::default();
    registry
        .device("ozw-5", "ozw", "1.5.1")
        .device("zjs-5", "zwave_js", "99-5")
        .entity("light.foo_ozwmigration", "ozw-5", "ozw", None)
        .entity("light.foo", "ozw-5", "ozw", None)
        .entity("light.zjs", "zjs-5", "zwave_js", None);

    let report = migrator(RunMode::Migrate, false)
        .run(&mut registry, &mut RecordingReporter::default())
        .await
        .unwrap();

    let entry = report.plan.entries().next().unwrap();
    assert_eq!(entry.source, "light.zjs");
    assert_eq!(
        entry.resolution,
        Resolution::Unresolved {
            candidates: vec![
                "light.foo_ozwmigration".to_string(),
                "light.foo".to_string(),
            ]
        }
    );
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.nodes_without_renames, vec![NodeId::from("5")]);
}
