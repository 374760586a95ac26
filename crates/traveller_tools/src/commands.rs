//! Store inspection commands.
//!
//! A store directory keeps weapons under `weapons/` and robots under
//! `robots/`, one JSON document per build.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use traveller_core::config::{ConstructionConfig, RulePolicy};
use traveller_core::construction::{Component, ComponentRef, ConstructionDomain, StageKind};
use traveller_core::error::ConstructionError;
use traveller_core::persist::{Construct, Robot, Weapon};
use traveller_core::store::{ObjectMetadata, ObjectStore, StoreError};

/// Subdirectory holding weapon documents.
pub const WEAPONS_DIR: &str = "weapons";

/// Subdirectory holding robot documents.
pub const ROBOTS_DIR: &str = "robots";

/// Tool failures.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The store could not be opened or an object could not be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A rule file could not be loaded.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// One problem found in one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Build kind.
    pub kind: &'static str,
    /// Object id.
    pub id: String,
    /// Description.
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.id, self.message)
    }
}

/// Outcome of validating a store directory.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Objects that loaded and regenerated.
    pub checked: usize,
    /// Objects that could not be loaded or regenerated, or break stage
    /// bounds.
    pub failures: Vec<Finding>,
    /// Advisory problems: skipped components and overrun warnings.
    pub warnings: Vec<Finding>,
}

impl ValidationReport {
    /// Check if no object failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

fn weapons_dir(dir: &Path) -> PathBuf {
    dir.join(WEAPONS_DIR)
}

fn robots_dir(dir: &Path) -> PathBuf {
    dir.join(ROBOTS_DIR)
}

/// Load a rule policy to apply in place of the one stored with each build.
pub fn load_rules(path: &Path) -> Result<RulePolicy> {
    Ok(RulePolicy::load(path)?)
}

/// Load every weapon and robot under `dir` and report what fails.
///
/// With `rules`, every loaded build is regenerated under that policy
/// before it is checked.
pub fn validate_directory(dir: &Path, rules: Option<RulePolicy>) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();
    check_store(&ObjectStore::<Weapon>::open(weapons_dir(dir))?, rules, &mut report);
    check_store(&ObjectStore::<Robot>::open(robots_dir(dir))?, rules, &mut report);
    info!(
        dir = %dir.display(),
        checked = report.checked,
        failures = report.failures.len(),
        warnings = report.warnings.len(),
        "Validation complete"
    );
    Ok(report)
}

fn check_store<D: ConstructionDomain>(
    store: &ObjectStore<Construct<D>>,
    rules: Option<RulePolicy>,
    report: &mut ValidationReport,
) {
    let finding = |id: &str, message: String| Finding {
        kind: D::KIND,
        id: id.to_string(),
        message,
    };

    let batch = store.load_all();
    for (id, err) in &batch.failures {
        report.failures.push(finding(id, err.to_string()));
    }

    for mut construct in batch.loaded {
        if let Some(rules) = rules {
            let config = ConstructionConfig {
                rules,
                ..*construct.context().config()
            };
            if let Err(err) = construct.context_mut().set_config(config) {
                report.failures.push(finding(construct.id(), err.to_string()));
                continue;
            }
        }
        report.checked += 1;
        debug!(kind = D::KIND, id = construct.id(), "Checked object");

        if let Err(err) = construct.context().validate() {
            report.failures.push(finding(construct.id(), err.to_string()));
        }
        for message in advisories(&construct) {
            report.warnings.push(finding(construct.id(), message));
        }
    }
}

/// Skipped components and overrun warnings of one loaded build.
fn advisories<D: ConstructionDomain>(construct: &Construct<D>) -> Vec<String> {
    let context = construct.context();
    let mut messages = Vec::new();

    for (sequence, stored) in context.sequences().iter().enumerate() {
        for stage in stored.stages() {
            if stage.kind().is_internal() {
                continue;
            }
            for (index, component) in stage.components().iter().enumerate() {
                let reference = ComponentRef::new(sequence, stage.kind(), index);
                if context.steps_for_component(reference).next().is_none() {
                    messages.push(format!(
                        "'{}' in {} is not compatible and was skipped",
                        component.instance_name(),
                        stage.kind().name()
                    ));
                }
            }
        }
    }

    messages.extend(
        construct
            .manifest()
            .notes()
            .filter(|note| note.starts_with("Warning"))
            .map(str::to_string),
    );

    if !messages.is_empty() {
        warn!(
            kind = D::KIND,
            id = construct.id(),
            advisories = messages.len(),
            "Build has advisories"
        );
    }
    messages
}

/// Metadata of every weapon, then every robot, under `dir`.
pub fn list_directory(dir: &Path) -> Result<Vec<ObjectMetadata>> {
    let mut objects = ObjectStore::<Weapon>::open(weapons_dir(dir))?.list();
    objects.extend(ObjectStore::<Robot>::open(robots_dir(dir))?.list());
    Ok(objects)
}

fn render<D: ConstructionDomain>(construct: &Construct<D>) -> String {
    let mut text = format!(
        "{} ({})\n{}",
        construct.name(),
        construct.id(),
        construct.manifest()
    );
    let notes = construct.context().construction_notes();
    if !notes.is_empty() {
        text.push_str("\n\nConstruction notes:");
        for note in notes {
            text.push_str("\n  ");
            text.push_str(&note);
        }
    }
    text
}

/// Load one weapon or robot and render its manifest and construction
/// notes as text.
pub fn render_manifest(dir: &Path, id: &str) -> Result<String> {
    let weapons = ObjectStore::<Weapon>::open(weapons_dir(dir))?;
    if weapons.metadata(id).is_some() {
        return Ok(render(&weapons.load(id)?));
    }
    let robots = ObjectStore::<Robot>::open(robots_dir(dir))?;
    Ok(render(&robots.load(id)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use traveller_core::config::EscalationStacking;
    use traveller_test_utils::fixtures;

    fn populated_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let weapons = ObjectStore::<Weapon>::open(weapons_dir(dir.path())).unwrap();
        weapons
            .save(&Weapon::from_context("Rifle", fixtures::assault_rifle()))
            .unwrap();
        let robots = ObjectStore::<Robot>::open(robots_dir(dir.path())).unwrap();
        robots
            .save(&Robot::from_context("Worker", fixtures::utility_robot()))
            .unwrap();
        dir
    }

    #[test]
    fn test_validate_clean_directory() {
        let dir = populated_dir();
        let report = validate_directory(dir.path(), None).unwrap();
        assert_eq!(report.checked, 2);
        assert!(report.is_success(), "{:?}", report.failures);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn test_validate_reports_broken_document() {
        let dir = populated_dir();
        fs::write(weapons_dir(dir.path()).join("broken.json"), "{ not json").unwrap();
        let report = validate_directory(dir.path(), None).unwrap();
        assert_eq!(report.checked, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "broken");
        assert_eq!(report.failures[0].kind, "weapon");
    }

    #[test]
    fn test_validate_reports_misplaced_robot() {
        let dir = populated_dir();
        let weapons = ObjectStore::<Robot>::open(weapons_dir(dir.path())).unwrap();
        weapons
            .save(&Robot::from_context("Stray", fixtures::utility_robot()))
            .unwrap();
        let report = validate_directory(dir.path(), None).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.contains("robot"));
    }

    #[test]
    fn test_draft_loads_but_fails_validation() {
        let dir = populated_dir();
        let weapons = ObjectStore::<Weapon>::open(weapons_dir(dir.path())).unwrap();
        let draft = Weapon::new("Draft", ConstructionConfig::default()).unwrap();
        weapons.save(&draft).unwrap();

        let report = validate_directory(dir.path(), None).unwrap();
        assert_eq!(report.checked, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, draft.id());
        assert!(report.failures[0].message.contains("Receiver"));
    }

    #[test]
    fn test_overrun_is_reported_as_warning() {
        let dir = tempfile::tempdir().unwrap();
        let robots = ObjectStore::<Robot>::open(robots_dir(dir.path())).unwrap();
        robots
            .save(&Robot::from_context("Crate", fixtures::overloaded_robot()))
            .unwrap();

        let report = validate_directory(dir.path(), None).unwrap();
        assert!(report.is_success());
        assert!(report
            .warnings
            .iter()
            .any(|w| w.message.contains("exceeds the maximum of 2")));
    }

    #[test]
    fn test_rule_override_is_applied() {
        let dir = populated_dir();
        let rules_path = dir.path().join("rules.ron");
        fs::write(
            &rules_path,
            "RulePolicy(multi_mount_escalation: Stack, primitive_brain_skills: true)",
        )
        .unwrap();
        let rules = load_rules(&rules_path).unwrap();
        assert_eq!(rules.multi_mount_escalation, EscalationStacking::Stack);

        let report = validate_directory(dir.path(), Some(rules)).unwrap();
        assert_eq!(report.checked, 2);
        assert!(report.is_success());
    }

    #[test]
    fn test_missing_rule_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rules(&dir.path().join("absent.ron")).unwrap_err();
        assert!(matches!(err, ToolError::Construction(ConstructionError::Config(_))));
    }

    #[test]
    fn test_list_and_render() {
        let dir = populated_dir();
        let listed = list_directory(dir.path()).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].kind, "weapon");
        assert_eq!(listed[1].kind, "robot");

        let text = render_manifest(dir.path(), &listed[1].id).unwrap();
        assert!(text.starts_with("Worker"));
        assert!(text.contains("robot manifest"));
        assert!(text.contains("Uses 6 of 12 slots"));
        assert!(text.contains("Construction notes:"));
    }

    #[test]
    fn test_render_unknown_id() {
        let dir = populated_dir();
        let err = render_manifest(dir.path(), "missing").unwrap_err();
        assert!(matches!(err, ToolError::Store(StoreError::UnknownId(_))));
    }
}
