//! Build configuration: tech level and rule-interpretation policy.
//!
//! Configuration is data, loaded from RON the same way rule tables are.
//!
//! # Example RON
//!
//! ```ron
//! ConstructionConfig(
//!     tech_level: 12,
//!     rules: RulePolicy(
//!         multi_mount_escalation: NoStack,
//!         primitive_brain_skills: false,
//!     ),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConstructionError, Result};

/// Default tech level for new builds.
pub const DEFAULT_TECH_LEVEL: u32 = 12;

/// Whether a multi-mount escalates a weapon that already fires RF/VRF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EscalationStacking {
    /// Weapons that already have RF or VRF are not escalated again.
    #[default]
    NoStack,
    /// Escalation applies on top of existing RF or VRF.
    Stack,
}

/// Switches for rules whose interpretation is left open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RulePolicy {
    /// Multi-mount RF/VRF stacking.
    #[serde(default)]
    pub multi_mount_escalation: EscalationStacking,
    /// Whether Primitive and Basic robot brains may take skill packages.
    #[serde(default)]
    pub primitive_brain_skills: bool,
}

/// Configuration shared by every component of one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructionConfig {
    /// Tech level gating component availability.
    pub tech_level: u32,
    /// Rule-interpretation policy.
    #[serde(default)]
    pub rules: RulePolicy,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TECH_LEVEL)
    }
}

impl ConstructionConfig {
    /// Create a configuration with default rules.
    #[must_use]
    pub const fn new(tech_level: u32) -> Self {
        Self {
            tech_level,
            rules: RulePolicy {
                multi_mount_escalation: EscalationStacking::NoStack,
                primitive_brain_skills: false,
            },
        }
    }

    /// Replace the rule policy (builder pattern).
    #[must_use]
    pub const fn with_rules(mut self, rules: RulePolicy) -> Self {
        self.rules = rules;
        self
    }

    /// Parse a configuration from RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| ConstructionError::Config(e.to_string()))
    }

    /// Load a configuration from a RON file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            ConstructionError::Config(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_ron_str(&source)
    }
}

impl RulePolicy {
    /// Parse a rule policy from RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| ConstructionError::Config(e.to_string()))
    }

    /// Load a rule policy from a RON file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            ConstructionError::Config(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_ron_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = ConstructionConfig::from_ron_str(
            "ConstructionConfig(
                tech_level: 9,
                rules: RulePolicy(
                    multi_mount_escalation: Stack,
                    primitive_brain_skills: true,
                ),
            )",
        )
        .unwrap();
        assert_eq!(config.tech_level, 9);
        assert_eq!(config.rules.multi_mount_escalation, EscalationStacking::Stack);
        assert!(config.rules.primitive_brain_skills);
    }

    #[test]
    fn test_rules_default_when_omitted() {
        let config = ConstructionConfig::from_ron_str("(tech_level: 8)").unwrap();
        assert_eq!(config.rules, RulePolicy::default());
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = ConstructionConfig::from_ron_str("(tech_level: \"high\")").unwrap_err();
        assert!(matches!(err, ConstructionError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.ron");
        std::fs::write(&path, "(primitive_brain_skills: true)").unwrap();
        let rules = RulePolicy::load(&path).unwrap();
        assert!(rules.primitive_brain_skills);
        assert_eq!(rules.multi_mount_escalation, EscalationStacking::NoStack);
    }
}
