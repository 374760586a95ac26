//! Error types for the construction engine.
//!
//! Only construction-invariant violations are errors. Incompatible
//! components are skipped during regeneration and slot or bandwidth
//! overruns become advisory notes, so neither appears here.

use thiserror::Error;

/// Result type alias using [`ConstructionError`].
pub type Result<T> = std::result::Result<T, ConstructionError>;

/// Top-level error type for construction-invariant violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// A component was offered to a stage that does not accept it.
    #[error("Component '{component}' cannot be attached to stage '{stage}'")]
    WrongStage {
        /// Component type name.
        component: String,
        /// Stage name.
        stage: String,
    },

    /// A stage already holds its maximum number of components.
    #[error("Stage '{stage}' already holds its maximum of {max} component(s)")]
    StageFull {
        /// Stage name.
        stage: String,
        /// Maximum component count.
        max: usize,
    },

    /// A stage holds fewer or more components than its bounds allow.
    #[error("Stage '{stage}' holds {count} component(s), expected {min}..={max}")]
    StageCountOutOfBounds {
        /// Stage name.
        stage: String,
        /// Current component count.
        count: usize,
        /// Minimum component count.
        min: usize,
        /// Maximum component count.
        max: usize,
    },

    /// The stage is populated by the engine and cannot be edited.
    #[error("Stage '{0}' is managed by the engine and cannot be edited")]
    InternalStage(String),

    /// The build has no sequence with this index.
    #[error("Unknown sequence: {0}")]
    UnknownSequence(usize),

    /// The build kind only supports a single sequence.
    #[error("Build kind '{0}' supports a single sequence only")]
    SingleSequenceOnly(String),

    /// A build must keep at least one sequence.
    #[error("Cannot remove the last sequence of a build")]
    LastSequence,

    /// A component index does not exist in the stage.
    #[error("Stage '{stage}' has no component at index {index}")]
    ComponentIndexOutOfRange {
        /// Stage name.
        stage: String,
        /// Requested index.
        index: usize,
    },

    /// A component has no option with this id.
    #[error("Component '{component}' has no option '{option}'")]
    UnknownOption {
        /// Component type name.
        component: String,
        /// Requested option id.
        option: String,
    },

    /// An option value is outside its bounds or of the wrong kind.
    #[error("Invalid value for option '{option}': {message}")]
    InvalidOptionValue {
        /// Option id.
        option: String,
        /// Description of the problem.
        message: String,
    },

    /// A modify factor targeted an attribute that was never set.
    #[error("Attribute '{attribute}' is not set and cannot be modified by {modifier}")]
    MissingAttribute {
        /// Attribute name.
        attribute: String,
        /// Description of the modifier that was applied.
        modifier: String,
    },

    /// A modifier was applied to a value of the wrong kind.
    #[error("Attribute '{attribute}' holds {found}, which {modifier} cannot modify")]
    AttributeTypeMismatch {
        /// Attribute name.
        attribute: String,
        /// Kind of value found.
        found: &'static str,
        /// Description of the modifier that was applied.
        modifier: String,
    },

    /// A persisted document is structurally invalid.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A report could not be encoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Configuration could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Config(String),
}
