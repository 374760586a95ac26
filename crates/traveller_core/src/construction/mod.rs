//! The generic construction engine.
//!
//! A build is a fixed, ordered list of stages per sequence. Collaborators
//! attach components to stages; the [`Context`] regenerates the build by
//! replaying every stage in order, letting each compatible component emit
//! [`Step`]s whose factors mutate the attribute map and whose cost
//! modifiers update the running phase totals.
//!
//! There is deliberately no dependency graph: stage order is the only
//! ordering, and components within a stage run in attachment order.
//!
//! - [`attribute`] - attribute values and maps
//! - [`modifier`] - pure value transformations
//! - [`factor`] - set/modify/non-modifying effects
//! - [`step`] - steps, cost modifiers, running totals
//! - [`option`] - editable component options
//! - [`component`] - component, stage and phase contracts
//! - [`stage`] - stage and sequence containers
//! - [`context`] - regeneration and the editing API
//! - [`manifest`] - the read-only phase-sectioned report

pub mod attribute;
pub mod component;
pub mod context;
pub mod factor;
pub mod manifest;
pub mod modifier;
pub mod option;
pub mod stage;
pub mod step;

use std::fmt;
use std::hash::Hash;

use crate::config::ConstructionConfig;

pub use attribute::{AttributeKey, AttributeMap, AttributeValue, DiceRoll, DieType, ScalarValue};
pub use component::{Component, ComponentRef, PhaseKind, StageKind};
pub use context::{BuildCursor, BuildView, Context};
pub use factor::{apply_factor, Factor, FactorOutcome};
pub use manifest::{Manifest, ManifestEntry, ManifestSection};
pub use modifier::{AbsentPolicy, Modifier};
pub use option::{BoundedInt, ComponentOption, OptionBounds, OptionChoice, OptionValue};
pub use stage::{Sequence, Stage};
pub use step::{AppliedStep, CostKind, CostModifier, CostTotals, Step};

/// One build kind's closed set of attributes, phases, stages and components.
///
/// Implemented by zero-sized marker types such as
/// [`crate::gunsmith::Gunsmith`] and [`crate::robots::Robots`].
pub trait ConstructionDomain:
    Sized + Copy + fmt::Debug + PartialEq + Eq + Hash + Default + Send + Sync + 'static
{
    /// Attribute keys.
    type Attribute: AttributeKey;
    /// Reporting phases.
    type Phase: PhaseKind;
    /// Pipeline stages.
    type Stage: StageKind<Phase = Self::Phase>;
    /// Every concrete component, as one closed enum.
    type Component: Component<Self>;

    /// Build kind identifier stored in documents (`"weapon"`, `"robot"`).
    const KIND: &'static str;

    /// Whether builds may hold more than one sequence.
    const MULTI_SEQUENCE: bool;

    /// Stages of one sequence, in regeneration order.
    fn stage_layout() -> &'static [Self::Stage];

    /// Components every new sequence starts with, engine-owned ones included.
    fn initial_components(config: &ConstructionConfig) -> Vec<(Self::Stage, Self::Component)>;
}
