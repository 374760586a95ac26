//! # Traveller Core
//!
//! Rule-driven construction engine for Traveller equipment.
//!
//! This crate contains **only** deterministic construction logic:
//! - No UI
//! - No network
//! - No floating-point math (uses fixed-point)
//!
//! Builds are composed by attaching components to a fixed, ordered list of
//! stages. Every edit replays the stages from the start, so the derived
//! attributes, running totals and manifest are always a pure function of
//! the attached components, their options and the configuration.
//!
//! ## Crate Structure
//!
//! - [`construction`] - The generic engine: attributes, factors, steps, stages, context
//! - [`gunsmith`] - Firearm rules
//! - [`robots`] - Robot rules
//! - [`persist`] - Named, documented builds
//! - [`store`] - Thread-safe object store for persisted builds
//! - [`config`] - Tech level and rule-interpretation policy
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod construction;
pub mod error;
pub mod gunsmith;
pub mod math;
pub mod persist;
pub mod robots;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConstructionConfig, EscalationStacking, RulePolicy};
    pub use crate::construction::{
        AttributeValue, Component, ComponentRef, ConstructionDomain, Context, CostKind,
        CostTotals, DiceRoll, Manifest, OptionValue, Step,
    };
    pub use crate::error::{ConstructionError, Result};
    pub use crate::gunsmith::{Gunsmith, WeaponAttribute, WeaponComponent, WeaponStage};
    pub use crate::math::Fixed;
    pub use crate::persist::{BuildDocument, Construct, Robot, Storable, Weapon};
    pub use crate::robots::{RobotAttribute, RobotComponent, RobotStage, Robots};
    pub use crate::store::{BatchLoad, ObjectStore, StoreError};
}
