//! Component, stage and phase contracts.

use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

use super::context::{BuildCursor, BuildView};
use super::option::{unknown_option, ComponentOption, OptionValue};
use super::ConstructionDomain;

/// A reporting group of one or more stages.
pub trait PhaseKind:
    Copy + Eq + Ord + Hash + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Display name.
    fn name(self) -> &'static str;
}

/// A typed slot in the fixed construction pipeline.
pub trait StageKind:
    Copy + Eq + Ord + Hash + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Phase this stage reports under.
    type Phase: PhaseKind;

    /// Display name.
    fn name(self) -> &'static str;

    /// Phase this stage reports under.
    fn phase(self) -> Self::Phase;

    /// Minimum number of attached components for a valid build.
    fn min_components(self) -> usize;

    /// Maximum number of attached components.
    fn max_components(self) -> usize;

    /// Engine-owned stages hold components collaborators cannot edit.
    fn is_internal(self) -> bool {
        false
    }
}

/// Identity of one attached component: sequence, stage and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentRef<D: ConstructionDomain> {
    /// Sequence index.
    pub sequence: usize,
    /// Stage holding the component.
    pub stage: D::Stage,
    /// Position in the stage's attachment order.
    pub index: usize,
}

impl<D: ConstructionDomain> ComponentRef<D> {
    /// Create a reference.
    #[must_use]
    pub const fn new(sequence: usize, stage: D::Stage, index: usize) -> Self {
        Self {
            sequence,
            stage,
            index,
        }
    }
}

/// A unit of construction that can be attached to a stage.
///
/// Every callback receives the sequence it is being evaluated for and an
/// explicit view of the build. Implementations must not keep state between
/// calls other than their own options.
pub trait Component<D: ConstructionDomain>:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The one stage kind that accepts this component.
    fn stage(&self) -> D::Stage;

    /// Type name, e.g. `"Single Shot Mechanism"`.
    fn type_name(&self) -> &'static str;

    /// Instance name including distinguishing options.
    fn instance_name(&self) -> String {
        self.type_name().to_string()
    }

    /// Check whether this component can contribute to the build.
    ///
    /// Must be pure: it is called speculatively for components that are not
    /// attached, and repeatedly for those that are.
    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, D>) -> bool;

    /// Editable options with their current bounds.
    fn options(&self) -> Vec<ComponentOption> {
        Vec::new()
    }

    /// Set an option value.
    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        let _ = value;
        Err(unknown_option(self.type_name(), id))
    }

    /// Recompute option bounds against the current build, clamping values.
    fn update_options(&mut self, sequence: usize, context: &BuildView<'_, D>) {
        let _ = (sequence, context);
    }

    /// Compute steps and apply them through the cursor.
    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, D>) -> Result<()>;
}

/// Declare a domain's closed component enum.
///
/// Generates the enum with serde derives, a `From` impl per variant and a
/// [`Component`] impl that dispatches to each variant's own implementation.
macro_rules! component_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident for $domain:ty {
            $( $(#[$vmeta:meta])* $variant:ident($ty:ty), )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant($ty), )+
        }

        $(
            impl From<$ty> for $name {
                fn from(component: $ty) -> Self {
                    Self::$variant(component)
                }
            }
        )+

        impl $crate::construction::Component<$domain> for $name {
            fn stage(&self) -> <$domain as $crate::construction::ConstructionDomain>::Stage {
                match self {
                    $( Self::$variant(c) => <$ty as $crate::construction::Component<$domain>>::stage(c), )+
                }
            }

            fn type_name(&self) -> &'static str {
                match self {
                    $( Self::$variant(c) => <$ty as $crate::construction::Component<$domain>>::type_name(c), )+
                }
            }

            fn instance_name(&self) -> String {
                match self {
                    $( Self::$variant(c) => <$ty as $crate::construction::Component<$domain>>::instance_name(c), )+
                }
            }

            fn is_compatible(
                &self,
                sequence: usize,
                context: &$crate::construction::BuildView<'_, $domain>,
            ) -> bool {
                match self {
                    $( Self::$variant(c) => <$ty as $crate::construction::Component<$domain>>::is_compatible(c, sequence, context), )+
                }
            }

            fn options(&self) -> Vec<$crate::construction::ComponentOption> {
                match self {
                    $( Self::$variant(c) => <$ty as $crate::construction::Component<$domain>>::options(c), )+
                }
            }

            fn set_option(
                &mut self,
                id: &str,
                value: &$crate::construction::OptionValue,
            ) -> $crate::error::Result<()> {
                match self {
                    $( Self::$variant(c) => <$ty as $crate::construction::Component<$domain>>::set_option(c, id, value), )+
                }
            }

            fn update_options(
                &mut self,
                sequence: usize,
                context: &$crate::construction::BuildView<'_, $domain>,
            ) {
                match self {
                    $( Self::$variant(c) => <$ty as $crate::construction::Component<$domain>>::update_options(c, sequence, context), )+
                }
            }

            fn create_steps(
                &self,
                sequence: usize,
                context: &mut $crate::construction::BuildCursor<'_, $domain>,
            ) -> $crate::error::Result<()> {
                match self {
                    $( Self::$variant(c) => <$ty as $crate::construction::Component<$domain>>::create_steps(c, sequence, context), )+
                }
            }
        }
    };
}

pub(crate) use component_enum;
