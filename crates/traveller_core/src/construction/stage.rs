//! Stage and sequence containers.

use crate::error::{ConstructionError, Result};

use super::component::{Component, StageKind};
use super::ConstructionDomain;

/// A slot in the pipeline and the components attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage<D: ConstructionDomain> {
    kind: D::Stage,
    components: Vec<D::Component>,
}

impl<D: ConstructionDomain> Stage<D> {
    /// Create an empty stage.
    #[must_use]
    pub fn new(kind: D::Stage) -> Self {
        Self {
            kind,
            components: Vec::new(),
        }
    }

    /// Stage kind.
    #[must_use]
    pub fn kind(&self) -> D::Stage {
        self.kind
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Phase the stage reports under.
    #[must_use]
    pub fn phase(&self) -> D::Phase {
        self.kind.phase()
    }

    /// Attached components in attachment order.
    #[must_use]
    pub fn components(&self) -> &[D::Component] {
        &self.components
    }

    /// Number of attached components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Check if the stage accepts this component.
    #[must_use]
    pub fn accepts(&self, component: &D::Component) -> bool {
        component.stage() == self.kind
    }

    /// Check if the stage is at its maximum.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.components.len() >= self.kind.max_components()
    }

    /// Check the component count against the stage bounds.
    pub fn check_bounds(&self) -> Result<()> {
        let count = self.components.len();
        let (min, max) = (self.kind.min_components(), self.kind.max_components());
        if count < min || count > max {
            return Err(ConstructionError::StageCountOutOfBounds {
                stage: self.name().to_string(),
                count,
                min,
                max,
            });
        }
        Ok(())
    }

    /// Error unless the component belongs to this stage.
    pub(crate) fn ensure_accepts(&self, component: &D::Component) -> Result<()> {
        if self.accepts(component) {
            Ok(())
        } else {
            Err(ConstructionError::WrongStage {
                component: component.type_name().to_string(),
                stage: self.name().to_string(),
            })
        }
    }

    pub(crate) fn component_mut(&mut self, index: usize) -> Result<&mut D::Component> {
        let stage = self.name();
        self.components
            .get_mut(index)
            .ok_or_else(|| ConstructionError::ComponentIndexOutOfRange {
                stage: stage.to_string(),
                index,
            })
    }

    pub(crate) fn insert(&mut self, index: usize, component: D::Component) -> Result<()> {
        self.ensure_accepts(&component)?;
        if self.is_full() {
            return Err(ConstructionError::StageFull {
                stage: self.name().to_string(),
                max: self.kind.max_components(),
            });
        }
        if index > self.components.len() {
            return Err(self.out_of_range(index));
        }
        self.components.insert(index, component);
        Ok(())
    }

    pub(crate) fn push(&mut self, component: D::Component) -> Result<()> {
        self.insert(self.components.len(), component)
    }

    pub(crate) fn remove(&mut self, index: usize) -> Result<D::Component> {
        if index >= self.components.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.components.remove(index))
    }

    pub(crate) fn replace(&mut self, index: usize, component: D::Component) -> Result<D::Component> {
        self.ensure_accepts(&component)?;
        let slot = self.component_mut(index)?;
        Ok(std::mem::replace(slot, component))
    }

    pub(crate) fn out_of_range(&self, index: usize) -> ConstructionError {
        ConstructionError::ComponentIndexOutOfRange {
            stage: self.name().to_string(),
            index,
        }
    }
}

/// One independently tracked buildable unit: the full stage list.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence<D: ConstructionDomain> {
    stages: Vec<Stage<D>>,
}

impl<D: ConstructionDomain> Default for Sequence<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ConstructionDomain> Sequence<D> {
    /// Create a sequence with every stage of the domain's layout, empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: D::stage_layout().iter().map(|kind| Stage::new(*kind)).collect(),
        }
    }

    /// Stages in regeneration order.
    #[must_use]
    pub fn stages(&self) -> &[Stage<D>] {
        &self.stages
    }

    /// Find a stage by kind.
    #[must_use]
    pub fn stage(&self, kind: D::Stage) -> Option<&Stage<D>> {
        self.stages.iter().find(|s| s.kind == kind)
    }

    pub(crate) fn stage_mut(&mut self, kind: D::Stage) -> Result<&mut Stage<D>> {
        self.stages
            .iter_mut()
            .find(|s| s.kind == kind)
            .ok_or_else(|| ConstructionError::WrongStage {
                component: String::from("<any>"),
                stage: kind.name().to_string(),
            })
    }

    /// Every attached component, in stage then attachment order.
    pub fn components(&self) -> impl Iterator<Item = &D::Component> {
        self.stages.iter().flat_map(|s| s.components.iter())
    }

    /// Check every stage's component count.
    pub fn check_bounds(&self) -> Result<()> {
        self.stages.iter().try_for_each(Stage::check_bounds)
    }
}
