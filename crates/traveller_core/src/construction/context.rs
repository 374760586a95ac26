//! The mutable per-build state and its regeneration algorithm.
//!
//! # Regeneration
//!
//! 1. Start from empty attribute maps, totals and step log.
//! 2. For each sequence, for each stage in static order, for each attached
//!    component in attachment order: skip it if it is not compatible,
//!    otherwise recompute its option bounds and let it create steps. Each
//!    step is applied immediately, so later components read the effects of
//!    earlier ones.
//! 3. Commit the new state only if every component succeeded. A failed
//!    regeneration leaves the context exactly as it was.
//!
//! Regeneration is single-threaded and runs to completion; callers
//! serialize edits to a given context.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::config::{ConstructionConfig, RulePolicy};
use crate::error::{ConstructionError, Result};
use crate::math::Fixed;

use super::attribute::{AttributeMap, AttributeValue, DiceRoll};
use super::component::{Component, ComponentRef, PhaseKind, StageKind};
use super::factor::{apply_factor, describe_factor};
use super::manifest::Manifest;
use super::option::OptionValue;
use super::stage::{Sequence, Stage};
use super::step::{AppliedStep, CostTotals, Step};
use super::ConstructionDomain;

/// Derived values of one sequence.
#[derive(Debug, Clone, PartialEq)]
struct SequenceState<D: ConstructionDomain> {
    attributes: AttributeMap<D::Attribute>,
    phase_totals: BTreeMap<D::Phase, CostTotals>,
}

impl<D: ConstructionDomain> SequenceState<D> {
    fn new() -> Self {
        Self {
            attributes: AttributeMap::new(),
            phase_totals: BTreeMap::new(),
        }
    }
}

/// Everything a regeneration derives: attributes, totals and the step log.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BuildState<D: ConstructionDomain> {
    sequences: Vec<SequenceState<D>>,
    log: Vec<AppliedStep<D>>,
}

impl<D: ConstructionDomain> BuildState<D> {
    fn new(sequence_count: usize) -> Self {
        Self {
            sequences: (0..sequence_count).map(|_| SequenceState::new()).collect(),
            log: Vec::new(),
        }
    }
}

/// Read-only view of a build during or after regeneration.
///
/// While a component is being evaluated the view knows its position, so
/// [`BuildView::has_component_before`] can tell an earlier copy from the
/// component itself.
pub struct BuildView<'a, D: ConstructionDomain> {
    config: &'a ConstructionConfig,
    sequences: &'a [Sequence<D>],
    state: &'a BuildState<D>,
    position: Option<ComponentRef<D>>,
}

impl<D: ConstructionDomain> Clone for BuildView<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: ConstructionDomain> Copy for BuildView<'_, D> {}

impl<'a, D: ConstructionDomain> BuildView<'a, D> {
    fn new(
        config: &'a ConstructionConfig,
        sequences: &'a [Sequence<D>],
        state: &'a BuildState<D>,
    ) -> Self {
        Self {
            config,
            sequences,
            state,
            position: None,
        }
    }

    fn at(self, position: ComponentRef<D>) -> Self {
        Self {
            position: Some(position),
            ..self
        }
    }

    /// Build configuration.
    #[must_use]
    pub fn config(&self) -> &'a ConstructionConfig {
        self.config
    }

    /// Tech level of the build.
    #[must_use]
    pub fn tech_level(&self) -> u32 {
        self.config.tech_level
    }

    /// Rule-interpretation policy.
    #[must_use]
    pub fn rules(&self) -> &'a RulePolicy {
        &self.config.rules
    }

    /// Number of sequences.
    #[must_use]
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Attribute map of a sequence as derived so far.
    #[must_use]
    pub fn attributes(&self, sequence: usize) -> Option<&'a AttributeMap<D::Attribute>> {
        self.state.sequences.get(sequence).map(|s| &s.attributes)
    }

    /// Current value of an attribute.
    #[must_use]
    pub fn attribute(&self, sequence: usize, attribute: D::Attribute) -> Option<&'a AttributeValue> {
        self.attributes(sequence).and_then(|a| a.get(attribute))
    }

    /// Check if an attribute is set.
    #[must_use]
    pub fn has_attribute(&self, sequence: usize, attribute: D::Attribute) -> bool {
        self.attribute(sequence, attribute).is_some()
    }

    /// Current scalar value of an attribute.
    #[must_use]
    pub fn scalar(&self, sequence: usize, attribute: D::Attribute) -> Option<Fixed> {
        self.attribute(sequence, attribute)
            .and_then(AttributeValue::as_scalar)
    }

    /// Current dice expression of an attribute.
    #[must_use]
    pub fn dice(&self, sequence: usize, attribute: D::Attribute) -> Option<&'a DiceRoll> {
        self.attribute(sequence, attribute)
            .and_then(AttributeValue::as_dice)
    }

    /// Current flag value of an attribute.
    #[must_use]
    pub fn flag(&self, sequence: usize, attribute: D::Attribute) -> Option<&'a str> {
        self.attribute(sequence, attribute)
            .and_then(AttributeValue::as_enum)
    }

    /// Every component attached to a sequence, in stage then attachment order.
    pub fn components(&self, sequence: usize) -> impl Iterator<Item = &'a D::Component> {
        self.sequences
            .get(sequence)
            .into_iter()
            .flat_map(Sequence::components)
    }

    /// Check if any attached component of the sequence matches.
    pub fn has_component(&self, sequence: usize, predicate: impl Fn(&D::Component) -> bool) -> bool {
        self.components(sequence).any(|c| predicate(c))
    }

    /// Components of a sequence attached ahead of the one being evaluated,
    /// in stage then attachment order. Outside an evaluation, or for another
    /// sequence, this is every component.
    pub fn components_before(&self, sequence: usize) -> impl Iterator<Item = &'a D::Component> {
        let stages = self.sequences.get(sequence).map_or(&[][..], Sequence::stages);
        let cutoff = self
            .position
            .filter(|p| p.sequence == sequence)
            .and_then(|p| {
                let at = stages.iter().position(|s| s.kind() == p.stage)?;
                Some((at, p.index))
            });
        stages.iter().enumerate().flat_map(move |(i, stage)| {
            let take = match cutoff {
                Some((at, index)) if i == at => index,
                Some((at, _)) if i > at => 0,
                _ => stage.len(),
            };
            stage.components().iter().take(take)
        })
    }

    /// Check if a component attached ahead of the one being evaluated
    /// matches. Used to refuse a second copy of a component that must not
    /// stack.
    pub fn has_component_before(
        &self,
        sequence: usize,
        predicate: impl Fn(&D::Component) -> bool,
    ) -> bool {
        self.components_before(sequence).any(|c| predicate(c))
    }

    /// Count attached components of the sequence that match.
    pub fn count_components(
        &self,
        sequence: usize,
        predicate: impl Fn(&D::Component) -> bool,
    ) -> usize {
        self.components(sequence).filter(|c| predicate(c)).count()
    }

    /// First value extracted from an attached component of the sequence.
    pub fn find_component<T>(
        &self,
        sequence: usize,
        extract: impl FnMut(&'a D::Component) -> Option<T>,
    ) -> Option<T> {
        self.components(sequence).find_map(extract)
    }

    /// Running totals of one phase of a sequence.
    #[must_use]
    pub fn phase_totals(&self, sequence: usize, phase: D::Phase) -> CostTotals {
        self.state
            .sequences
            .get(sequence)
            .and_then(|s| s.phase_totals.get(&phase))
            .copied()
            .unwrap_or_default()
    }

    /// Running totals of a sequence across all phases.
    #[must_use]
    pub fn sequence_totals(&self, sequence: usize) -> CostTotals {
        self.state
            .sequences
            .get(sequence)
            .map(|s| {
                s.phase_totals
                    .values()
                    .fold(CostTotals::ZERO, |acc, t| acc.combined(t))
            })
            .unwrap_or_default()
    }

    /// Steps applied so far.
    #[must_use]
    pub fn steps(&self) -> &'a [AppliedStep<D>] {
        &self.state.log
    }
}

/// Handle through which a component applies its steps.
pub struct BuildCursor<'a, D: ConstructionDomain> {
    config: &'a ConstructionConfig,
    sequences: &'a [Sequence<D>],
    state: &'a mut BuildState<D>,
    component: ComponentRef<D>,
    component_name: String,
}

impl<'a, D: ConstructionDomain> BuildCursor<'a, D> {
    fn new(
        config: &'a ConstructionConfig,
        sequences: &'a [Sequence<D>],
        state: &'a mut BuildState<D>,
        component: ComponentRef<D>,
        component_name: String,
    ) -> Self {
        Self {
            config,
            sequences,
            state,
            component,
            component_name,
        }
    }

    /// Read-only view of the build including steps applied so far.
    #[must_use]
    pub fn view(&self) -> BuildView<'_, D> {
        BuildView::new(self.config, self.sequences, self.state).at(self.component)
    }

    /// The component the cursor applies steps for.
    #[must_use]
    pub fn component(&self) -> ComponentRef<D> {
        self.component
    }

    /// Phase the component's steps are accounted in.
    #[must_use]
    pub fn phase(&self) -> D::Phase {
        self.component.stage.phase()
    }

    /// Apply a step: run its factors in order, update the phase totals and
    /// record it in the log.
    pub fn apply_step(&mut self, step: Step<D::Attribute>) -> Result<()> {
        let phase = self.phase();
        let sequence = self
            .state
            .sequences
            .get_mut(self.component.sequence)
            .ok_or(ConstructionError::UnknownSequence(self.component.sequence))?;

        let mut factors = Vec::with_capacity(step.factors.len());
        for factor in &step.factors {
            let outcome = apply_factor(&mut sequence.attributes, factor)?;
            factors.push(describe_factor(factor, &outcome));
        }

        let totals = sequence.phase_totals.entry(phase).or_default();
        let mut cost_deltas = BTreeMap::new();
        for (kind, modifier) in &step.costs {
            let delta = modifier.delta(totals.get(*kind));
            totals.add(*kind, delta);
            cost_deltas.insert(*kind, delta);
        }

        trace!(
            component = %self.component_name,
            step = %step.name,
            phase = phase.name(),
            factors = factors.len(),
            "Applied step"
        );

        self.state.log.push(AppliedStep {
            component: self.component,
            component_name: self.component_name.clone(),
            phase,
            name: step.name,
            cost_deltas,
            factors,
            notes: step.notes,
        });
        Ok(())
    }
}

/// Replay every stage and return the derived state.
///
/// Option updates are written into `sequences`. When `stop` is given the
/// replay ends just before that stage of that sequence.
fn run_pipeline<D: ConstructionDomain>(
    config: &ConstructionConfig,
    sequences: &mut [Sequence<D>],
    stop: Option<(usize, D::Stage)>,
) -> Result<BuildState<D>> {
    let mut state = BuildState::new(sequences.len());

    for sequence in 0..sequences.len() {
        for stage_index in 0..sequences[sequence].stages().len() {
            let stage = sequences[sequence].stages()[stage_index].kind();
            if stop == Some((sequence, stage)) {
                return Ok(state);
            }

            for index in 0..sequences[sequence].stages()[stage_index].len() {
                let mut component = sequences[sequence].stages()[stage_index].components()[index].clone();
                {
                    let view = BuildView::new(config, sequences, &state)
                        .at(ComponentRef::new(sequence, stage, index));
                    if !component.is_compatible(sequence, &view) {
                        debug!(
                            sequence,
                            stage = stage.name(),
                            component = component.type_name(),
                            "Skipping incompatible component"
                        );
                        continue;
                    }
                    component.update_options(sequence, &view);
                }
                *sequences[sequence].stage_mut(stage)?.component_mut(index)? = component;

                let component = &sequences[sequence].stages()[stage_index].components()[index];
                let mut cursor = BuildCursor::new(
                    config,
                    sequences,
                    &mut state,
                    ComponentRef::new(sequence, stage, index),
                    component.instance_name(),
                );
                component.create_steps(sequence, &mut cursor)?;
            }
        }
    }

    Ok(state)
}

/// A build under construction: configuration, stages and derived state.
#[derive(Debug, Clone, PartialEq)]
pub struct Context<D: ConstructionDomain> {
    config: ConstructionConfig,
    sequences: Vec<Sequence<D>>,
    state: BuildState<D>,
}

impl<D: ConstructionDomain> Context<D> {
    /// Create a build with one sequence holding the domain's initial
    /// components, regenerated.
    pub fn new(config: ConstructionConfig) -> Result<Self> {
        let mut context = Self {
            config,
            sequences: Vec::new(),
            state: BuildState::new(0),
        };
        context.sequences.push(context.initial_sequence()?);
        context.regenerate()?;
        Ok(context)
    }

    /// Rebuild a context from stored sequences, validating stage membership
    /// before regenerating.
    ///
    /// Stage maximums are enforced as components are pushed. Minimums are
    /// not: a draft saved before its required components were attached must
    /// load again, and [`Context::validate`] reports what it still lacks.
    pub(crate) fn from_sequences(
        config: ConstructionConfig,
        sequences: Vec<Sequence<D>>,
    ) -> Result<Self> {
        if sequences.is_empty() {
            return Err(ConstructionError::InvalidDocument(
                "a build needs at least one sequence".to_string(),
            ));
        }
        if sequences.len() > 1 && !D::MULTI_SEQUENCE {
            return Err(ConstructionError::SingleSequenceOnly(D::KIND.to_string()));
        }
        for sequence in &sequences {
            for stage in sequence.stages() {
                for component in stage.components() {
                    stage.ensure_accepts(component)?;
                }
            }
        }
        let mut context = Self {
            config,
            state: BuildState::new(sequences.len()),
            sequences,
        };
        context.regenerate()?;
        Ok(context)
    }

    fn initial_sequence(&self) -> Result<Sequence<D>> {
        let mut sequence = Sequence::new();
        for (stage, component) in D::initial_components(&self.config) {
            sequence.stage_mut(stage)?.push(component)?;
        }
        Ok(sequence)
    }

    // ========================================================================
    // Regeneration
    // ========================================================================

    /// Replay every stage from scratch.
    ///
    /// On error the context is unchanged.
    pub fn regenerate(&mut self) -> Result<()> {
        let mut sequences = self.sequences.clone();
        let state = run_pipeline(&self.config, &mut sequences, None)?;
        debug!(
            kind = D::KIND,
            sequences = sequences.len(),
            steps = state.log.len(),
            "Regenerated build"
        );
        self.sequences = sequences;
        self.state = state;
        Ok(())
    }

    /// Replay stages up to, but not including, `stage` of `sequence`.
    ///
    /// Used for "stop early" previews. The derived state stays partial until
    /// the next full [`Context::regenerate`].
    pub fn regenerate_until(&mut self, sequence: usize, stage: D::Stage) -> Result<()> {
        self.ensure_sequence(sequence)?;
        let mut sequences = self.sequences.clone();
        let state = run_pipeline(&self.config, &mut sequences, Some((sequence, stage)))?;
        self.sequences = sequences;
        self.state = state;
        Ok(())
    }

    /// Run an edit against the stages, regenerating if asked. The edit is
    /// rolled back if it or the regeneration fails.
    fn edit<T>(
        &mut self,
        regenerate: bool,
        apply: impl FnOnce(&mut Vec<Sequence<D>>) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self.sequences.clone();
        let value = match apply(&mut self.sequences) {
            Ok(value) => value,
            Err(err) => {
                self.sequences = snapshot;
                return Err(err);
            }
        };
        if regenerate {
            if let Err(err) = self.regenerate() {
                self.sequences = snapshot;
                return Err(err);
            }
        }
        Ok(value)
    }

    fn ensure_sequence(&self, sequence: usize) -> Result<()> {
        if sequence < self.sequences.len() {
            Ok(())
        } else {
            Err(ConstructionError::UnknownSequence(sequence))
        }
    }

    fn editable_stage(
        sequences: &mut [Sequence<D>],
        sequence: usize,
        stage: D::Stage,
    ) -> Result<&mut Stage<D>> {
        if stage.is_internal() {
            return Err(ConstructionError::InternalStage(stage.name().to_string()));
        }
        sequences
            .get_mut(sequence)
            .ok_or(ConstructionError::UnknownSequence(sequence))?
            .stage_mut(stage)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Attach a component at the end of a stage. Returns its index.
    pub fn add_component(
        &mut self,
        sequence: usize,
        stage: D::Stage,
        component: D::Component,
        regenerate: bool,
    ) -> Result<usize> {
        self.edit(regenerate, |sequences| {
            let target = Self::editable_stage(sequences, sequence, stage)?;
            target.push(component)?;
            Ok(target.len() - 1)
        })
    }

    /// Attach a component at a position within a stage.
    pub fn insert_component(
        &mut self,
        sequence: usize,
        stage: D::Stage,
        index: usize,
        component: D::Component,
        regenerate: bool,
    ) -> Result<()> {
        self.edit(regenerate, |sequences| {
            Self::editable_stage(sequences, sequence, stage)?.insert(index, component)
        })
    }

    /// Detach a component. The stage may drop below its minimum until the
    /// caller restores it; [`Context::validate`] reports the violation.
    pub fn remove_component(
        &mut self,
        sequence: usize,
        stage: D::Stage,
        index: usize,
        regenerate: bool,
    ) -> Result<D::Component> {
        self.edit(regenerate, |sequences| {
            Self::editable_stage(sequences, sequence, stage)?.remove(index)
        })
    }

    /// Replace a component in place, returning the old one.
    pub fn replace_component(
        &mut self,
        sequence: usize,
        stage: D::Stage,
        index: usize,
        component: D::Component,
        regenerate: bool,
    ) -> Result<D::Component> {
        self.edit(regenerate, |sequences| {
            Self::editable_stage(sequences, sequence, stage)?.replace(index, component)
        })
    }

    /// Move a component to another position within its stage.
    pub fn move_component(
        &mut self,
        sequence: usize,
        stage: D::Stage,
        from: usize,
        to: usize,
        regenerate: bool,
    ) -> Result<()> {
        self.edit(regenerate, |sequences| {
            let target = Self::editable_stage(sequences, sequence, stage)?;
            if to >= target.len() {
                return Err(target.out_of_range(to));
            }
            let component = target.remove(from)?;
            target.insert(to, component)
        })
    }

    /// Set an option on an attached component.
    pub fn set_component_option(
        &mut self,
        sequence: usize,
        stage: D::Stage,
        index: usize,
        option: &str,
        value: &OptionValue,
        regenerate: bool,
    ) -> Result<()> {
        self.edit(regenerate, |sequences| {
            Self::editable_stage(sequences, sequence, stage)?
                .component_mut(index)?
                .set_option(option, value)
        })
    }

    /// Add a sequence populated with the domain's initial components.
    pub fn add_sequence(&mut self, regenerate: bool) -> Result<usize> {
        if !D::MULTI_SEQUENCE {
            return Err(ConstructionError::SingleSequenceOnly(D::KIND.to_string()));
        }
        let sequence = self.initial_sequence()?;
        self.edit(regenerate, |sequences| {
            sequences.push(sequence);
            Ok(sequences.len() - 1)
        })
    }

    /// Remove a sequence. The last sequence cannot be removed.
    pub fn remove_sequence(&mut self, sequence: usize, regenerate: bool) -> Result<()> {
        self.ensure_sequence(sequence)?;
        if self.sequences.len() == 1 {
            return Err(ConstructionError::LastSequence);
        }
        self.edit(regenerate, |sequences| {
            sequences.remove(sequence);
            Ok(())
        })
    }

    /// Change the tech level and regenerate.
    pub fn set_tech_level(&mut self, tech_level: u32) -> Result<()> {
        self.set_config(ConstructionConfig {
            tech_level,
            ..self.config
        })
    }

    /// Replace the configuration and regenerate. Rolled back on error.
    pub fn set_config(&mut self, config: ConstructionConfig) -> Result<()> {
        let previous = std::mem::replace(&mut self.config, config);
        if let Err(err) = self.regenerate() {
            self.config = previous;
            return Err(err);
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Build configuration.
    #[must_use]
    pub fn config(&self) -> &ConstructionConfig {
        &self.config
    }

    /// Tech level of the build.
    #[must_use]
    pub fn tech_level(&self) -> u32 {
        self.config.tech_level
    }

    /// Number of sequences.
    #[must_use]
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// All sequences.
    #[must_use]
    pub fn sequences(&self) -> &[Sequence<D>] {
        &self.sequences
    }

    /// Components attached to a stage of a sequence.
    #[must_use]
    pub fn components(&self, sequence: usize, stage: D::Stage) -> &[D::Component] {
        self.sequences
            .get(sequence)
            .and_then(|s| s.stage(stage))
            .map_or(&[], Stage::components)
    }

    /// Read-only view of the derived state.
    #[must_use]
    pub fn view(&self) -> BuildView<'_, D> {
        BuildView::new(&self.config, &self.sequences, &self.state)
    }

    /// Current value of an attribute.
    #[must_use]
    pub fn attribute_value(&self, sequence: usize, attribute: D::Attribute) -> Option<&AttributeValue> {
        self.state
            .sequences
            .get(sequence)
            .and_then(|s| s.attributes.get(attribute))
    }

    /// Attribute map of a sequence.
    #[must_use]
    pub fn attributes(&self, sequence: usize) -> Option<&AttributeMap<D::Attribute>> {
        self.state.sequences.get(sequence).map(|s| &s.attributes)
    }

    /// Check if any attached component of the sequence matches.
    pub fn has_component(&self, sequence: usize, predicate: impl Fn(&D::Component) -> bool) -> bool {
        self.view().has_component(sequence, predicate)
    }

    /// Every applied step in application order.
    #[must_use]
    pub fn steps(&self) -> &[AppliedStep<D>] {
        &self.state.log
    }

    /// Steps produced by one component.
    pub fn steps_for_component(
        &self,
        component: ComponentRef<D>,
    ) -> impl Iterator<Item = &AppliedStep<D>> {
        self.state
            .log
            .iter()
            .filter(move |s| s.component == component)
    }

    /// Steps accounted in one phase of a sequence.
    pub fn steps_for_phase(
        &self,
        sequence: usize,
        phase: D::Phase,
    ) -> impl Iterator<Item = &AppliedStep<D>> {
        self.state
            .log
            .iter()
            .filter(move |s| s.component.sequence == sequence && s.phase == phase)
    }

    /// Running totals of one phase of a sequence.
    #[must_use]
    pub fn phase_totals(&self, sequence: usize, phase: D::Phase) -> CostTotals {
        self.view().phase_totals(sequence, phase)
    }

    /// Totals of one sequence.
    #[must_use]
    pub fn sequence_totals(&self, sequence: usize) -> CostTotals {
        self.view().sequence_totals(sequence)
    }

    /// Totals of the whole build.
    #[must_use]
    pub fn totals(&self) -> CostTotals {
        (0..self.sequences.len())
            .map(|s| self.sequence_totals(s))
            .fold(CostTotals::ZERO, |acc, t| acc.combined(&t))
    }

    /// Every step note, prefixed with the component that produced it.
    #[must_use]
    pub fn construction_notes(&self) -> Vec<String> {
        self.state
            .log
            .iter()
            .flat_map(|step| {
                step.notes
                    .iter()
                    .map(move |note| format!("{}: {note}", step.component_name))
            })
            .collect()
    }

    /// Phase-sectioned report of every applied step.
    #[must_use]
    pub fn manifest(&self) -> Manifest {
        Manifest::from_context(self)
    }

    /// Check every stage's component count against its bounds.
    pub fn validate(&self) -> Result<()> {
        self.sequences.iter().try_for_each(Sequence::check_bounds)
    }

    /// Components that could be attached to a stage, given everything
    /// before it.
    ///
    /// The build is replayed up to the stage on a scratch copy, with
    /// `replacing` detached, and each candidate for this stage is tested
    /// for compatibility. The context itself is never modified.
    pub fn find_compatible_components(
        &self,
        sequence: usize,
        stage: D::Stage,
        replacing: Option<usize>,
        candidates: impl IntoIterator<Item = D::Component>,
    ) -> Result<Vec<D::Component>> {
        self.ensure_sequence(sequence)?;
        let mut sequences = self.sequences.clone();
        if let Some(index) = replacing {
            sequences[sequence].stage_mut(stage)?.remove(index)?;
        }
        let state = run_pipeline(&self.config, &mut sequences, Some((sequence, stage)))?;
        let position = replacing.unwrap_or_else(|| {
            sequences[sequence].stage(stage).map_or(0, Stage::len)
        });
        let view = BuildView::new(&self.config, &sequences, &state)
            .at(ComponentRef::new(sequence, stage, position));
        Ok(candidates
            .into_iter()
            .filter(|c| c.stage() == stage && c.is_compatible(sequence, &view))
            .collect())
    }
}
