//! The read-only, phase-sectioned report of a build.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConstructionError, Result};

use super::component::{PhaseKind, StageKind};
use super::context::Context;
use super::step::{CostKind, CostTotals};
use super::ConstructionDomain;

/// One applied step as shown in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Display name of the component that produced the step.
    pub component: String,
    /// Step label.
    pub step: String,
    /// Change to each running total.
    pub deltas: CostTotals,
    /// Factor descriptions.
    pub factors: Vec<String>,
    /// Notes.
    pub notes: Vec<String>,
}

/// Entries of one phase of one sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSection {
    /// Sequence index.
    pub sequence: usize,
    /// Phase name.
    pub phase: String,
    /// Entries in application order.
    pub entries: Vec<ManifestEntry>,
    /// Phase totals.
    pub totals: CostTotals,
}

/// Phase-sectioned report of every applied step.
///
/// Sections are ordered by sequence, then by the phase's first stage in the
/// domain layout. Phases without steps are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Build kind.
    pub kind: String,
    /// Sections.
    pub sections: Vec<ManifestSection>,
    /// Totals of the whole build.
    pub totals: CostTotals,
}

impl Manifest {
    /// Derive the manifest of a context.
    #[must_use]
    pub fn from_context<D: ConstructionDomain>(context: &Context<D>) -> Self {
        let mut phases: Vec<D::Phase> = Vec::new();
        for stage in D::stage_layout() {
            if !phases.contains(&stage.phase()) {
                phases.push(stage.phase());
            }
        }

        let mut sections = Vec::new();
        for sequence in 0..context.sequence_count() {
            for phase in &phases {
                let entries: Vec<ManifestEntry> = context
                    .steps_for_phase(sequence, *phase)
                    .map(|step| {
                        let mut deltas = CostTotals::ZERO;
                        for kind in CostKind::ALL {
                            deltas.add(kind, step.delta(kind));
                        }
                        ManifestEntry {
                            component: step.component_name.clone(),
                            step: step.name.clone(),
                            deltas,
                            factors: step.factors.clone(),
                            notes: step.notes.clone(),
                        }
                    })
                    .collect();
                if entries.is_empty() {
                    continue;
                }
                sections.push(ManifestSection {
                    sequence,
                    phase: phase.name().to_string(),
                    entries,
                    totals: context.phase_totals(sequence, *phase),
                });
            }
        }

        Self {
            kind: D::KIND.to_string(),
            sections,
            totals: context.totals(),
        }
    }

    /// Every note in the manifest.
    pub fn notes(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| s.entries.iter())
            .flat_map(|e| e.notes.iter().map(String::as_str))
    }

    /// Find a section by sequence and phase name.
    #[must_use]
    pub fn section(&self, sequence: usize, phase: &str) -> Option<&ManifestSection> {
        self.sections
            .iter()
            .find(|s| s.sequence == sequence && s.phase == phase)
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| ConstructionError::Serialization(e.to_string()))
    }
}

fn write_deltas(f: &mut fmt::Formatter<'_>, deltas: &CostTotals) -> fmt::Result {
    let parts: Vec<String> = CostKind::ALL
        .iter()
        .filter(|kind| deltas.get(**kind) != crate::math::Fixed::ZERO)
        .map(|kind| format!("{kind} {}", crate::math::format_delta(deltas.get(*kind))))
        .collect();
    if !parts.is_empty() {
        write!(f, " ({})", parts.join(", "))?;
    }
    Ok(())
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} manifest", self.kind)?;
        for section in &self.sections {
            writeln!(f, "[Sequence {}] {}", section.sequence + 1, section.phase)?;
            for entry in &section.entries {
                write!(f, "  {}: {}", entry.component, entry.step)?;
                write_deltas(f, &entry.deltas)?;
                writeln!(f)?;
                for factor in &entry.factors {
                    writeln!(f, "    - {factor}")?;
                }
                for note in &entry.notes {
                    writeln!(f, "    * {note}")?;
                }
            }
            writeln!(f, "  Phase total: {}", section.totals)?;
        }
        write!(f, "Total: {}", self.totals)
    }
}
