//! Robot finalisation: trait notes, maintenance and overrun warnings.
//!
//! Overruns are advisory. A robot using more slots or bandwidth than it
//! has is still fully computed; the warning is a note on this step.

use serde::{Deserialize, Serialize};

use crate::construction::{BuildCursor, BuildView, Component, CostKind, OptionChoice, Step};
use crate::error::Result;
use crate::math::{format_delta, format_scalar, Fixed};

use super::{LocomotionKind, RobotAttribute, RobotComponent, RobotSkill, RobotStage, Robots};

/// Engine-owned finalisation of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RobotFinalisation;

fn locomotion_kinds(view: &BuildView<'_, Robots>, sequence: usize) -> Vec<LocomotionKind> {
    view.components(sequence)
        .filter_map(|c| match c {
            RobotComponent::Locomotion(l) => Some(l.kind),
            RobotComponent::SecondaryLocomotion(l) => Some(l.kind),
            _ => None,
        })
        .collect()
}

fn flyer_note(kinds: &[LocomotionKind]) -> Option<String> {
    let atmospheric = kinds
        .iter()
        .any(|k| k.movement_trait() == Some(RobotAttribute::Flyer) && k.needs_atmosphere());
    let gravitic = kinds.contains(&LocomotionKind::Grav);
    match (atmospheric, gravitic) {
        (_, true) => Some("Flyer: gravitic lift, operates with or without an atmosphere".into()),
        (true, false) => Some("Flyer: requires an atmosphere to fly".into()),
        (false, false) => None,
    }
}

impl RobotFinalisation {
    fn trait_notes(view: &BuildView<'_, Robots>, sequence: usize) -> Vec<String> {
        let mut notes = Vec::new();

        if let Some(protection) = view.scalar(sequence, RobotAttribute::Protection) {
            notes.push(format!("Armour {}", format_scalar(protection)));
        }
        if view.has_attribute(sequence, RobotAttribute::Atv) {
            notes.push("ATV: all-terrain movement".to_string());
        }
        if view.has_attribute(sequence, RobotAttribute::Acv) {
            notes.push("ACV: travels over land and water on an air cushion".to_string());
        }
        if view.has_attribute(sequence, RobotAttribute::Seafarer) {
            notes.push("Seafarer: moves on or under water".to_string());
        }
        if view.has_attribute(sequence, RobotAttribute::Flyer) {
            if let Some(note) = flyer_note(&locomotion_kinds(view, sequence)) {
                notes.push(note);
            }
        }
        if view.has_attribute(sequence, RobotAttribute::Thruster) {
            notes.push("Thruster: manoeuvres in vacuum".to_string());
        }
        if let Some(stealth) = view.scalar(sequence, RobotAttribute::Stealth) {
            notes.push(format!("Stealth {}: DM-{} to detect", format_scalar(stealth), format_scalar(stealth)));
        }
        if let Some(agility) = view.scalar(sequence, RobotAttribute::Agility) {
            notes.push(format!("Agility {}", format_delta(agility)));
        }
        if let Some(speed) = view.scalar(sequence, RobotAttribute::Speed) {
            notes.push(format!("Speed {}m", format_scalar(speed)));
        }
        if let Some(endurance) = view.scalar(sequence, RobotAttribute::Endurance) {
            notes.push(format!("Endurance {} hours", format_scalar(endurance)));
        }
        if let Some(hits) = view.scalar(sequence, RobotAttribute::Hits) {
            notes.push(format!("Hits {}: inoperable at 0", format_scalar(hits)));
        }
        notes
    }

    fn autopilot_note(view: &BuildView<'_, Robots>, sequence: usize) -> Option<String> {
        let rating = view.scalar(sequence, RobotAttribute::Autopilot)?;
        let skill = view.find_component(sequence, |c| match c {
            RobotComponent::SkillPackage(p) if p.skill.is_vehicle() => Some(p.skill),
            _ => None,
        })?;
        Some(overlap_note(rating, skill))
    }

    fn usage_notes(view: &BuildView<'_, Robots>, sequence: usize) -> Vec<String> {
        let used = view.sequence_totals(sequence);
        let mut notes = Vec::new();
        let limits = [
            (CostKind::Slots, RobotAttribute::MaxSlots, "slots"),
            (CostKind::Bandwidth, RobotAttribute::MaxBandwidth, "bandwidth"),
        ];
        for (kind, attribute, label) in limits {
            let max = view.scalar(sequence, attribute).unwrap_or(Fixed::ZERO);
            let used = used.get(kind);
            notes.push(format!(
                "Uses {} of {} {label}",
                format_scalar(used),
                format_scalar(max)
            ));
            if used > max {
                notes.push(format!(
                    "Warning: {} {label} used exceeds the maximum of {}",
                    format_scalar(used),
                    format_scalar(max)
                ));
            }
        }
        notes
    }
}

fn overlap_note(rating: Fixed, skill: RobotSkill) -> String {
    format!(
        "Autopilot {} overlaps the {} skill package; use the higher of the two",
        format_scalar(rating),
        skill.label()
    )
}

impl Component<Robots> for RobotFinalisation {
    fn stage(&self) -> RobotStage {
        RobotStage::Finalisation
    }

    fn type_name(&self) -> &'static str {
        "Finalisation"
    }

    fn is_compatible(&self, _sequence: usize, _context: &BuildView<'_, Robots>) -> bool {
        true
    }

    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let view = context.view();
        let mut step = Step::new("Robot Traits");
        for note in Self::trait_notes(&view, sequence) {
            step.add_note(note);
        }
        if !view.has_component(sequence, |c| matches!(c, RobotComponent::ImprovedMaintenance(_))) {
            step.add_note("Requires routine maintenance every year");
        }
        if let Some(note) = Self::autopilot_note(&view, sequence) {
            step.add_note(note);
        }
        for note in Self::usage_notes(&view, sequence) {
            step.add_note(note);
        }
        context.apply_step(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flyer_note_prefers_gravitic() {
        let note = flyer_note(&[LocomotionKind::Aeroplane, LocomotionKind::Grav]);
        assert!(note.is_some_and(|n| n.contains("gravitic")));
        let note = flyer_note(&[LocomotionKind::Wheels, LocomotionKind::Vtol]);
        assert!(note.is_some_and(|n| n.contains("atmosphere")));
        assert!(flyer_note(&[LocomotionKind::Wheels]).is_none());
    }

    #[test]
    fn test_overlap_note_names_skill() {
        let note = overlap_note(crate::math::fixed(2), RobotSkill::Drive);
        assert!(note.contains("Autopilot 2"));
        assert!(note.contains("Drive"));
    }
}
