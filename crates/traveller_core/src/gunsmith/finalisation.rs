//! Weapon finalisation: trait notes derived from the finished attributes.

use serde::{Deserialize, Serialize};

use crate::construction::{BuildCursor, BuildView, Component, Step};
use crate::error::Result;
use crate::math::{format_delta, format_scalar, Fixed};

use super::{has_conventional_receiver, Gunsmith, WeaponAttribute, WeaponStage};

/// Engine-owned finalisation of every weapon sequence. Never fails the
/// build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeaponFinalisation;

impl WeaponFinalisation {
    fn trait_notes(view: &BuildView<'_, Gunsmith>, sequence: usize) -> Vec<String> {
        let positive = |attribute| view.scalar(sequence, attribute).filter(|v| *v > Fixed::ZERO);
        let mut notes = Vec::new();

        if let Some(damage) = view.dice(sequence, WeaponAttribute::Damage) {
            notes.push(format!("Damage {damage}"));
        }
        if let Some(range) = view.scalar(sequence, WeaponAttribute::Range) {
            notes.push(format!("Range {}m", format_scalar(range)));
        }
        if let Some(capacity) = view.scalar(sequence, WeaponAttribute::AmmoCapacity) {
            notes.push(format!("Capacity {}", format_scalar(capacity)));
        }
        if let Some(auto) = positive(WeaponAttribute::Auto) {
            notes.push(format!("Auto {}", format_scalar(auto)));
        }
        if let Some(rate) = view.flag(sequence, WeaponAttribute::FireRate) {
            notes.push(rate.to_string());
        }
        if let Some(ap) = positive(WeaponAttribute::Penetration) {
            notes.push(format!("AP {}", format_scalar(ap)));
        }
        if let Some(heat) = positive(WeaponAttribute::Heat) {
            notes.push(format!("Heat {} per attack", format_scalar(heat)));
        }
        if let Some(bulk) = view.flag(sequence, WeaponAttribute::Bulk) {
            notes.push(bulk.to_string());
        }
        if let Some(signature) = view.flag(sequence, WeaponAttribute::Signature) {
            notes.push(format!("Physical Signature ({signature})"));
        }
        if let Some(quickdraw) = view.scalar(sequence, WeaponAttribute::Quickdraw) {
            notes.push(format!("Quickdraw {}", format_delta(quickdraw)));
        }
        notes
    }
}

impl Component<Gunsmith> for WeaponFinalisation {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Finalisation
    }

    fn type_name(&self) -> &'static str {
        "Finalisation"
    }

    fn is_compatible(&self, _sequence: usize, _context: &BuildView<'_, Gunsmith>) -> bool {
        true
    }

    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let view = context.view();
        let mut step = Step::new("Weapon Traits");
        for note in Self::trait_notes(&view, sequence) {
            step.add_note(note);
        }
        let has_mechanism = view.has_component(sequence, |c| c.stage() == WeaponStage::Mechanism);
        if has_conventional_receiver(&view, sequence) && !has_mechanism {
            step.add_note("No mechanism selected; the weapon cannot fire");
        }
        context.apply_step(step)
    }
}
