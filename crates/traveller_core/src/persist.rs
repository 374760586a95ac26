//! Stored builds and their document form.
//!
//! A [`Construct`] is a named build with a stable identity. Its
//! [`BuildDocument`] records the configuration and, per sequence, every
//! editable stage with its components in attachment order. Engine-owned
//! stages are not stored; they are recreated on load.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ConstructionConfig;
use crate::construction::{ConstructionDomain, Context, Manifest, Sequence, StageKind};
use crate::error::{ConstructionError, Result};
use crate::gunsmith::Gunsmith;
use crate::robots::Robots;

/// Document format version for compatibility.
pub const DOCUMENT_VERSION: u32 = 1;

/// Check that an id can name a document file on its own: non-empty and a
/// single path component.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}

/// One stage of a stored sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct DocumentStage<D: ConstructionDomain> {
    /// Stage kind.
    pub stage: D::Stage,
    /// Components in attachment order.
    pub components: Vec<D::Component>,
}

/// One stored sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct DocumentSequence<D: ConstructionDomain> {
    /// Editable stages that hold at least one component.
    pub stages: Vec<DocumentStage<D>>,
}

/// Serialized form of a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct BuildDocument<D: ConstructionDomain> {
    /// Document format version.
    pub version: u32,
    /// Stable identity.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Build kind, see [`ConstructionDomain::KIND`].
    pub kind: String,
    /// Configuration the build was made under.
    pub config: ConstructionConfig,
    /// Sequences in order.
    pub sequences: Vec<DocumentSequence<D>>,
}

impl<D: ConstructionDomain> BuildDocument<D> {
    fn check_header(&self) -> Result<()> {
        if self.version != DOCUMENT_VERSION {
            return Err(ConstructionError::InvalidDocument(format!(
                "document version mismatch: expected {DOCUMENT_VERSION}, got {}",
                self.version
            )));
        }
        if self.kind != D::KIND {
            return Err(ConstructionError::InvalidDocument(format!(
                "expected a '{}' document, found '{}'",
                D::KIND,
                self.kind
            )));
        }
        if !is_valid_id(&self.id) {
            return Err(ConstructionError::InvalidDocument(format!(
                "document id '{}' is not a single path component",
                self.id
            )));
        }
        Ok(())
    }
}

fn document_sequence<D: ConstructionDomain>(sequence: &Sequence<D>) -> DocumentSequence<D> {
    let stages = sequence
        .stages()
        .iter()
        .filter(|stage| !stage.kind().is_internal() && !stage.is_empty())
        .map(|stage| DocumentStage {
            stage: stage.kind(),
            components: stage.components().to_vec(),
        })
        .collect();
    DocumentSequence { stages }
}

fn restore_sequence<D: ConstructionDomain>(
    config: &ConstructionConfig,
    document: DocumentSequence<D>,
) -> Result<Sequence<D>> {
    let mut sequence = Sequence::new();
    for (stage, component) in D::initial_components(config) {
        if stage.is_internal() {
            sequence.stage_mut(stage)?.push(component)?;
        }
    }
    for stored in document.stages {
        if stored.stage.is_internal() {
            return Err(ConstructionError::InternalStage(
                stored.stage.name().to_string(),
            ));
        }
        let stage = sequence.stage_mut(stored.stage)?;
        for component in stored.components {
            stage.push(component)?;
        }
    }
    Ok(sequence)
}

/// A named build with a stable identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Construct<D: ConstructionDomain> {
    id: String,
    name: String,
    context: Context<D>,
}

/// A stored weapon.
pub type Weapon = Construct<Gunsmith>;

/// A stored robot.
pub type Robot = Construct<Robots>;

impl<D: ConstructionDomain> Construct<D> {
    /// Create a build with a fresh id and the domain's initial components.
    pub fn new(name: impl Into<String>, config: ConstructionConfig) -> Result<Self> {
        Ok(Self::from_context(name, Context::new(config)?))
    }

    /// Wrap an existing context under a fresh id.
    #[must_use]
    pub fn from_context(name: impl Into<String>, context: Context<D>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            context,
        }
    }

    /// Stable identity.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the build.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The build.
    #[must_use]
    pub const fn context(&self) -> &Context<D> {
        &self.context
    }

    /// The build, for editing.
    pub fn context_mut(&mut self) -> &mut Context<D> {
        &mut self.context
    }

    /// Phase-sectioned report of the build.
    #[must_use]
    pub fn manifest(&self) -> Manifest {
        self.context.manifest()
    }

    /// Convert to the stored document form.
    #[must_use]
    pub fn to_document(&self) -> BuildDocument<D> {
        BuildDocument {
            version: DOCUMENT_VERSION,
            id: self.id.clone(),
            name: self.name.clone(),
            kind: D::KIND.to_string(),
            config: *self.context.config(),
            sequences: self
                .context
                .sequences()
                .iter()
                .map(document_sequence)
                .collect(),
        }
    }

    /// Rebuild from a document. Stage membership and component counts are
    /// validated, then the build is regenerated.
    pub fn from_document(document: BuildDocument<D>) -> Result<Self> {
        document.check_header()?;
        let config = document.config;
        let sequences = document
            .sequences
            .into_iter()
            .map(|sequence| restore_sequence(&config, sequence))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: document.id,
            name: document.name,
            context: Context::from_sequences(config, sequences)?,
        })
    }
}

/// Something an object store can hold.
pub trait Storable: Sized + Send + Sync {
    /// Serialized form.
    type Document: Serialize + DeserializeOwned;

    /// Kind recorded in documents.
    const KIND: &'static str;

    /// Stable identity.
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// Convert to the serialized form.
    fn to_document(&self) -> Self::Document;

    /// Rebuild from the serialized form.
    fn from_document(document: Self::Document) -> Result<Self>;

    /// A copy of this object under a new identity and name.
    #[must_use]
    fn duplicate(&self, id: String, name: String) -> Self;
}

impl<D: ConstructionDomain> Storable for Construct<D> {
    type Document = BuildDocument<D>;

    const KIND: &'static str = D::KIND;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_document(&self) -> BuildDocument<D> {
        Self::to_document(self)
    }

    fn from_document(document: BuildDocument<D>) -> Result<Self> {
        Self::from_document(document)
    }

    fn duplicate(&self, id: String, name: String) -> Self {
        Self {
            id,
            name,
            context: self.context.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gunsmith::{ConventionalReceiver, ReceiverClass, WeaponStage};
    use crate::robots::{Manipulator, RobotStage};

    fn sample_weapon() -> Weapon {
        let mut weapon = Weapon::new("Carbine", ConstructionConfig::default()).unwrap();
        weapon
            .context_mut()
            .add_component(
                0,
                WeaponStage::Receiver,
                ConventionalReceiver::new(ReceiverClass::Assault).into(),
                true,
            )
            .unwrap();
        weapon
    }

    #[test]
    fn test_document_skips_internal_stages() {
        let document = sample_weapon().to_document();
        assert_eq!(document.kind, "weapon");
        let stages: Vec<_> = document.sequences[0].stages.iter().map(|s| s.stage).collect();
        assert_eq!(stages, vec![WeaponStage::Receiver]);
    }

    #[test]
    fn test_document_round_trip_preserves_manifest() {
        let weapon = sample_weapon();
        let restored = Weapon::from_document(weapon.to_document()).unwrap();
        assert_eq!(restored.id(), weapon.id());
        assert_eq!(restored.manifest(), weapon.manifest());
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let mut document = sample_weapon().to_document();
        document.kind = "robot".to_string();
        let err = Weapon::from_document(document).unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidDocument(_)));
    }

    #[test]
    fn test_internal_stage_in_document_rejected() {
        let mut document = Robot::new("Droid", ConstructionConfig::default())
            .unwrap()
            .to_document();
        document.sequences[0].stages.push(DocumentStage {
            stage: RobotStage::Finalisation,
            components: Vec::new(),
        });
        let err = Robot::from_document(document).unwrap_err();
        assert!(matches!(err, ConstructionError::InternalStage(_)));
    }

    #[test]
    fn test_component_on_wrong_stage_rejected() {
        let mut document = Robot::new("Droid", ConstructionConfig::default())
            .unwrap()
            .to_document();
        document.sequences[0].stages.push(DocumentStage {
            stage: RobotStage::SlotOptions,
            components: vec![Manipulator::default().into()],
        });
        let err = Robot::from_document(document).unwrap_err();
        assert!(matches!(err, ConstructionError::WrongStage { .. }));
    }

    #[test]
    fn test_path_like_ids_rejected() {
        for id in ["", ".", "..", "../escape", "nested/id", "back\\slash"] {
            let mut document = sample_weapon().to_document();
            document.id = id.to_string();
            let err = Weapon::from_document(document).unwrap_err();
            assert!(
                matches!(err, ConstructionError::InvalidDocument(_)),
                "id {id:?} should be rejected"
            );
        }
        assert!(is_valid_id("6f1c1f9e-2b7d-4b47-9d0e-0c7c1b4d2a11"));
        assert!(is_valid_id("carbine.v2"));
    }

    #[test]
    fn test_draft_without_receiver_round_trips() {
        let draft = Weapon::new("Draft", ConstructionConfig::default()).unwrap();
        assert!(draft.context().validate().is_err());

        let restored = Weapon::from_document(draft.to_document()).unwrap();
        assert_eq!(restored.manifest(), draft.manifest());
        assert!(matches!(
            restored.context().validate(),
            Err(ConstructionError::StageCountOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_duplicate_keeps_build() {
        let weapon = sample_weapon();
        let copy = weapon.duplicate("other".to_string(), "Copy".to_string());
        assert_eq!(copy.id(), "other");
        assert_eq!(copy.context(), weapon.context());
    }
}
