#![deny(unsafe_code)]

//! Attribute and relation conventions shared by the built-in domains.
//!
//! The built-in definitions read objects through [`DomainObject`] only, so
//! any store works as long as it uses these record types, relation names and
//! attribute names.

use anyhow::{Context, Result, anyhow};
use sdtm_core::DomainObject;
use sdtm_model::Value;

pub const STUDY: &str = "Study";
pub const PARTICIPANT: &str = "Participant";

/// Study → participants.
pub const PARTICIPANTS_RELATION: &str = "participants";
/// Participant → study.
pub const STUDY_RELATION: &str = "study";
/// Leaf → participant.
pub const PARTICIPANT_RELATION: &str = "participant";

/// Reads an attribute that must be present and non-null.
pub fn required<O: DomainObject>(object: &O, name: &str) -> Result<Value> {
    match object.attribute(name) {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(anyhow!(
            "{} {} has no '{name}'",
            object.record_type(),
            object.identity()
        )),
    }
}

/// Reads an optional attribute; absent attributes are [`Value::Null`].
pub fn optional<O: DomainObject>(object: &O, name: &str) -> Value {
    object.attribute(name).unwrap_or_default()
}

/// Study identifier: the study's `name`.
pub fn study_id<O: DomainObject>(study: &O) -> Result<Value> {
    required(study, "name")
}

/// Unique subject identifier, `<study name>-<subject_id>`.
///
/// The study is reached through the participant's parent relation.
pub fn usubjid<O: DomainObject>(participant: &O) -> Result<String> {
    let subject_id = required(participant, "subject_id")?;
    let study = participant
        .parent(STUDY_RELATION)?
        .with_context(|| format!("participant {} has no study", participant.identity()))?;
    let study_id = study_id(&study)?;
    Ok(format!("{study_id}-{subject_id}"))
}
