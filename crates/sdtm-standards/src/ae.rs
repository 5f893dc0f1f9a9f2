#![deny(unsafe_code)]

//! AE: Adverse Events.
//!
//! Study → Participant → AdverseEvent, one record per event.

use anyhow::Result;
use sdtm_core::{DomainObject, ExportDefinition, NodeDescriptor, SortOrder};
use sdtm_model::{ConfigurationError, PartialRecord, Variable, VariableSpec, VariableType};

use crate::common::{
    PARTICIPANT, PARTICIPANT_RELATION, PARTICIPANTS_RELATION, STUDY, STUDY_RELATION, optional,
    required, study_id, usubjid,
};

pub const RECORD_TYPE: &str = "AdverseEvent";
pub const RELATION: &str = "adverse_events";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Ae {
    Studyid,
    Domain,
    Usubjid,
    Aeseq,
    Aeterm,
    Aedecod,
    Aesev,
    Aeser,
    Aerel,
    Aeout,
    Aestdtc,
    Aeendtc,
}

impl Variable for Ae {
    const ALL: &'static [Self] = &[
        Ae::Studyid,
        Ae::Domain,
        Ae::Usubjid,
        Ae::Aeseq,
        Ae::Aeterm,
        Ae::Aedecod,
        Ae::Aesev,
        Ae::Aeser,
        Ae::Aerel,
        Ae::Aeout,
        Ae::Aestdtc,
        Ae::Aeendtc,
    ];

    fn spec(self) -> VariableSpec {
        match self {
            Ae::Studyid => {
                VariableSpec::new("STUDYID", "Study Identifier", VariableType::String).with_length(20)
            }
            Ae::Domain => {
                VariableSpec::new("DOMAIN", "Domain Abbreviation", VariableType::String).with_length(2)
            }
            Ae::Usubjid => {
                VariableSpec::new("USUBJID", "Unique Subject Identifier", VariableType::String)
                    .with_length(40)
            }
            Ae::Aeseq => VariableSpec::new("AESEQ", "Sequence Number", VariableType::Integer),
            Ae::Aeterm => {
                VariableSpec::new("AETERM", "Reported Term for the Adverse Event", VariableType::String)
                    .with_length(200)
            }
            Ae::Aedecod => {
                VariableSpec::new("AEDECOD", "Dictionary-Derived Term", VariableType::String)
                    .with_length(200)
            }
            Ae::Aesev => VariableSpec::new("AESEV", "Severity/Intensity", VariableType::String)
                .with_length(8),
            // Y/N flag; booleans render as Y/N in string columns.
            Ae::Aeser => VariableSpec::new("AESER", "Serious Event", VariableType::String)
                .with_length(1),
            Ae::Aerel => VariableSpec::new("AEREL", "Causality", VariableType::String)
                .with_length(40),
            Ae::Aeout => VariableSpec::new("AEOUT", "Outcome of Adverse Event", VariableType::String)
                .with_length(40),
            Ae::Aestdtc => {
                VariableSpec::new("AESTDTC", "Start Date/Time of Adverse Event", VariableType::DateTime)
            }
            Ae::Aeendtc => {
                VariableSpec::new("AEENDTC", "End Date/Time of Adverse Event", VariableType::DateTime)
            }
        }
    }
}

/// Builds the AE export definition.
pub fn definition<O: DomainObject + 'static>() -> Result<ExportDefinition<Ae, O>, ConfigurationError> {
    ExportDefinition::builder("AE", "Adverse Events")
        .domain_variable(Ae::Domain)
        .sequence_variable(Ae::Aeseq)
        .node(NodeDescriptor::root(STUDY, PARTICIPANTS_RELATION))
        .node(NodeDescriptor::branch(PARTICIPANT, RELATION, STUDY_RELATION))
        .node(NodeDescriptor::leaf(RECORD_TYPE, PARTICIPANT_RELATION))
        .visitor(STUDY, visit_study::<O>)
        .visitor(PARTICIPANT, visit_participant::<O>)
        .visitor(RECORD_TYPE, visit_event::<O>)
        .sort_by(Ae::Usubjid, SortOrder::Ascending)
        .build()
}

fn visit_study<O: DomainObject>(study: &O) -> Result<PartialRecord<Ae>> {
    Ok(PartialRecord::new().with(Ae::Studyid, study_id(study)?))
}

fn visit_participant<O: DomainObject>(participant: &O) -> Result<PartialRecord<Ae>> {
    Ok(PartialRecord::new().with(Ae::Usubjid, usubjid(participant)?))
}

fn visit_event<O: DomainObject>(event: &O) -> Result<PartialRecord<Ae>> {
    Ok(PartialRecord::new()
        .with(Ae::Aeterm, required(event, "term")?)
        .with(Ae::Aedecod, optional(event, "decoded_term"))
        .with(Ae::Aesev, optional(event, "severity"))
        .with(Ae::Aeser, optional(event, "serious"))
        .with(Ae::Aerel, optional(event, "causality"))
        .with(Ae::Aeout, optional(event, "outcome"))
        .with(Ae::Aestdtc, optional(event, "start_date"))
        .with(Ae::Aeendtc, optional(event, "end_date")))
}
