#![deny(unsafe_code)]

//! CM: Concomitant/Prior Medications.
//!
//! Study → Participant → ConcomitantMedication, one record per medication.

use anyhow::Result;
use sdtm_core::{DomainObject, ExportDefinition, NodeDescriptor, SortOrder};
use sdtm_model::{ConfigurationError, PartialRecord, Variable, VariableSpec, VariableType};

use crate::common::{
    PARTICIPANT, PARTICIPANT_RELATION, PARTICIPANTS_RELATION, STUDY, STUDY_RELATION, optional,
    required, study_id, usubjid,
};

pub const RECORD_TYPE: &str = "ConcomitantMedication";
pub const RELATION: &str = "concomitant_medications";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cm {
    Studyid,
    Domain,
    Usubjid,
    Cmseq,
    Cmtrt,
    Cmindc,
    Cmdose,
    Cmdosu,
    Cmroute,
    Cmstdtc,
    Cmendtc,
}

impl Variable for Cm {
    const ALL: &'static [Self] = &[
        Cm::Studyid,
        Cm::Domain,
        Cm::Usubjid,
        Cm::Cmseq,
        Cm::Cmtrt,
        Cm::Cmindc,
        Cm::Cmdose,
        Cm::Cmdosu,
        Cm::Cmroute,
        Cm::Cmstdtc,
        Cm::Cmendtc,
    ];

    fn spec(self) -> VariableSpec {
        match self {
            Cm::Studyid => {
                VariableSpec::new("STUDYID", "Study Identifier", VariableType::String).with_length(20)
            }
            Cm::Domain => {
                VariableSpec::new("DOMAIN", "Domain Abbreviation", VariableType::String).with_length(2)
            }
            Cm::Usubjid => {
                VariableSpec::new("USUBJID", "Unique Subject Identifier", VariableType::String)
                    .with_length(40)
            }
            Cm::Cmseq => VariableSpec::new("CMSEQ", "Sequence Number", VariableType::Integer),
            Cm::Cmtrt => {
                VariableSpec::new("CMTRT", "Reported Name of Drug, Med, or Therapy", VariableType::String)
                    .with_length(200)
            }
            Cm::Cmindc => VariableSpec::new("CMINDC", "Indication", VariableType::String)
                .with_length(200),
            Cm::Cmdose => VariableSpec::new("CMDOSE", "Dose per Administration", VariableType::Float),
            Cm::Cmdosu => VariableSpec::new("CMDOSU", "Dose Units", VariableType::String)
                .with_length(40),
            Cm::Cmroute => {
                VariableSpec::new("CMROUTE", "Route of Administration", VariableType::String)
                    .with_length(40)
            }
            Cm::Cmstdtc => {
                VariableSpec::new("CMSTDTC", "Start Date/Time of Medication", VariableType::Date)
            }
            Cm::Cmendtc => {
                VariableSpec::new("CMENDTC", "End Date/Time of Medication", VariableType::Date)
            }
        }
    }
}

/// Builds the CM export definition.
pub fn definition<O: DomainObject + 'static>() -> Result<ExportDefinition<Cm, O>, ConfigurationError> {
    ExportDefinition::builder("CM", "Concomitant/Prior Medications")
        .domain_variable(Cm::Domain)
        .sequence_variable(Cm::Cmseq)
        .node(NodeDescriptor::root(STUDY, PARTICIPANTS_RELATION))
        .node(NodeDescriptor::branch(PARTICIPANT, RELATION, STUDY_RELATION))
        .node(NodeDescriptor::leaf(RECORD_TYPE, PARTICIPANT_RELATION))
        .visitor(STUDY, visit_study::<O>)
        .visitor(PARTICIPANT, visit_participant::<O>)
        .visitor(RECORD_TYPE, visit_medication::<O>)
        .sort_by(Cm::Usubjid, SortOrder::Ascending)
        .build()
}

fn visit_study<O: DomainObject>(study: &O) -> Result<PartialRecord<Cm>> {
    Ok(PartialRecord::new().with(Cm::Studyid, study_id(study)?))
}

fn visit_participant<O: DomainObject>(participant: &O) -> Result<PartialRecord<Cm>> {
    Ok(PartialRecord::new().with(Cm::Usubjid, usubjid(participant)?))
}

fn visit_medication<O: DomainObject>(medication: &O) -> Result<PartialRecord<Cm>> {
    Ok(PartialRecord::new()
        .with(Cm::Cmtrt, required(medication, "name")?)
        .with(Cm::Cmindc, optional(medication, "indication"))
        .with(Cm::Cmdose, optional(medication, "dose"))
        .with(Cm::Cmdosu, optional(medication, "dose_unit"))
        .with(Cm::Cmroute, optional(medication, "route"))
        .with(Cm::Cmstdtc, optional(medication, "start_date"))
        .with(Cm::Cmendtc, optional(medication, "end_date")))
}
