#![deny(unsafe_code)]

//! DM: Demographics, one record per participant.

use anyhow::Result;
use sdtm_core::{DomainObject, ExportDefinition, NodeDescriptor, SortOrder};
use sdtm_model::{
    ConfigurationError, PartialRecord, Value, Variable, VariableSpec, VariableType,
};

use crate::common::{
    PARTICIPANT, PARTICIPANTS_RELATION, STUDY, STUDY_RELATION, optional, required, study_id,
    usubjid,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dm {
    Studyid,
    Domain,
    Usubjid,
    Subjid,
    Siteid,
    Brthdtc,
    Age,
    Ageu,
    Sex,
    Race,
    Ethnic,
    Armcd,
    Arm,
    Country,
}

impl Variable for Dm {
    const ALL: &'static [Self] = &[
        Dm::Studyid,
        Dm::Domain,
        Dm::Usubjid,
        Dm::Subjid,
        Dm::Siteid,
        Dm::Brthdtc,
        Dm::Age,
        Dm::Ageu,
        Dm::Sex,
        Dm::Race,
        Dm::Ethnic,
        Dm::Armcd,
        Dm::Arm,
        Dm::Country,
    ];

    fn spec(self) -> VariableSpec {
        use VariableType::{Date, Integer, String as Text};
        match self {
            Dm::Studyid => VariableSpec::new("STUDYID", "Study Identifier", Text).with_length(20),
            Dm::Domain => VariableSpec::new("DOMAIN", "Domain Abbreviation", Text).with_length(2),
            Dm::Usubjid => {
                VariableSpec::new("USUBJID", "Unique Subject Identifier", Text).with_length(40)
            }
            Dm::Subjid => {
                VariableSpec::new("SUBJID", "Subject Identifier for the Study", Text)
                    .with_length(20)
            }
            Dm::Siteid => VariableSpec::new("SITEID", "Study Site Identifier", Text).with_length(20),
            Dm::Brthdtc => VariableSpec::new("BRTHDTC", "Date/Time of Birth", Date),
            Dm::Age => VariableSpec::new("AGE", "Age", Integer),
            Dm::Ageu => VariableSpec::new("AGEU", "Age Units", Text).with_length(10),
            Dm::Sex => VariableSpec::new("SEX", "Sex", Text).with_length(2),
            Dm::Race => VariableSpec::new("RACE", "Race", Text).with_length(100),
            Dm::Ethnic => VariableSpec::new("ETHNIC", "Ethnicity", Text).with_length(60),
            Dm::Armcd => {
                VariableSpec::new("ARMCD", "Planned Arm Code", Text).with_length(20)
            }
            Dm::Arm => {
                VariableSpec::new("ARM", "Description of Planned Arm", Text).with_length(200)
            }
            Dm::Country => VariableSpec::new("COUNTRY", "Country", Text).with_length(3),
        }
    }
}

/// Builds the DM export definition.
///
/// Participants are the leaf level, so DM has no sequence variable.
pub fn definition<O: DomainObject + 'static>() -> Result<ExportDefinition<Dm, O>, ConfigurationError> {
    ExportDefinition::builder("DM", "Demographics")
        .domain_variable(Dm::Domain)
        .node(NodeDescriptor::root(STUDY, PARTICIPANTS_RELATION))
        .node(NodeDescriptor::leaf(PARTICIPANT, STUDY_RELATION))
        .visitor(STUDY, visit_study::<O>)
        .visitor(PARTICIPANT, visit_participant::<O>)
        .constant(Dm::Ageu, "YEARS")
        .sort_by(Dm::Usubjid, SortOrder::Ascending)
        .build()
}

fn visit_study<O: DomainObject>(study: &O) -> Result<PartialRecord<Dm>> {
    Ok(PartialRecord::new().with(Dm::Studyid, study_id(study)?))
}

fn visit_participant<O: DomainObject>(participant: &O) -> Result<PartialRecord<Dm>> {
    Ok(PartialRecord::new()
        .with(Dm::Usubjid, usubjid(participant)?)
        .with(Dm::Subjid, required(participant, "subject_id")?)
        .with(Dm::Siteid, optional(participant, "site_id"))
        .with(Dm::Brthdtc, optional(participant, "birth_date"))
        .with(Dm::Age, optional(participant, "age"))
        .with(Dm::Sex, optional(participant, "sex"))
        .with(Dm::Race, optional(participant, "race"))
        .with(Dm::Ethnic, optional(participant, "ethnicity"))
        .with(Dm::Armcd, optional(participant, "arm_code"))
        .with(Dm::Arm, optional(participant, "arm"))
        .with(Dm::Country, country(participant)))
}

/// Country codes are written upper-case.
fn country<O: DomainObject>(participant: &O) -> Value {
    match optional(participant, "country") {
        Value::Text(code) => Value::Text(code.trim().to_ascii_uppercase()),
        other => other,
    }
}
