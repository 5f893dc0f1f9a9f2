//! End-to-end traversal tests over an in-memory study graph.

use anyhow::{Result, anyhow};
use sdtm_core::{
    ChildOrdering, DomainObject, ExportDefinition, ExportDefinitionBuilder, Exporter,
    MemoryObject, NodeDescriptor, SortOrder,
};
use sdtm_model::{
    ConfigurationError, ExportError, PartialRecord, TraversalError, Value, Variable, VariableSpec,
    VariableType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Cm {
    Studyid,
    Domain,
    Usubjid,
    Cmseq,
    Cmtrt,
    Cmdose,
    Cmstdtc,
    Source,
}

impl Variable for Cm {
    const ALL: &'static [Self] = &[
        Cm::Studyid,
        Cm::Domain,
        Cm::Usubjid,
        Cm::Cmseq,
        Cm::Cmtrt,
        Cm::Cmdose,
        Cm::Cmstdtc,
        Cm::Source,
    ];

    fn spec(self) -> VariableSpec {
        match self {
            Cm::Studyid => VariableSpec::new("STUDYID", "Study Identifier", VariableType::String),
            Cm::Domain => VariableSpec::new("DOMAIN", "Domain Abbreviation", VariableType::String),
            Cm::Usubjid => {
                VariableSpec::new("USUBJID", "Unique Subject Identifier", VariableType::String)
            }
            Cm::Cmseq => VariableSpec::new("CMSEQ", "Sequence Number", VariableType::Integer),
            Cm::Cmtrt => {
                VariableSpec::new("CMTRT", "Reported Name of Drug", VariableType::String)
            }
            Cm::Cmdose => VariableSpec::new("CMDOSE", "Dose per Administration", VariableType::Float),
            Cm::Cmstdtc => {
                VariableSpec::new("CMSTDTC", "Start Date/Time of Medication", VariableType::Date)
            }
            Cm::Source => VariableSpec::new("SOURCE", "Data Source", VariableType::String),
        }
    }
}

fn text(object: &MemoryObject, name: &str) -> Result<Value> {
    object
        .attribute(name)
        .ok_or_else(|| anyhow!("missing attribute '{name}'"))
}

fn visit_study(study: &MemoryObject) -> Result<PartialRecord<Cm>> {
    Ok(PartialRecord::new().with(Cm::Studyid, text(study, "name")?))
}

fn visit_participant(participant: &MemoryObject) -> Result<PartialRecord<Cm>> {
    Ok(PartialRecord::new().with(Cm::Usubjid, text(participant, "subject_id")?))
}

fn visit_medication(medication: &MemoryObject) -> Result<PartialRecord<Cm>> {
    Ok(PartialRecord::new()
        .with(Cm::Cmtrt, text(medication, "name")?)
        .with(Cm::Cmdose, medication.attribute("dose"))
        .with(Cm::Cmstdtc, medication.attribute("start")))
}

fn builder() -> ExportDefinitionBuilder<Cm, MemoryObject> {
    ExportDefinition::builder("CM", "Concomitant Medications")
        .domain_variable(Cm::Domain)
        .sequence_variable(Cm::Cmseq)
        .node(NodeDescriptor::root("Study", "participants"))
        .node(NodeDescriptor::branch("Participant", "medications", "study"))
        .node(NodeDescriptor::leaf("Medication", "participant"))
        .visitor("Study", visit_study)
        .visitor("Participant", visit_participant)
        .visitor("Medication", visit_medication)
}

fn definition() -> ExportDefinition<Cm, MemoryObject> {
    builder().build().expect("valid definition")
}

fn study() -> MemoryObject {
    MemoryObject::new("Study", "1")
        .with_attribute("name", "CDISCPILOT01")
        .with_relation("participants")
}

fn participant(study: &MemoryObject, id: &str, subject_id: &str) -> MemoryObject {
    let participant = MemoryObject::new("Participant", id)
        .with_attribute("subject_id", subject_id)
        .with_relation("medications");
    study.add_child("participants", &participant, "study");
    participant
}

fn medication(participant: &MemoryObject, id: &str, name: &str, dose: f64) -> MemoryObject {
    let medication = MemoryObject::new("Medication", id)
        .with_attribute("name", name)
        .with_attribute("dose", dose)
        .with_attribute("start", "2024-01-15");
    participant.add_child("medications", &medication, "participant");
    medication
}

fn sequences(records: &[sdtm_model::FlatRecord<Cm>]) -> Vec<Value> {
    records.iter().map(|record| record.get(Cm::Cmseq).clone()).collect()
}

#[test]
fn one_participant_two_medications() {
    let root = study();
    let subject = participant(&root, "10", "CDISCPILOT01-001");
    medication(&subject, "100", "ASPIRIN", 81.0);
    medication(&subject, "101", "IBUPROFEN", 200.0);

    let definition = definition();
    let dataset = Exporter::new(&definition, root).export().unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.domain().as_str(), "CM");
    assert_eq!(dataset.label(), "Concomitant Medications");
    assert_eq!(dataset.root().as_str(), "1");
    let records = dataset.records();
    assert_eq!(sequences(records), vec![Value::Integer(1), Value::Integer(2)]);
    for record in records {
        assert_eq!(record.get(Cm::Studyid), &Value::from("CDISCPILOT01"));
        assert_eq!(record.get(Cm::Usubjid), &Value::from("CDISCPILOT01-001"));
        assert_eq!(record.get(Cm::Domain), &Value::from("CM"));
        assert_eq!(record.get(Cm::Source), &Value::Null);
    }
    assert_eq!(records[0].get(Cm::Cmtrt), &Value::from("ASPIRIN"));
    assert_eq!(records[1].get(Cm::Cmtrt), &Value::from("IBUPROFEN"));
    assert_eq!(records[1].get(Cm::Cmdose), &Value::Float(200.0));
    assert_eq!(records[1].source().as_str(), "101");
}

#[test]
fn sequence_restarts_for_each_parent() {
    let root = study();
    let first = participant(&root, "10", "001");
    medication(&first, "100", "A", 1.0);
    medication(&first, "101", "B", 1.0);
    medication(&first, "102", "C", 1.0);
    let second = participant(&root, "11", "002");
    medication(&second, "103", "D", 1.0);
    medication(&second, "104", "E", 1.0);

    let definition = definition();
    let dataset = Exporter::new(&definition, root).export().unwrap();

    let seq: Vec<u32> = dataset.records().iter().map(|r| r.sequence()).collect();
    assert_eq!(seq, vec![1, 2, 3, 1, 2]);
    assert_eq!(
        sequences(dataset.records()),
        vec![1, 2, 3, 1, 2].into_iter().map(Value::Integer).collect::<Vec<_>>()
    );
}

#[test]
fn empty_collections_yield_no_records() {
    let root = study();
    let definition = definition();
    let exporter = Exporter::new(&definition, root.clone());
    assert!(exporter.export().unwrap().is_empty());

    participant(&root, "10", "001");
    let with_participant = exporter.export().unwrap();
    assert!(with_participant.is_empty());

    let subject = participant(&root, "11", "002");
    medication(&subject, "100", "A", 1.0);
    assert_eq!(exporter.export().unwrap().len(), 1);
}

#[test]
fn re_export_reflects_store_changes() {
    let root = study();
    let subject = participant(&root, "10", "001");
    medication(&subject, "100", "A", 1.0);
    let definition = definition();
    let exporter = Exporter::new(&definition, root);

    let before = exporter.export().unwrap();
    assert_eq!(before, exporter.export().unwrap());

    medication(&subject, "101", "B", 2.0);
    assert_eq!(exporter.export().unwrap().len(), 2);

    subject.clear_children("medications");
    assert!(exporter.export().unwrap().is_empty());
}

#[test]
fn constants_are_written_to_every_row() {
    let root = study();
    let subject = participant(&root, "10", "001");
    medication(&subject, "100", "A", 1.0);
    medication(&subject, "101", "B", 1.0);
    let definition = builder().constant(Cm::Source, "EDC").build().unwrap();

    let dataset = Exporter::new(&definition, root).export().unwrap();
    assert!(
        dataset
            .records()
            .iter()
            .all(|record| record.get(Cm::Source) == &Value::from("EDC"))
    );
}

#[test]
fn sorting_keeps_traversal_sequence_numbers() {
    let root = study();
    let subject = participant(&root, "10", "001");
    medication(&subject, "100", "ASPIRIN", 1.0);
    medication(&subject, "101", "ZINC", 1.0);
    medication(&subject, "102", "METFORMIN", 1.0);
    let definition = builder()
        .sort_by(Cm::Cmtrt, SortOrder::Descending)
        .build()
        .unwrap();

    let dataset = Exporter::new(&definition, root).export().unwrap();
    let names: Vec<String> = dataset
        .records()
        .iter()
        .map(|record| record.get(Cm::Cmtrt).to_string())
        .collect();
    assert_eq!(names, vec!["ZINC", "METFORMIN", "ASPIRIN"]);
    let seq: Vec<u32> = dataset.records().iter().map(|r| r.sequence()).collect();
    assert_eq!(seq, vec![2, 3, 1]);
}

#[test]
fn sorting_by_several_keys() {
    let root = study();
    let second = participant(&root, "11", "002");
    medication(&second, "100", "MAYBE", 1.0);
    medication(&second, "101", "NO", 1.0);
    let first = participant(&root, "10", "001");
    medication(&first, "102", "YES", 1.0);
    let definition = builder()
        .sort_by(Cm::Usubjid, SortOrder::Ascending)
        .sort_by(Cm::Cmtrt, SortOrder::Descending)
        .build()
        .unwrap();

    let dataset = Exporter::new(&definition, root).export().unwrap();
    let names: Vec<String> = dataset
        .records()
        .iter()
        .map(|record| record.get(Cm::Cmtrt).to_string())
        .collect();
    assert_eq!(names, vec!["YES", "NO", "MAYBE"]);
}

#[test]
fn identity_ordering_sorts_children_before_numbering() {
    let root = study();
    let subject = participant(&root, "10", "001");
    medication(&subject, "20", "LATER", 1.0);
    medication(&subject, "3", "EARLIER", 1.0);
    let definition = builder()
        .child_ordering(ChildOrdering::ByIdentity)
        .build()
        .unwrap();

    let dataset = Exporter::new(&definition, root).export().unwrap();
    let first = &dataset.records()[0];
    assert_eq!(first.get(Cm::Cmtrt), &Value::from("EARLIER"));
    assert_eq!(first.sequence(), 1);
}

#[test]
fn unknown_named_variable_fails_the_export() {
    let root = study();
    let subject = participant(&root, "10", "001");
    medication(&subject, "100", "A", 1.0);
    let definition = ExportDefinition::builder("CM", "Concomitant Medications")
        .node(NodeDescriptor::root("Study", "participants"))
        .node(NodeDescriptor::branch("Participant", "medications", "study"))
        .node(NodeDescriptor::leaf("Medication", "participant"))
        .visitor("Study", visit_study)
        .visitor("Participant", visit_participant)
        .visitor("Medication", |_: &MemoryObject| {
            anyhow::Ok(PartialRecord::<Cm>::new().with_named("CMROUTE", "ORAL"))
        })
        .build()
        .unwrap();

    let err = Exporter::new(&definition, root).export().unwrap_err();
    assert!(matches!(
        err,
        ExportError::Configuration(ConfigurationError::UnknownVariable { ref name, ref record_type })
            if name == "CMROUTE" && record_type == "Medication"
    ));
}

#[test]
fn overlapping_levels_fail_the_export() {
    let root = study();
    let subject = participant(&root, "10", "001");
    medication(&subject, "100", "A", 1.0);
    let definition = ExportDefinition::builder("CM", "Concomitant Medications")
        .node(NodeDescriptor::root("Study", "participants"))
        .node(NodeDescriptor::branch("Participant", "medications", "study"))
        .node(NodeDescriptor::leaf("Medication", "participant"))
        .visitor("Study", visit_study)
        .visitor("Participant", |participant: &MemoryObject| {
            anyhow::Ok(visit_participant(participant)?.with(Cm::Studyid, "OTHER"))
        })
        .visitor("Medication", visit_medication)
        .build()
        .unwrap();

    let err = Exporter::new(&definition, root).export().unwrap_err();
    assert!(matches!(
        err,
        ExportError::Configuration(ConfigurationError::ConflictingValue { .. })
    ));
}

#[test]
fn visitors_may_not_set_the_sequence_variable() {
    let root = study();
    let subject = participant(&root, "10", "001");
    medication(&subject, "100", "A", 1.0);
    let definition = ExportDefinition::builder("CM", "Concomitant Medications")
        .sequence_variable(Cm::Cmseq)
        .node(NodeDescriptor::root("Study", "participants"))
        .node(NodeDescriptor::branch("Participant", "medications", "study"))
        .node(NodeDescriptor::leaf("Medication", "participant"))
        .visitor("Study", visit_study)
        .visitor("Participant", visit_participant)
        .visitor("Medication", |medication: &MemoryObject| {
            anyhow::Ok(visit_medication(medication)?.with(Cm::Cmseq, 9_i64))
        })
        .build()
        .unwrap();

    let err = Exporter::new(&definition, root).export().unwrap_err();
    assert!(matches!(
        err,
        ExportError::Configuration(ConfigurationError::ReservedVariable { .. })
    ));
}

#[test]
fn visitor_failure_names_the_instance() {
    let root = study();
    let subject = MemoryObject::new("Participant", "10").with_relation("medications");
    root.add_child("participants", &subject, "study");

    let definition = definition();
    let err = Exporter::new(&definition, root).export().unwrap_err();
    match err {
        ExportError::Traversal(TraversalError::Visitor {
            record_type,
            identity,
            source,
        }) => {
            assert_eq!(record_type, "Participant");
            assert_eq!(identity.as_str(), "10");
            assert_eq!(source.to_string(), "missing attribute 'subject_id'");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unresolvable_relation_is_a_traversal_error() {
    let root = study();
    let subject = MemoryObject::new("Participant", "10").with_attribute("subject_id", "001");
    root.add_child("participants", &subject, "study");

    let definition = definition();
    let err = Exporter::new(&definition, root).export().unwrap_err();
    assert!(matches!(
        err,
        ExportError::Traversal(TraversalError::Relation { ref relation, .. }) if relation == "medications"
    ));
}

#[test]
fn wrong_record_type_in_collection() {
    let root = study();
    let stray = MemoryObject::new("Site", "5");
    root.add_child("participants", &stray, "study");

    let definition = definition();
    let err = Exporter::new(&definition, root).export().unwrap_err();
    assert!(matches!(
        err,
        ExportError::Traversal(TraversalError::UnexpectedRecordType { level: 1, .. })
    ));
}

#[test]
fn subtree_of_a_leaf_keeps_its_position() {
    let root = study();
    let subject = participant(&root, "10", "001");
    medication(&subject, "100", "A", 1.0);
    let second = medication(&subject, "101", "B", 2.0);

    let definition = definition();
    let dataset = Exporter::new(&definition, root)
        .export_subtree(&second)
        .unwrap();

    assert_eq!(dataset.len(), 1);
    let record = &dataset.records()[0];
    assert_eq!(record.get(Cm::Cmtrt), &Value::from("B"));
    assert_eq!(record.get(Cm::Cmseq), &Value::Integer(2));
    assert_eq!(record.get(Cm::Studyid), &Value::from("CDISCPILOT01"));
    assert_eq!(record.get(Cm::Usubjid), &Value::from("001"));
}

#[test]
fn subtree_of_a_participant_exports_only_its_rows() {
    let root = study();
    let first = participant(&root, "10", "001");
    medication(&first, "100", "A", 1.0);
    let second = participant(&root, "11", "002");
    medication(&second, "101", "B", 1.0);
    medication(&second, "102", "C", 1.0);

    let definition = definition();
    let dataset = Exporter::new(&definition, root)
        .export_subtree(&second)
        .unwrap();

    assert_eq!(dataset.len(), 2);
    assert!(
        dataset
            .records()
            .iter()
            .all(|record| record.get(Cm::Usubjid) == &Value::from("002"))
    );
}

#[test]
fn subtree_rejects_root_and_foreign_nodes() {
    let root = study();
    let definition = definition();
    let exporter = Exporter::new(&definition, root.clone());

    let err = exporter.export_subtree(&root).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Traversal(TraversalError::SubtreeIsRoot { .. })
    ));

    let other_study = MemoryObject::new("Study", "2")
        .with_attribute("name", "OTHER")
        .with_relation("participants");
    let stranger = participant(&other_study, "20", "900");
    let foreign = medication(&stranger, "200", "X", 1.0);
    let err = exporter.export_subtree(&foreign).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Traversal(TraversalError::ForeignSubtree { .. })
    ));
}

#[test]
fn subtree_needs_a_parent() {
    let root = study();
    let orphan = MemoryObject::new("Medication", "300").with_attribute("name", "A");
    let definition = definition();

    let err = Exporter::new(&definition, root)
        .export_subtree(&orphan)
        .unwrap_err();
    assert!(matches!(
        err,
        ExportError::Traversal(TraversalError::MissingParent { .. })
    ));
}

#[test]
fn builder_requires_a_visitor_per_level() {
    let err = ExportDefinition::<Cm, MemoryObject>::builder("CM", "Concomitant Medications")
        .node(NodeDescriptor::root("Study", "participants"))
        .node(NodeDescriptor::leaf("Participant", "study"))
        .visitor("Study", visit_study)
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::MissingVisitor { ref record_type } if record_type == "Participant"));
}

#[test]
fn builder_rejects_constant_on_derived_variable() {
    let err = builder().constant(Cm::Cmseq, 1_i64).build().unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::ConstantOnDerivedVariable { .. }
    ));
}

#[test]
fn builder_rejects_shared_domain_and_sequence_variable() {
    let err = builder().sequence_variable(Cm::Domain).build().unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::DomainVariableIsSequence { .. }
    ));
}

#[test]
fn builder_rejects_bad_domain_code() {
    let err = ExportDefinition::<Cm, MemoryObject>::builder("", "Nothing")
        .nodes(vec![NodeDescriptor::single("Study")])
        .visitor("Study", visit_study)
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidDomainCode(_)));
}
