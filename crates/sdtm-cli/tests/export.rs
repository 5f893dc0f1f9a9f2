//! End-to-end `export` runs against the pilot study graph.

use std::fs;
use std::path::PathBuf;

use sdtm_cli::export::{ExportRequest, OutputFormat, run_export};
use sdtm_report::CsvOptions;
use sdtm_standards::StandardDomain;

fn pilot_graph() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/pilot_study.json")
}

#[test]
fn writes_csv_and_json_named_after_the_domain() {
    let dir = tempfile::tempdir().unwrap();
    let request = ExportRequest::new(StandardDomain::Cm, pilot_graph(), dir.path());

    let result = run_export(&request).unwrap();

    assert_eq!(result.study, "S1");
    assert_eq!(result.domains.len(), 1);
    let summary = &result.domains[0];
    assert_eq!(summary.domain_code, "CM");
    assert_eq!(summary.records, 3);
    assert_eq!(summary.outputs.csv, Some(dir.path().join("cm.csv")));
    assert_eq!(summary.outputs.json, Some(dir.path().join("cm.json")));

    let csv = fs::read_to_string(dir.path().join("cm.csv")).unwrap();
    insta::assert_snapshot!(csv.trim_end(), @r"
    STUDYID,DOMAIN,USUBJID,CMSEQ,CMTRT,CMINDC,CMDOSE,CMDOSU,CMROUTE,CMSTDTC,CMENDTC
    PILOT01,CM,PILOT01-001,1,ASPIRIN,Prophylaxis,81,mg,ORAL,2023-11-02,
    PILOT01,CM,PILOT01-001,2,LISINOPRIL,Hypertension,10,mg,ORAL,2022,
    PILOT01,CM,PILOT01-002,1,METFORMIN,Type 2 diabetes,500,mg,ORAL,2021-06,
    ");

    let json: serde_json::Value =
        serde_json::from_slice(&fs::read(dir.path().join("cm.json")).unwrap()).unwrap();
    let group = &json["clinicalData"]["itemGroupData"]["IG.CM"];
    assert_eq!(group["records"], 3);
    assert_eq!(json["clinicalData"]["studyOID"], "S1");
}

#[test]
fn single_format_writes_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut request = ExportRequest::new(StandardDomain::Ae, pilot_graph(), dir.path());
    request.formats = vec![OutputFormat::Json];
    request.json.study_oid = Some("STUDY.PILOT01".to_string());

    let result = run_export(&request).unwrap();

    assert_eq!(result.domains[0].outputs.csv, None);
    assert!(!dir.path().join("ae.csv").exists());
    let json: serde_json::Value =
        serde_json::from_slice(&fs::read(dir.path().join("ae.json")).unwrap()).unwrap();
    assert_eq!(json["clinicalData"]["studyOID"], "STUDY.PILOT01");
    assert_eq!(json["clinicalData"]["metaDataVersionOID"], "STUDY.PILOT01");
}

#[test]
fn output_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("out").join("sdtm");
    let mut request = ExportRequest::new(StandardDomain::Dm, pilot_graph(), &output_dir);
    request.formats = vec![OutputFormat::Csv];

    let result = run_export(&request).unwrap();

    assert_eq!(result.domains[0].records, 2);
    assert!(output_dir.join("dm.csv").is_file());
}

#[test]
fn transposing_many_records_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let mut request = ExportRequest::new(StandardDomain::Dm, pilot_graph(), dir.path());
    request.formats = vec![OutputFormat::Csv];
    request.csv = CsvOptions::default().transposed();

    let error = run_export(&request).unwrap_err();

    assert!(format!("{error:#}").contains("exactly one record"), "{error:#}");
    assert!(!dir.path().join("dm.csv").exists());
}

#[test]
fn missing_graph_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let graph = dir.path().join("absent.json");
    let request = ExportRequest::new(StandardDomain::Cm, &graph, dir.path());

    let error = run_export(&request).unwrap_err();

    assert!(error.to_string().contains("load object graph"));
    assert!(error.to_string().contains("absent.json"));
}

#[test]
fn failed_render_writes_no_format() {
    let dir = tempfile::tempdir().unwrap();
    let mut request = ExportRequest::new(StandardDomain::Dm, pilot_graph(), dir.path());
    request.formats = vec![OutputFormat::Json, OutputFormat::Csv];
    request.csv = CsvOptions::default().transposed();

    let error = run_export(&request).unwrap_err();

    assert!(format!("{error:#}").contains("exactly one record"), "{error:#}");
    assert!(!dir.path().join("dm.json").exists());
    assert!(!dir.path().join("dm.csv").exists());
}
