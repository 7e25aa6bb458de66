//! End-to-end library scenarios: parse an upload, match a table, validate the
//! rows, and hand the batch to a writer.

mod common;

use common::{INVOICE_CATALOG_YAML, TestWorkspace, invoice_catalog};
use production_import::{
    ImportError,
    catalog::Catalog,
    data::Value,
    import::Importer,
    match_table,
    parser::parse_str,
    validate_rows,
    writer::{JsonFileWriter, MemoryWriter},
};

const INVOICE_UPLOAD: &str = "\
vendor,amount,status,date_issued
Acme,1000,,2025-10-01
,250,paid,2025-10-02
Globex,abc,,2025-10-03
Initech,75.5,paid,10/04/2025
";

#[test]
fn invoice_upload_matches_and_coerces() {
    let catalog = invoice_catalog();
    let sheet = parse_str(INVOICE_UPLOAD, b',').expect("parse upload");
    let matched = match_table(&sheet.headers, &catalog);
    assert_eq!(matched.table_name(), Some("invoices"));
    assert_eq!(matched.match_count, 4);
    assert!(matched.has_required_columns());

    let report = validate_rows(matched.table.unwrap(), &sheet.rows, Some("ctx-42"))
        .expect("validate rows");
    assert_eq!(report.accepted_count(), 2);
    assert_eq!(report.skipped_count(), 2);
    assert_eq!(
        report.skipped.iter().map(|s| s.line).collect::<Vec<_>>(),
        vec![3, 4]
    );

    let first = &report.rows[0];
    assert_eq!(first.project_id, "ctx-42");
    assert_eq!(first.get("vendor"), Some(&Value::String("Acme".into())));
    assert_eq!(first.get("amount"), Some(&Value::Numeric(1000.0)));
    assert_eq!(first.get("status"), None);
    assert_eq!(
        first.get("date_issued").map(|v| v.as_display()).as_deref(),
        Some("2025-10-01T00:00:00.000Z")
    );
    assert_eq!(
        report.rows[1].get("date_issued").map(|v| v.as_display()).as_deref(),
        Some("2025-10-04T00:00:00.000Z")
    );
}

#[test]
fn unknown_headers_match_nothing() {
    let catalog = invoice_catalog();
    let sheet = parse_str("foo,bar\n1,2\n", b',').unwrap();
    let matched = match_table(&sheet.headers, &catalog);
    assert!(matched.table.is_none());
    assert_eq!(matched.match_count, 0);
}

#[test]
fn missing_project_produces_no_rows() {
    let catalog = invoice_catalog();
    let importer = Importer::new(&catalog);
    let sheet = parse_str(INVOICE_UPLOAD, b',').unwrap();
    let mut writer = MemoryWriter::default();
    let err = importer.execute(&sheet, None, &mut writer).unwrap_err();
    assert!(matches!(err, ImportError::MissingProjectContext));
    assert!(writer.batches.is_empty());
}

#[test]
fn json_writer_receives_the_whole_batch() {
    let workspace = TestWorkspace::new();
    let catalog_path = workspace.write("catalog.yml", INVOICE_CATALOG_YAML);
    let catalog = Catalog::load(&catalog_path).expect("load catalog");
    assert_eq!(catalog, invoice_catalog());

    let importer = Importer::new(&catalog).with_project(Some("ctx".into()));
    let sheet = importer
        .parse(INVOICE_UPLOAD.as_bytes(), "invoices.csv")
        .unwrap();
    let output = workspace.path().join("batch.json");
    let mut writer = JsonFileWriter::new(Some(output.clone()));
    let outcome = importer.execute(&sheet, None, &mut writer).unwrap();
    assert!(outcome.written);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["table"], "invoices");
    let rows = json["rows"].as_array().expect("rows array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["project_id"], "ctx");
    assert_eq!(rows[0]["amount"], 1000);
    assert!(rows[0]["status"].is_null());
    assert!(rows[0].get("id").is_none());
    assert!(rows[0].get("created_at").is_none());
}

#[test]
fn catalog_round_trips_through_yaml() {
    let workspace = TestWorkspace::new();
    let path = workspace.path().join("builtin.yml");
    let builtin = Catalog::builtin().unwrap();
    builtin.save(&path).unwrap();
    assert_eq!(Catalog::load(&path).unwrap(), builtin);
}

#[test]
fn non_csv_upload_is_rejected_before_parsing() {
    let catalog = invoice_catalog();
    let importer = Importer::new(&catalog);
    let err = importer
        .parse(b"PK\x03\x04", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        .unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedContentType { .. }));
}
