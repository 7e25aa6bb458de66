mod common;

use std::collections::BTreeMap;

use common::invoice_catalog;
use production_import::{
    catalog::{Catalog, ColumnSpec, ColumnType, SchemaTable},
    data::coerce,
    match_table,
    matcher::match_count,
    parser::{ParsedRow, parse_str},
    validate_rows,
};
use proptest::prelude::*;

fn column_type() -> impl Strategy<Value = ColumnType> {
    prop_oneof![
        Just(ColumnType::String),
        Just(ColumnType::Integer),
        Just(ColumnType::BigInt),
        Just(ColumnType::Numeric),
        Just(ColumnType::Date),
        Just(ColumnType::Timestamp),
        Just(ColumnType::TimestampTz),
    ]
}

fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[A-Za-z ]{1,8}",
        "-?[0-9]{1,6}",
        "[0-9]{1,4}\\.[0-9]{1,3}",
        "20[0-9]{2}-0[1-9]-[0-2][1-9]",
    ]
}

fn header_pool() -> Vec<&'static str> {
    vec![
        "vendor", "amount", "status", "date_issued", "name", "role", "foo", "bar",
    ]
}

proptest! {
    #[test]
    fn coercion_never_panics_and_yields_canonical_values(
        raw in proptest::option::of(".{0,24}"),
        ty in column_type()
    ) {
        if let Some(value) = coerce(raw.as_deref(), ty) {
            prop_assert!(value.conforms_to(ty));
        }
    }

    #[test]
    fn parsing_is_idempotent(
        rows in proptest::collection::vec(proptest::collection::vec(cell(), 3), 0..8)
    ) {
        let mut content = String::from("a,b,c\n");
        for row in &rows {
            content.push_str(&row.join(","));
            content.push('\n');
        }
        let first = parse_str(&content, b',').unwrap();
        let second = parse_str(&content, b',').unwrap();
        prop_assert_eq!(&first, &second);

        let rendered = first.to_csv_string(b',').unwrap();
        let reparsed = parse_str(&rendered, b',').unwrap();
        prop_assert_eq!(&reparsed.headers, &first.headers);
        let cells = |rows: &[ParsedRow]| rows.iter().map(|r| r.cells().clone()).collect::<Vec<_>>();
        prop_assert_eq!(cells(&reparsed.rows), cells(&first.rows));
    }

    #[test]
    fn matching_is_deterministic(
        picks in proptest::collection::vec(0usize..8, 0..8)
    ) {
        let catalog = Catalog::builtin().unwrap();
        let pool = header_pool();
        let headers = picks.iter().map(|i| pool[*i].to_string()).collect::<Vec<_>>();
        prop_assert_eq!(match_table(&headers, &catalog), match_table(&headers, &catalog));
    }

    #[test]
    fn adding_a_matching_header_never_lowers_the_count(
        picks in proptest::collection::vec(0usize..8, 0..8),
        extra in 0usize..4
    ) {
        let catalog = invoice_catalog();
        let invoices = catalog.get("invoices").unwrap();
        let pool = header_pool();
        let mut headers = picks.iter().map(|i| pool[*i].to_string()).collect::<Vec<_>>();
        let before = match_count(&headers, invoices);
        headers.push(["vendor", "amount", "status", "date_issued"][extra].to_string());
        prop_assert!(match_count(&headers, invoices) >= before);
    }

    #[test]
    fn accepted_rows_have_required_values_and_keep_order(
        rows in proptest::collection::vec(
            (cell(), cell(), cell()),
            0..12
        )
    ) {
        let table = SchemaTable::new(
            "ledger",
            vec![
                ColumnSpec::new("label", ColumnType::String, true),
                ColumnSpec::new("qty", ColumnType::Integer, true),
                ColumnSpec::new("booked", ColumnType::Date, false),
            ],
        );
        let parsed = rows
            .iter()
            .enumerate()
            .map(|(idx, (label, qty, booked))| {
                let cells = [("label", label), ("qty", qty), ("booked", booked)]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), (!v.trim().is_empty()).then(|| v.clone())))
                    .collect::<BTreeMap<_, _>>();
                ParsedRow::new(idx as u64 + 2, cells)
            })
            .collect::<Vec<_>>();

        let report = validate_rows(&table, &parsed, Some("p")).unwrap();
        prop_assert_eq!(report.accepted_count() + report.skipped_count(), parsed.len());
        for row in &report.rows {
            prop_assert!(row.get("label").is_some());
            prop_assert!(row.get("qty").is_some());
            prop_assert_eq!(row.project_id.as_str(), "p");
        }

        let expected_labels = parsed
            .iter()
            .filter(|row| row.get("label").is_some()
                && coerce(row.get("qty"), ColumnType::Integer).is_some())
            .map(|row| row.get("label").unwrap().to_string())
            .collect::<Vec<_>>();
        let labels = report
            .rows
            .iter()
            .map(|row| row.get("label").unwrap().as_display())
            .collect::<Vec<_>>();
        prop_assert_eq!(labels, expected_labels);
    }
}
