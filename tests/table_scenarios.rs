use pretty_assertions::assert_eq;
use proptest::prelude::*;

use sheet_table::excel::{CellValue, Sheet};
use sheet_table::table::{Range, Record, RowOutcome, SheetAccess, Table};
use sheet_table::utils::parse_range;

fn header_only(frozen_rows: usize) -> Sheet {
    Sheet::from_rows("People", vec![vec!["id".into(), "name".into()]]).with_frozen_rows(frozen_rows)
}

/// Sheet with `frozen` frozen rows (header on the last one) and `data_rows` records.
fn sheet_with(frozen: usize, data_rows: usize, headers: &[&str]) -> Sheet {
    let header_row = frozen.max(1);
    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for row in 1..header_row {
        rows.push(vec![CellValue::text(format!("banner {}", row))]);
    }
    rows.push(headers.iter().map(|h| CellValue::text(*h)).collect());
    for i in 0..data_rows {
        rows.push(
            (0..headers.len())
                .map(|col| CellValue::Int((i * 10 + col) as i64))
                .collect(),
        );
    }
    Sheet::from_rows("Data", rows).with_frozen_rows(frozen)
}

#[test]
fn add_then_list_all_records() {
    let mut table = Table::new(header_only(1)).unwrap();
    let rows = table
        .add_records(&[
            Record::new().with("id", 1).with("name", "A"),
            Record::new().with("id", 2).with("name", "B"),
        ])
        .unwrap();
    assert_eq!(rows, vec![2, 3]);

    let records = table.all_records().unwrap().into_records();
    assert_eq!(
        records,
        vec![
            Record::at_row(2).with("id", 1).with("name", "A"),
            Record::at_row(3).with("id", 2).with("name", "B"),
        ]
    );
}

#[test]
fn deleting_the_header_row_changes_nothing() {
    let mut table = Table::new(sheet_with(1, 2, &["id", "name"])).unwrap();
    let before = table.sheet().last_row();

    let outcome = table.delete_records(&Range::new(1, 1, 1, 2)).unwrap();

    assert!(!outcome.is_deleted());
    assert_eq!(table.sheet().last_row(), before);
    assert_eq!(table.all_records().unwrap().len(), 2);
}

#[test]
fn update_rewrites_only_the_target_row() {
    let mut sheet = sheet_with(1, 3, &["id", "name"]);
    let untouched: Vec<_> = [1, 3, 4].iter().map(|&r| sheet.row_values(r)).collect();

    let mut table = Table::new(&mut sheet).unwrap();
    table
        .update_record(2, &Record::new().with("id", 1).with("name", "Z"))
        .unwrap();

    assert_eq!(sheet.row_values(2), vec![CellValue::Int(1), CellValue::text("Z")]);
    let after: Vec<_> = [1, 3, 4].iter().map(|&r| sheet.row_values(r)).collect();
    assert_eq!(after, untouched);
}

#[test]
fn rows_shorter_than_the_headers_are_skipped() {
    let table = Table::new(sheet_with(0, 2, &["a", "b"])).unwrap();
    let raw = vec![vec![CellValue::Int(1)], vec![CellValue::Int(1), CellValue::Int(2)]];

    let outcomes: Vec<_> = raw
        .iter()
        .enumerate()
        .map(|(i, row)| table.make_record(row, i + 2).is_ok())
        .collect();
    assert_eq!(outcomes, vec![false, true]);
}

#[test]
fn row_selector_at_the_usize_limit_deletes_nothing() {
    let mut table = Table::new(sheet_with(1, 3, &["a", "b"])).unwrap();
    assert!(parse_range("2:18446744073709551615", 2).is_err());

    let huge = Range::new(2, 1, u64::MAX as usize, 2);
    let outcome = table.delete_records(&huge).unwrap();
    assert!(!outcome.is_deleted());
    assert_eq!(table.all_records().unwrap().len(), 3);
}

#[test]
fn records_range_reads_past_last_row_as_blank_records() {
    let table = Table::new(sheet_with(0, 1, &["a", "b"])).unwrap();
    let batch = table.records(&Range::new(2, 1, 2, 1)).unwrap();

    assert_eq!(batch.len(), 2);
    match &batch.outcomes()[1] {
        RowOutcome::Read(record) => {
            assert_eq!(record.row_index(), Some(3));
            assert!(record.fields().values().all(CellValue::is_empty));
        }
        other => panic!("expected a blank record, got {:?}", other),
    }
}

proptest! {
    #[test]
    fn all_records_keys_are_exactly_the_headers(frozen in 0usize..4, data_rows in 0usize..12, width in 1usize..6) {
        let headers: Vec<String> = (0..width).map(|i| format!("h{}", i)).collect();
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        let table = Table::new(sheet_with(frozen, data_rows, &header_refs)).unwrap();

        let records = table.all_records().unwrap().into_records();
        prop_assert_eq!(records.len(), data_rows);
        for (i, record) in records.iter().enumerate() {
            prop_assert_eq!(record.headers().collect::<Vec<_>>(), header_refs.clone());
            prop_assert_eq!(record.row_index(), Some(table.first_record_index() + i));
        }
    }

    #[test]
    fn first_record_index_follows_frozen_rows(frozen in 0usize..20) {
        let table = Table::new(sheet_with(frozen, 1, &["a"])).unwrap();
        let expected = if frozen > 0 { frozen + 1 } else { 2 };
        prop_assert_eq!(table.first_record_index(), expected);
    }

    #[test]
    fn within_record_range_matches_bounds(
        frozen in 0usize..4,
        data_rows in 0usize..10,
        row in prop_oneof![1usize..40, Just(usize::MAX - 1), Just(usize::MAX)],
        height in prop_oneof![0usize..12, Just(usize::MAX - 1), Just(usize::MAX)],
    ) {
        let mut table = Table::new(sheet_with(frozen, data_rows, &["a", "b"])).unwrap();
        let last_row = table.sheet().last_row();
        let range = Range::new(row, 1, height, 2);

        // Widened so the span end cannot wrap
        let end = row as u128 + height as u128;
        let expected = row >= table.first_record_index() && end <= last_row as u128 + 1;
        prop_assert_eq!(table.within_record_range(&range), expected);

        let outcome = table.delete_records(&range).unwrap();
        prop_assert_eq!(outcome.is_deleted(), expected);
        if !expected {
            prop_assert_eq!(table.sheet().last_row(), last_row);
        }
    }

    #[test]
    fn mismatched_rows_never_become_records(len in 0usize..8) {
        let table = Table::new(sheet_with(0, 0, &["a", "b", "c"])).unwrap();
        let row = vec![CellValue::Int(7); len];
        prop_assert_eq!(table.make_record(&row, 2).is_ok(), len == 3);
    }

    #[test]
    fn added_record_reads_back_unchanged(id in any::<i64>(), name in "[a-zA-Z ]{1,12}") {
        let mut table = Table::new(header_only(0)).unwrap();
        let record = Record::new().with("id", id).with("name", name.as_str());

        let rows = table.add_records(std::slice::from_ref(&record)).unwrap();
        let batch = table.records(&Range::new(rows[0], 1, 1, 1)).unwrap();
        let read = batch.records().next().unwrap();

        prop_assert_eq!(read.get("id"), record.get("id"));
        prop_assert_eq!(read.get("name"), record.get("name"));
    }
}
