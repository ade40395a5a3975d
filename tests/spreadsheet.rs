//! Integration tests for spreadsheet import

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use tabingest::{read_file_data, ErrorKind, FormatTag, ImportError, Row};

fn build_xlsx<F>(fill: F) -> Vec<u8>
where
    F: FnOnce(&mut Worksheet) -> Result<(), XlsxError>,
{
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    fill(sheet).unwrap();
    workbook.save_to_buffer().unwrap()
}

fn write_row(sheet: &mut Worksheet, row: u32, values: &[&str]) -> Result<(), XlsxError> {
    for (col, value) in values.iter().enumerate() {
        sheet.write_string(row, col as u16, *value)?;
    }
    Ok(())
}

fn some(cells: &[&str]) -> Row {
    cells.iter().map(|c| Some(c.to_string())).collect()
}

#[test]
fn test_header_and_one_row_trimmed() {
    let bytes = build_xlsx(|sheet| {
        write_row(sheet, 0, &["Name", "ShortDescription", "LongDescription"])?;
        write_row(sheet, 1, &["  Revenue ", "\tMoney in", "Total income  "])?;
        Ok(())
    });

    let rows = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap();
    assert_eq!(rows.rows(), &[some(&["Revenue", "Money in", "Total income"])]);
}

#[test]
fn test_extension_is_case_insensitive() {
    let bytes = build_xlsx(|sheet| {
        write_row(sheet, 0, &["h"])?;
        write_row(sheet, 1, &["v"])?;
        Ok(())
    });

    for name in ["a.xlsx", "A.XLSX", "a.XlSx"] {
        let rows = read_file_data(name, bytes.as_slice()).unwrap();
        assert_eq!(rows.rows(), &[some(&["v"])]);
    }
}

#[test]
fn test_blank_header_is_empty_result() {
    let bold = Format::new().set_bold();
    let bytes = build_xlsx(|sheet| {
        sheet.write_blank(0, 0, &bold)?;
        sheet.write_blank(0, 1, &bold)?;
        write_row(sheet, 1, &["data", "below"])?;
        write_row(sheet, 2, &["more", "data"])?;
        Ok(())
    });

    let err = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyResult);
}

#[test]
fn test_cell_less_first_row_is_blank_header() {
    let bytes = build_xlsx(|sheet| {
        // a styled row with no cells is still the header row
        sheet.set_row_height(0, 30)?;
        write_row(sheet, 1, &["Name", "ShortDescription"])?;
        write_row(sheet, 2, &["Revenue", "Money in"])?;
        Ok(())
    });

    let err = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyResult);
}

#[test]
fn test_blank_rows_are_skipped() {
    let bold = Format::new().set_bold();
    let bytes = build_xlsx(|sheet| {
        write_row(sheet, 0, &["a", "b"])?;
        write_row(sheet, 1, &["1", "2"])?;
        sheet.write_blank(2, 0, &bold)?;
        sheet.write_blank(2, 1, &bold)?;
        // row 3 has no cells at all
        write_row(sheet, 4, &["3", "4"])?;
        Ok(())
    });

    let rows = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap();
    assert_eq!(rows.rows(), &[some(&["1", "2"]), some(&["3", "4"])]);
}

#[test]
fn test_only_blank_data_rows_is_empty_result() {
    let bold = Format::new().set_bold();
    let bytes = build_xlsx(|sheet| {
        write_row(sheet, 0, &["a", "b"])?;
        sheet.write_blank(1, 0, &bold)?;
        sheet.write_blank(2, 1, &bold)?;
        Ok(())
    });

    let err = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap_err();
    assert!(matches!(err, ImportError::EmptyResult));
}

#[test]
fn test_header_only_is_empty_result() {
    let bytes = build_xlsx(|sheet| write_row(sheet, 0, &["a", "b", "c"]));

    let err = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap_err();
    assert!(matches!(err, ImportError::EmptyResult));
}

#[test]
fn test_empty_sheet_is_empty_result() {
    let bytes = build_xlsx(|_| Ok(()));

    let err = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap_err();
    assert!(matches!(err, ImportError::EmptyResult));
}

#[test]
fn test_missing_cells_are_none_and_row_width_is_per_row() {
    let bytes = build_xlsx(|sheet| {
        write_row(sheet, 0, &["a", "b", "c", "d"])?;
        sheet.write_string(1, 0, "first")?;
        sheet.write_string(1, 2, "third")?;
        sheet.write_string(2, 1, "only second")?;
        Ok(())
    });

    let rows = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap();
    assert_eq!(
        rows.rows(),
        &[
            vec![Some("first".to_string()), None, Some("third".to_string())],
            vec![None, Some("only second".to_string())],
        ]
    );
}

#[test]
fn test_blank_cell_inside_row_is_empty_string() {
    let bold = Format::new().set_bold();
    let bytes = build_xlsx(|sheet| {
        write_row(sheet, 0, &["a", "b", "c"])?;
        sheet.write_string(1, 0, "x")?;
        sheet.write_blank(1, 1, &bold)?;
        sheet.write_string(1, 2, "z")?;
        Ok(())
    });

    let rows = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap();
    assert_eq!(rows.rows(), &[some(&["x", "", "z"])]);
}

#[test]
fn test_whitespace_string_row_is_kept() {
    let bytes = build_xlsx(|sheet| {
        write_row(sheet, 0, &["a"])?;
        sheet.write_string(1, 0, "   ")?;
        Ok(())
    });

    let rows = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap();
    assert_eq!(rows.rows(), &[some(&[""])]);
}

#[test]
fn test_data_starting_in_later_column() {
    let bytes = build_xlsx(|sheet| {
        sheet.write_string(0, 1, "name")?;
        sheet.write_string(0, 2, "value")?;
        sheet.write_string(1, 1, "k")?;
        sheet.write_string(1, 2, "v")?;
        Ok(())
    });

    let rows = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap();
    assert_eq!(
        rows.rows(),
        &[vec![None, Some("k".to_string()), Some("v".to_string())]]
    );
}

#[test]
fn test_non_string_cells_have_pinned_text() {
    let date = Format::new().set_num_format("yyyy-mm-dd");
    let bytes = build_xlsx(|sheet| {
        write_row(sheet, 0, &["int", "float", "date", "flag"])?;
        sheet.write_number(1, 0, 42)?;
        sheet.write_number(1, 1, 3.5)?;
        // 2024-01-15
        sheet.write_number_with_format(1, 2, 45306, &date)?;
        sheet.write_boolean(1, 3, true)?;
        Ok(())
    });

    let rows = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap();
    assert_eq!(rows.rows(), &[some(&["42", "3.5", "2024-01-15", "true"])]);
}

#[test]
fn test_only_first_sheet_is_read() {
    let mut workbook = Workbook::new();
    let first = workbook.add_worksheet();
    write_row(first, 0, &["h"]).unwrap();
    write_row(first, 1, &["from first"]).unwrap();
    let second = workbook.add_worksheet();
    write_row(second, 0, &["h"]).unwrap();
    write_row(second, 1, &["from second"]).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let rows = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap();
    assert_eq!(rows.rows(), &[some(&["from first"])]);
}

#[test]
fn test_same_bytes_twice_are_identical() {
    let bytes = build_xlsx(|sheet| {
        write_row(sheet, 0, &["a", "b"])?;
        write_row(sheet, 1, &["1", "2"])?;
        write_row(sheet, 2, &["3", "4"])?;
        Ok(())
    });

    let first = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap();
    let second = read_file_data("glossary.xlsx", bytes.as_slice()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_mismatched_signature_is_read_fault() {
    let bytes = build_xlsx(|sheet| {
        write_row(sheet, 0, &["a"])?;
        write_row(sheet, 1, &["1"])?;
        Ok(())
    });

    let err = read_file_data("glossary.xls", bytes.as_slice()).unwrap_err();
    assert!(matches!(err, ImportError::Spreadsheet(_)));
    assert_eq!(err.kind(), ErrorKind::ReadFault);
}

#[test]
fn test_truncated_workbook_is_read_fault() {
    let bytes = build_xlsx(|sheet| {
        write_row(sheet, 0, &["a"])?;
        write_row(sheet, 1, &["1"])?;
        Ok(())
    });
    let truncated = &bytes[..bytes.len() / 2];

    let err = tabingest::read_with_format(FormatTag::SpreadsheetModern, truncated).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReadFault);
}
