//! Excel file parser (xls, xlsx)

use std::io::{Cursor, Read, Seek};

use calamine::{Data, Reader, Xls, Xlsx};
use tracing::{debug, trace};

use crate::error::{ImportError, Result};
use crate::format::FormatTag;
use crate::model::{Row, RowSet};

use super::{biff, sheet_xml};

/// A cell declared in the sheet. `Data::Empty` marks an explicit blank cell.
#[derive(Debug, Clone, PartialEq)]
struct SheetCell {
    row: u32,
    col: u32,
    value: Data,
}

/// Cells of the first sheet plus the index of its first physical row
#[derive(Debug, Default)]
struct SheetContents {
    cells: Vec<SheetCell>,
    /// A row can exist without any cells, so this may precede every cell
    first_row: Option<u32>,
}

/// Read the first sheet of a workbook into rows.
///
/// `format` selects the decoder and must be a spreadsheet format. The whole
/// stream is buffered before decoding.
pub fn read_excel<R: Read>(mut reader: R, format: FormatTag) -> Result<RowSet> {
    let decode: fn(&[u8]) -> Result<SheetContents> = match format {
        FormatTag::SpreadsheetLegacy => xls_contents,
        FormatTag::SpreadsheetModern => xlsx_contents,
        FormatTag::DelimitedText => {
            return Err(ImportError::UnsupportedFormat(format.to_string()));
        }
    };

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    let contents = decode(&buffer)?;

    debug!(
        %format,
        cells = contents.cells.len(),
        first_row = ?contents.first_row,
        "Decoded first sheet"
    );

    Ok(collect_rows(contents))
}

fn xlsx_contents(buffer: &[u8]) -> Result<SheetContents> {
    let cells = xlsx_cells(Xlsx::new(Cursor::new(buffer))?)?;
    let first_row = sheet_xml::first_row_index(Cursor::new(buffer))?;
    Ok(SheetContents { cells, first_row })
}

fn xls_contents(buffer: &[u8]) -> Result<SheetContents> {
    let mut cells = xls_cells(Xls::new(Cursor::new(buffer))?)?;
    let layout = biff::scan_first_sheet(buffer)?;

    cells.extend(layout.blanks.into_iter().map(|(row, col)| SheetCell {
        row,
        col,
        value: Data::Empty,
    }));

    Ok(SheetContents {
        cells,
        first_row: layout.first_row,
    })
}

/// Declared cells of the first sheet, including explicit blanks
fn xlsx_cells<RS: Read + Seek>(mut workbook: Xlsx<RS>) -> Result<Vec<SheetCell>> {
    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };

    let mut cells = Vec::new();
    let mut cell_reader = workbook.worksheet_cells_reader(&sheet_name)?;
    while let Some(cell) = cell_reader.next_cell()? {
        let (row, col) = cell.get_position();
        cells.push(SheetCell {
            row,
            col,
            value: Data::from(cell.get_value().clone()),
        });
    }

    Ok(cells)
}

/// Non-empty cells of the first sheet. Blank records are recovered
/// separately by the BIFF scan.
fn xls_cells<RS: Read + Seek>(mut workbook: Xls<RS>) -> Result<Vec<SheetCell>> {
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Vec::new()),
    };

    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    Ok(range
        .used_cells()
        .map(|(row, col, value)| SheetCell {
            row: start_row + row as u32,
            col: start_col + col as u32,
            value: value.clone(),
        })
        .collect())
}

/// Group declared cells into rows, drop the header and blank rows
fn collect_rows(contents: SheetContents) -> RowSet {
    let SheetContents {
        mut cells,
        first_row,
    } = contents;

    // Valued cells sort ahead of a blank at the same position, which dedup drops
    cells.sort_by_key(|c| (c.row, c.col, matches!(c.value, Data::Empty)));
    cells.dedup_by_key(|c| (c.row, c.col));

    let mut rows = RowSet::new();
    let mut sheet_rows = cells.chunk_by(|a, b| a.row == b.row);

    // First row is header
    match sheet_rows.next() {
        Some(header) if first_row.is_some_and(|first| first < header[0].row) => {
            debug!(first_row = ?first_row, "Header row has no cells");
            return rows;
        }
        Some(header) if !is_row_empty(header) => {}
        _ => {
            debug!("Header row is missing or blank");
            return rows;
        }
    }

    for row_cells in sheet_rows {
        if is_row_empty(row_cells) {
            trace!(row = row_cells[0].row + 1, "Skipping blank sheet row");
            continue;
        }
        rows.push(build_row(row_cells));
    }

    debug!(kept = rows.len(), "Read sheet rows");

    rows
}

/// A row is blank when every declared cell is an explicit blank
fn is_row_empty(cells: &[SheetCell]) -> bool {
    cells.iter().all(|c| matches!(c.value, Data::Empty))
}

/// Build a row from column A up to the last declared cell.
/// Columns with no declared cell are `None`.
fn build_row(cells: &[SheetCell]) -> Row {
    let width = cells.iter().map(|c| c.col as usize + 1).max().unwrap_or(0);
    let mut row: Row = vec![None; width];

    for cell in cells {
        row[cell.col as usize] = Some(cell_to_string(&cell.value).trim().to_string());
    }

    row
}

/// Plain-text form of a cell value
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                return dt.as_f64().to_string();
            }
            match dt.as_datetime() {
                Some(datetime) if datetime.time() == chrono::NaiveTime::MIN => {
                    datetime.format("%Y-%m-%d").to_string()
                }
                Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => dt.as_f64().to_string(),
            }
        }
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}
