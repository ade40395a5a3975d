//! Row layout of the first worksheet of a BIFF (xls) workbook.
//!
//! calamine drops BLANK and MULBLANK records and ignores ROW records, so
//! explicit blank cells and cell-less rows never reach the range. This walks
//! the first sheet's record stream to recover them.

use tracing::trace;

use crate::error::Result;

use super::compound::CompoundFile;

const RECORD_EOF: u16 = 0x000A;
const RECORD_BOUNDSHEET: u16 = 0x0085;
const RECORD_MULBLANK: u16 = 0x00BE;
const RECORD_BLANK: u16 = 0x0201;
const RECORD_ROW: u16 = 0x0208;

/// BIFF8 names the stream `Workbook`, BIFF5 names it `Book`
const WORKBOOK_STREAMS: &[&str] = &["Workbook", "Book"];

/// What the first sheet declares beyond its non-empty cells
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SheetLayout {
    /// 0-based index of the first ROW record or blank cell
    pub first_row: Option<u32>,
    /// (row, col) of every explicit blank cell
    pub blanks: Vec<(u32, u32)>,
}

impl SheetLayout {
    fn mark_row(&mut self, row: u32) {
        self.first_row = Some(self.first_row.map_or(row, |first| first.min(row)));
    }

    fn push_blank(&mut self, row: u32, col: u32) {
        self.mark_row(row);
        self.blanks.push((row, col));
    }
}

/// Scan the compound file for the first sheet's layout
pub(crate) fn scan_first_sheet(file: &[u8]) -> Result<SheetLayout> {
    let compound = CompoundFile::parse(file)?;

    let Some(stream) = compound.stream(WORKBOOK_STREAMS)? else {
        return Ok(SheetLayout::default());
    };

    Ok(scan_workbook_stream(&stream))
}

/// Walk globals to the first BOUNDSHEET, then that sheet's records to EOF
pub(crate) fn scan_workbook_stream(stream: &[u8]) -> SheetLayout {
    let sheet_offset = records(stream, 0)
        .take_while(|(kind, _)| *kind != RECORD_EOF)
        .find(|(kind, data)| *kind == RECORD_BOUNDSHEET && data.len() >= 4)
        .map(|(_, data)| read_u32(data, 0) as usize);

    let mut layout = SheetLayout::default();
    let Some(offset) = sheet_offset else {
        return layout;
    };

    for (kind, data) in records(stream, offset) {
        match kind {
            RECORD_EOF => break,
            RECORD_ROW if data.len() >= 2 => layout.mark_row(read_u16(data, 0) as u32),
            RECORD_BLANK if data.len() >= 4 => {
                layout.push_blank(read_u16(data, 0) as u32, read_u16(data, 2) as u32);
            }
            // rw, colFirst, one ixfe per cell, colLast
            RECORD_MULBLANK if data.len() >= 6 => {
                let row = read_u16(data, 0) as u32;
                let first = read_u16(data, 2) as u32;
                let last = read_u16(data, data.len() - 2) as u32;
                for col in first..=last {
                    layout.push_blank(row, col);
                }
            }
            _ => {}
        }
    }

    trace!(first_row = ?layout.first_row, blanks = layout.blanks.len(), "Scanned BIFF sheet");

    layout
}

/// Iterate `(type, data)` records starting at `offset`. Stops at a truncated record.
fn records(stream: &[u8], offset: usize) -> impl Iterator<Item = (u16, &[u8])> {
    let mut pos = offset;
    std::iter::from_fn(move || {
        let header = stream.get(pos..pos + 4)?;
        let kind = read_u16(header, 0);
        let len = read_u16(header, 2) as usize;
        let data = stream.get(pos + 4..pos + 4 + len)?;
        pos += 4 + len;
        Some((kind, data))
    })
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}
