//! Row layout of the first worksheet of an xlsx package.
//!
//! The cell reader only reports `<c>` elements, so a `<row>` with no cells
//! is invisible to it. This scans the sheet XML for the first `<row>`.

use std::io::{Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::Result;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

/// 0-based index of the first `<row>` element in the first sheet
pub(crate) fn first_row_index<RS: Read + Seek>(reader: RS) -> Result<Option<u32>> {
    let mut archive = ZipArchive::new(reader)?;

    let workbook = read_part(&mut archive, WORKBOOK_PART)?;
    let Some(rel_id) = first_sheet_rel_id(&workbook)? else {
        return Ok(None);
    };

    let rels = read_part(&mut archive, WORKBOOK_RELS_PART)?;
    let Some(target) = relationship_target(&rels, &rel_id)? else {
        return Ok(None);
    };

    let sheet = read_part(&mut archive, &resolve_target(&target))?;
    first_row(&sheet)
}

fn read_part<RS: Read + Seek>(archive: &mut ZipArchive<RS>, name: &str) -> Result<String> {
    let mut part = archive.by_name(name)?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Relationship id (`r:id`) of the first `<sheet>` in workbook.xml
fn first_sheet_rel_id(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                return attribute(&e, b"id");
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn relationship_target(xml: &str, rel_id: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if attribute(&e, b"Id")?.as_deref() == Some(rel_id) {
                    return attribute(&e, b"Target");
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Relationship targets are relative to `xl/` unless absolute
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn first_row(xml: &str) -> Result<Option<u32>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                // `r` is 1-based; a row without it is the first row
                let index = attribute(&e, b"r")?
                    .and_then(|r| r.parse::<u32>().ok())
                    .map_or(0, |r| r.saturating_sub(1));
                return Ok(Some(index));
            }
            Event::End(e) if e.local_name().as_ref() == b"sheetData" => return Ok(None),
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Attribute value by local name (ignores namespace prefixes)
fn attribute(element: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
