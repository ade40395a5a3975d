//! Stream lookup inside an OLE compound file (the xls container).
//!
//! Sector `n` starts at `(n + 1) * sector_size`, after the header slot.
//! Streams shorter than the mini-stream cutoff live in 64-byte mini sectors
//! carved out of the root entry's stream.

use std::io;

const SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const HEADER_LEN: usize = 512;
const DIR_ENTRY_LEN: usize = 128;

/// Sector ids at or above this are markers, not sectors
const MAX_REGULAR_SECTOR: u32 = 0xFFFF_FFFA;
const END_OF_CHAIN: u32 = 0xFFFF_FFFE;

const ENTRY_STREAM: u8 = 2;

fn invalid(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("compound file: {}", message))
}

/// Directory entry fields needed to pull a stream out
#[derive(Debug)]
struct Entry {
    name: String,
    kind: u8,
    start: u32,
    size: usize,
}

/// Parsed header, FAT, and directory of a compound file held in memory
pub(crate) struct CompoundFile<'a> {
    file: &'a [u8],
    sector_size: usize,
    mini_sector_size: usize,
    mini_cutoff: usize,
    mini_fat_start: u32,
    fat: Vec<u32>,
    entries: Vec<Entry>,
}

impl<'a> CompoundFile<'a> {
    pub(crate) fn parse(file: &'a [u8]) -> io::Result<Self> {
        let header = file
            .get(..HEADER_LEN)
            .ok_or_else(|| invalid("truncated header"))?;
        if header[..8] != SIGNATURE {
            return Err(invalid("bad signature"));
        }

        let sector_size = match read_u16(header, 30) {
            9 => 512,
            12 => 4096,
            _ => return Err(invalid("unsupported sector size")),
        };
        let mini_sector_size = 1usize << read_u16(header, 32).min(12);

        let mut compound = CompoundFile {
            file,
            sector_size,
            mini_sector_size,
            mini_cutoff: read_u32(header, 56) as usize,
            mini_fat_start: read_u32(header, 60),
            fat: Vec::new(),
            entries: Vec::new(),
        };

        let fat_sectors = compound.difat(header)?;
        for id in fat_sectors {
            let sector = compound.sector(id)?;
            compound.fat.extend(u32s(sector));
        }

        let directory = compound.chain(read_u32(header, 48))?;
        compound.entries = directory
            .chunks_exact(DIR_ENTRY_LEN)
            .map(|raw| Entry::parse(raw, sector_size))
            .collect();

        Ok(compound)
    }

    /// Contents of the first stream whose name matches one of `names`
    /// (case-insensitively, as compound file names compare)
    pub(crate) fn stream(&self, names: &[&str]) -> io::Result<Option<Vec<u8>>> {
        let Some(entry) = self.entries.iter().find(|e| {
            e.kind == ENTRY_STREAM && names.iter().any(|n| n.eq_ignore_ascii_case(&e.name))
        }) else {
            return Ok(None);
        };

        let mut data = if entry.size < self.mini_cutoff {
            self.mini_chain(entry.start)?
        } else {
            self.chain(entry.start)?
        };

        if data.len() < entry.size {
            return Err(invalid("stream shorter than its directory size"));
        }
        data.truncate(entry.size);
        Ok(Some(data))
    }

    /// FAT sector ids: 109 in the header, the rest in chained DIFAT sectors
    fn difat(&self, header: &[u8]) -> io::Result<Vec<u32>> {
        let mut ids: Vec<u32> = u32s(&header[76..]).collect();

        let per_sector = self.sector_size / 4 - 1;
        let mut next = read_u32(header, 68);
        let mut remaining = self.file.len() / self.sector_size;
        while next < MAX_REGULAR_SECTOR {
            remaining = remaining
                .checked_sub(1)
                .ok_or_else(|| invalid("DIFAT chain loops"))?;
            let sector = self.sector(next)?;
            if sector.len() < self.sector_size {
                return Err(invalid("truncated DIFAT sector"));
            }
            ids.extend(u32s(&sector[..per_sector * 4]));
            next = read_u32(sector, per_sector * 4);
        }

        ids.retain(|id| *id < MAX_REGULAR_SECTOR);
        Ok(ids)
    }

    fn sector(&self, id: u32) -> io::Result<&'a [u8]> {
        let start = (id as usize + 1) * self.sector_size;
        let end = (start + self.sector_size).min(self.file.len());
        self.file
            .get(start..end)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("sector out of range"))
    }

    /// Concatenate the sectors of a FAT chain
    fn chain(&self, start: u32) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        for id in walk(start, &self.fat)? {
            data.extend_from_slice(self.sector(id)?);
        }
        Ok(data)
    }

    /// Concatenate the mini sectors of a mini FAT chain
    fn mini_chain(&self, start: u32) -> io::Result<Vec<u8>> {
        let root = self
            .entries
            .first()
            .ok_or_else(|| invalid("missing root entry"))?;
        let mini_stream = self.chain(root.start)?;
        let mini_fat: Vec<u32> = u32s(&self.chain(self.mini_fat_start)?).collect();

        let mut data = Vec::new();
        for id in walk(start, &mini_fat)? {
            let offset = id as usize * self.mini_sector_size;
            let sector = mini_stream
                .get(offset..offset + self.mini_sector_size)
                .ok_or_else(|| invalid("mini sector out of range"))?;
            data.extend_from_slice(sector);
        }
        Ok(data)
    }
}

impl Entry {
    fn parse(raw: &[u8], sector_size: usize) -> Self {
        // Name length is in bytes and counts the UTF-16 terminator
        let units = (read_u16(raw, 64) as usize / 2).saturating_sub(1).min(31);
        let name: Vec<u16> = (0..units).map(|i| read_u16(raw, i * 2)).collect();

        let size = if sector_size == 512 {
            read_u32(raw, 120) as usize
        } else {
            u64::from_le_bytes(raw[120..128].try_into().unwrap_or_default()) as usize
        };

        Entry {
            name: String::from_utf16_lossy(&name),
            kind: raw[66],
            start: read_u32(raw, 116),
            size,
        }
    }
}

/// Sector ids along a chain, rejecting loops and dangling links
fn walk(start: u32, fat: &[u32]) -> io::Result<Vec<u32>> {
    let mut ids = Vec::new();
    let mut next = start;
    while next != END_OF_CHAIN {
        if next >= MAX_REGULAR_SECTOR {
            break;
        }
        if ids.len() > fat.len() {
            return Err(invalid("sector chain loops"));
        }
        ids.push(next);
        next = *fat
            .get(next as usize)
            .ok_or_else(|| invalid("sector chain leaves the FAT"))?;
    }
    Ok(ids)
}

fn u32s(bytes: &[u8]) -> impl Iterator<Item = u32> + '_ {
    bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    const FREE: u32 = 0xFFFF_FFFF;
    const FAT_SECTOR: u32 = 0xFFFF_FFFD;

    fn put_u16(buf: &mut [u8], at: usize, v: u16) {
        buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
    }

    fn put_u32(buf: &mut [u8], at: usize, v: u32) {
        buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    fn dir_entry(name: &str, kind: u8, start: u32, size: u32) -> Vec<u8> {
        let mut raw = vec![0u8; DIR_ENTRY_LEN];
        let units: Vec<u16> = name.encode_utf16().collect();
        for (i, u) in units.iter().enumerate() {
            put_u16(&mut raw, i * 2, *u);
        }
        put_u16(&mut raw, 64, ((units.len() + 1) * 2) as u16);
        raw[66] = kind;
        put_u32(&mut raw, 68, FREE);
        put_u32(&mut raw, 72, FREE);
        put_u32(&mut raw, 76, FREE);
        put_u32(&mut raw, 116, start);
        put_u32(&mut raw, 120, size);
        raw
    }

    /// Sector 0 is the FAT, 1 the directory, 2.. the stream
    fn single_stream_file(name: &str, stream: &[u8]) -> Vec<u8> {
        let sectors = stream.len().div_ceil(512).max(1);

        let mut header = vec![0u8; HEADER_LEN];
        header[..8].copy_from_slice(&SIGNATURE);
        put_u16(&mut header, 26, 3);
        put_u16(&mut header, 28, 0xFFFE);
        put_u16(&mut header, 30, 9);
        put_u16(&mut header, 32, 6);
        put_u32(&mut header, 44, 1);
        put_u32(&mut header, 48, 1);
        put_u32(&mut header, 56, 4096);
        put_u32(&mut header, 60, END_OF_CHAIN);
        put_u32(&mut header, 68, END_OF_CHAIN);
        for i in 0..109 {
            put_u32(&mut header, 76 + i * 4, if i == 0 { 0 } else { FREE });
        }

        let mut fat = vec![0u8; 512];
        for i in 0..128u32 {
            let next = match i {
                0 => FAT_SECTOR,
                1 => END_OF_CHAIN,
                i if (i as usize) < sectors + 1 => i + 1,
                i if i as usize == sectors + 1 => END_OF_CHAIN,
                _ => FREE,
            };
            put_u32(&mut fat, i as usize * 4, next);
        }

        let mut dir = dir_entry("Root Entry", 5, END_OF_CHAIN, 0);
        dir.extend(dir_entry(name, ENTRY_STREAM, 2, stream.len() as u32));
        dir.resize(512, 0);

        let mut body = stream.to_vec();
        body.resize(sectors * 512, 0);

        [header, fat, dir, body].concat()
    }

    #[test]
    fn test_reads_regular_stream() {
        let stream: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        let file = single_stream_file("Workbook", &stream);

        let compound = CompoundFile::parse(&file).unwrap();
        assert_eq!(compound.stream(&["workbook"]).unwrap(), Some(stream));
        assert_eq!(compound.stream(&["Book"]).unwrap(), None);
    }

    #[test]
    fn test_rejects_non_compound_bytes() {
        let err = CompoundFile::parse(b"PK\x03\x04 not a compound file").err();
        assert_eq!(err.map(|e| e.kind()), Some(io::ErrorKind::InvalidData));

        let mut file = single_stream_file("Workbook", &[0u8; 4096]);
        file[0] = 0;
        assert!(CompoundFile::parse(&file).is_err());
    }

    #[test]
    fn test_chain_loop_is_an_error() {
        let fat = vec![1, 0];
        assert!(walk(0, &fat).is_err());
        assert_eq!(walk(END_OF_CHAIN, &fat).unwrap(), Vec::<u32>::new());
    }
}
