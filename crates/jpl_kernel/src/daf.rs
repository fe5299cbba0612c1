//! NAIF Double precision Array File (DAF) container.
//!
//! A DAF is a sequence of 1024-byte records. Record 1 is the file record,
//! followed by optional comment records and a doubly linked list of
//! summary/name record pairs describing the arrays stored in the file.
//!
//! Reference: NAIF DAF Required Reading (public domain, US Government
//! work product). The whole file is held in memory; addresses are
//! 1-based double-precision word indices, as in the format itself.

use std::collections::HashSet;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::KernelError;

pub const RECORD_BYTES: usize = 1024;
const WORD_BYTES: usize = 8;
const CONTROL_WORDS: usize = 3;

/// Byte order of the numeric data in a DAF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    fn read_f64(self, bytes: &[u8]) -> f64 {
        match self {
            Self::Little => LittleEndian::read_f64(bytes),
            Self::Big => BigEndian::read_f64(bytes),
        }
    }

    fn read_i32(self, bytes: &[u8]) -> i32 {
        match self {
            Self::Little => LittleEndian::read_i32(bytes),
            Self::Big => BigEndian::read_i32(bytes),
        }
    }
}

/// One array summary: `nd` doubles and `ni` integers, plus its name.
#[derive(Debug, Clone, PartialEq)]
pub struct DafSummary {
    pub name: String,
    pub doubles: Vec<f64>,
    pub ints: Vec<i32>,
}

/// An in-memory DAF.
pub struct DafFile {
    bytes: Vec<u8>,
    pub endian: Endian,
    /// File identification word, e.g. `DAF/SPK`.
    pub file_id: String,
    pub internal_name: String,
    pub nd: usize,
    pub ni: usize,
    pub first_summary: usize,
    pub last_summary: usize,
    pub free_address: usize,
}

impl std::fmt::Debug for DafFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DafFile")
            .field("file_id", &self.file_id)
            .field("internal_name", &self.internal_name)
            .field("endian", &self.endian)
            .field("nd", &self.nd)
            .field("ni", &self.ni)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl DafFile {
    /// Parse the file record of a DAF held in `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, KernelError> {
        if bytes.len() < RECORD_BYTES {
            return Err(KernelError::format(format!(
                "file is {} bytes, shorter than one DAF record",
                bytes.len()
            )));
        }

        let header = &bytes[..RECORD_BYTES];
        let file_id = String::from_utf8_lossy(&header[0..8]).trim_end().to_string();
        if !file_id.starts_with("DAF/") && file_id != "NAIF/DAF" {
            return Err(KernelError::format(format!(
                "unrecognised file id word {file_id:?}"
            )));
        }

        let endian = detect_endian(header)?;
        let nd = endian.read_i32(&header[8..12]);
        let ni = endian.read_i32(&header[12..16]);
        let fward = endian.read_i32(&header[76..80]);
        let bward = endian.read_i32(&header[80..84]);
        let free = endian.read_i32(&header[84..88]);

        // A summary must fit in the 125 words after the control words.
        let words = i64::from(nd) + (i64::from(ni) + 1) / 2;
        if nd <= 0 || ni <= 0 || words > 125 {
            return Err(KernelError::format(format!(
                "bad summary format: nd={nd} ni={ni}"
            )));
        }
        if fward <= 0 || bward <= 0 || free <= 0 {
            return Err(KernelError::format(format!(
                "bad record pointers: fward={fward} bward={bward} free={free}"
            )));
        }

        let internal_name = String::from_utf8_lossy(&header[16..76]).trim_end().to_string();

        Ok(Self {
            bytes,
            endian,
            file_id,
            internal_name,
            nd: nd as usize,
            ni: ni as usize,
            first_summary: fward as usize,
            last_summary: bward as usize,
            free_address: free as usize,
        })
    }

    /// Summary size in double-precision words.
    pub fn summary_words(&self) -> usize {
        self.nd + self.ni.div_ceil(2)
    }

    /// Number of whole records in the file.
    pub fn record_count(&self) -> usize {
        self.bytes.len() / RECORD_BYTES
    }

    fn record(&self, number: usize) -> Result<&[u8], KernelError> {
        if number == 0 {
            return Err(KernelError::format("record numbers start at 1"));
        }
        if number > self.record_count() {
            return Err(KernelError::format(format!("record {number} is past end of file")));
        }
        let start = (number - 1) * RECORD_BYTES;
        Ok(&self.bytes[start..start + RECORD_BYTES])
    }

    /// Walk the summary list and return every array summary in file order.
    pub fn summaries(&self) -> Result<Vec<DafSummary>, KernelError> {
        let words = self.summary_words();
        let step = words * WORD_BYTES;
        let per_record = (RECORD_BYTES - CONTROL_WORDS * WORD_BYTES) / step;

        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut number = self.first_summary;

        while number != 0 {
            if !visited.insert(number) {
                return Err(KernelError::format(format!(
                    "summary record {number} visited twice"
                )));
            }

            let summary = self.record(number)?;
            let names = self.record(number + 1)?;

            let next_word = self.endian.read_f64(&summary[0..8]);
            let next = whole_words(next_word, self.record_count()).ok_or_else(|| {
                KernelError::format(format!(
                    "summary record {number} points to record {next_word}, file has {}",
                    self.record_count()
                ))
            })?;
            let count_word = self.endian.read_f64(&summary[16..24]);
            let count = whole_words(count_word, per_record).ok_or_else(|| {
                KernelError::format(format!(
                    "summary record {number} claims {count_word} summaries, at most {per_record} fit"
                ))
            })?;

            for i in 0..count {
                let base = CONTROL_WORDS * WORD_BYTES + i * step;
                let doubles = (0..self.nd)
                    .map(|j| {
                        let at = base + j * WORD_BYTES;
                        self.endian.read_f64(&summary[at..at + WORD_BYTES])
                    })
                    .collect();
                let int_base = base + self.nd * WORD_BYTES;
                let ints = (0..self.ni)
                    .map(|j| {
                        let at = int_base + j * 4;
                        self.endian.read_i32(&summary[at..at + 4])
                    })
                    .collect();
                let name_at = i * step;
                let name = String::from_utf8_lossy(&names[name_at..name_at + step])
                    .trim_end_matches(['\0', ' '])
                    .to_string();

                out.push(DafSummary {
                    name,
                    doubles,
                    ints,
                });
            }

            number = next;
        }

        Ok(out)
    }

    /// Read `out.len()` doubles starting at a 1-based word address.
    pub fn read_words(&self, address: usize, out: &mut [f64]) -> Result<(), KernelError> {
        if address == 0 {
            return Err(KernelError::format("word addresses start at 1"));
        }
        let past_end = || {
            KernelError::format(format!(
                "{} words at address {address} are past end of file",
                out.len()
            ))
        };
        let start = (address - 1).checked_mul(WORD_BYTES).ok_or_else(past_end)?;
        let end = out
            .len()
            .checked_mul(WORD_BYTES)
            .and_then(|len| start.checked_add(len))
            .ok_or_else(past_end)?;
        let bytes = self.bytes.get(start..end).ok_or_else(past_end)?;
        for (slot, chunk) in out.iter_mut().zip(bytes.chunks_exact(WORD_BYTES)) {
            *slot = self.endian.read_f64(chunk);
        }
        Ok(())
    }
}

/// `value` as a count, if it is a whole number in `0..=limit`.
pub(crate) fn whole_words(value: f64, limit: usize) -> Option<usize> {
    (value.is_finite() && value.fract() == 0.0 && value >= 0.0 && value <= limit as f64)
        .then_some(value as usize)
}

/// Decide byte order from the binary format tag, or, for pre-tag files,
/// from which interpretation gives plausible ND/NI values.
fn detect_endian(header: &[u8]) -> Result<Endian, KernelError> {
    match &header[88..96] {
        b"LTL-IEEE" => return Ok(Endian::Little),
        b"BIG-IEEE" => return Ok(Endian::Big),
        _ => {}
    }

    let plausible = |e: Endian| {
        let nd = e.read_i32(&header[8..12]);
        let ni = e.read_i32(&header[12..16]);
        (1..=124).contains(&nd) && (2..=250).contains(&ni)
    };
    if plausible(Endian::Little) {
        Ok(Endian::Little)
    } else if plausible(Endian::Big) {
        Ok(Endian::Big)
    } else {
        Err(KernelError::format("cannot determine byte order"))
    }
}
