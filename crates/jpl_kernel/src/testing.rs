//! Synthetic SPK kernels for tests.
//!
//! Writes small, well-formed DAF/SPK files whose segments describe
//! uniform straight-line motion, so evaluations have exact expected
//! values. Compiled for this crate's tests and, through the
//! `test-support` feature, for downstream test suites.

use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::daf::RECORD_BYTES;

const RECORDS_PER_SEGMENT: usize = 4;
const COEFFS: usize = 3;
/// Summary size for ND=2, NI=6.
const SUMMARY_WORDS: usize = 5;
const FIRST_DATA_RECORD: usize = 4;

#[derive(Debug, Clone)]
struct SyntheticSegment {
    target: i32,
    center: i32,
    data_type: i32,
    start_s: f64,
    end_s: f64,
    position_km: [f64; 3],
    velocity_km_s: [f64; 3],
}

/// Builder for an in-memory SPK file.
#[derive(Debug, Clone, Default)]
pub struct SyntheticSpk {
    segments: Vec<SyntheticSegment>,
    big_endian: bool,
}

impl SyntheticSpk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store numbers big-endian instead of the default little-endian.
    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    /// Add a Type 2 segment: `position_km` at `start_s`, constant velocity.
    pub fn linear_segment(
        self,
        target: i32,
        center: i32,
        start_s: f64,
        end_s: f64,
        position_km: [f64; 3],
        velocity_km_s: [f64; 3],
    ) -> Self {
        self.push(2, target, center, start_s, end_s, position_km, velocity_km_s)
    }

    /// Same motion as [`linear_segment`](Self::linear_segment), stored as Type 3.
    pub fn linear_segment_type3(
        self,
        target: i32,
        center: i32,
        start_s: f64,
        end_s: f64,
        position_km: [f64; 3],
        velocity_km_s: [f64; 3],
    ) -> Self {
        self.push(3, target, center, start_s, end_s, position_km, velocity_km_s)
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        mut self,
        data_type: i32,
        target: i32,
        center: i32,
        start_s: f64,
        end_s: f64,
        position_km: [f64; 3],
        velocity_km_s: [f64; 3],
    ) -> Self {
        assert!(end_s > start_s, "segment must have positive duration");
        self.segments.push(SyntheticSegment {
            target,
            center,
            data_type,
            start_s,
            end_s,
            position_km,
            velocity_km_s,
        });
        self
    }

    /// Serialise to DAF bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        assert!(
            self.segments.len() <= (RECORD_BYTES - 24) / (SUMMARY_WORDS * 8),
            "too many segments for one summary record"
        );

        let mut words: Vec<f64> = Vec::new();
        let mut addresses = Vec::with_capacity(self.segments.len());
        let first_address = (FIRST_DATA_RECORD - 1) * RECORD_BYTES / 8 + 1;

        for seg in &self.segments {
            let start = first_address + words.len();
            words.extend(segment_words(seg));
            addresses.push((start, first_address + words.len() - 1));
        }
        let free = first_address + words.len();

        let data_bytes = words.len() * 8;
        let total = (FIRST_DATA_RECORD - 1) * RECORD_BYTES + data_bytes.div_ceil(RECORD_BYTES) * RECORD_BYTES;
        let mut bytes = vec![0u8; total.max(FIRST_DATA_RECORD * RECORD_BYTES)];

        // File record.
        bytes[0..8].copy_from_slice(b"DAF/SPK ");
        self.put_i32(&mut bytes[8..12], 2);
        self.put_i32(&mut bytes[12..16], 6);
        let name = b"SYNTHETIC TEST KERNEL";
        bytes[16..16 + name.len()].copy_from_slice(name);
        for b in &mut bytes[16 + name.len()..76] {
            *b = b' ';
        }
        self.put_i32(&mut bytes[76..80], 2);
        self.put_i32(&mut bytes[80..84], 2);
        self.put_i32(&mut bytes[84..88], free as i32);
        bytes[88..96].copy_from_slice(if self.big_endian { b"BIG-IEEE" } else { b"LTL-IEEE" });

        // Summary record 2, name record 3.
        let summary = RECORD_BYTES;
        self.put_f64(&mut bytes[summary..summary + 8], 0.0);
        self.put_f64(&mut bytes[summary + 8..summary + 16], 0.0);
        self.put_f64(&mut bytes[summary + 16..summary + 24], self.segments.len() as f64);
        for (i, (seg, &(start, end))) in self.segments.iter().zip(&addresses).enumerate() {
            let at = summary + 24 + i * SUMMARY_WORDS * 8;
            self.put_f64(&mut bytes[at..at + 8], seg.start_s);
            self.put_f64(&mut bytes[at + 8..at + 16], seg.end_s);
            let ints = [seg.target, seg.center, 1, seg.data_type, start as i32, end as i32];
            for (j, v) in ints.iter().enumerate() {
                let p = at + 16 + j * 4;
                self.put_i32(&mut bytes[p..p + 4], *v);
            }

            let label = format!("SYNTH {} WRT {}", seg.target, seg.center);
            let n = 2 * RECORD_BYTES + i * SUMMARY_WORDS * 8;
            let slot = &mut bytes[n..n + SUMMARY_WORDS * 8];
            slot.fill(b' ');
            slot[..label.len()].copy_from_slice(label.as_bytes());
        }

        let data = (FIRST_DATA_RECORD - 1) * RECORD_BYTES;
        for (i, w) in words.iter().enumerate() {
            let at = data + i * 8;
            self.put_f64(&mut bytes[at..at + 8], *w);
        }
        bytes
    }

    /// Write the kernel to `path`.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }

    fn put_f64(&self, out: &mut [u8], v: f64) {
        if self.big_endian {
            BigEndian::write_f64(out, v);
        } else {
            LittleEndian::write_f64(out, v);
        }
    }

    fn put_i32(&self, out: &mut [u8], v: i32) {
        if self.big_endian {
            BigEndian::write_i32(out, v);
        } else {
            LittleEndian::write_i32(out, v);
        }
    }
}

/// Records followed by the INIT, INTLEN, RSIZE, N trailer.
fn segment_words(seg: &SyntheticSegment) -> Vec<f64> {
    let interval = (seg.end_s - seg.start_s) / RECORDS_PER_SEGMENT as f64;
    let radius = interval / 2.0;
    let series = if seg.data_type == 2 { 3 } else { 6 };
    let record_words = 2 + series * COEFFS;

    let mut words = Vec::with_capacity(RECORDS_PER_SEGMENT * record_words + 4);
    for r in 0..RECORDS_PER_SEGMENT {
        let mid = seg.start_s + (r as f64 + 0.5) * interval;
        words.push(mid);
        words.push(radius);
        for axis in 0..3 {
            let at_mid = seg.position_km[axis] + seg.velocity_km_s[axis] * (mid - seg.start_s);
            words.extend([at_mid, seg.velocity_km_s[axis] * radius, 0.0]);
        }
        if seg.data_type == 3 {
            for axis in 0..3 {
                words.extend([seg.velocity_km_s[axis], 0.0, 0.0]);
            }
        }
    }
    words.extend([
        seg.start_s,
        interval,
        record_words as f64,
        RECORDS_PER_SEGMENT as f64,
    ]);
    words
}
