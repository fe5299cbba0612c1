//! NAIF leapseconds kernel (LSK) data.
//!
//! Reads the `DELTET/*` variables from the `\begindata` blocks of an LSK
//! text file. A built-in table equivalent to `naif0012.tls` is available
//! through [`LskData::builtin`] for callers that do not ship the file.

use std::collections::HashMap;

use crate::error::TimeError;
use crate::julian::{calendar_to_jd, jd_to_j2000_seconds, month_from_abbrev};

/// TT - TAI in seconds.
pub const TT_MINUS_TAI_S: f64 = 32.184;

/// TAI - UTC steps: `(delta_at, year, month)`, effective 00:00 UTC on day 1.
const BUILTIN_DELTA_AT: [(f64, i32, u32); 28] = [
    (10.0, 1972, 1),
    (11.0, 1972, 7),
    (12.0, 1973, 1),
    (13.0, 1974, 1),
    (14.0, 1975, 1),
    (15.0, 1976, 1),
    (16.0, 1977, 1),
    (17.0, 1978, 1),
    (18.0, 1979, 1),
    (19.0, 1980, 1),
    (20.0, 1981, 7),
    (21.0, 1982, 7),
    (22.0, 1983, 7),
    (23.0, 1985, 7),
    (24.0, 1988, 1),
    (25.0, 1990, 1),
    (26.0, 1991, 1),
    (27.0, 1992, 7),
    (28.0, 1993, 7),
    (29.0, 1994, 7),
    (30.0, 1996, 1),
    (31.0, 1997, 7),
    (32.0, 1999, 1),
    (33.0, 2006, 1),
    (34.0, 2009, 1),
    (35.0, 2012, 7),
    (36.0, 2015, 7),
    (37.0, 2017, 1),
];

/// Parsed LSK contents.
#[derive(Debug, Clone, PartialEq)]
pub struct LskData {
    /// TT - TAI (DELTET/DELTA_T_A).
    pub delta_t_a: f64,
    /// Amplitude of the periodic TDB - TT term (DELTET/K).
    pub k: f64,
    /// Eccentricity of the Earth-Moon barycenter orbit (DELTET/EB).
    pub eb: f64,
    /// Mean anomaly at J2000 in radians (DELTET/M[0]).
    pub m0: f64,
    /// Mean anomaly rate in rad/s (DELTET/M[1]).
    pub m1: f64,
    /// `(delta_at, utc_seconds_past_j2000)` pairs, ascending by epoch.
    pub leap_seconds: Vec<(f64, f64)>,
}

impl LskData {
    /// Constants and leap-second table of `naif0012.tls` (last step 2017-01-01).
    pub fn builtin() -> Self {
        let leap_seconds = BUILTIN_DELTA_AT
            .iter()
            .map(|&(delta, year, month)| {
                (delta, jd_to_j2000_seconds(calendar_to_jd(year, month, 1.0)))
            })
            .collect();
        Self {
            delta_t_a: TT_MINUS_TAI_S,
            k: 1.657e-3,
            eb: 1.671e-2,
            m0: 6.239996,
            m1: 1.99096871e-7,
            leap_seconds,
        }
    }
}

/// Parse LSK text.
pub fn parse_lsk(content: &str) -> Result<LskData, TimeError> {
    let pool = KernelPool::parse(content)?;

    let m = pool.values("DELTET/M")?;
    if m.len() < 2 {
        return Err(TimeError::LskParse("DELTET/M needs 2 values".into()));
    }

    let flat = pool.values("DELTET/DELTA_AT")?;
    if flat.is_empty() || flat.len() % 2 != 0 {
        return Err(TimeError::LskParse(
            "DELTET/DELTA_AT must hold (offset, epoch) pairs".into(),
        ));
    }
    let mut leap_seconds: Vec<(f64, f64)> = flat.chunks(2).map(|p| (p[0], p[1])).collect();
    if leap_seconds.windows(2).any(|w| w[1].1 <= w[0].1) {
        log::warn!("DELTET/DELTA_AT epochs are not ascending; sorting");
        leap_seconds.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    Ok(LskData {
        delta_t_a: pool.scalar("DELTET/DELTA_T_A")?,
        k: pool.scalar("DELTET/K")?,
        eb: pool.scalar("DELTET/EB")?,
        m0: m[0],
        m1: m[1],
        leap_seconds,
    })
}

/// Numeric kernel-pool variables from the data blocks.
struct KernelPool {
    vars: HashMap<String, Vec<f64>>,
}

impl KernelPool {
    fn parse(content: &str) -> Result<Self, TimeError> {
        let mut data = String::new();
        let mut in_data = false;
        for line in content.lines() {
            match line.trim() {
                t if t.eq_ignore_ascii_case("\\begindata") => in_data = true,
                t if t.eq_ignore_ascii_case("\\begintext") => in_data = false,
                _ if in_data => {
                    data.push_str(line);
                    data.push('\n');
                }
                _ => {}
            }
        }
        if data.trim().is_empty() {
            return Err(TimeError::LskParse("no \\begindata section found".into()));
        }

        let mut vars = HashMap::new();
        let mut tokens = tokenize(&data).into_iter().peekable();
        while let Some(name) = tokens.next() {
            match tokens.next().as_deref() {
                Some("=") | Some("+=") => {}
                _ => return Err(TimeError::LskParse(format!("expected '=' after {name}"))),
            }
            let mut values = Vec::new();
            if tokens.peek().map(String::as_str) == Some("(") {
                tokens.next();
                loop {
                    match tokens.next() {
                        Some(t) if t == ")" => break,
                        Some(t) => values.push(parse_value(&t)?),
                        None => {
                            return Err(TimeError::LskParse(format!("unclosed '(' in {name}")));
                        }
                    }
                }
            } else {
                let t = tokens
                    .next()
                    .ok_or_else(|| TimeError::LskParse(format!("{name} has no value")))?;
                values.push(parse_value(&t)?);
            }
            vars.entry(name).or_insert_with(Vec::new).extend(values);
        }
        Ok(Self { vars })
    }

    fn values(&self, name: &str) -> Result<&[f64], TimeError> {
        self.vars
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| TimeError::LskParse(format!("missing {name}")))
    }

    fn scalar(&self, name: &str) -> Result<f64, TimeError> {
        self.values(name)?
            .first()
            .copied()
            .ok_or_else(|| TimeError::LskParse(format!("{name} has no values")))
    }
}

/// Split on whitespace and commas, keeping `(`, `)` and `=` as tokens.
fn tokenize(text: &str) -> Vec<String> {
    let spaced = text
        .replace('(', " ( ")
        .replace(')', " ) ")
        .replace("+=", " += ")
        .replace(',', " ");
    let mut out = Vec::new();
    for word in spaced.split_whitespace() {
        if word == "+=" {
            out.push(word.to_string());
            continue;
        }
        // `NAME=VALUE` without spaces.
        let mut parts = word.split('=').peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                out.push(part.to_string());
            }
            if parts.peek().is_some() {
                out.push("=".to_string());
            }
        }
    }
    out
}

/// A number (Fortran `D` exponents allowed) or an `@YYYY-MON-DD` date.
fn parse_value(token: &str) -> Result<f64, TimeError> {
    if let Some(date) = token.strip_prefix('@') {
        return parse_naif_date(date);
    }
    token
        .replace(['D', 'd'], "e")
        .parse()
        .map_err(|e| TimeError::LskParse(format!("cannot parse {token:?} as a number: {e}")))
}

/// `1972-JAN-1` as UTC seconds past J2000.
fn parse_naif_date(s: &str) -> Result<f64, TimeError> {
    let bad = || TimeError::LskParse(format!("bad date literal @{s}"));
    let mut parts = s.splitn(3, '-');
    let year: i32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    let month = parts.next().and_then(month_from_abbrev).ok_or_else(bad)?;
    let day: f64 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    Ok(jd_to_j2000_seconds(calendar_to_jd(year, month, day)))
}
