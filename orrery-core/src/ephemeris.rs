//! Parser for the initial-conditions text file
//!
//! Sections are separated by blank lines:
//!
//! ```text
//! <free-text header>
//!
//! Reference epoch
//! 2024-01-01 00:00:00
//! Format
//! %Y-%m-%d %H:%M:%S
//!
//! Earth
//! Mass = 5.97219e+24
//! X=-2.6e+07 Y=1.4e+08 Z=-8.5e+03
//! VX=-2.9e+01 VY=-5.4e+00 VZ=1.2e-03
//! ```
//!
//! Masses are in kg, positions in km and velocities in km/s.

use chrono::NaiveDateTime;
use glam::DVec3;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("missing reference epoch section")]
    MissingEpoch,

    #[error("cannot parse epoch '{value}' with format '{format}': {source}")]
    InvalidEpoch {
        value: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("body section {section}: missing {field} line")]
    MissingLine { section: usize, field: &'static str },

    #[error("body '{body}': invalid {field}: '{text}'")]
    InvalidField {
        body: String,
        field: &'static str,
        text: String,
    },

    #[error("no bodies found")]
    NoBodies,
}

/// One body as read from the file, still in SI-derived input units
#[derive(Debug, Clone, PartialEq)]
pub struct BodyRecord {
    pub name: String,
    pub mass_kg: f64,
    pub position_km: DVec3,
    pub velocity_km_s: DVec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ephemeris {
    pub epoch: NaiveDateTime,
    pub records: Vec<BodyRecord>,
}

pub fn load_ephemeris(path: impl AsRef<Path>) -> Result<Ephemeris, EphemerisError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| EphemerisError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_ephemeris(&text)
}

pub fn parse_ephemeris(text: &str) -> Result<Ephemeris, EphemerisError> {
    let sections = split_sections(text);

    let epoch_lines = sections.get(1).ok_or(EphemerisError::MissingEpoch)?;
    let (value, format) = match (epoch_lines.get(1), epoch_lines.get(3)) {
        (Some(value), Some(format)) => (value.trim(), format.trim()),
        _ => return Err(EphemerisError::MissingEpoch),
    };
    let epoch = NaiveDateTime::parse_from_str(value, format).map_err(|source| EphemerisError::InvalidEpoch {
        value: value.to_string(),
        format: format.to_string(),
        source,
    })?;

    let records = sections
        .iter()
        .enumerate()
        .skip(2)
        .map(|(section, lines)| parse_body(section, lines))
        .collect::<Result<Vec<_>, _>>()?;
    if records.is_empty() {
        return Err(EphemerisError::NoBodies);
    }

    Ok(Ephemeris { epoch, records })
}

/// Split on blank lines, dropping empty sections
fn split_sections(text: &str) -> Vec<Vec<&str>> {
    let mut sections = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        sections.push(current);
    }
    sections
}

fn parse_body(section: usize, lines: &[&str]) -> Result<BodyRecord, EphemerisError> {
    let line = |index: usize, field: &'static str| {
        lines
            .get(index)
            .map(|l| l.trim())
            .ok_or(EphemerisError::MissingLine { section, field })
    };

    let name = line(0, "name")?.to_string();
    let mass_line = line(1, "mass")?;
    let mass_kg = mass_line
        .split_once('=')
        .and_then(|(_, value)| value.trim().parse::<f64>().ok())
        .ok_or_else(|| invalid(&name, "mass", mass_line))?;
    let position_km = parse_vector(&name, "position", line(2, "position")?)?;
    let velocity_km_s = parse_vector(&name, "velocity", line(3, "velocity")?)?;

    Ok(BodyRecord {
        name,
        mass_kg,
        position_km,
        velocity_km_s,
    })
}

/// `X=1.0 Y=2.0 Z=3.0`: three whitespace-separated `key=value` parts
fn parse_vector(name: &str, field: &'static str, text: &str) -> Result<DVec3, EphemerisError> {
    let values = text
        .split_whitespace()
        .map(|part| part.split_once('=').and_then(|(_, v)| v.trim().parse::<f64>().ok()))
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| invalid(name, field, text))?;
    match values.as_slice() {
        [x, y, z] => Ok(DVec3::new(*x, *y, *z)),
        _ => Err(invalid(name, field, text)),
    }
}

fn invalid(body: &str, field: &'static str, text: &str) -> EphemerisError {
    EphemerisError::InvalidField {
        body: body.to_string(),
        field,
        text: text.to_string(),
    }
}
