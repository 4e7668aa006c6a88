//! Delimited-text records: loading ULD and package lists, writing placements.
//!
//! Every record is parsed by a pure function returning a `Result`; a single
//! bad record fails the whole load with its file and line number. Nothing is
//! silently defaulted.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{Package, Placement, Priority, Uld, ValidationError};

/// Header of the placement output.
pub const PLACEMENT_HEADER: &str = "Package_ID,ULD_ID,X0,Y0,Z0,X1,Y1,Z1";

/// Why a single record could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: &'static str, found: usize },
    #[error("{field} is not a non-negative integer: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("unknown priority class '{0}' (expected Priority or Economy)")]
    UnknownPriority(String),
    #[error("Economy package has no deferral cost")]
    MissingDeferralCost,
    #[error("duplicate identifier '{0}'")]
    DuplicateId(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Errors that can occur when loading a record file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {kind} file {}: {source}", .path.display())]
    InputUnavailable {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: malformed {kind} record: {source}", .path.display())]
    MalformedRecord {
        kind: &'static str,
        path: PathBuf,
        line: usize,
        #[source]
        source: RecordError,
    },
}

/// Errors that can occur when writing placements.
#[derive(Debug, Error)]
#[error("cannot write output file {}: {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

fn parse_number(value: &str, field: &'static str) -> Result<u32, RecordError> {
    value.parse::<u32>().map_err(|_| RecordError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_priority(value: &str) -> Result<Priority, RecordError> {
    match value.to_ascii_lowercase().as_str() {
        "priority" | "p" => Ok(Priority::Priority),
        "economy" | "e" => Ok(Priority::Economy),
        _ => Err(RecordError::UnknownPriority(value.to_string())),
    }
}

/// Parses `id,length,width,height,weight_limit`.
pub fn parse_uld_record(line: &str) -> Result<Uld, RecordError> {
    let fields = split_fields(line);
    let [id, length, width, height, limit] = fields.as_slice() else {
        return Err(RecordError::FieldCount {
            expected: "5",
            found: fields.len(),
        });
    };

    let dims = (
        parse_number(length, "length")?,
        parse_number(width, "width")?,
        parse_number(height, "height")?,
    );
    Ok(Uld::new(*id, dims, parse_number(limit, "weight limit")?)?)
}

/// Parses `id,length,width,height,weight,class[,deferral_cost]`.
///
/// Economy packages must carry a deferral cost. For Priority packages the
/// cost column is optional and ignored (datasets commonly put `-` there).
pub fn parse_package_record(line: &str) -> Result<Package, RecordError> {
    let fields = split_fields(line);
    let (id, length, width, height, weight, class, cost) = match fields.as_slice() {
        [id, l, w, h, weight, class] => (id, l, w, h, weight, class, None),
        [id, l, w, h, weight, class, cost] => (id, l, w, h, weight, class, Some(cost)),
        _ => {
            return Err(RecordError::FieldCount {
                expected: "6 or 7",
                found: fields.len(),
            });
        }
    };

    let dims = (
        parse_number(length, "length")?,
        parse_number(width, "width")?,
        parse_number(height, "height")?,
    );
    let weight = parse_number(weight, "weight")?;
    let priority = parse_priority(class)?;
    let deferral_cost = match (priority, cost) {
        (Priority::Priority, _) => 0,
        (Priority::Economy, Some(cost)) if !cost.is_empty() => {
            parse_number(cost, "deferral cost")?
        }
        (Priority::Economy, _) => return Err(RecordError::MissingDeferralCost),
    };

    Ok(Package::new(*id, dims, weight, priority, deferral_cost)?)
}

/// Parses the body of a record file: skips the header line and blank lines,
/// rejects duplicate identifiers.
fn parse_records<T>(
    content: &str,
    path: &Path,
    kind: &'static str,
    parse: impl Fn(&str) -> Result<T, RecordError>,
    id_of: impl Fn(&T) -> &str,
) -> Result<Vec<T>, LoadError> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for (idx, line) in content.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let malformed = |source| LoadError::MalformedRecord {
            kind,
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        };

        let record = parse(line).map_err(malformed)?;
        if !seen.insert(id_of(&record).to_string()) {
            return Err(malformed(RecordError::DuplicateId(
                id_of(&record).to_string(),
            )));
        }
        records.push(record);
    }
    Ok(records)
}

fn read_source(path: &Path, kind: &'static str) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::InputUnavailable {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Loads ULDs from a CSV file with a header line.
pub fn load_ulds(path: impl AsRef<Path>) -> Result<Vec<Uld>, LoadError> {
    let path = path.as_ref();
    let content = read_source(path, "ULD")?;
    parse_records(&content, path, "ULD", parse_uld_record, |u: &Uld| u.id.as_str())
}

/// Loads packages from a CSV file with a header line.
pub fn load_packages(path: impl AsRef<Path>) -> Result<Vec<Package>, LoadError> {
    let path = path.as_ref();
    let content = read_source(path, "package")?;
    parse_records(&content, path, "package", parse_package_record, |p: &Package| p.id.as_str())
}

/// Writes placements as CSV rows, header first.
pub fn write_placements_to(mut out: impl Write, placements: &[Placement]) -> io::Result<()> {
    writeln!(out, "{PLACEMENT_HEADER}")?;
    for p in placements {
        let (x0, y0, z0) = p.min;
        let (x1, y1, z1) = p.max;
        writeln!(
            out,
            "{},{},{x0},{y0},{z0},{x1},{y1},{z1}",
            p.package_id, p.uld_id
        )?;
    }
    out.flush()
}

/// Writes placements to `path`, creating missing parent directories.
pub fn write_placements(path: impl AsRef<Path>, placements: &[Placement]) -> Result<(), WriteError> {
    let path = path.as_ref();
    let unwritable = |source| WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(unwritable)?;
    }
    let file = File::create(path).map_err(unwritable)?;
    write_placements_to(BufWriter::new(file), placements).map_err(unwritable)
}
