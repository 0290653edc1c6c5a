//! Price-source CSV ingest.
//!
//! Each partition file has no header row and seven positional fields:
//!
//! `shape_code, clarity, color, weight_from, weight_to, price_per_unit, date`
//!
//! Design goals:
//! - **Strict rows**: any malformed required field aborts the load with the
//!   file and line (a partial table would price stones silently wrong)
//! - **Lenient dates**: an unparseable date is stored as absent
//! - **Source order preserved**: lookups depend on table order

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::{Clarity, Color, PriceBandRecord, ShapeCode};
use crate::error::AppError;
use crate::pricing::PriceTable;

const REQUIRED_FIELDS: usize = 6;

/// Locations of the two price-source partitions.
#[derive(Debug, Clone)]
pub struct PriceSourcePaths {
    pub round: PathBuf,
    pub fancy: PathBuf,
}

/// Load both partitions into an immutable table.
pub fn load_price_table(paths: &PriceSourcePaths) -> Result<PriceTable, AppError> {
    let round = load_partition(&paths.round, ShapeCode::Round)?;
    let fancy = load_partition(&paths.fancy, ShapeCode::Fancy)?;
    let table = PriceTable::from_partitions(round, fancy);

    for overlap in table.overlapping_bands() {
        tracing::warn!(
            shape = overlap.shape_code.code(),
            clarity = overlap.clarity.code(),
            color = overlap.color.code(),
            first = overlap.first,
            second = overlap.second,
            "overlapping price bands {:.2}-{:.2} and {:.2}-{:.2}; first band wins",
            overlap.first_range.0,
            overlap.first_range.1,
            overlap.second_range.0,
            overlap.second_range.1,
        );
    }

    tracing::info!(
        round = table.partition(ShapeCode::Round).len(),
        fancy = table.partition(ShapeCode::Fancy).len(),
        latest = ?table.latest_as_of(),
        "loaded price table"
    );

    Ok(table)
}

/// Load one partition file.
///
/// Rows whose shape code does not belong to `partition` are kept (lookups
/// filter on shape code) but logged, since they can never match.
pub fn load_partition(path: &Path, partition: ShapeCode) -> Result<Vec<PriceBandRecord>, AppError> {
    validate_source_path(path)?;

    let file = File::open(path)
        .map_err(|e| AppError::data_load(format!("Failed to open price source '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records = Vec::new();
    let mut foreign_rows = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 1;
        let record = result.map_err(|e| {
            AppError::data_load(format!("{}:{line}: CSV parse error: {e}", path.display()))
        })?;

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let band = parse_record(&record)
            .map_err(|msg| AppError::data_load(format!("{}:{line}: {msg}", path.display())))?;

        if band.shape_code != partition {
            foreign_rows += 1;
        }
        records.push(band);
    }

    if foreign_rows > 0 {
        tracing::warn!(
            path = %path.display(),
            partition = partition.partition_name(),
            rows = foreign_rows,
            "rows with a foreign shape code will never match"
        );
    }

    if records.is_empty() {
        return Err(AppError::data_load(format!(
            "Price source '{}' ({} partition) contains no price bands.",
            path.display(),
            partition.partition_name()
        )));
    }

    Ok(records)
}

/// Ensure the path exists and is a regular file.
pub fn validate_source_path(path: &Path) -> Result<(), AppError> {
    if !path.exists() {
        return Err(AppError::data_load(format!(
            "Price source not found: {}",
            path.display()
        )));
    }
    if path.is_dir() {
        return Err(AppError::data_load(format!(
            "Expected a price source file, got a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

fn parse_record(record: &StringRecord) -> Result<PriceBandRecord, String> {
    if record.len() < REQUIRED_FIELDS {
        return Err(format!(
            "expected at least {REQUIRED_FIELDS} fields (shape, clarity, color, from, to, price), got {}",
            record.len()
        ));
    }

    let field = |i: usize| record.get(i).unwrap_or("");

    let shape_code = ShapeCode::from_code(field(0))
        .ok_or_else(|| format!("Unknown shape code '{}'", field(0)))?;
    let clarity =
        Clarity::from_code(field(1)).ok_or_else(|| format!("Unknown clarity '{}'", field(1)))?;
    if clarity == Clarity::Fl {
        return Err("FL is not stored in the price table (FL is priced as IF)".to_string());
    }
    let color = Color::from_code(field(2)).ok_or_else(|| format!("Unknown color '{}'", field(2)))?;

    let weight_from = parse_number(field(3), "weight_from")?;
    let weight_to = parse_number(field(4), "weight_to")?;
    let price_per_unit = parse_number(field(5), "price_per_unit")?;

    if weight_from > weight_to {
        return Err(format!(
            "weight_from {weight_from} is greater than weight_to {weight_to}"
        ));
    }

    let as_of_date = record.get(6).and_then(parse_date);

    Ok(PriceBandRecord {
        shape_code,
        clarity,
        color,
        weight_from,
        weight_to,
        price_per_unit,
        as_of_date,
    })
}

fn parse_number(raw: &str, name: &str) -> Result<f64, String> {
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{raw}'"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite `{name}` value '{raw}'"))
    }
}

/// Parse the as-of date; `None` for anything unrecognized.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}
