use std::collections::HashSet;

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use tracing::info;
use vidmetrics_parser::schema::{
    COUNT_COLUMNS, DURATION, NORMALIZED_DATE_FORMAT, REQUIRED_COLUMNS, UPLOAD_DATE, VIDEO_ID,
};
use vidmetrics_parser::RawTable;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub loaded_rows: usize,
    pub duplicates_removed: usize,
    pub unparseable_dates: usize,
    pub before_cutoff: usize,
    pub retained_rows: usize,
    /// Missing cells per column among retained rows, before zero-filling.
    pub missing_values: Vec<(String, usize)>,
}

pub fn check_required_columns(table: &RawTable) -> Result<()> {
    let missing = table.missing_columns(&REQUIRED_COLUMNS);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::MissingColumns { missing })
    }
}

/// Parses `value` with the first matching format.
pub fn parse_calendar_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let trimmed = value.trim();
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Counts may arrive as integers or as floats such as `100.0`.
pub fn parse_count(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v as i64)
    })
}

pub fn parse_seconds(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Deduplicates on `video_id` (first occurrence wins), drops rows whose
/// `upload_date` cannot be parsed or precedes `cutoff`, and zero-fills the
/// count and duration columns.
///
/// The returned frame keeps the input column order. Required columns are
/// typed (`upload_date` normalized to `YYYY-MM-DD` text, counts `i64`,
/// duration `f64`); any other column is carried as text.
pub fn clean_table(
    table: &RawTable,
    cutoff: NaiveDate,
    date_formats: &[String],
) -> Result<(DataFrame, CleaningReport)> {
    check_required_columns(table)?;

    let id_idx = column_index(table, VIDEO_ID)?;
    let date_idx = column_index(table, UPLOAD_DATE)?;

    let mut report = CleaningReport {
        loaded_rows: table.height(),
        ..CleaningReport::default()
    };

    let mut seen: HashSet<Option<&str>> = HashSet::new();
    let mut kept: Vec<(usize, NaiveDate)> = Vec::with_capacity(table.height());

    for row in 0..table.height() {
        if !seen.insert(table.cell(row, id_idx)) {
            report.duplicates_removed += 1;
            continue;
        }

        let Some(date) = table
            .cell(row, date_idx)
            .and_then(|value| parse_calendar_date(value, date_formats))
        else {
            report.unparseable_dates += 1;
            continue;
        };

        if date < cutoff {
            report.before_cutoff += 1;
            continue;
        }

        kept.push((row, date));
    }

    report.retained_rows = kept.len();

    let mut columns: Vec<Column> = Vec::with_capacity(table.headers.len());
    for (col_idx, name) in table.headers.iter().enumerate() {
        let name = name.as_str();
        let mut missing = 0usize;

        let series = if name == UPLOAD_DATE {
            let values: Vec<String> = kept
                .iter()
                .map(|(_, date)| date.format(NORMALIZED_DATE_FORMAT).to_string())
                .collect();
            Series::new(name.into(), values)
        } else if COUNT_COLUMNS.contains(&name) {
            let values: Vec<i64> = kept
                .iter()
                .map(|(row, _)| {
                    table.cell(*row, col_idx).and_then(parse_count).unwrap_or_else(|| {
                        missing += 1;
                        0
                    })
                })
                .collect();
            Series::new(name.into(), values)
        } else if name == DURATION {
            let values: Vec<f64> = kept
                .iter()
                .map(|(row, _)| {
                    table.cell(*row, col_idx).and_then(parse_seconds).unwrap_or_else(|| {
                        missing += 1;
                        0.0
                    })
                })
                .collect();
            Series::new(name.into(), values)
        } else {
            let values: Vec<Option<&str>> = kept
                .iter()
                .map(|(row, _)| {
                    let cell = table.cell(*row, col_idx);
                    if cell.is_none() {
                        missing += 1;
                    }
                    cell
                })
                .collect();
            Series::new(name.into(), values)
        };

        report.missing_values.push((name.to_string(), missing));
        columns.push(series.into());
    }

    info!(
        loaded = report.loaded_rows,
        duplicates_removed = report.duplicates_removed,
        unparseable_dates = report.unparseable_dates,
        before_cutoff = report.before_cutoff,
        retained = report.retained_rows,
        "table cleaned"
    );
    for (column, count) in &report.missing_values {
        info!(column = %column, missing = count, "missing values");
    }

    Ok((DataFrame::new(columns)?, report))
}

fn column_index(table: &RawTable, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| PipelineError::MissingColumns {
            missing: vec![name.to_string()],
        })
}

