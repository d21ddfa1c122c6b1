use std::path::Path;

use polars::prelude::*;
use vidmetrics_parser::schema::COLLECTED_COLUMNS;
use vidmetrics_parser::CollectedRow;

use crate::error::Result;

/// Both tables are written as UTF-8 with a byte-order mark.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Serializes the intermediate table. The header is written even when there
/// are no rows.
pub fn collected_table_bytes(rows: &[CollectedRow], delimiter: u8) -> Result<Vec<u8>> {
    let mut buffer = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_writer(&mut buffer);

        writer.write_record(COLLECTED_COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

/// Serializes a feature table column by column. Booleans are written as
/// `True`/`False` and nulls as empty fields.
pub fn feature_table_bytes(df: &DataFrame, delimiter: u8) -> Result<Vec<u8>> {
    let columns = df
        .get_columns()
        .iter()
        .map(format_column)
        .collect::<PolarsResult<Vec<Vec<String>>>>()?;

    let mut buffer = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_writer(&mut buffer);

        writer.write_record(df.get_column_names().iter().map(|name| name.as_str()))?;
        for idx in 0..df.height() {
            writer.write_record(columns.iter().map(|cells| cells[idx].as_str()))?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

/// Writes a fully serialized table, creating the parent directory if needed.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

fn format_column(column: &Column) -> PolarsResult<Vec<String>> {
    let series = column.as_materialized_series();
    let len = series.len();

    let cells = match series.dtype() {
        DataType::String => {
            let values = series.str()?;
            (0..len)
                .map(|idx| values.get(idx).unwrap_or_default().to_string())
                .collect()
        }
        DataType::Int64 => {
            let values = series.i64()?;
            (0..len)
                .map(|idx| values.get(idx).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        }
        DataType::Int32 => {
            let values = series.i32()?;
            (0..len)
                .map(|idx| values.get(idx).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        }
        DataType::Float64 => {
            let values = series.f64()?;
            (0..len)
                .map(|idx| values.get(idx).map(format_float).unwrap_or_default())
                .collect()
        }
        DataType::Boolean => {
            let values = series.bool()?;
            (0..len)
                .map(|idx| match values.get(idx) {
                    Some(true) => "True".to_string(),
                    Some(false) => "False".to_string(),
                    None => String::new(),
                })
                .collect()
        }
        other => {
            return Err(PolarsError::ComputeError(
                format!("column '{}' has unsupported type {other}", series.name()).into(),
            ))
        }
    };

    Ok(cells)
}

fn format_float(value: f64) -> String {
    if value.is_finite() {
        format!("{value:?}")
    } else {
        String::new()
    }
}
