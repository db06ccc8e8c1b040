//! Read-only exploration of the raw table: schema, preview rows, null counts
//! and a memory summary. Display is left to the caller.

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Exploration {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    /// First rows of the table, stringified per cell.
    pub preview: Vec<Vec<String>>,
    pub estimated_size_bytes: usize,
}

impl Exploration {
    pub fn from_frame(df: &DataFrame, preview_rows: usize) -> Result<Self> {
        let null_counts = df.null_count();
        let mut columns = Vec::with_capacity(df.width());
        for (series, nulls) in df.get_columns().iter().zip(null_counts.get_columns()) {
            columns.push(ColumnSummary {
                name: series.name().to_string(),
                dtype: series.dtype().to_string(),
                null_count: nulls.u32()?.get(0).unwrap_or(0) as usize,
            });
        }
        let preview = (0..df.height().min(preview_rows))
            .map(|idx| {
                df.get(idx)
                    .map(|row| row.iter().map(cell_to_string).collect())
                    .unwrap_or_default()
            })
            .collect();
        Ok(Self {
            rows: df.height(),
            columns,
            preview,
            estimated_size_bytes: df.estimated_size(),
        })
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

// Strings are rendered without the quotes their `Display` impl adds.
fn cell_to_string(value: &AnyValue) -> String {
    match value.get_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}
