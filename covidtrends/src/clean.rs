//! The cleaning pipeline: allow-list filter, date parsing, sorting, removal
//! of rows missing critical values, and per-location gap filling.

use anyhow::Result;
use itertools::izip;
use log::info;
use polars::prelude::*;

use crate::{config::Config, COL};

/// Columns a row must have for it to survive cleaning.
pub const CRITICAL_COLUMNS: [&str; 4] = [
    COL::DATE,
    COL::TOTAL_CASES,
    COL::TOTAL_DEATHS,
    COL::TOTAL_VACCINATIONS,
];

const METRIC_COLUMNS: [&str; 6] = [
    COL::TOTAL_CASES,
    COL::TOTAL_DEATHS,
    COL::TOTAL_VACCINATIONS,
    COL::NEW_CASES,
    COL::NEW_CASES_SMOOTHED,
    COL::PEOPLE_VACCINATED_PER_HUNDRED,
];

/// Result of the cleaning pipeline.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub df: DataFrame,
    /// Rows removed because a critical column was missing.
    pub dropped_rows: usize,
}

/// Run the full cleaning pipeline over a raw table. An allow-list filter
/// that matches nothing yields an empty (but valid) frame rather than an
/// error; chart generation checks for emptiness before proceeding.
pub fn clean(df: DataFrame, config: &Config) -> Result<Cleaned> {
    // Re-running the pipeline over its own output must be a no-op, so the
    // date parse is skipped when the column is already a date.
    let date_expr = match df.column(COL::DATE)?.dtype() {
        DataType::Date => col(COL::DATE),
        _ => col(COL::DATE).str().to_date(StrptimeOptions {
            format: Some("%Y-%m-%d".to_string()),
            ..Default::default()
        }),
    };
    let countries = Series::new("countries", config.countries.as_slice());
    let cast_exprs: Vec<Expr> = METRIC_COLUMNS
        .iter()
        .map(|name| col(*name).cast(DataType::Float64))
        .collect();

    let sorted = df
        .lazy()
        .filter(col(COL::LOCATION).is_in(lit(countries)))
        .with_column(date_expr)
        .with_columns(cast_exprs)
        .sort(
            [COL::LOCATION, COL::DATE],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;

    let before = sorted.height();
    let critical: Vec<Expr> = CRITICAL_COLUMNS.iter().map(|name| col(*name)).collect();
    let survivors = sorted.lazy().drop_nulls(Some(critical)).collect()?;
    let dropped_rows = before - survivors.height();
    info!("dropped {dropped_rows} rows with missing critical values");

    // Gap-fill the remaining numeric columns forward then backward, within
    // each location group so values never leak across country boundaries.
    let fill_exprs: Vec<Expr> = survivors
        .get_columns()
        .iter()
        .filter(|series| series.dtype().is_numeric())
        .map(|series| {
            col(series.name())
                .forward_fill(None)
                .backward_fill(None)
                .over([col(COL::LOCATION)])
        })
        .collect();
    let df = survivors.lazy().with_columns(fill_exprs).collect()?;

    Ok(Cleaned { df, dropped_rows })
}

/// A death-rate observation before fills are applied. Division by zero is
/// distinguished from an absent input so the fill policy stays explicit.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RateSample {
    Present(f64),
    Missing,
    NonFinite,
}

impl RateSample {
    fn from_parts(deaths: Option<f64>, cases: Option<f64>) -> Self {
        match (deaths, cases) {
            (Some(deaths), Some(cases)) => {
                let rate = 100.0 * deaths / cases;
                if rate.is_finite() {
                    RateSample::Present(rate)
                } else {
                    RateSample::NonFinite
                }
            }
            _ => RateSample::Missing,
        }
    }
}

/// Append the derived `death_rate` column: 100 × total_deaths / total_cases,
/// with non-finite results treated as missing, forward-filled within each
/// location and defaulted to 0 at sequence start.
///
/// Expects a cleaned frame: rows grouped contiguously by location.
pub fn with_death_rate(df: &DataFrame) -> Result<DataFrame> {
    let locations = df.column(COL::LOCATION)?.str()?;
    let deaths = df.column(COL::TOTAL_DEATHS)?.f64()?;
    let cases = df.column(COL::TOTAL_CASES)?.f64()?;

    let mut rates = Vec::with_capacity(df.height());
    let mut current_location: Option<&str> = None;
    let mut last_rate: Option<f64> = None;
    for (location, deaths, cases) in izip!(locations, deaths, cases) {
        if location != current_location {
            current_location = location;
            last_rate = None;
        }
        let rate = match RateSample::from_parts(deaths, cases) {
            RateSample::Present(rate) => {
                last_rate = Some(rate);
                rate
            }
            RateSample::Missing | RateSample::NonFinite => last_rate.unwrap_or(0.0),
        };
        rates.push(rate);
    }

    let mut out = df.clone();
    out.with_column(Series::new(COL::DEATH_RATE, rates))?;
    Ok(out)
}
