//! Chart generators. Each renderer consumes the cleaned table and writes one
//! PNG into the output directory; failures in the plotting backend propagate.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use itertools::izip;
use log::{info, warn};
use plotters::prelude::*;
use polars::prelude::*;

use crate::{clean, COL};

const CHART_SIZE: (u32, u32) = (1280, 720);
const CAPTION_FONT: (&str, u32) = ("sans-serif", 30);

type LocationSeries = Vec<(String, Vec<(NaiveDate, f64)>)>;

/// Collect one (date, value) series per location for the given metric.
/// Cells with a null value are skipped. Relies on the cleaned table being
/// grouped contiguously by location.
pub(crate) fn series_by_location(df: &DataFrame, metric: &str) -> Result<LocationSeries> {
    let locations = df.column(COL::LOCATION)?.str()?;
    let dates = df.column(COL::DATE)?.date()?;
    let values = df.column(metric)?.f64()?;

    let mut series: LocationSeries = Vec::new();
    for (location, date, value) in izip!(locations, dates.as_date_iter(), values) {
        let (Some(location), Some(date), Some(value)) = (location, date, value) else {
            continue;
        };
        match series.last_mut() {
            Some((name, points)) if name == location => points.push((date, value)),
            _ => series.push((location.to_string(), vec![(date, value)])),
        }
    }
    Ok(series)
}

/// Shared shape of the time-series overlay charts: one line per location,
/// categorical colour key.
fn line_chart(
    df: &DataFrame,
    metric: &str,
    caption: &str,
    y_desc: &str,
    path: PathBuf,
) -> Result<Option<PathBuf>> {
    let series = series_by_location(df, metric)?;
    let points: Vec<(NaiveDate, f64)> = series
        .iter()
        .flat_map(|(_, points)| points.iter().copied())
        .collect();
    let Some(&(first_date, _)) = points.first() else {
        warn!("no data points for '{metric}', skipping chart");
        println!("No data available for '{metric}'. Chart skipped.");
        return Ok(None);
    };

    let mut min_date = first_date;
    let mut max_date = first_date;
    let mut y_max = 0f64;
    for &(date, value) in &points {
        min_date = min_date.min(date);
        max_date = max_date.max(date);
        y_max = y_max.max(value);
    }
    if max_date == min_date {
        max_date = max_date + Duration::days(1);
    }
    if y_max <= 0.0 {
        y_max = 1.0;
    }

    let render_path = path.clone();
    let root = BitMapBackend::new(&render_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(min_date..max_date, 0f64..y_max * 1.05)?;
    chart.configure_mesh().x_desc("Date").y_desc(y_desc).draw()?;

    for (idx, (location, points)) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), &color))?
            .label(location)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    info!("chart saved to {}", path.display());
    Ok(Some(path))
}

pub fn plot_total_cases(df: &DataFrame, out_dir: &Path) -> Result<Option<PathBuf>> {
    line_chart(
        df,
        COL::TOTAL_CASES,
        "Total COVID-19 Cases Over Time",
        "Total Cases",
        out_dir.join("total_cases.png"),
    )
}

pub fn plot_total_deaths(df: &DataFrame, out_dir: &Path) -> Result<Option<PathBuf>> {
    line_chart(
        df,
        COL::TOTAL_DEATHS,
        "Total COVID-19 Deaths Over Time",
        "Total Deaths",
        out_dir.join("total_deaths.png"),
    )
}

pub fn plot_new_cases_smoothed(df: &DataFrame, out_dir: &Path) -> Result<Option<PathBuf>> {
    line_chart(
        df,
        COL::NEW_CASES_SMOOTHED,
        "Daily New COVID-19 Cases (Smoothed) Over Time",
        "New Cases (Smoothed)",
        out_dir.join("new_cases_smoothed.png"),
    )
}

/// The death rate is derived from the cleaned table immediately before the
/// chart is drawn; it is not stored by the cleaning pipeline.
pub fn plot_death_rate(df: &DataFrame, out_dir: &Path) -> Result<Option<PathBuf>> {
    let with_rate = clean::with_death_rate(df)?;
    line_chart(
        &with_rate,
        COL::DEATH_RATE,
        "COVID-19 Death Rate (%) Over Time",
        "Death Rate (%)",
        out_dir.join("death_rate.png"),
    )
}

pub fn plot_total_vaccinations(df: &DataFrame, out_dir: &Path) -> Result<Option<PathBuf>> {
    line_chart(
        df,
        COL::TOTAL_VACCINATIONS,
        "Cumulative COVID-19 Vaccinations Over Time",
        "Total Vaccinations",
        out_dir.join("total_vaccinations.png"),
    )
}

/// Each location's most recent observation of the vaccination percentage,
/// with locations missing the metric dropped. The cleaned table is sorted by
/// date within each location, so the last row per group is the latest.
pub fn vaccination_snapshot(df: &DataFrame) -> Result<DataFrame> {
    let snapshot = df
        .clone()
        .lazy()
        .group_by_stable([col(COL::LOCATION)])
        .agg([
            col(COL::DATE).last(),
            col(COL::PEOPLE_VACCINATED_PER_HUNDRED).last(),
        ])
        .drop_nulls(Some(vec![col(COL::PEOPLE_VACCINATED_PER_HUNDRED)]))
        .collect()?;
    Ok(snapshot)
}

/// Bar chart comparing the latest vaccination percentage per location. If no
/// location has the metric, the chart is skipped with a reported message.
pub fn plot_vaccination_comparison(df: &DataFrame, out_dir: &Path) -> Result<Option<PathBuf>> {
    let snapshot = vaccination_snapshot(df)?;
    if snapshot.height() == 0 {
        warn!("no eligible locations for the vaccination comparison");
        println!("No vaccination data available for comparison after cleaning.");
        return Ok(None);
    }

    let locations: Vec<String> = snapshot
        .column(COL::LOCATION)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    let values: Vec<f64> = snapshot
        .column(COL::PEOPLE_VACCINATED_PER_HUNDRED)?
        .f64()?
        .into_iter()
        .flatten()
        .collect();
    let y_max = values.iter().copied().fold(1f64, f64::max);

    let path = out_dir.join("vaccinated_population.png");
    let render_path = path.clone();
    let root = BitMapBackend::new(&render_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Percentage of Population Vaccinated (Latest Data)",
            CAPTION_FONT,
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0..locations.len() as i32, 0f64..y_max * 1.05)?;
    let x_label = |idx: &i32| {
        locations
            .get(*idx as usize)
            .cloned()
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .x_labels(locations.len())
        .x_label_formatter(&x_label)
        .x_desc("Country")
        .y_desc("People Vaccinated Per Hundred (%)")
        .draw()?;
    for (idx, value) in values.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart.draw_series(std::iter::once(Rectangle::new(
            [(idx as i32, 0.0), (idx as i32 + 1, *value)],
            color.filled(),
        )))?;
    }
    root.present()?;
    info!("chart saved to {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clean::clean, config::Config};

    fn cleaned_df() -> DataFrame {
        let raw = df!(
            COL::LOCATION => [
                "Canada", "Canada",
                "India", "India",
                "United States", "United States",
            ],
            COL::DATE => [
                "2021-01-01", "2021-01-02",
                "2021-01-01", "2021-01-02",
                "2021-01-01", "2021-01-02",
            ],
            COL::TOTAL_CASES => [10.0, 20.0, 5.0, 6.0, 100.0, 120.0],
            COL::TOTAL_DEATHS => [1.0, 2.0, 0.0, 1.0, 10.0, 12.0],
            COL::TOTAL_VACCINATIONS => [5.0, 6.0, 1.0, 2.0, 50.0, 60.0],
            COL::NEW_CASES => [10.0, 10.0, 5.0, 1.0, 100.0, 20.0],
            COL::NEW_CASES_SMOOTHED => [
                Some(9.0), Some(10.0),
                None, None,
                Some(60.0), Some(55.0),
            ],
            COL::PEOPLE_VACCINATED_PER_HUNDRED => [
                Some(1.0), Some(2.0),
                None, None,
                Some(10.0), Some(12.0),
            ],
        )
        .unwrap();
        clean(raw, &Config::default()).unwrap().df
    }

    #[test]
    fn series_are_grouped_per_location() {
        let df = cleaned_df();
        let series = series_by_location(&df, COL::TOTAL_CASES).unwrap();
        let names: Vec<&str> = series.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Canada", "India", "United States"]);
        assert!(series.iter().all(|(_, points)| points.len() == 2));
    }

    #[test]
    fn null_cells_are_skipped_in_series() {
        let df = cleaned_df();
        // India has no smoothed observations, so it contributes no series.
        let series = series_by_location(&df, COL::NEW_CASES_SMOOTHED).unwrap();
        let names: Vec<&str> = series.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Canada", "United States"]);
    }

    #[test]
    fn snapshot_takes_latest_row_and_drops_missing_locations() {
        let df = cleaned_df();
        let snapshot = vaccination_snapshot(&df).unwrap();
        assert_eq!(snapshot.height(), 2);
        let values: Vec<Option<f64>> = snapshot
            .column(COL::PEOPLE_VACCINATED_PER_HUNDRED)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(2.0), Some(12.0)]);
    }

    #[test]
    fn comparison_is_skipped_when_no_location_has_data() {
        let mut df = cleaned_df();
        let height = df.height();
        df.with_column(Float64Chunked::full_null(
            COL::PEOPLE_VACCINATED_PER_HUNDRED,
            height,
        )
        .into_series())
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let rendered = plot_vaccination_comparison(&df, dir.path()).unwrap();
        assert!(rendered.is_none());
    }

    #[test]
    fn comparison_is_skipped_when_the_only_location_lacks_the_metric() {
        let raw = df!(
            COL::LOCATION => ["India", "India"],
            COL::DATE => ["2021-01-01", "2021-01-02"],
            COL::TOTAL_CASES => [5.0, 6.0],
            COL::TOTAL_DEATHS => [0.0, 1.0],
            COL::TOTAL_VACCINATIONS => [1.0, 2.0],
            COL::NEW_CASES => [5.0, 1.0],
            COL::NEW_CASES_SMOOTHED => [None::<f64>, None],
            COL::PEOPLE_VACCINATED_PER_HUNDRED => [None::<f64>, None],
        )
        .unwrap();
        let config = Config {
            countries: vec!["India".into()],
            ..Config::default()
        };
        let df = clean(raw, &config).unwrap().df;
        let dir = tempfile::tempdir().unwrap();
        let rendered = plot_vaccination_comparison(&df, dir.path()).unwrap();
        assert!(rendered.is_none());
    }
}
