use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;
use polars::frame::DataFrame;

use crate::clean::Cleaned;
use crate::config::Config;
use crate::explore::Exploration;
use crate::source::DataSource;

// Re-exports
pub use column_names as COL;

// Modules
pub mod charts;
pub mod clean;
pub mod column_names;
pub mod config;
pub mod explore;
pub mod source;

/// Type for the covidtrends pipeline and API
pub struct CovidTrends {
    pub config: Config,
}

impl CovidTrends {
    /// Setup the CovidTrends object with default configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Setup the CovidTrends object with custom configuration
    pub fn with_config(config: Config) -> Self {
        debug!("config: {config:?}");
        Self { config }
    }

    /// Obtains the raw table from a data source. `None` signals an
    /// acquisition failure that has already been reported.
    pub fn acquire(&self, source: &DataSource) -> Result<Option<DataFrame>> {
        source.acquire()
    }

    /// Computes the read-only exploration summary of a raw table.
    pub fn explore(&self, df: &DataFrame) -> Result<Exploration> {
        Exploration::from_frame(df, self.config.preview_rows)
    }

    /// Runs the cleaning pipeline over a raw table.
    pub fn clean(&self, df: DataFrame) -> Result<Cleaned> {
        clean::clean(df, &self.config)
    }

    /// Renders all charts for a cleaned table into `out_dir`, returning the
    /// paths written. Charts with nothing to show are skipped with a
    /// reported message.
    pub fn render_charts(&self, df: &DataFrame, out_dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(out_dir)?;
        let mut rendered = Vec::new();
        rendered.extend(charts::plot_total_cases(df, out_dir)?);
        rendered.extend(charts::plot_total_deaths(df, out_dir)?);
        rendered.extend(charts::plot_new_cases_smoothed(df, out_dir)?);
        rendered.extend(charts::plot_death_rate(df, out_dir)?);
        rendered.extend(charts::plot_total_vaccinations(df, out_dir)?);
        rendered.extend(charts::plot_vaccination_comparison(df, out_dir)?);
        Ok(rendered)
    }
}

impl Default for CovidTrends {
    fn default() -> Self {
        Self::new()
    }
}
