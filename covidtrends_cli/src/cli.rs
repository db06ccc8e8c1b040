use std::path::{Path, PathBuf};

use clap::{command, Args, Parser, Subcommand};
use covidtrends::{
    clean::Cleaned,
    config::Config,
    source::DataSource,
    CovidTrends,
};
use enum_dispatch::enum_dispatch;
use log::info;
use polars::frame::DataFrame;

use crate::display::display_exploration;
use crate::error::CovidTrendsCliResult;

/// Trait that defines what to run when a given subcommand is invoked.
#[enum_dispatch]
pub trait RunCommand {
    fn run(&self, config: Config) -> CovidTrendsCliResult<()>;
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    #[arg(help = "CSV file, or a directory to scan for the first CSV file")]
    input: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ChartParamsArgs {
    #[arg(short = 'o', long, help = "Directory to place the rendered charts")]
    output_dir: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_delimiter = ',',
        help = "Override the configured country allow-list (comma-separated)"
    )]
    countries: Vec<String>,
}

fn config_with_overrides(mut config: Config, args: &ChartParamsArgs) -> Config {
    if !args.countries.is_empty() {
        config.countries = args.countries.clone();
    }
    config
}

fn charts_dir(config: &Config, args: &ChartParamsArgs) -> PathBuf {
    args.output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.charts_dir))
}

fn explore_with_report(trends: &CovidTrends, df: &DataFrame) -> CovidTrendsCliResult<()> {
    println!("\n--- Data Exploration ---");
    let exploration = trends.explore(df)?;
    display_exploration(&exploration);
    Ok(())
}

fn clean_with_report(
    trends: &CovidTrends,
    df: DataFrame,
) -> CovidTrendsCliResult<Option<Cleaned>> {
    println!("\n--- Data Cleaning ---");
    let cleaned = trends.clean(df)?;
    println!(
        "Dropped {} rows with missing critical values.",
        cleaned.dropped_rows
    );
    if cleaned.df.height() == 0 {
        println!("Cleaned data is empty. No charts can be generated.");
        return Ok(None);
    }
    println!("Data cleaned successfully!");
    Ok(Some(cleaned))
}

fn render_with_report(
    trends: &CovidTrends,
    df: &DataFrame,
    out_dir: &Path,
) -> CovidTrendsCliResult<()> {
    let rendered = trends.render_charts(df, out_dir)?;
    println!(
        "\nRendered {} chart(s) to '{}':",
        rendered.len(),
        out_dir.display()
    );
    for path in rendered {
        println!("  {}", path.display());
    }
    Ok(())
}

/// The `explore` command prints the exploration diagnostics for a raw table.
#[derive(Args, Debug)]
pub struct ExploreCommand {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long, help = "Print the exploration summary as JSON")]
    json: bool,
}

impl RunCommand for ExploreCommand {
    fn run(&self, config: Config) -> CovidTrendsCliResult<()> {
        info!("Running `explore` subcommand");
        let trends = CovidTrends::with_config(config);
        let Some(df) = trends.acquire(&DataSource::Path(self.input.input.clone()))? else {
            return Ok(());
        };
        if self.json {
            let exploration = trends.explore(&df)?;
            println!("{}", serde_json::to_string_pretty(&exploration)?);
        } else {
            explore_with_report(&trends, &df)?;
        }
        Ok(())
    }
}

/// The `charts` command cleans the table and renders every chart.
#[derive(Args, Debug)]
pub struct ChartsCommand {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    chart_params: ChartParamsArgs,
}

impl RunCommand for ChartsCommand {
    fn run(&self, config: Config) -> CovidTrendsCliResult<()> {
        info!("Running `charts` subcommand");
        let config = config_with_overrides(config, &self.chart_params);
        let out_dir = charts_dir(&config, &self.chart_params);
        let trends = CovidTrends::with_config(config);
        let Some(df) = trends.acquire(&DataSource::Path(self.input.input.clone()))? else {
            return Ok(());
        };
        let Some(cleaned) = clean_with_report(&trends, df)? else {
            return Ok(());
        };
        render_with_report(&trends, &cleaned.df, &out_dir)
    }
}

/// The `run` command is the end-to-end flow: exploration diagnostics, then
/// cleaning, then every chart.
#[derive(Args, Debug)]
pub struct RunAllCommand {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    chart_params: ChartParamsArgs,
}

impl RunCommand for RunAllCommand {
    fn run(&self, config: Config) -> CovidTrendsCliResult<()> {
        info!("Running `run` subcommand");
        let config = config_with_overrides(config, &self.chart_params);
        let out_dir = charts_dir(&config, &self.chart_params);
        let trends = CovidTrends::with_config(config);
        let Some(df) = trends.acquire(&DataSource::Path(self.input.input.clone()))? else {
            return Ok(());
        };
        explore_with_report(&trends, &df)?;
        let Some(cleaned) = clean_with_report(&trends, df)? else {
            return Ok(());
        };
        render_with_report(&trends, &cleaned.df, &out_dir)
    }
}

/// The entrypoint for the CLI.
#[derive(Parser, Debug)]
#[command(version, about="Covidtrends ingests the OWID COVID-19 CSV and renders descriptive charts for a small set of countries.", long_about = None, name="covidtrends")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Commands contains the list of subcommands avaliable for use in the CLI.
/// Each command should implmement the RunCommand trait and specify the list
/// of required args for that command.
#[derive(Subcommand, Debug)]
#[enum_dispatch(RunCommand)]
pub enum Commands {
    /// Print exploration diagnostics for a raw dataset
    Explore(ExploreCommand),
    /// Clean the dataset and render every chart
    Charts(ChartsCommand),
    /// Explore, clean and render charts in one pass
    Run(RunAllCommand),
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use super::*;

    const RAW_CSV: &str = "\
location,date,total_cases,total_deaths,total_vaccinations,new_cases,new_cases_smoothed,people_vaccinated_per_hundred
Canada,2021-01-01,10,1,5,10,9,1.0
Canada,2021-01-02,20,2,6,10,10,2.0
Brazil,2021-01-01,100,10,1,1,1,1.0
";

    fn write_csv(dir: &Path) -> PathBuf {
        let path = dir.join("data.csv");
        let mut f = File::create(&path).unwrap();
        f.write_all(RAW_CSV.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_explore_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path());
        let explore_command = ExploreCommand {
            input: InputArgs { input: path },
            json: false,
        };
        let result = explore_command.run(Config::default());
        assert!(result.is_ok());
    }

    #[test]
    fn test_explore_command_reports_missing_csv() {
        let dir = tempfile::tempdir().unwrap();
        let explore_command = ExploreCommand {
            input: InputArgs {
                input: dir.path().to_path_buf(),
            },
            json: false,
        };
        let result = explore_command.run(Config::default());
        assert!(result.is_ok());
    }

    #[test]
    fn countries_argument_overrides_config() {
        let args = ChartParamsArgs {
            output_dir: None,
            countries: vec!["Brazil".into(), "Peru".into()],
        };
        let config = config_with_overrides(Config::default(), &args);
        assert_eq!(config.countries, vec!["Brazil", "Peru"]);

        let args = ChartParamsArgs {
            output_dir: Some(PathBuf::from("out")),
            countries: vec![],
        };
        let config = config_with_overrides(Config::default(), &args);
        assert_eq!(config.countries, Config::default().countries);
        assert_eq!(charts_dir(&config, &args), PathBuf::from("out"));
    }

    #[test]
    fn cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
