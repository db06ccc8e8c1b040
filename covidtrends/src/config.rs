use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Allow-list of country names kept by the cleaning pipeline.
    pub countries: Vec<String>,
    /// Directory rendered charts are placed in, unless overridden on the CLI.
    pub charts_dir: String,
    /// Number of rows shown in the exploration preview.
    pub preview_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            countries: vec![
                "United States".into(),
                "India".into(),
                "Canada".into(),
            ],
            charts_dir: "charts".into(),
            preview_rows: 5,
        }
    }
}
