//! Data acquisition. The dataset is provided through an injected `DataSource`
//! rather than an interactive prompt, so the pipeline can be driven from the
//! CLI or from in-memory fixtures in tests.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{info, warn};
use polars::prelude::*;

/// Where the raw CSV bytes come from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// A CSV file, or a directory scanned (in lexical order) for the first
    /// entry with a `.csv` extension.
    Path(PathBuf),
    /// Raw UTF-8 CSV bytes.
    Memory(Vec<u8>),
}

impl DataSource {
    /// Obtain the raw table. Returns `Ok(None)` when no CSV file can be
    /// located, or when decoding/parsing fails; both conditions are reported
    /// rather than propagated so the caller can halt the pipeline cleanly.
    pub fn acquire(&self) -> Result<Option<DataFrame>> {
        match self {
            DataSource::Path(path) => {
                let Some(file) = locate_csv(path)? else {
                    warn!("no CSV file found at '{}'", path.display());
                    println!(
                        "No CSV file found at '{}'. Please provide a CSV.",
                        path.display()
                    );
                    return Ok(None);
                };
                match read_csv_path(&file) {
                    Ok(df) => {
                        info!("loaded '{}' with shape {:?}", file.display(), df.shape());
                        println!("Data '{}' loaded successfully!", file.display());
                        Ok(Some(df))
                    }
                    Err(e) => {
                        println!("Error loading file: {e}");
                        Ok(None)
                    }
                }
            }
            DataSource::Memory(bytes) => match read_csv_bytes(bytes) {
                Ok(df) => {
                    info!("loaded in-memory CSV with shape {:?}", df.shape());
                    Ok(Some(df))
                }
                Err(e) => {
                    println!("Error loading file: {e}");
                    Ok(None)
                }
            },
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Resolve a path to a concrete CSV file. Directories are scanned in lexical
/// order and the first CSV entry wins, matching the original upload flow.
fn locate_csv(path: &Path) -> Result<Option<PathBuf>> {
    if path.is_dir() {
        let mut entries: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        entries.sort();
        Ok(entries.into_iter().find(|p| has_csv_extension(p)))
    } else if has_csv_extension(path) {
        Ok(Some(path.to_path_buf()))
    } else {
        Ok(None)
    }
}

fn read_options() -> CsvReadOptions {
    // `date` stays a string column here; parsing to a date type is the
    // cleaning pipeline's job.
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
}

fn read_csv_path(path: &Path) -> PolarsResult<DataFrame> {
    read_options()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

fn read_csv_bytes(bytes: &[u8]) -> PolarsResult<DataFrame> {
    read_options()
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    const SMALL_CSV: &str = "\
location,date,total_cases
Canada,2021-01-01,10
Canada,2021-01-02,12
";

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_csv_given_directly() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "data.csv", SMALL_CSV);
        let df = DataSource::Path(path).acquire().unwrap();
        assert_eq!(df.unwrap().shape(), (2, 3));
    }

    #[test]
    fn scans_directory_for_first_csv() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "notes.txt", "not a table");
        write_file(dir.path(), "b.csv", SMALL_CSV);
        write_file(
            dir.path(),
            "z.csv",
            "location,date,total_cases\nIndia,2021-01-01,7\n",
        );
        let df = DataSource::Path(dir.path().to_path_buf())
            .acquire()
            .unwrap()
            .unwrap();
        // Lexical order: b.csv wins over z.csv.
        assert_eq!(df.shape(), (2, 3));
    }

    #[test]
    fn reports_absent_table_when_no_csv_present() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "notes.txt", "not a table");
        let df = DataSource::Path(dir.path().to_path_buf()).acquire().unwrap();
        assert!(df.is_none());
    }

    #[test]
    fn non_csv_file_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "data.txt", SMALL_CSV);
        let df = DataSource::Path(path).acquire().unwrap();
        assert!(df.is_none());
    }

    #[test]
    fn malformed_csv_is_caught_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "ragged.csv", "a,b\n1,2,3,4\n");
        let df = DataSource::Path(path).acquire().unwrap();
        assert!(df.is_none());
    }

    #[test]
    fn memory_source_parses_bytes() {
        let df = DataSource::Memory(SMALL_CSV.as_bytes().to_vec())
            .acquire()
            .unwrap()
            .unwrap();
        assert_eq!(df.shape(), (2, 3));
    }
}
