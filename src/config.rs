use std::path::PathBuf;

/// Where the employee archive is published.
pub const DEFAULT_URL: &str =
    "https://s3.eu-west-2.amazonaws.com/interview.thanskben.com/backend/employees_19-02-2024.zip";

/// Where to read the archive from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

/// Everything a run needs, passed explicitly into [`run`](crate::pipeline::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: Source,
    /// Directory receiving the `employees_<N>.csv` files.
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            source: Source::Url(url.into()),
            output_dir: PathBuf::from("."),
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
            output_dir: PathBuf::from("."),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_url(DEFAULT_URL)
    }
}
