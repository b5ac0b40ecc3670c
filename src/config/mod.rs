pub mod local_storage;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_distinct_dirs, validate_extension, validate_path, validate_range, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const MAX_CONCURRENT_FILES: usize = 256;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "lottery-etl")]
#[command(about = "Validate lottery result JSON files and rewrite them into a flat shape")]
pub struct CliConfig {
    /// Directory holding the raw lottery result files
    #[arg(long, default_value = "./data/json")]
    pub input_dir: String,

    /// Directory the transformed files are written to
    #[arg(long, default_value = "./transformed_json")]
    pub output_dir: String,

    /// Only files with this extension are processed
    #[arg(long, default_value = "json")]
    pub extension: String,

    #[arg(long, default_value = "8")]
    pub concurrent_files: usize,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<String>,

    /// Validate and transform without writing any output
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log phase timings and memory usage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_dir(&self) -> &str {
        &self.input_dir
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn file_extension(&self) -> &str {
        &self.extension
    }

    fn concurrent_files(&self) -> usize {
        self.concurrent_files
    }

    fn report_path(&self) -> Option<&str> {
        self.report.as_deref()
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input_dir", &self.input_dir)?;
        validate_path("output_dir", &self.output_dir)?;
        validate_distinct_dirs("output_dir", &self.input_dir, &self.output_dir)?;
        validate_extension("extension", &self.extension)?;
        validate_range(
            "concurrent_files",
            self.concurrent_files,
            1,
            MAX_CONCURRENT_FILES,
        )?;
        if let Some(report) = &self.report {
            validate_path("report", report)?;
        }
        Ok(())
    }
}
