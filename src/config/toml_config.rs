use crate::config::MAX_CONCURRENT_FILES;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_distinct_dirs, validate_extension, validate_one_of, validate_path, validate_range,
    validate_required_field, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_EXTENSION: &str = "json";
const DEFAULT_CONCURRENT_FILES: usize = 8;
const LOG_FORMATS: [&str; 2] = ["compact", "json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    pub source: SourceConfig,
    pub load: LoadConfig,
    pub performance: Option<PerformanceConfig>,
    pub monitoring: Option<MonitoringConfig>,
    /// Set from the command line only.
    #[serde(skip)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_dir: String,
    pub extension: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_dir: Option<String>,
    pub report_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub concurrent_files: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LOTTERY_DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_non_empty_string("job.name", &self.job.name)?;
        validate_path("source.input_dir", &self.source.input_dir)?;

        let output_dir = validate_required_field("load.output_dir", &self.load.output_dir)?;
        validate_path("load.output_dir", output_dir)?;
        validate_distinct_dirs("load.output_dir", &self.source.input_dir, output_dir)?;

        validate_extension("source.extension", self.extension())?;
        validate_range(
            "performance.concurrent_files",
            self.concurrent_files(),
            1,
            MAX_CONCURRENT_FILES,
        )?;

        if let Some(report_path) = &self.load.report_path {
            validate_path("load.report_path", report_path)?;
        }

        if let Some(format) = self.monitoring.as_ref().and_then(|m| m.log_format.as_deref()) {
            validate_one_of("monitoring.log_format", format, &LOG_FORMATS)?;
        }

        Ok(())
    }

    pub fn extension(&self) -> &str {
        self.source.extension.as_deref().unwrap_or(DEFAULT_EXTENSION)
    }

    pub fn concurrent_files(&self) -> usize {
        self.performance
            .as_ref()
            .and_then(|p| p.concurrent_files)
            .unwrap_or(DEFAULT_CONCURRENT_FILES)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|f| f == "json")
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_dir(&self) -> &str {
        &self.source.input_dir
    }

    fn output_dir(&self) -> &str {
        // validate_config guarantees presence before a pipeline is built
        self.load.output_dir.as_deref().unwrap_or_default()
    }

    fn file_extension(&self) -> &str {
        self.extension()
    }

    fn concurrent_files(&self) -> usize {
        self.concurrent_files()
    }

    fn report_path(&self) -> Option<&str> {
        self.load.report_path.as_deref()
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[job]
name = "daily-results"
description = "Flatten lottery results"

[source]
input_dir = "./data/json"

[load]
output_dir = "./transformed_json"
report_path = "./reports/run.json"

[performance]
concurrent_files = 4
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.job.name, "daily-results");
        assert_eq!(config.input_dir(), "./data/json");
        assert_eq!(config.output_dir(), "./transformed_json");
        assert_eq!(config.file_extension(), "json");
        assert_eq!(ConfigProvider::concurrent_files(&config), 4);
        assert_eq!(config.report_path(), Some("./reports/run.json"));
        assert!(!config.monitoring_enabled());
        assert!(!config.dry_run());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LOTTERY_ETL_TEST_INPUT", "/srv/lottery/raw");

        let toml_content = r#"
[job]
name = "env"

[source]
input_dir = "${LOTTERY_ETL_TEST_INPUT}"

[load]
output_dir = "${LOTTERY_ETL_TEST_UNSET_OUTPUT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.input_dir, "/srv/lottery/raw");
        assert_eq!(config.output_dir(), "${LOTTERY_ETL_TEST_UNSET_OUTPUT}");

        std::env::remove_var("LOTTERY_ETL_TEST_INPUT");
    }

    #[test]
    fn test_missing_output_dir_is_rejected() {
        let toml_content = r#"
[job]
name = "no-output"

[source]
input_dir = "./data/json"

[load]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(EtlError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[job]
name = "bad"

[source]
input_dir = "./data/json"
extension = ".json"

[load]
output_dir = "./transformed_json"

[monitoring]
enabled = true
log_format = "xml"
"#;

        let mut config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        config.source.extension = Some("json".to_string());
        assert!(config.validate().is_err());

        config.monitoring.as_mut().unwrap().log_format = Some("json".to_string());
        assert!(config.validate().is_ok());
        assert!(config.json_logs());
        assert!(config.monitoring_enabled());
    }

    #[test]
    fn test_invalid_toml_reports_parsing_error() {
        let result = TomlConfig::from_toml_str("[job\nname = ");
        assert!(matches!(
            result,
            Err(EtlError::ConfigValidationError { ref field, .. }) if field == "toml_parsing"
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[job]
name = "file-test"

[source]
input_dir = "./in"
extension = "txt"

[load]
output_dir = "./out"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.job.name, "file-test");
        assert_eq!(config.file_extension(), "txt");
    }
}
