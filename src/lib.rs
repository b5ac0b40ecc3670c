pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{local_storage::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{
    etl::EtlEngine, pipeline::LotteryPipeline, transform::transform, validator::LotterySchema,
};
pub use domain::model::{RawRecord, TransformedRecord};
pub use domain::report::{BatchReport, FileStatus};
pub use utils::error::{EtlError, Result};
