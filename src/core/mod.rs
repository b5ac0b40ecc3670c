pub mod etl;
pub mod pipeline;
pub mod transform;
pub mod validator;

pub use crate::domain::model::{RawRecord, TransformedRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::domain::report::{BatchReport, TransformResult};
pub use crate::utils::error::Result;
