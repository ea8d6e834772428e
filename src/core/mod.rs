pub mod etl;
pub mod form_filler;
pub mod output;
pub mod pipeline;

pub use crate::domain::model::{FieldKind, FieldUpdate, FilledForm, Row, RowOutcome, RunSummary};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
