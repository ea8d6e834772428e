pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, FormConfig};

pub use core::{
    etl::{EtlEngine, ErrorPolicy},
    form_filler::{fill_form, FormTemplate},
    pipeline::FormPipeline,
};
pub use domain::model::{FieldKind, FilledForm, Row, RowOutcome, RunSummary};
pub use utils::error::{FormError, Result};
