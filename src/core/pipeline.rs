use crate::adapters::csv_loader;
use crate::core::form_filler::{fill_form, FormTemplate};
use crate::core::output;
use crate::core::{ConfigProvider, FilledForm, Pipeline, Row, Storage};
use crate::utils::error::Result;
use std::path::PathBuf;

pub struct FormPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    template: FormTemplate,
}

impl<S: Storage, C: ConfigProvider> FormPipeline<S, C> {
    pub fn new(storage: S, config: C, template: FormTemplate) -> Self {
        Self {
            storage,
            config,
            template,
        }
    }

    /// 依設定開啟範本；範本讀不到時在產生任何輸出前就失敗
    pub fn from_config(storage: S, config: C) -> Result<Self> {
        let template = FormTemplate::open(config.template_path())?;
        tracing::debug!(
            "Template {} loaded with {} fields",
            template.path(),
            template.field_count()
        );
        Ok(Self::new(storage, config, template))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for FormPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Row>> {
        tracing::debug!("Reading rows from {}", self.config.csv_path());
        csv_loader::load_rows(self.config.csv_path())
    }

    async fn prepare(&self) -> Result<()> {
        self.storage.ensure_root().await
    }

    async fn transform(&self, index: usize, row: &Row) -> Result<FilledForm> {
        fill_form(self.template.bytes(), index, row)
    }

    async fn load(&self, form: FilledForm) -> Result<PathBuf> {
        let filename = output::filename_for(&form);
        tracing::debug!("Writing {} ({} bytes)", filename, form.pdf.len());

        let path = self.storage.write_file(&filename, &form.pdf).await?;
        tracing::info!("   → {}", filename);
        Ok(path)
    }

    fn output_location(&self) -> PathBuf {
        self.storage.root().to_path_buf()
    }
}
