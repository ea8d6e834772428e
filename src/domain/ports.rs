use crate::domain::model::{FilledForm, Row};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub trait Storage: Send + Sync {
    fn root(&self) -> &Path;
    fn ensure_root(&self) -> impl std::future::Future<Output = Result<()>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn template_path(&self) -> &str;
    fn csv_path(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn continue_on_error(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Row>>;
    async fn transform(&self, index: usize, row: &Row) -> Result<FilledForm>;
    async fn load(&self, form: FilledForm) -> Result<PathBuf>;
    fn output_location(&self) -> PathBuf;
    /// 處理任何一列之前呼叫，例如建立輸出目錄
    async fn prepare(&self) -> Result<()> {
        Ok(())
    }
}
