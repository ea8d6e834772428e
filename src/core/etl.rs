use crate::core::{Pipeline, Row, RowOutcome, RunSummary};
use crate::utils::error::Result;
use std::path::PathBuf;

/// 單列失敗時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// 第一個錯誤就中止整批
    #[default]
    FailFast,
    /// 記錄失敗的列，繼續處理其餘列
    ContinueOnError,
}

impl ErrorPolicy {
    pub fn from_flag(continue_on_error: bool) -> Self {
        if continue_on_error {
            ErrorPolicy::ContinueOnError
        } else {
            ErrorPolicy::FailFast
        }
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    policy: ErrorPolicy,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::with_policy(pipeline, ErrorPolicy::default())
    }

    pub fn with_policy(pipeline: P, policy: ErrorPolicy) -> Self {
        Self { pipeline, policy }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<RunSummary> {
        // Extract
        let rows = self.pipeline.extract().await?;
        tracing::info!("📄 Processing {} CSV rows...", rows.len());

        self.pipeline.prepare().await?;

        let mut outcomes = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let index = i + 1;
            tracing::info!("📋 Row {}:", index);

            match self.process_row(index, row).await {
                Ok(path) => outcomes.push(RowOutcome::Written { row: index, path }),
                Err(e) => {
                    let e = e.at_row(index);
                    if self.policy == ErrorPolicy::FailFast {
                        return Err(e);
                    }
                    tracing::error!("❌ {}", e);
                    outcomes.push(RowOutcome::Failed {
                        row: index,
                        error: e.to_string(),
                    });
                }
            }
        }

        let summary = RunSummary {
            output_dir: self.pipeline.output_location(),
            total_rows: rows.len(),
            outcomes,
        };
        tracing::info!(
            "🎉 Completed: {} forms generated in {}/ ({} failed)",
            summary.written(),
            summary.output_dir.display(),
            summary.failed()
        );

        Ok(summary)
    }

    async fn process_row(&self, index: usize, row: &Row) -> Result<PathBuf> {
        // Transform
        let form = self.pipeline.transform(index, row).await?;
        tracing::debug!("Row {}: {} fields applied", index, form.updates.len());

        // Load
        self.pipeline.load(form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FilledForm;
    use crate::utils::error::FormError;
    use std::sync::Mutex;

    struct MockPipeline {
        rows: Vec<Row>,
        fail_on: Option<usize>,
        written: Mutex<Vec<usize>>,
    }

    impl MockPipeline {
        fn new(count: usize) -> Self {
            Self {
                rows: (0..count)
                    .map(|i| Row::from_iter([("NOMBRE", format!("persona {}", i))]))
                    .collect(),
                fail_on: None,
                written: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(mut self, index: usize) -> Self {
            self.fail_on = Some(index);
            self
        }

        fn written(&self) -> Vec<usize> {
            self.written.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for MockPipeline {
        async fn extract(&self) -> Result<Vec<Row>> {
            Ok(self.rows.clone())
        }

        async fn transform(&self, index: usize, _row: &Row) -> Result<FilledForm> {
            Ok(FilledForm {
                index,
                month: None,
                year: None,
                updates: Vec::new(),
                pdf: b"%PDF-".to_vec(),
            })
        }

        async fn load(&self, form: FilledForm) -> Result<PathBuf> {
            if self.fail_on == Some(form.index) {
                return Err(FormError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.written.lock().unwrap().push(form.index);
            Ok(PathBuf::from(format!("out/formulario_{}.pdf", form.index)))
        }

        fn output_location(&self) -> PathBuf {
            PathBuf::from("out")
        }
    }

    #[tokio::test]
    async fn test_rows_are_processed_in_order() {
        let engine = EtlEngine::new(MockPipeline::new(3));

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.written(), 3);
        assert_eq!(engine.pipeline().written(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fail_fast_stops_at_first_error() {
        let engine = EtlEngine::new(MockPipeline::new(3).failing_on(2));

        let err = engine.run().await.unwrap_err();

        assert_eq!(err.row(), Some(2));
        assert_eq!(engine.pipeline().written(), vec![1]);
    }

    #[tokio::test]
    async fn test_continue_on_error_records_failures() {
        let engine = EtlEngine::with_policy(
            MockPipeline::new(3).failing_on(2),
            ErrorPolicy::ContinueOnError,
        );

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.written(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(engine.pipeline().written(), vec![1, 3]);
        assert!(matches!(
            &summary.outcomes[1],
            RowOutcome::Failed { row: 2, error } if error.contains("disk full")
        ));
    }

    #[tokio::test]
    async fn test_empty_csv_produces_empty_summary() {
        let engine = EtlEngine::new(MockPipeline::new(0));

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.total_rows, 0);
        assert!(summary.outcomes.is_empty());
    }
}
