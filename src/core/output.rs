use crate::domain::model::{FilledForm, RunSummary};
use crate::utils::error::Result;
use std::path::Path;

pub const FILE_PREFIX: &str = "formulario";

/// 同時有月份與年份時，檔名以 `年-月` 排序
pub fn output_filename(index: usize, month: Option<&str>, year: Option<&str>) -> String {
    match (month, year) {
        (Some(month), Some(year)) => format!("{}_{}-{}_{}.pdf", FILE_PREFIX, year, month, index),
        _ => format!("{}_{}.pdf", FILE_PREFIX, index),
    }
}

pub fn filename_for(form: &FilledForm) -> String {
    output_filename(form.index, form.month.as_deref(), form.year.as_deref())
}

/// 以 JSON 寫出每一列的處理結果
pub fn write_report<P: AsRef<Path>>(summary: &RunSummary, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RowOutcome;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_filename_with_month_and_year() {
        assert_eq!(
            output_filename(1, Some("03"), Some("2023")),
            "formulario_2023-03_1.pdf"
        );
    }

    #[test]
    fn test_filename_falls_back_to_index() {
        assert_eq!(output_filename(7, Some("03"), None), "formulario_7.pdf");
        assert_eq!(output_filename(7, None, Some("2023")), "formulario_7.pdf");
        assert_eq!(output_filename(12, None, None), "formulario_12.pdf");
    }

    #[test]
    fn test_filename_uses_values_verbatim() {
        // 正規化失敗時保留原值
        assert_eq!(
            output_filename(2, Some("marzo"), Some("23")),
            "formulario_23-marzo_2.pdf"
        );
    }

    #[test]
    fn test_write_report() {
        let temp_dir = TempDir::new().unwrap();
        let report_path = temp_dir.path().join("reports").join("run.json");
        let summary = RunSummary {
            output_dir: PathBuf::from("formularios_generados"),
            total_rows: 1,
            outcomes: vec![RowOutcome::Written {
                row: 1,
                path: PathBuf::from("formularios_generados/formulario_1.pdf"),
            }],
        };

        write_report(&summary, &report_path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(json["total_rows"], 1);
        assert_eq!(json["outcomes"][0]["status"], "written");
    }
}
