use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 一列 CSV 資料：依出現順序保存的欄位名稱與原始值
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// 重複的欄位名稱會覆寫先前的值，但保留原本的位置
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub name: String,
    pub kind: FieldKind,
    pub previous: Option<String>,
    pub value: String,
}

/// 已填好的表單，尚未寫入儲存
#[derive(Debug, Clone)]
pub struct FilledForm {
    pub index: usize,
    pub month: Option<String>,
    pub year: Option<String>,
    pub updates: Vec<FieldUpdate>,
    pub pdf: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RowOutcome {
    Written { row: usize, path: PathBuf },
    Failed { row: usize, error: String },
}

impl RowOutcome {
    pub fn row(&self) -> usize {
        match self {
            RowOutcome::Written { row, .. } | RowOutcome::Failed { row, .. } => *row,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, RowOutcome::Written { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub total_rows: usize,
    pub outcomes: Vec<RowOutcome>,
}

impl RunSummary {
    pub fn written(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_written()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.written()
    }

    pub fn written_paths(&self) -> Vec<&PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                RowOutcome::Written { path, .. } => Some(path),
                RowOutcome::Failed { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_duplicate_keeps_position_last_value_wins() {
        let row: Row = vec![("MES", "1"), ("ANIO", "23"), ("MES", "2")]
            .into_iter()
            .collect();

        assert_eq!(row.len(), 2);
        let fields: Vec<_> = row.iter().collect();
        assert_eq!(fields, vec![("MES", "2"), ("ANIO", "23")]);
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary {
            output_dir: PathBuf::from("out"),
            total_rows: 3,
            outcomes: vec![
                RowOutcome::Written {
                    row: 1,
                    path: PathBuf::from("out/formulario_1.pdf"),
                },
                RowOutcome::Failed {
                    row: 2,
                    error: "disk full".to_string(),
                },
            ],
        };

        assert_eq!(summary.written(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.written_paths().len(), 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["outcomes"][1]["status"], "failed");
        assert_eq!(json["outcomes"][1]["row"], 2);
    }
}
