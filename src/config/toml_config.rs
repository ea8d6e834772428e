use crate::core::ConfigProvider;
use crate::utils::error::{FormError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_TEMPLATE: &str = "template.pdf";
pub const DEFAULT_CSV: &str = "values.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "formularios_generados";

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

fn default_csv() -> String {
    DEFAULT_CSV.to_string()
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

/// 批次填表的設定，預設值對應目前工作目錄下的檔案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default = "default_template")]
    pub template_path: String,
    #[serde(default = "default_csv")]
    pub csv_path: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// 單列失敗時是否繼續處理其餘列
    #[serde(default)]
    pub continue_on_error: bool,
    #[serde(default)]
    pub report_path: Option<String>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            template_path: default_template(),
            csv_path: default_csv(),
            output_dir: default_output_dir(),
            continue_on_error: false,
            report_path: None,
        }
    }
}

impl FormConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| FormError::InputError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FormError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FORM_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }
}

impl ConfigProvider for FormConfig {
    fn template_path(&self) -> &str {
        &self.template_path
    }

    fn csv_path(&self) -> &str {
        &self.csv_path
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn continue_on_error(&self) -> bool {
        self.continue_on_error
    }
}

impl Validate for FormConfig {
    fn validate(&self) -> Result<()> {
        // 範本和 CSV 不限副檔名，讀不到的檔案在讀取時才報錯
        validation::validate_path("template_path", &self.template_path)?;
        validation::validate_path("csv_path", &self.csv_path)?;
        validation::validate_path("output_dir", &self.output_dir)?;
        if let Some(report) = &self.report_path {
            validation::validate_path("report_path", report)?;
            validation::validate_file_extension("report_path", report, &["json"])?;
        }
        Ok(())
    }
}
