pub mod cli;
pub mod toml_config;

pub use toml_config::FormConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "pdf-form-etl")]
#[command(about = "Fill a PDF form template once per CSV row")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// PDF template with the form fields [default: template.pdf]
    #[arg(long)]
    pub template: Option<String>,

    /// CSV file with field/value pairs [default: values.csv]
    #[arg(long)]
    pub csv: Option<String>,

    /// Directory for the generated forms [default: formularios_generados]
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Keep processing the remaining rows when one row fails
    #[arg(long)]
    pub continue_on_error: bool,

    /// Write a JSON report of every row's outcome
    #[arg(long)]
    pub report: Option<String>,

    /// Show what would be processed without writing any file
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 先讀設定檔（若有），再套用命令列覆蓋
    pub fn resolve(&self) -> Result<FormConfig> {
        let mut config = match &self.config {
            Some(path) => FormConfig::from_file(path)?,
            None => FormConfig::default(),
        };

        if let Some(template) = &self.template {
            config.template_path = template.clone();
        }
        if let Some(csv) = &self.csv {
            config.csv_path = csv.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if self.continue_on_error {
            config.continue_on_error = true;
        }
        if let Some(report) = &self.report {
            config.report_path = Some(report.clone());
        }

        Ok(config)
    }
}
