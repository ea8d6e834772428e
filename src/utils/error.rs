use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    PdfError(#[from] lopdf::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Cannot read input file '{path}': {source}")]
    InputError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid PDF template '{path}': {message}")]
    TemplateError { path: String, message: String },

    #[error("Form field not found in template: {name}")]
    FieldNotFound { name: String },

    #[error("Row {row} failed: {source}")]
    RowError {
        row: usize,
        #[source]
        source: Box<FormError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl FormError {
    /// 為某一列的錯誤附上列號
    pub fn at_row(self, row: usize) -> Self {
        match self {
            FormError::RowError { .. } => self,
            other => FormError::RowError {
                row,
                source: Box::new(other),
            },
        }
    }

    pub fn row(&self) -> Option<usize> {
        match self {
            FormError::RowError { row, .. } => Some(*row),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FormError::CsvError(_) | FormError::InputError { .. } => ErrorCategory::Input,
            FormError::TemplateError { .. } | FormError::FieldNotFound { .. } => {
                ErrorCategory::Input
            }
            FormError::ConfigError { .. }
            | FormError::ConfigValidationError { .. }
            | FormError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            FormError::PdfError(_) | FormError::SerializationError(_) => {
                ErrorCategory::Processing
            }
            FormError::IoError(_) => ErrorCategory::Output,
            FormError::RowError { source, .. } => source.category(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::Medium,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FormError::RowError { source, .. } => source.recovery_suggestion(),
            FormError::InputError { .. } => {
                "Check that the input file exists and is readable"
            }
            FormError::CsvError(_) => "Make sure the CSV file is UTF-8 encoded",
            FormError::TemplateError { .. } | FormError::PdfError(_) => {
                "Make sure the template is a valid PDF with form fields"
            }
            FormError::FieldNotFound { .. } => {
                "Compare the CSV field names with the form fields in the template"
            }
            FormError::IoError(_) => {
                "Check permissions and free disk space in the output directory"
            }
            FormError::SerializationError(_) => "Check the report path is writable",
            FormError::ConfigError { .. }
            | FormError::ConfigValidationError { .. }
            | FormError::InvalidConfigValueError { .. } => {
                "Review the command line flags and the TOML configuration file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FormError::RowError { row, source } => {
                format!("Form for row {} could not be generated: {}", row, source)
            }
            FormError::InputError { path, .. } => format!("Cannot open input file: {}", path),
            FormError::TemplateError { path, .. } => {
                format!("The PDF template could not be loaded: {}", path)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormError>;
