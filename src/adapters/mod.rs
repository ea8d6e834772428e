// Adapters layer: concrete implementations for external formats (CSV input, PDF forms).

pub mod appearance;
pub mod csv_loader;
pub mod pdf_form;
