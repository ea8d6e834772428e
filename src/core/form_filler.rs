use crate::adapters::pdf_form::FormDocument;
use crate::domain::model::{FieldKind, FieldUpdate, FilledForm, Row};
use crate::domain::normalize::{self, CheckboxState, MONTH_FIELD, YEAR_FIELD};
use crate::utils::error::{FormError, Result};
use std::path::Path;

/// 範本只讀取一次，之後每一列都從這份 bytes 重新解析
#[derive(Debug, Clone)]
pub struct FormTemplate {
    path: String,
    bytes: Vec<u8>,
    field_count: usize,
}

impl FormTemplate {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| FormError::InputError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(path.display().to_string(), bytes)
    }

    pub fn from_bytes(path: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let path = path.into();
        let document = FormDocument::load(&bytes).map_err(|e| FormError::TemplateError {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if document.is_empty() {
            tracing::warn!("Template {} has no form fields", path);
        }

        Ok(Self {
            path,
            field_count: document.len(),
            bytes,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn field_count(&self) -> usize {
        self.field_count
    }
}

/// 以全新的範本副本填入一列資料，不保留任何跨列狀態
pub fn fill_form(template: &[u8], index: usize, row: &Row) -> Result<FilledForm> {
    let mut document = FormDocument::load(template)?;
    let mut month = None;
    let mut year = None;
    let mut updates = Vec::new();

    for (name, raw) in row.iter() {
        let value = normalize::normalize_field(name, raw);
        match name {
            MONTH_FIELD => month = Some(value.clone()),
            YEAR_FIELD => year = Some(value.clone()),
            _ => {}
        }

        let Some(kind) = document.field(name).map(|field| field.kind) else {
            tracing::debug!("Row {}: no form field named '{}', skipping", index, name);
            continue;
        };
        let previous = document.value(name);

        let applied = match kind {
            FieldKind::Checkbox => {
                let state = CheckboxState::from_value(&value);
                document.set_checkbox(name, state.is_on())?;
                tracing::info!(
                    "   {}: {}",
                    name,
                    if state.is_on() { "✓" } else { "✗" }
                );
                state.as_str().to_string()
            }
            FieldKind::Text => {
                document.set_text(name, &value)?;
                tracing::info!(
                    "   {}: '{}' -> '{}'",
                    name,
                    previous.as_deref().unwrap_or_default(),
                    value
                );
                value
            }
        };

        updates.push(FieldUpdate {
            name: name.to_string(),
            kind,
            previous,
            value: applied,
        });
    }

    document.regenerate_appearances()?;
    let pdf = document.to_optimized_bytes()?;

    Ok(FilledForm {
        index,
        month,
        year,
        updates,
        pdf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Dictionary, Document, Object, Stream};

    fn template() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let mut fields = Vec::new();
        for name in ["MES", "ANIO", "NOMBRE"] {
            fields.push(doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Widget",
                "FT" => "Tx",
                "T" => Object::string_literal(name),
                "DA" => Object::string_literal("/Helv 10 Tf 0 g"),
                "Rect" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(80), Object::Integer(20)],
            }));
        }
        let on = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let off = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
        fields.push(doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Btn",
            "T" => Object::string_literal("ACEPTA"),
            "Rect" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(12), Object::Integer(12)],
            "AP" => dictionary! {
                "N" => dictionary! {
                    "Yes" => Object::Reference(on),
                    "Off" => Object::Reference(off),
                },
            },
        }));

        let refs: Vec<Object> = fields.iter().map(|id| Object::Reference(*id)).collect();
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let acro_form = doc.add_object(dictionary! { "Fields" => refs });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
            "AcroForm" => Object::Reference(acro_form),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_fill_normalizes_month_and_year() {
        let row = Row::from_iter([("MES", "3"), ("ANIO", "23")]);

        let filled = fill_form(&template(), 1, &row).unwrap();

        assert_eq!(filled.month.as_deref(), Some("03"));
        assert_eq!(filled.year.as_deref(), Some("2023"));
        let document = FormDocument::load(&filled.pdf).unwrap();
        assert_eq!(document.value("MES").as_deref(), Some("03"));
        assert_eq!(document.value("ANIO").as_deref(), Some("2023"));
    }

    #[test]
    fn test_fill_checkbox_and_unknown_fields() {
        let row = Row::from_iter([
            ("ACEPTA", "/Yes"),
            ("NO_EXISTE", "valor"),
            ("NOMBRE", "/Ana"),
        ]);

        let filled = fill_form(&template(), 4, &row).unwrap();

        let names: Vec<&str> = filled.updates.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["ACEPTA", "NOMBRE"]);
        assert_eq!(filled.updates[0].kind, FieldKind::Checkbox);
        assert_eq!(filled.updates[0].value, "Yes");

        let document = FormDocument::load(&filled.pdf).unwrap();
        assert_eq!(document.value("ACEPTA").as_deref(), Some("Yes"));
        assert_eq!(document.value("NOMBRE").as_deref(), Some("Ana"));
        assert!(document.field("NO_EXISTE").is_none());
    }

    #[test]
    fn test_falsy_checkbox_is_off() {
        let row = Row::from_iter([("ACEPTA", " FALSE ")]);

        let filled = fill_form(&template(), 1, &row).unwrap();

        assert_eq!(filled.updates[0].value, "Off");
        let document = FormDocument::load(&filled.pdf).unwrap();
        assert_eq!(document.appearance_states("ACEPTA"), vec!["Off".to_string()]);
    }

    #[test]
    fn test_no_month_or_year_without_those_columns() {
        let row = Row::from_iter([("NOMBRE", "Ana")]);
        let filled = fill_form(&template(), 2, &row).unwrap();
        assert!(filled.month.is_none());
        assert!(filled.year.is_none());
    }

    #[test]
    fn test_rows_do_not_share_state() {
        let template = template();
        let first = fill_form(&template, 1, &Row::from_iter([("NOMBRE", "Ana")])).unwrap();
        let second = fill_form(&template, 2, &Row::from_iter([("MES", "5")])).unwrap();

        assert_eq!(
            FormDocument::load(&first.pdf).unwrap().value("NOMBRE").as_deref(),
            Some("Ana")
        );
        assert_eq!(FormDocument::load(&second.pdf).unwrap().value("NOMBRE"), None);
    }

    #[test]
    fn test_template_errors() {
        let missing = FormTemplate::open("/no/such/template.pdf").unwrap_err();
        assert!(matches!(missing, FormError::InputError { .. }));

        let invalid = FormTemplate::from_bytes("broken.pdf", b"not a pdf".to_vec()).unwrap_err();
        assert!(matches!(invalid, FormError::TemplateError { .. }));

        let template = FormTemplate::from_bytes("template.pdf", template()).unwrap();
        assert_eq!(template.field_count(), 4);
    }
}
