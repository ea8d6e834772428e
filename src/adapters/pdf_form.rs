//! AcroForm access on top of lopdf.
//!
//! `FormDocument` owns one parsed copy of a template. Fields are indexed by
//! their fully qualified name (partial names joined with `.`) when the
//! document is loaded; values are written straight into the field
//! dictionaries and appearances are rebuilt on demand.

use crate::adapters::appearance::{self, DefaultAppearance, DEFAULT_APPEARANCE};
use crate::domain::model::FieldKind;
use crate::utils::error::{FormError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::{BTreeMap, HashSet};

const MAX_FIELD_DEPTH: usize = 32;
const MULTILINE_FLAG: i64 = 1 << 12;
const OFF_STATE: &[u8] = b"Off";
const DEFAULT_ON_STATE: &[u8] = b"Yes";

#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    id: ObjectId,
    widgets: Vec<ObjectId>,
    da: Option<String>,
    flags: i64,
}

impl FormField {
    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_multiline(&self) -> bool {
        self.kind == FieldKind::Text && self.flags & MULTILINE_FLAG != 0
    }
}

#[derive(Debug, Clone, Default)]
struct Inherited {
    name: Option<String>,
    field_type: Option<Vec<u8>>,
    da: Option<String>,
    flags: Option<i64>,
}

pub struct FormDocument {
    doc: Document,
    fields: BTreeMap<String, FormField>,
    dirty: HashSet<String>,
}

impl FormDocument {
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)?;
        let fields = collect_fields(&doc);
        tracing::trace!("Loaded form with {} fields", fields.len());
        Ok(Self {
            doc,
            fields,
            dirty: HashSet::new(),
        })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 欄位目前的 `/V`，文字欄位解碼成字串，checkbox 回傳狀態名稱
    pub fn value(&self, name: &str) -> Option<String> {
        let field = self.fields.get(name)?;
        let dict = self.doc.get_dictionary(field.id).ok()?;
        match resolve(&self.doc, dict.get(b"V").ok()?)? {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }

    /// 各 widget 目前的 `/AS`
    pub fn appearance_states(&self, name: &str) -> Vec<String> {
        let Some(field) = self.fields.get(name) else {
            return Vec::new();
        };
        field
            .widgets
            .iter()
            .filter_map(|widget| {
                let dict = self.doc.get_dictionary(*widget).ok()?;
                let state = dict.get(b"AS").ok()?.as_name().ok()?;
                Some(String::from_utf8_lossy(state).into_owned())
            })
            .collect()
    }

    pub fn has_normal_appearance(&self, widget: ObjectId) -> bool {
        self.normal_appearance(widget).is_some()
    }

    pub fn set_text(&mut self, name: &str, value: &str) -> Result<()> {
        let id = self.require(name)?.id;
        let dict = self.doc.get_object_mut(id)?.as_dict_mut()?;
        dict.set("V", text_string(value));
        self.dirty.insert(name.to_string());
        Ok(())
    }

    /// 勾選時使用 widget 外觀中非 `Off` 的狀態名稱（通常是 `Yes`）
    pub fn set_checkbox(&mut self, name: &str, checked: bool) -> Result<String> {
        let field = self.require(name)?.clone();
        let states: Vec<(ObjectId, Vec<u8>)> = field
            .widgets
            .iter()
            .map(|widget| (*widget, self.on_state(*widget)))
            .collect();

        let value = if checked {
            states
                .first()
                .map(|(_, on)| on.clone())
                .unwrap_or_else(|| DEFAULT_ON_STATE.to_vec())
        } else {
            OFF_STATE.to_vec()
        };

        self.doc
            .get_object_mut(field.id)?
            .as_dict_mut()?
            .set("V", Object::Name(value.clone()));

        for (widget, on) in states {
            let state = if checked && on == value {
                on
            } else {
                OFF_STATE.to_vec()
            };
            self.doc
                .get_object_mut(widget)?
                .as_dict_mut()?
                .set("AS", Object::Name(state));
        }

        self.dirty.insert(name.to_string());
        Ok(String::from_utf8_lossy(&value).into_owned())
    }

    /// 重建外觀：值有變動的文字欄位，以及沒有 `/AP /N` 的 widget
    pub fn regenerate_appearances(&mut self) -> Result<usize> {
        let fields: Vec<FormField> = self.fields.values().cloned().collect();
        let mut rebuilt = 0;

        for field in &fields {
            let dirty = self.dirty.contains(&field.name);
            for widget in &field.widgets {
                let missing = !self.has_normal_appearance(*widget);
                match field.kind {
                    FieldKind::Text if dirty || missing => {
                        self.build_text_appearance(field, *widget)?;
                        rebuilt += 1;
                    }
                    FieldKind::Checkbox if missing => {
                        self.build_checkbox_appearance(field, *widget)?;
                        rebuilt += 1;
                    }
                    _ => {}
                }
            }
        }

        self.dirty.clear();
        tracing::debug!("Regenerated {} widget appearances", rebuilt);
        Ok(rebuilt)
    }

    /// 清除未引用物件並壓縮 stream 後輸出
    pub fn to_optimized_bytes(mut self) -> Result<Vec<u8>> {
        self.doc.prune_objects();
        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| FormError::IoError(std::io::Error::other(e.to_string())))?;
        Ok(buffer)
    }

    fn require(&self, name: &str) -> Result<&FormField> {
        self.fields.get(name).ok_or_else(|| FormError::FieldNotFound {
            name: name.to_string(),
        })
    }

    fn normal_appearance(&self, widget: ObjectId) -> Option<&Object> {
        let dict = self.doc.get_dictionary(widget).ok()?;
        let ap = resolve(&self.doc, dict.get(b"AP").ok()?)?.as_dict().ok()?;
        resolve(&self.doc, ap.get(b"N").ok()?)
    }

    fn on_state(&self, widget: ObjectId) -> Vec<u8> {
        self.normal_appearance(widget)
            .and_then(|normal| normal.as_dict().ok())
            .and_then(|states| {
                states
                    .iter()
                    .map(|(key, _)| key)
                    .find(|key| key.as_slice() != OFF_STATE)
                    .cloned()
            })
            .unwrap_or_else(|| DEFAULT_ON_STATE.to_vec())
    }

    fn widget_size(&self, widget: ObjectId) -> (f32, f32) {
        let rect: Vec<f32> = self
            .doc
            .get_dictionary(widget)
            .ok()
            .and_then(|dict| dict.get(b"Rect").ok())
            .and_then(|rect| resolve(&self.doc, rect))
            .and_then(|rect| rect.as_array().ok())
            .map(|values| values.iter().filter_map(number).collect())
            .unwrap_or_default();

        match rect.as_slice() {
            [x1, y1, x2, y2] => ((x2 - x1).abs(), (y2 - y1).abs()),
            _ => (0.0, 0.0),
        }
    }

    fn acro_form(&self) -> Option<&Dictionary> {
        let catalog = self.doc.catalog().ok()?;
        resolve(&self.doc, catalog.get(b"AcroForm").ok()?)?.as_dict().ok()
    }

    fn widget_da(&self, field: &FormField, widget: ObjectId) -> String {
        self.doc
            .get_dictionary(widget)
            .ok()
            .and_then(|dict| dict.get(b"DA").ok())
            .and_then(|da| da.as_str().ok())
            .map(|da| String::from_utf8_lossy(da).into_owned())
            .or_else(|| field.da.clone())
            .or_else(|| {
                self.acro_form()
                    .and_then(|form| form.get(b"DA").ok())
                    .and_then(|da| da.as_str().ok())
                    .map(|da| String::from_utf8_lossy(da).into_owned())
            })
            .unwrap_or_else(|| DEFAULT_APPEARANCE.to_string())
    }

    /// `/DR` 有該字型就沿用，否則改用內建 Helvetica
    fn font_resources(&self, font: &str) -> Object {
        let dr = self.acro_form().and_then(|form| form.get(b"DR").ok());
        let has_font = dr
            .and_then(|dr| resolve(&self.doc, dr))
            .and_then(|dr| dr.as_dict().ok())
            .and_then(|dr| dr.get(b"Font").ok())
            .and_then(|fonts| resolve(&self.doc, fonts))
            .and_then(|fonts| fonts.as_dict().ok())
            .map(|fonts| fonts.has(font.as_bytes()))
            .unwrap_or(false);

        match dr {
            Some(dr) if has_font => dr.clone(),
            _ => appearance::fallback_font_resources(font),
        }
    }

    fn build_text_appearance(&mut self, field: &FormField, widget: ObjectId) -> Result<()> {
        let (width, height) = self.widget_size(widget);
        let da = DefaultAppearance::parse(&self.widget_da(field, widget));
        let value = self.value(&field.name).unwrap_or_default();
        let resources = self.font_resources(&da.font);

        let content = appearance::text_content(width, height, &da, &value, field.is_multiline());
        let stream = Stream::new(
            appearance::form_xobject_dict(width, height, Some(resources)),
            content,
        );
        let stream_id = self.doc.add_object(stream);

        self.doc.get_object_mut(widget)?.as_dict_mut()?.set(
            "AP",
            dictionary! {
                "N" => Object::Reference(stream_id),
            },
        );
        Ok(())
    }

    fn build_checkbox_appearance(&mut self, field: &FormField, widget: ObjectId) -> Result<()> {
        let (width, height) = self.widget_size(widget);
        let checked = self
            .value(&field.name)
            .map(|value| value.as_bytes() != OFF_STATE)
            .unwrap_or(false);

        let on_id = self.doc.add_object(Stream::new(
            appearance::form_xobject_dict(width, height, None),
            appearance::checkbox_content(width, height, true),
        ));
        let off_id = self.doc.add_object(Stream::new(
            appearance::form_xobject_dict(width, height, None),
            appearance::checkbox_content(width, height, false),
        ));

        let mut normal = Dictionary::new();
        normal.set(DEFAULT_ON_STATE.to_vec(), Object::Reference(on_id));
        normal.set(OFF_STATE.to_vec(), Object::Reference(off_id));

        let state = if checked { DEFAULT_ON_STATE } else { OFF_STATE };
        let dict = self.doc.get_object_mut(widget)?.as_dict_mut()?;
        dict.set(
            "AP",
            dictionary! {
                "N" => Object::Dictionary(normal),
            },
        );
        dict.set("AS", Object::Name(state.to_vec()));
        Ok(())
    }
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}

fn collect_fields(doc: &Document) -> BTreeMap<String, FormField> {
    let mut fields = BTreeMap::new();

    let roots: Vec<ObjectId> = doc
        .catalog()
        .ok()
        .and_then(|catalog| catalog.get(b"AcroForm").ok())
        .and_then(|form| resolve(doc, form))
        .and_then(|form| form.as_dict().ok())
        .and_then(|form| form.get(b"Fields").ok())
        .and_then(|list| resolve(doc, list))
        .and_then(|list| list.as_array().ok())
        .map(|list| list.iter().filter_map(|f| f.as_reference().ok()).collect())
        .unwrap_or_default();

    for root in roots {
        collect_field(doc, root, &Inherited::default(), &mut fields, 0);
    }
    fields
}

fn collect_field(
    doc: &Document,
    id: ObjectId,
    inherited: &Inherited,
    out: &mut BTreeMap<String, FormField>,
    depth: usize,
) {
    if depth > MAX_FIELD_DEPTH {
        tracing::warn!("Field tree deeper than {} levels, skipping {:?}", MAX_FIELD_DEPTH, id);
        return;
    }
    let Ok(dict) = doc.get_dictionary(id) else {
        return;
    };

    let partial = dict
        .get(b"T")
        .ok()
        .and_then(|t| t.as_str().ok())
        .map(decode_text_string);
    let name = match (&inherited.name, partial) {
        (Some(parent), Some(partial)) => Some(format!("{}.{}", parent, partial)),
        (None, Some(partial)) => Some(partial),
        (parent, None) => parent.clone(),
    };
    let current = Inherited {
        name,
        field_type: dict
            .get(b"FT")
            .ok()
            .and_then(|ft| ft.as_name().ok())
            .map(<[u8]>::to_vec)
            .or_else(|| inherited.field_type.clone()),
        da: dict
            .get(b"DA")
            .ok()
            .and_then(|da| da.as_str().ok())
            .map(|da| String::from_utf8_lossy(da).into_owned())
            .or_else(|| inherited.da.clone()),
        flags: dict
            .get(b"Ff")
            .ok()
            .and_then(|ff| ff.as_i64().ok())
            .or(inherited.flags),
    };

    let kids: Vec<ObjectId> = dict
        .get(b"Kids")
        .ok()
        .and_then(|kids| resolve(doc, kids))
        .and_then(|kids| kids.as_array().ok())
        .map(|kids| kids.iter().filter_map(|k| k.as_reference().ok()).collect())
        .unwrap_or_default();

    // 有 /T 的 kid 是子欄位，其餘是 widget
    let (children, widgets): (Vec<ObjectId>, Vec<ObjectId>) = kids.into_iter().partition(|kid| {
        doc.get_dictionary(*kid)
            .map(|kid| kid.has(b"T"))
            .unwrap_or(false)
    });

    if !children.is_empty() {
        for child in children {
            collect_field(doc, child, &current, out, depth + 1);
        }
        return;
    }

    let Some(name) = current.name else {
        return;
    };
    let kind = match current.field_type.as_deref() {
        Some(b"Btn") => FieldKind::Checkbox,
        _ => FieldKind::Text,
    };
    let widgets = if widgets.is_empty() { vec![id] } else { widgets };

    out.entry(name.clone()).or_insert(FormField {
        name,
        kind,
        id,
        widgets,
        da: current.da,
        flags: current.flags.unwrap_or(0),
    });
}

/// ASCII 用 literal string，其他改用 UTF-16BE（含 BOM）
pub fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xfe, 0xff];
        for unit in value.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

pub fn decode_text_string(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xfe, 0xff]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => bytes.iter().map(|&b| b as char).collect(),
    }
}
