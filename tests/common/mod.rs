#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

pub enum TemplateField<'a> {
    Text(&'a str),
    Checkbox(&'a str),
}

/// 建立只有一頁、包含指定欄位的 PDF 範本
pub fn build_template(fields: &[TemplateField]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let mut field_ids = Vec::new();

    for (i, field) in fields.iter().enumerate() {
        let y = 700 - (i as i64) * 30;
        let id = match field {
            TemplateField::Text(name) => doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Widget",
                "FT" => "Tx",
                "T" => Object::string_literal(*name),
                "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
                "Rect" => vec![Object::Integer(50), Object::Integer(y), Object::Integer(250), Object::Integer(y + 20)],
            }),
            TemplateField::Checkbox(name) => {
                let on = doc.add_object(Stream::new(
                    Dictionary::new(),
                    b"0 g 2 2 8 8 re f".to_vec(),
                ));
                let off = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
                doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Widget",
                    "FT" => "Btn",
                    "T" => Object::string_literal(*name),
                    "Rect" => vec![Object::Integer(50), Object::Integer(y), Object::Integer(62), Object::Integer(y + 12)],
                    "AS" => "Off",
                    "AP" => dictionary! {
                        "N" => dictionary! {
                            "Yes" => Object::Reference(on),
                            "Off" => Object::Reference(off),
                        },
                    },
                })
            }
        };
        field_ids.push(id);
    }

    let refs: Vec<Object> = field_ids.iter().map(|id| Object::Reference(*id)).collect();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
        "Annots" => refs.clone(),
    });
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => 1,
    });
    doc.get_object_mut(page_id)
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set("Parent", Object::Reference(pages_id));
    let helvetica = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let acro_form = doc.add_object(dictionary! {
        "Fields" => refs,
        "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
        "DR" => dictionary! {
            "Font" => dictionary! {
                "Helv" => Object::Reference(helvetica),
            },
        },
    });
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

pub fn write_template(dir: &Path, fields: &[TemplateField]) -> PathBuf {
    let path = dir.join("template.pdf");
    std::fs::write(&path, build_template(fields)).unwrap();
    path
}

pub fn write_csv(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("values.csv");
    std::fs::write(&path, content).unwrap();
    path
}

pub fn sorted_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
