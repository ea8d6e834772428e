//! Appearance stream content for form widgets.

use lopdf::{dictionary, Dictionary, Object};

pub const DEFAULT_APPEARANCE: &str = "/Helv 0 Tf 0 g";

const PADDING: f32 = 2.0;
const LINE_HEIGHT: f32 = 1.15;
const MIN_AUTO_SIZE: f32 = 4.0;
const MAX_AUTO_SIZE: f32 = 12.0;

/// 解析後的 `/DA` 字串，例如 `/Helv 12 Tf 0 g`
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultAppearance {
    pub font: String,
    pub size: f32,
    pub operators: String,
}

impl DefaultAppearance {
    pub fn parse(da: &str) -> Self {
        let tokens: Vec<&str> = da.split_whitespace().collect();
        let tf = tokens.iter().position(|token| *token == "Tf");

        match tf {
            Some(i) if i >= 2 => {
                let font = tokens[i - 2].trim_start_matches('/').to_string();
                let size = tokens[i - 1].parse().unwrap_or(0.0);
                let operators = tokens[..i - 2]
                    .iter()
                    .chain(tokens[i + 1..].iter())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ");
                Self {
                    font,
                    size,
                    operators,
                }
            }
            _ => Self::parse(DEFAULT_APPEARANCE),
        }
    }

    /// 字級為 0 代表依欄位高度自動調整
    pub fn resolved_size(&self, height: f32) -> f32 {
        if self.size > 0.0 {
            self.size
        } else {
            ((height - 2.0 * PADDING) / LINE_HEIGHT).clamp(MIN_AUTO_SIZE, MAX_AUTO_SIZE)
        }
    }
}

pub fn fmt_num(value: f32) -> String {
    let formatted = format!("{:.3}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn win_ansi_byte(c: char) -> u8 {
    match c as u32 {
        code @ 0x20..=0x7e => code as u8,
        code @ 0xa0..=0xff => code as u8,
        0x20ac => 0x80,
        _ => b'?',
    }
}

/// 轉成 content stream 可用的 literal string 內容（WinAnsi）
pub fn escape_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let byte = if c == '\t' { b' ' } else { win_ansi_byte(c) };
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out
}

pub fn text_content(
    width: f32,
    height: f32,
    da: &DefaultAppearance,
    value: &str,
    multiline: bool,
) -> Vec<u8> {
    let size = da.resolved_size(height);
    let mut content = Vec::new();

    let header = format!(
        "/Tx BMC\nq\n{} {} {} {} re W n\nBT\n/{} {} Tf {}\n",
        fmt_num(PADDING / 2.0),
        fmt_num(PADDING / 2.0),
        fmt_num(width - PADDING),
        fmt_num(height - PADDING),
        da.font,
        fmt_num(size),
        da.operators
    );
    content.extend_from_slice(header.as_bytes());

    if multiline {
        let leading = size * LINE_HEIGHT;
        let top = height - PADDING - size;
        content.extend_from_slice(
            format!(
                "{} TL\n{} {} Td\n",
                fmt_num(leading),
                fmt_num(PADDING),
                fmt_num(top)
            )
            .as_bytes(),
        );
        for (i, line) in value.lines().enumerate() {
            if i > 0 {
                content.extend_from_slice(b"T*\n");
            }
            content.push(b'(');
            content.extend_from_slice(&escape_text(line));
            content.extend_from_slice(b") Tj\n");
        }
    } else {
        let baseline = ((height - size) / 2.0 + size * 0.22).max(1.0);
        let single_line = value.replace(['\r', '\n'], " ");
        content.extend_from_slice(
            format!("{} {} Td\n(", fmt_num(PADDING), fmt_num(baseline)).as_bytes(),
        );
        content.extend_from_slice(&escape_text(&single_line));
        content.extend_from_slice(b") Tj\n");
    }

    content.extend_from_slice(b"ET\nQ\nEMC\n");
    content
}

pub fn checkbox_content(width: f32, height: f32, checked: bool) -> Vec<u8> {
    if !checked {
        return Vec::new();
    }
    let inset = (width.min(height) * 0.2).max(1.0);
    format!(
        "q\n0 G\n1 w\n{l} {b} m\n{r} {t} l\n{l} {t} m\n{r} {b} l\nS\nQ\n",
        l = fmt_num(inset),
        b = fmt_num(inset),
        r = fmt_num(width - inset),
        t = fmt_num(height - inset)
    )
    .into_bytes()
}

pub fn form_xobject_dict(width: f32, height: f32, resources: Option<Object>) -> Dictionary {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width),
            Object::Real(height),
        ],
    };
    if let Some(resources) = resources {
        dict.set("Resources", resources);
    }
    dict
}

/// `/DR` 找不到對應字型時使用的 Helvetica
pub fn fallback_font_resources(font: &str) -> Object {
    let helvetica = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    };
    let mut fonts = Dictionary::new();
    fonts.set(font.as_bytes().to_vec(), Object::Dictionary(helvetica));
    Object::Dictionary(dictionary! {
        "Font" => Object::Dictionary(fonts),
    })
}
