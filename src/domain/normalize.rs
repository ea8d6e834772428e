//! Field value normalization applied before values reach the form.

pub const MONTH_FIELD: &str = "MES";
pub const YEAR_FIELD: &str = "ANIO";

const FALSY: [&str; 4] = ["0", "false", "no", "off"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckboxState {
    On,
    Off,
}

impl CheckboxState {
    pub fn from_value(value: &str) -> Self {
        if is_truthy(value) {
            CheckboxState::On
        } else {
            CheckboxState::Off
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckboxState::On => "Yes",
            CheckboxState::Off => "Off",
        }
    }

    pub fn is_on(self) -> bool {
        self == CheckboxState::On
    }
}

fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

pub fn normalize_month(raw: &str) -> String {
    let digits = digits(raw);
    if digits.is_empty() {
        raw.to_string()
    } else {
        format!("{:0>2}", digits)
    }
}

pub fn normalize_year(raw: &str) -> String {
    let digits = digits(raw);
    match digits.len() {
        2 => format!("20{}", digits),
        4 => digits,
        _ => raw.to_string(),
    }
}

pub fn is_truthy(raw: &str) -> bool {
    let value = raw.trim().to_lowercase();
    !(value.is_empty() || FALSY.contains(&value.as_str()))
}

/// 去掉 checkbox 匯出值常見的前導 `/`（只去一個）
pub fn strip_checkbox_prefix(value: &str) -> &str {
    value.strip_prefix('/').unwrap_or(value)
}

/// 依欄位名稱套用月份/年份規則，再去掉 checkbox 前綴
pub fn normalize_field(name: &str, raw: &str) -> String {
    let value = match name {
        MONTH_FIELD => normalize_month(raw),
        YEAR_FIELD => normalize_year(raw),
        _ => raw.to_string(),
    };
    strip_checkbox_prefix(&value).to_string()
}

pub fn checkbox_state(value: &str) -> CheckboxState {
    CheckboxState::from_value(strip_checkbox_prefix(value))
}
