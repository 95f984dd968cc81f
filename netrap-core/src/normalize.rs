//! Canonical forms for the free-text `type` and `status` fields.

use serde::Serialize;

/// Comparison key: trimmed, lowercased, with runs of spaces/underscores
/// collapsed to a single `_`. Missing input yields an empty key.
pub fn normalize_key(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    raw.trim()
        .to_lowercase()
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Display label: words of the key in title case, separated by spaces.
/// Missing or blank input yields `-`.
pub fn pretty_label(raw: Option<&str>) -> String {
    let key = normalize_key(raw);
    if key.is_empty() {
        return "-".to_string();
    }
    key.split('_')
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Online,
    Warning,
    Offline,
    Other,
}

impl DeviceStatus {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match normalize_key(raw).as_str() {
            "online" => DeviceStatus::Online,
            "warning" => DeviceStatus::Warning,
            "offline" => DeviceStatus::Offline,
            _ => DeviceStatus::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Router,
    Switch,
    AccessPoint,
    Other,
}

impl DeviceKind {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match normalize_key(raw).as_str() {
            "router" => DeviceKind::Router,
            "switch" => DeviceKind::Switch,
            "access_point" => DeviceKind::AccessPoint,
            _ => DeviceKind::Other,
        }
    }

    /// Listing priority for problem devices; lower sorts first.
    pub fn priority(&self) -> u8 {
        match self {
            DeviceKind::Router => 0,
            DeviceKind::Switch => 1,
            DeviceKind::AccessPoint => 2,
            DeviceKind::Other => 99,
        }
    }
}
