use anyhow::{Context as _, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::InventoryIssue;

/// Optional value with an explicit distinction between "not supplied" and
/// "supplied but unusable". Aggregates skip both unless they define their
/// own default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Field<T> {
    Present(T),
    Missing,
    Malformed,
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Missing
    }
}

impl<T> Field<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Missing | Field::Malformed => None,
        }
    }
}

impl<T: Copy> Field<T> {
    pub fn get(&self) -> Option<T> {
        self.value().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortUsage {
    pub used: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Device {
    pub hostname: Option<String>,
    pub ip_address: Option<String>,
    pub device_type: Option<String>,
    pub status: Option<String>,
    pub uptime_days: Field<f64>,
    pub ports: Field<PortUsage>,
    /// VLAN identifiers that parsed as integers, in input order.
    pub vlans: Vec<i64>,
    pub vendor: Option<String>,
    pub connected_clients: Field<i64>,
}

impl Device {
    pub fn hostname_or_dash(&self) -> &str {
        self.hostname.as_deref().unwrap_or("-")
    }

    pub fn ip_or_dash(&self) -> &str {
        self.ip_address.as_deref().unwrap_or("-")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Location {
    pub site: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
    pub devices: Vec<Device>,
}

impl Location {
    pub fn site_or_dash(&self) -> &str {
        self.site.as_deref().unwrap_or("-")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Inventory {
    pub company: Option<String>,
    pub last_updated: Option<String>,
    pub locations: Vec<Location>,
}

/// Inventory together with everything the decoder had to skip or default.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    pub inventory: Inventory,
    pub issues: Vec<InventoryIssue>,
}

impl Inventory {
    /// Decodes an inventory from any JSON value. Never fails: absent or
    /// wrong-typed fields are recorded as issues and left empty.
    pub fn from_value(value: &Value) -> Decoded {
        let mut decoder = Decoder::default();
        let inventory = decoder.inventory(value);
        Decoded {
            inventory,
            issues: decoder.issues,
        }
    }

    /// Fails only when `input` is not JSON at all.
    pub fn from_json_str(input: &str) -> Result<Decoded> {
        let value: Value = serde_json::from_str(input).context("inventory is not valid JSON")?;
        Ok(Self::from_value(&value))
    }}

#[derive(Default)]
struct Decoder {
    issues: Vec<InventoryIssue>,
}

impl Decoder {
    fn inventory(&mut self, value: &Value) -> Inventory {
        let empty = Map::new();
        let root = match value.as_object() {
            Some(map) => map,
            None => {
                let issue = InventoryIssue::malformed("inventory", "root", value);
                self.issues.push(issue);
                &empty
            }
        };

        let company = self.required_text(root, "company", "inventory");
        let last_updated = self.required_text(root, "last_updated", "inventory");
        let locations = self
            .required_list(root, "locations", "inventory")
            .iter()
            .enumerate()
            .map(|(index, entry)| self.location(index, entry))
            .collect();

        Inventory {
            company,
            last_updated,
            locations,
        }
    }

    fn location(&mut self, index: usize, value: &Value) -> Location {
        let fallback_scope = format!("locations[{index}]");
        let Some(map) = value.as_object() else {
            self.issues
                .push(InventoryIssue::malformed(fallback_scope, "location", value));
            return Location::default();
        };

        let site = self.required_text(map, "site", &fallback_scope);
        let scope = site.clone().unwrap_or(fallback_scope);
        let city = self.optional_text(map, "city", &scope);
        let contact = self.optional_text(map, "contact", &scope);
        let devices = self
            .required_list(map, "devices", &scope)
            .iter()
            .enumerate()
            .map(|(index, entry)| self.device(&scope, index, entry))
            .collect();

        Location {
            site,
            city,
            contact,
            devices,
        }
    }

    fn device(&mut self, site_scope: &str, index: usize, value: &Value) -> Device {
        let fallback_scope = format!("{site_scope}/devices[{index}]");
        let Some(map) = value.as_object() else {
            self.issues
                .push(InventoryIssue::malformed(fallback_scope, "device", value));
            return Device::default();
        };

        let hostname = self.required_text(map, "hostname", &fallback_scope);
        let scope = match hostname.as_deref() {
            Some(name) => format!("{site_scope}/{name}"),
            None => fallback_scope,
        };

        Device {
            ip_address: self.optional_text(map, "ip_address", &scope),
            device_type: self.required_text(map, "type", &scope),
            status: self.required_text(map, "status", &scope),
            uptime_days: self.number(map, "uptime_days", &scope),
            ports: self.ports(map, &scope),
            vlans: self.vlans(map, &scope),
            vendor: self.optional_text(map, "vendor", &scope),
            connected_clients: self.clients(map, &scope),
            hostname,
        }
    }

    fn required_text(
        &mut self,
        map: &Map<String, Value>,
        key: &'static str,
        scope: &str,
    ) -> Option<String> {
        if !map.contains_key(key) {
            self.issues.push(InventoryIssue::missing(scope, key));
            return None;
        }
        self.optional_text(map, key, scope)
    }

    fn optional_text(
        &mut self,
        map: &Map<String, Value>,
        key: &'static str,
        scope: &str,
    ) -> Option<String> {
        match map.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            other => {
                self.issues.push(InventoryIssue::malformed(scope, key, other));
                None
            }
        }
    }

    fn required_list<'v>(
        &mut self,
        map: &'v Map<String, Value>,
        key: &'static str,
        scope: &str,
    ) -> &'v [Value] {
        match map.get(key) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                self.issues.push(InventoryIssue::malformed(scope, key, other));
                &[]
            }
            None => {
                self.issues.push(InventoryIssue::missing(scope, key));
                &[]
            }
        }
    }

    fn number(&mut self, map: &Map<String, Value>, key: &'static str, scope: &str) -> Field<f64> {
        match map.get(key) {
            None | Some(Value::Null) => Field::Missing,
            Some(Value::Number(number)) => match number.as_f64() {
                Some(value) if value.is_finite() => Field::Present(value),
                _ => {
                    let value = Value::Number(number.clone());
                    self.issues.push(InventoryIssue::malformed(scope, key, &value));
                    Field::Malformed
                }
            },
            Some(other) => {
                self.issues.push(InventoryIssue::malformed(scope, key, other));
                Field::Malformed
            }
        }
    }

    fn ports(&mut self, map: &Map<String, Value>, scope: &str) -> Field<PortUsage> {
        let value = match map.get("ports") {
            None | Some(Value::Null) => return Field::Missing,
            Some(value) => value,
        };

        let used = value.get("used").and_then(Value::as_i64);
        let total = value.get("total").and_then(Value::as_i64);
        match (used, total) {
            (Some(used), Some(total)) => Field::Present(PortUsage { used, total }),
            _ => {
                self.issues.push(InventoryIssue::malformed(scope, "ports", value));
                Field::Malformed
            }
        }
    }

    fn vlans(&mut self, map: &Map<String, Value>, scope: &str) -> Vec<i64> {
        let entries = match map.get("vlans") {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                self.issues.push(InventoryIssue::malformed(scope, "vlans", other));
                return Vec::new();
            }
        };

        let mut parsed = Vec::with_capacity(entries.len());
        for entry in entries {
            match parse_vlan(entry) {
                Some(id) => parsed.push(id),
                None => self.issues.push(InventoryIssue::malformed(scope, "vlans", entry)),
            }
        }
        parsed
    }

    fn clients(&mut self, map: &Map<String, Value>, scope: &str) -> Field<i64> {
        let Some((key, value)) = ["connected_clients", "clients"]
            .into_iter()
            .find_map(|key| map.get(key).filter(|value| !value.is_null()).map(|v| (key, v)))
        else {
            return Field::Missing;
        };

        match value {
            Value::Number(number) => match number.as_i64() {
                Some(count) => Field::Present(count),
                None => {
                    self.issues.push(InventoryIssue::malformed(scope, key, value));
                    Field::Malformed
                }
            },
            other => {
                self.issues.push(InventoryIssue::malformed(scope, key, other));
                Field::Malformed
            }
        }
    }
}

/// Best-effort integer parse: integers, integral floats and numeric strings.
pub fn parse_vlan(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| {
                    f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f)
                })
                .map(|f| f as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}
