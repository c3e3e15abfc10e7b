//! User-editable device parameters
//!
//! Named string values with a maximum length, stored as a flat JSON object
//! in ~/.config/led-marquee/user.json.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::form::parse_leading_int;

/// Parameters holding secrets, masked in `redacted`
const SECRET_PARAMS: [&str; 1] = ["mqtt_pass"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct UserParameter {
    desc: String,
    value: String,
    len: usize,
}

/// A parameter as listed to clients building a settings form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamInfo {
    pub name: String,
    pub description: String,
    pub max_len: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserConfig {
    params: BTreeMap<String, UserParameter>,
}

/// Longest prefix of `s` that fits in `len` bytes without splitting a char
fn truncate(s: &str, len: usize) -> &str {
    if s.len() <= len {
        return s;
    }
    let mut end = len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl UserConfig {
    /// The parameters a marquee understands, with their defaults
    pub fn with_defaults() -> Self {
        let mut config = Self::default();
        config.add_param("hostname", "mDNS hostname", "", 63);
        config.add_param("mqtt_host", "MQTT host", "", 63);
        config.add_param("mqtt_port", "MQTT port", "1883", 5);
        config.add_param("mqtt_user", "MQTT user", "", 16);
        config.add_param("mqtt_pass", "MQTT password", "", 16);
        config.add_param("mqtt_node", "MQTT node name", "marquee", 16);
        config
    }

    /// Register a parameter. Re-adding an existing name keeps the first one.
    pub fn add_param(&mut self, name: &str, desc: &str, default_value: &str, len: usize) {
        self.params.entry(name.to_string()).or_insert_with(|| UserParameter {
            desc: desc.to_string(),
            value: truncate(default_value, len).to_string(),
            len,
        });
    }

    /// Every parameter in name order, without values
    pub fn describe(&self) -> Vec<ParamInfo> {
        self.params
            .iter()
            .map(|(name, p)| ParamInfo {
                name: name.clone(),
                description: p.desc.clone(),
                max_len: p.len,
            })
            .collect()
    }

    pub fn string_value(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|p| p.value.as_str())
    }

    /// Leading decimal digits of the value; 0 when there are none
    pub fn int_value(&self, name: &str) -> Option<i64> {
        self.string_value(name).map(parse_leading_int)
    }

    /// Unknown names are ignored; values are cut to the parameter's length
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        match self.params.get_mut(name) {
            Some(param) => {
                param.value = truncate(value, param.len).to_string();
                true
            }
            None => false,
        }
    }

    /// Copy known parameters out of a JSON object. Strings and integers are
    /// accepted; anything else is skipped with a warning.
    pub fn read_from_json(&mut self, json: &Value) {
        let Some(obj) = json.as_object() else {
            warn!("user config is not a JSON object");
            return;
        };

        for (name, param) in &mut self.params {
            let Some(value) = obj.get(name) else {
                continue;
            };
            let source = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
                _ => {
                    warn!("unknown JSON type for '{name}'");
                    continue;
                }
            };
            param.value = truncate(&source, param.len).to_string();
        }
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .params
            .iter()
            .map(|(name, p)| (name.clone(), Value::String(p.value.clone())))
            .collect();
        Value::Object(map)
    }

    /// JSON with secrets masked, for logs
    pub fn redacted(&self) -> Value {
        let mut json = self.to_json();
        if let Some(obj) = json.as_object_mut() {
            for name in SECRET_PARAMS {
                if let Some(v) = obj.get_mut(name) {
                    *v = Value::String("*****".to_string());
                }
            }
        }
        json
    }

    /// Load values from `path` if it exists
    pub fn load(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let json: Value = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        self.read_from_json(&json);
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("failed to create config directory")?;
        }
        let content = serde_json::to_string_pretty(&self.to_json())?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}
