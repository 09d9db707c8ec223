use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use toml::map::Map;
use toml::Value;
use tracing::{info, warn};

use crate::generation::EndpointKind;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/generate";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
pub const DEFAULT_API_KEY_ENV: &str = "PAGECRAFT_API_KEY";

#[derive(Debug)]
pub struct ConfigStore {
    pub path: PathBuf,
    doc: Value,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let doc = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse TOML: {}", path.display()))?
        } else {
            info!(path = %path.display(), "config file missing, writing defaults");
            Value::Table(Map::new())
        };

        let mut store = Self { path, doc };
        store.normalize_doc();
        store.save()?;
        Ok(store)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create config directory: {}", parent.display())
                })?;
            }
        }
        let text = toml::to_string_pretty(&self.doc).context("failed to serialize TOML")?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write config: {}", self.path.display()))
    }

    pub fn server_port(&self) -> u16 {
        self.table("app")
            .and_then(|t| t.get("server_port"))
            .and_then(value_to_i64)
            .and_then(|v| u16::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    pub fn endpoint_kind(&self) -> EndpointKind {
        self.table("generation")
            .and_then(|t| t.get("mode"))
            .and_then(Value::as_str)
            .and_then(EndpointKind::parse)
            .unwrap_or_default()
    }

    pub fn endpoint(&self) -> String {
        self.generation_str("endpoint")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn model(&self) -> String {
        self.generation_str("model")
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn api_key_env(&self) -> String {
        self.generation_str("api_key_env")
            .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string())
    }

    fn generation_str(&self, key: &str) -> Option<String> {
        self.table("generation")
            .and_then(|t| t.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
    }

    fn normalize_doc(&mut self) {
        {
            let app = self.ensure_table_mut("app");
            let port = app
                .get("server_port")
                .and_then(value_to_i64)
                .filter(|v| (1..=65_535).contains(v));
            if port.is_none() && app.contains_key("server_port") {
                warn!("invalid app.server_port, using {DEFAULT_SERVER_PORT}");
            }
            app.insert(
                "server_port".to_string(),
                Value::Integer(port.unwrap_or(i64::from(DEFAULT_SERVER_PORT))),
            );
        }

        {
            let generation = self.ensure_table_mut("generation");

            let mode = generation
                .get("mode")
                .and_then(Value::as_str)
                .and_then(EndpointKind::parse);
            if mode.is_none() && generation.contains_key("mode") {
                warn!("unknown generation.mode, using backend");
            }
            generation.insert(
                "mode".to_string(),
                Value::String(mode.unwrap_or_default().as_str().to_string()),
            );

            for (key, default) in [
                ("endpoint", DEFAULT_ENDPOINT),
                ("model", DEFAULT_MODEL),
                ("api_key_env", DEFAULT_API_KEY_ENV),
            ] {
                let value = generation
                    .get(key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(default)
                    .to_string();
                generation.insert(key.to_string(), Value::String(value));
            }
        }
    }

    fn table(&self, name: &str) -> Option<&Map<String, Value>> {
        self.doc
            .as_table()
            .and_then(|root| root.get(name))
            .and_then(Value::as_table)
    }

    fn root_table_mut(&mut self) -> &mut Map<String, Value> {
        if !self.doc.is_table() {
            self.doc = Value::Table(Map::new());
        }
        self.doc
            .as_table_mut()
            .expect("root should be table after normalization")
    }

    fn ensure_table_mut(&mut self, name: &str) -> &mut Map<String, Value> {
        let root = self.root_table_mut();
        let table = root
            .entry(name.to_string())
            .or_insert_with(|| Value::Table(Map::new()));
        if !table.is_table() {
            *table = Value::Table(Map::new());
        }
        table
            .as_table_mut()
            .expect("table should exist after normalization")
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    value
        .as_integer()
        .or_else(|| value.as_float().map(|v| v as i64))
        .or_else(|| value.as_str().and_then(|v| v.trim().parse::<i64>().ok()))
}
