use std::path::Path;

use anyhow::Context;
use serde_json::{json, Map, Value as JsonValue};

use crate::codec::{deserialize_group, serialize_group};
use crate::rule::Group;

/// A persisted smart-shelf definition: display metadata plus the rule tree
/// that decides membership. Icon and visibility are pass-through fields the
/// engine never reads.
#[derive(Debug, Clone, PartialEq)]
pub struct MagicShelf {
    pub id: Option<u64>,
    pub name: String,
    pub icon: Option<String>,
    pub public: bool,
    pub group: Group,
}

impl MagicShelf {
    pub fn new(name: impl Into<String>, group: Group) -> Self {
        MagicShelf {
            id: None,
            name: name.into(),
            icon: None,
            public: false,
            group,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        if let Some(id) = self.id {
            map.insert("id".to_string(), json!(id));
        }
        map.insert("name".to_string(), json!(self.name));
        if let Some(icon) = &self.icon {
            map.insert("icon".to_string(), json!(icon));
        }
        map.insert("public".to_string(), json!(self.public));
        map.insert("filter".to_string(), serialize_group(&self.group));
        JsonValue::Object(map)
    }

    pub fn from_json(json: &JsonValue) -> anyhow::Result<Self> {
        let name = json
            .get("name")
            .and_then(JsonValue::as_str)
            .context("shelf definition has no name")?
            .to_string();
        let filter = json
            .get("filter")
            .with_context(|| format!("shelf '{name}' has no filter"))?;
        let group = deserialize_group(filter)
            .with_context(|| format!("shelf '{name}' has a malformed filter"))?;
        Ok(MagicShelf {
            id: json.get("id").and_then(JsonValue::as_u64),
            name,
            icon: json
                .get("icon")
                .and_then(JsonValue::as_str)
                .map(String::from),
            public: json
                .get("public")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            group,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading shelf file {}", path.display()))?;
        let json: JsonValue = serde_json::from_str(&content)
            .with_context(|| format!("parsing shelf file {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.to_json())?;
        std::fs::write(path, content)
            .with_context(|| format!("writing shelf file {}", path.display()))?;
        Ok(())
    }
}
