//! Tag dictionary file layered over the built-in tag table
//!
//! ```toml
//! [tags]
//! EMS_REQ_EMERGENCY_POWER = 0x0100_0011
//!
//! [values.EMS_COUPLING_MODE]
//! "3" = "hybrid"
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use log::warn;
use rscp_protocol::types::Unit;
use rscp_protocol::{BuiltinDictionary, Payload, Tag, TagDictionary};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("unknown tag `{0}`")]
    UnknownTag(String),
    #[error("invalid tag number `{0}`")]
    InvalidTagNumber(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DictionaryFile {
    #[serde(default)]
    tags: HashMap<String, u32>,
    #[serde(default)]
    values: HashMap<String, HashMap<String, String>>,
}

/// Names and value texts from a file, falling back to the built-in table
#[derive(Debug, Default)]
pub struct FileDictionary {
    by_name: HashMap<String, Tag>,
    by_tag: HashMap<Tag, String>,
    /// Keyed by the request form of the tag
    values: HashMap<Tag, HashMap<i64, String>>,
}

impl FileDictionary {
    pub fn load(path: &Path) -> anyhow::Result<FileDictionary> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse dictionary {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<FileDictionary> {
        let file: DictionaryFile = toml::from_str(text)?;
        let mut dictionary = FileDictionary::default();
        for (name, number) in file.tags {
            let tag = Tag(number);
            dictionary.by_name.insert(name.to_ascii_uppercase(), tag);
            dictionary.by_tag.insert(tag, name);
        }
        for (name, texts) in file.values {
            let Some(tag) = dictionary.tag(&name) else {
                warn!("Dictionary values for unknown tag {name} ignored");
                continue;
            };
            let entry = dictionary.values.entry(tag.request()).or_default();
            for (key, text) in texts {
                match key.trim().parse::<i64>() {
                    Ok(value) => {
                        entry.insert(value, text);
                    }
                    Err(_) => warn!("Dictionary value key `{key}` of {name} is not a number"),
                }
            }
        }
        Ok(dictionary)
    }

    /// Resolve a tag given by name or as a number (`0x...` or decimal)
    pub fn resolve(&self, name: &str) -> Result<Tag, DictionaryError> {
        if let Some(hex) = name.strip_prefix("0x").or_else(|| name.strip_prefix("0X")) {
            return u32::from_str_radix(&hex.replace('_', ""), 16)
                .map(Tag)
                .map_err(|_| DictionaryError::InvalidTagNumber(name.to_string()));
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return name
                .parse()
                .map(Tag)
                .map_err(|_| DictionaryError::InvalidTagNumber(name.to_string()));
        }
        self.tag(name)
            .ok_or_else(|| DictionaryError::UnknownTag(name.to_string()))
    }
}

impl TagDictionary for FileDictionary {
    fn tag(&self, name: &str) -> Option<Tag> {
        self.by_name
            .get(&name.to_ascii_uppercase())
            .copied()
            .or_else(|| BuiltinDictionary.tag(name))
    }

    fn name(&self, tag: Tag) -> Option<&str> {
        self.by_tag
            .get(&tag)
            .or_else(|| self.by_tag.get(&tag.request()))
            .map(String::as_str)
            .or_else(|| BuiltinDictionary.name(tag))
    }

    fn interpret(&self, tag: Tag, payload: &Payload) -> Option<String> {
        let from_file = self
            .values
            .get(&tag.request())
            .and_then(|texts| texts.get(&payload.integer()?))
            .cloned();
        from_file.or_else(|| BuiltinDictionary.interpret(tag, payload))
    }

    fn unit(&self, tag: Tag) -> Option<Unit> {
        BuiltinDictionary.unit(tag)
    }
}
