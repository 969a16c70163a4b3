//! Front-matter parsing

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while reading a front-matter block
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("Invalid YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML front-matter: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON front-matter: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} front-matter must be a mapping of keys to values")]
    NotAMapping(&'static str),
}

/// Front-matter fields of a post, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: Map<String, Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.trim_start_matches('\u{feff}');
        let trimmed = content.trim_start();

        if let Some((header, body)) = split_block(trimmed, "---") {
            return Ok((Self::parse_yaml(header)?, body));
        }

        if let Some((header, body)) = split_block(trimmed, "+++") {
            return Ok((Self::parse_toml(header)?, body));
        }

        if trimmed.lines().next().map(str::trim_end) == Some("{") {
            return Self::parse_json(trimmed);
        }

        // No front-matter found
        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml(header: &str) -> Result<Self, FrontMatterError> {
        if header.trim().is_empty() {
            return Ok(FrontMatter::default());
        }

        match serde_yaml::from_str::<Value>(header)? {
            Value::Object(fields) => Ok(Self { fields }),
            Value::Null => Ok(FrontMatter::default()),
            _ => Err(FrontMatterError::NotAMapping("YAML")),
        }
    }

    fn parse_toml(header: &str) -> Result<Self, FrontMatterError> {
        let table: toml::Table = toml::from_str(header)?;
        let fields = table
            .into_iter()
            .map(|(key, value)| (key, toml_to_json(value)))
            .collect();
        Ok(Self { fields })
    }

    fn parse_json(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let mut stream = serde_json::Deserializer::from_str(content).into_iter::<Value>();
        let value = match stream.next() {
            Some(value) => value?,
            None => return Err(FrontMatterError::NotAMapping("JSON")),
        };
        let remaining = content[stream.byte_offset()..].trim_start_matches(['\n', '\r']);

        match value {
            Value::Object(fields) => Ok((Self { fields }, remaining)),
            _ => Err(FrontMatterError::NotAMapping("JSON")),
        }
    }

    /// Look up a single field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the front-matter, yielding its fields
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

/// Split a block opened and closed by `delimiter` lines off the top of `content`.
///
/// Returns `None` when the content does not open with the delimiter or the
/// block is never closed.
fn split_block<'a>(content: &'a str, delimiter: &str) -> Option<(&'a str, &'a str)> {
    let first_line_end = content.find('\n').unwrap_or(content.len());
    if content[..first_line_end].trim_end() != delimiter {
        return None;
    }

    let header_start = (first_line_end + 1).min(content.len());
    let mut offset = header_start;
    for line in content[header_start..].split_inclusive('\n') {
        if line.trim_end() == delimiter {
            let header = &content[header_start..offset];
            let body = content[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Some((header, body));
        }
        offset += line.len();
    }

    None
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}
