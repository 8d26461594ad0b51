//! External-parser boundary: the raw contract document model.
//!
//! Deserializes the minimal OpenAPI-style subset the pipeline consumes,
//! keeping document order everywhere (`indexmap`) so normalization and the
//! round-trip writer stay deterministic. Parse failures carry the document
//! path of the offending value via `serde_path_to_error`, and structural
//! validation aggregates every message before failing, never just the first.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// A loaded contract: the typed subset the pipeline walks, plus the raw
/// value tree the round-trip writer serializes back out.
#[derive(Debug)]
pub struct ContractDocument {
    pub source_path: PathBuf,
    pub raw: Value,
    pub contract: Contract,
}

#[derive(Debug, Deserialize)]
pub struct Contract {
    pub openapi: Option<String>,
    pub info: Option<Value>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    pub components: Option<Components>,
}

#[derive(Debug, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, RawSchema>,
}

const METHOD_KEYS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// One path item; operations keyed by method, in document order.
#[derive(Debug)]
pub struct PathItem {
    pub operations: IndexMap<String, RawOperation>,
    /// Path-level parameters shared by all operations on the path.
    pub parameters: Option<Vec<RawParameter>>,
}

impl<'de> Deserialize<'de> for PathItem {
    // Hand-rolled so the method keys keep the order they have in the
    // document; a field-per-method struct would impose a fixed walk order.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: IndexMap<String, Value> = IndexMap::deserialize(deserializer)?;
        let mut operations = IndexMap::new();
        let mut parameters = None;
        for (key, value) in raw {
            if METHOD_KEYS.contains(&key.as_str()) {
                let op = RawOperation::deserialize(value).map_err(serde::de::Error::custom)?;
                operations.insert(key, op);
            } else if key == "parameters" {
                parameters =
                    Some(Vec::<RawParameter>::deserialize(value).map_err(serde::de::Error::custom)?);
            }
        }
        Ok(PathItem {
            operations,
            parameters,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    pub operation_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Option<Vec<RawParameter>>,
    pub request_body: Option<RawRequestBody>,
    #[serde(default)]
    pub responses: IndexMap<String, RawResponse>,
}

#[derive(Debug, Deserialize)]
pub struct RawParameter {
    pub name: Option<String>,
    #[serde(rename = "in")]
    pub location: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<RawSchema>,
    /// `content`-style parameters have no mapping here; presence is detected
    /// and reported as unsupported during normalization.
    pub content: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawRequestBody {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, RawMediaType>,
}

#[derive(Debug, Deserialize)]
pub struct RawResponse {
    pub description: Option<String>,
    pub content: Option<IndexMap<String, RawMediaType>>,
}

#[derive(Debug, Deserialize)]
pub struct RawMediaType {
    pub schema: Option<RawSchema>,
}

/// The schema grammar as written in the document. Composition keywords are
/// parsed so the normalizer can point at them when rejecting, not to model
/// them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchema {
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub properties: Option<IndexMap<String, RawSchema>>,
    pub required: Option<Vec<String>>,
    pub items: Option<Box<RawSchema>>,
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    pub format: Option<String>,

    // Composition / polymorphism keywords: recognized only to be rejected.
    pub one_of: Option<Vec<RawSchema>>,
    pub any_of: Option<Vec<RawSchema>>,
    pub all_of: Option<Vec<RawSchema>>,
    pub not: Option<Box<RawSchema>>,
    pub discriminator: Option<Value>,
    pub nullable: Option<bool>,

    // Validation keywords.
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    #[serde(default)]
    pub exclusive_minimum: bool,
    #[serde(default)]
    pub exclusive_maximum: bool,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    #[serde(default)]
    pub unique_items: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<RawSchema>),
}

// ------------------------------ Loading ---------------------------------- //

/// Load and structurally validate a contract document from disk.
pub fn load(path: &Path) -> Result<ContractDocument> {
    let source = std::fs::read_to_string(path)?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let raw: Value = if is_yaml {
        from_yaml_with_path(&source)?
    } else {
        from_json_with_path(&source)?
    };

    let contract: Contract = {
        let mut track = serde_path_to_error::Track::new();
        let de = serde_path_to_error::Deserializer::new(&raw, &mut track);
        Contract::deserialize(de).map_err(|err| Error::ContractParse {
            messages: vec![format!("at {} -> {err}", track.path())],
        })?
    };

    let messages = validate_structure(&contract);
    if !messages.is_empty() {
        return Err(Error::ContractParse { messages });
    }

    Ok(ContractDocument {
        source_path: path.to_path_buf(),
        raw,
        contract,
    })
}

/// Deserialize JSON with path context in error messages.
fn from_json_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        Error::ContractParse {
            messages: vec![format!("at {path} -> {}", err.into_inner())],
        }
    })
}

/// Deserialize YAML with path context in error messages.
fn from_yaml_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = serde_yaml::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        Error::ContractParse {
            messages: vec![format!("at {path} -> {}", err.into_inner())],
        }
    })
}

/// Structural validation over the deserialized tree. Collects every problem
/// so the caller can report the full list at once.
fn validate_structure(contract: &Contract) -> Vec<String> {
    let mut messages = Vec::new();

    if contract.openapi.is_none() {
        messages.push("missing required top-level field `openapi`".to_string());
    }
    if contract.info.is_none() {
        messages.push("missing required top-level field `info`".to_string());
    }

    for (path, item) in &contract.paths {
        if !path.starts_with('/') {
            messages.push(format!("path `{path}` must start with `/`"));
        }
        for (method, op) in &item.operations {
            if op.responses.is_empty() {
                messages.push(format!("{method} {path}: operation has no responses"));
            }
            for p in op.parameters.iter().flatten() {
                if p.name.is_none() {
                    messages.push(format!("{method} {path}: parameter without a name"));
                }
                if p.location.is_none() {
                    messages.push(format!(
                        "{method} {path}: parameter `{}` without an `in` location",
                        p.name.as_deref().unwrap_or("?")
                    ));
                }
            }
        }
        for p in item.parameters.iter().flatten() {
            if p.name.is_none() || p.location.is_none() {
                messages.push(format!("{path}: incomplete path-level parameter"));
            }
        }
    }

    messages
}
