//! Generator configuration, validated once at the boundary.
//!
//! The pipeline is a pure function of (document, configuration); every
//! variant decision is made here, up front, and the rest of the code only
//! reads the struct. Renderer selection is a capability table checked once,
//! not variant conditionals scattered through the pipeline.

use std::path::PathBuf;

use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Which artifact family to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GeneratorType {
    Client,
    Server,
    ModelOnly,
}

/// Library flavor within a generator type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GeneratorVariant {
    /// Client over OkHttp.
    Okhttp,
    /// Client over Spring RestTemplate.
    Resttemplate,
    /// Spring MVC server stubs.
    Spring,
    /// Micronaut server stubs.
    Micronaut,
}

/// Serialization library style for the generated models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelVariant {
    Jackson,
    Gson,
}

/// Which renderer consumes the assembled specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    Model,
    Client,
    ServerStub,
}

#[derive(Debug, Clone)]
pub struct GeneratorConfiguration {
    pub generator_type: GeneratorType,
    pub generator_variant: Option<GeneratorVariant>,
    pub model_variant: ModelVariant,
    pub output_dir: PathBuf,
    pub base_package: String,
    pub package_mirrors_schema_directory: bool,
    pub package_directory_prefix: Option<String>,
    pub model_name_prefix: Option<String>,
    pub output_contract: bool,
    pub output_contract_file: Option<PathBuf>,
}

/// Valid variants per generator type. `ModelOnly` takes none.
fn compatible_variants(ty: GeneratorType) -> &'static [GeneratorVariant] {
    match ty {
        GeneratorType::Client => &[GeneratorVariant::Okhttp, GeneratorVariant::Resttemplate],
        GeneratorType::Server => &[GeneratorVariant::Spring, GeneratorVariant::Micronaut],
        GeneratorType::ModelOnly => &[],
    }
}

/// Capability table: {generator type} -> renderer set. Every renderer in the
/// set receives the same assembled specification.
pub fn renderers_for(ty: GeneratorType) -> &'static [Renderer] {
    match ty {
        GeneratorType::Client => &[Renderer::Model, Renderer::Client],
        GeneratorType::Server => &[Renderer::Model, Renderer::ServerStub],
        GeneratorType::ModelOnly => &[Renderer::Model],
    }
}

static IDENTIFIER_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static pattern"));

impl GeneratorConfiguration {
    /// Reject invalid option combinations before anything is parsed.
    pub fn validate(&self) -> Result<()> {
        match (self.generator_type, self.generator_variant) {
            (GeneratorType::ModelOnly, Some(v)) => {
                return Err(Error::Configuration(format!(
                    "generator variant {v:?} is meaningless for model-only generation"
                )));
            }
            (ty @ (GeneratorType::Client | GeneratorType::Server), Some(v)) => {
                if !compatible_variants(ty).contains(&v) {
                    return Err(Error::Configuration(format!(
                        "generator variant {v:?} does not belong to generator type {ty:?}"
                    )));
                }
            }
            (GeneratorType::Client | GeneratorType::Server, None) => {
                return Err(Error::Configuration(format!(
                    "generator type {:?} requires a generator variant",
                    self.generator_type
                )));
            }
            (GeneratorType::ModelOnly, None) => {}
        }

        // Server stubs bind request bodies through jackson.
        if self.generator_type == GeneratorType::Server && self.model_variant == ModelVariant::Gson
        {
            return Err(Error::Configuration(
                "model variant `gson` cannot be combined with server generation".to_string(),
            ));
        }

        if let Some(prefix) = &self.model_name_prefix {
            if !IDENTIFIER_START.is_match(prefix) {
                return Err(Error::Configuration(format!(
                    "model name prefix `{prefix}` is not a legal identifier"
                )));
            }
        }

        if self.base_package.is_empty()
            || !self
                .base_package
                .split('.')
                .all(|seg| IDENTIFIER_START.is_match(seg))
        {
            return Err(Error::Configuration(format!(
                "base package `{}` is not a legal package path",
                self.base_package
            )));
        }

        if self.package_directory_prefix.is_some() && !self.package_mirrors_schema_directory {
            return Err(Error::Configuration(
                "package directory prefix requires package-mirrors-schema-directory".to_string(),
            ));
        }

        if self.output_contract_file.is_some() && !self.output_contract {
            return Err(Error::Configuration(
                "output contract file given but contract output is disabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Package the generated models land in, honoring the mirror option.
    pub fn model_package(&self, contract_path: &std::path::Path) -> String {
        if !self.package_mirrors_schema_directory {
            return format!("{}.model", self.base_package);
        }

        let mut segments = vec![self.base_package.clone()];
        if let Some(prefix) = &self.package_directory_prefix {
            segments.push(prefix.clone());
        }
        if let Some(parent) = contract_path.parent() {
            for comp in parent.components() {
                if let std::path::Component::Normal(os) = comp {
                    let seg: String = os
                        .to_string_lossy()
                        .chars()
                        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                        .collect();
                    if !seg.is_empty() {
                        segments.push(seg.to_ascii_lowercase());
                    }
                }
            }
        }
        segments.push("model".to_string());
        segments.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> GeneratorConfiguration {
        GeneratorConfiguration {
            generator_type: GeneratorType::ModelOnly,
            generator_variant: None,
            model_variant: ModelVariant::Jackson,
            output_dir: PathBuf::from("out"),
            base_package: "com.example.api".to_string(),
            package_mirrors_schema_directory: false,
            package_directory_prefix: None,
            model_name_prefix: None,
            output_contract: false,
            output_contract_file: None,
        }
    }

    #[test]
    fn variant_must_belong_to_type() {
        let mut cfg = base_config();
        cfg.generator_type = GeneratorType::Client;
        cfg.generator_variant = Some(GeneratorVariant::Spring);
        assert!(matches!(cfg.validate(), Err(Error::Configuration(_))));

        cfg.generator_variant = Some(GeneratorVariant::Okhttp);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn gson_server_combination_is_rejected() {
        let mut cfg = base_config();
        cfg.generator_type = GeneratorType::Server;
        cfg.generator_variant = Some(GeneratorVariant::Spring);
        cfg.model_variant = ModelVariant::Gson;
        assert!(matches!(cfg.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn malformed_name_prefix_is_rejected() {
        let mut cfg = base_config();
        cfg.model_name_prefix = Some("9Bad".to_string());
        assert!(matches!(cfg.validate(), Err(Error::Configuration(_))));

        cfg.model_name_prefix = Some("Api".to_string());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn mirrored_package_includes_directory() {
        let mut cfg = base_config();
        cfg.package_mirrors_schema_directory = true;
        cfg.package_directory_prefix = Some("contracts".to_string());
        let pkg = cfg.model_package(std::path::Path::new("specs/petstore/api.yaml"));
        assert_eq!(pkg, "com.example.api.contracts.specs.petstore.model");

        cfg.package_mirrors_schema_directory = false;
        cfg.package_directory_prefix = None;
        let pkg = cfg.model_package(std::path::Path::new("specs/petstore/api.yaml"));
        assert_eq!(pkg, "com.example.api.model");
    }
}
