//! Minimal CLI: contract -> (generate | validate)
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::assemble::{assemble, select_artifacts};
use crate::config::{GeneratorConfiguration, GeneratorType, GeneratorVariant, ModelVariant};
use crate::error::Result;
use crate::mapper::TypeMapper;
use crate::render::GeneratedFile;
use crate::{contract, emit, normalize, render};

// ---- Types ---------------------------------------------------------------- //

/// read an OpenAPI-style contract and emit source artifacts for it
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate model, client or server-stub sources from a contract
    Generate(GenerateArgs),
    /// parse and normalize a contract, reporting problems without writing anything
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// contract document (.yaml, .yml or .json)
    #[arg(short, long)]
    input: PathBuf,

    /// artifact family to generate
    #[arg(long, value_enum)]
    generator: GeneratorType,

    /// runtime flavor of the generated client or server stub
    #[arg(long, value_enum)]
    variant: Option<GeneratorVariant>,

    /// serialization library targeted by the generated models
    #[arg(long, value_enum, default_value = "jackson")]
    model_variant: ModelVariant,

    /// output directory
    #[arg(short, long, default_value = "generated")]
    out: PathBuf,

    /// root package of the generated sources
    #[arg(long)]
    base_package: String,

    /// derive the model package from the contract file's directory
    #[arg(long)]
    mirror_package: bool,

    /// directory prefix stripped before mirroring (requires --mirror-package)
    #[arg(long)]
    package_prefix: Option<String>,

    /// prefix prepended to every synthesized model type name
    #[arg(long)]
    model_name_prefix: Option<String>,

    /// also write the normalized contract back out as YAML
    #[arg(long)]
    output_contract: bool,

    /// file name for the echoed contract (requires --output-contract)
    #[arg(long)]
    output_contract_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// contract document (.yaml, .yml or .json)
    #[arg(short, long)]
    input: PathBuf,
}

// ---- Implementation ------------------------------------------------------- //

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Generate(args) => args.run(),
            Command::Validate(args) => args.run(),
        }
    }
}

impl GenerateArgs {
    fn configuration(&self) -> GeneratorConfiguration {
        GeneratorConfiguration {
            generator_type: self.generator,
            generator_variant: self.variant,
            model_variant: self.model_variant,
            output_dir: self.out.clone(),
            base_package: self.base_package.clone(),
            package_mirrors_schema_directory: self.mirror_package,
            package_directory_prefix: self.package_prefix.clone(),
            model_name_prefix: self.model_name_prefix.clone(),
            output_contract: self.output_contract,
            output_contract_file: self.output_contract_file.clone(),
        }
    }

    fn run(&self) -> Result<()> {
        let config = self.configuration();
        config.validate()?;

        let doc = contract::load(&self.input)?;
        let spec = normalize::normalize(&doc)?;
        let mut mapper = TypeMapper::with_contract_path(&spec, &config, &self.input)?;
        let assembled = assemble(&spec, &mut mapper)?;

        let renderers = select_artifacts(&config);
        let mut files = render::render(&assembled, &config, &self.input, renderers);
        if config.output_contract {
            files.push(GeneratedFile {
                path: config
                    .output_contract_file
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("openapi.yaml")),
                content: emit::emit_contract(&doc)?,
            });
        }

        // Everything rendered without error, so now it is safe to touch disk.
        for file in &files {
            let target = config.output_dir.join(&file.path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, &file.content)?;
        }

        println!(
            "{} {} file(s) in {}",
            "wrote".green().bold(),
            files.len(),
            config.output_dir.display()
        );
        Ok(())
    }
}

impl ValidateArgs {
    fn run(&self) -> Result<()> {
        let config = GeneratorConfiguration {
            generator_type: GeneratorType::ModelOnly,
            generator_variant: None,
            model_variant: ModelVariant::Jackson,
            output_dir: PathBuf::new(),
            base_package: "contract_validation".to_string(),
            package_mirrors_schema_directory: false,
            package_directory_prefix: None,
            model_name_prefix: None,
            output_contract: false,
            output_contract_file: None,
        };

        let doc = contract::load(&self.input)?;
        let spec = normalize::normalize(&doc)?;
        let mut mapper = TypeMapper::new(&spec, &config)?;
        let assembled = assemble(&spec, &mut mapper)?;

        println!(
            "{} {}: {} operation(s), {} model(s)",
            "ok".green().bold(),
            self.input.display(),
            assembled
                .groups
                .iter()
                .map(|g| g.operations.len())
                .sum::<usize>(),
            assembled.models.len()
        );
        Ok(())
    }
}
