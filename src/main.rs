use clap::{Args, Parser, Subcommand, ValueEnum};
use config_init::error::Result;
use config_init::initializer::text::TOML_SCHEMA_DECLARATION;
use config_init::{
    BinaryInitializer, ConfigInitializer, ConfigManager, InitOptions, JsonInitializer,
    Placeholders, Producer, TextInitializer, YamlInitializer,
};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "config-init")]
#[command(about = "Scaffold config files and keep their JSON schemas current", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config (and schema) unless it already exists
    Init {
        #[command(flatten)]
        target: Target,
        /// File holding the default config content; `{key}` placeholders are
        /// filled from `--arg`
        #[arg(long)]
        default: Option<PathBuf>,
        /// Copy the config from this directory instead of using the default
        #[arg(long)]
        template: Option<PathBuf>,
        /// Replace an existing config
        #[arg(long)]
        overwrite: bool,
        /// Do not embed a schema reference in the config
        #[arg(long)]
        no_inject_schema: bool,
        /// Placeholder value for the default content, as key=value (repeatable)
        #[arg(long = "arg", value_parser = parse_key_value)]
        args: Vec<(String, String)>,
    },
    /// Rewrite the schema file from the schema source
    UpdateSchema {
        #[command(flatten)]
        target: Target,
    },
    /// Exit with an error if the schema file is out of date
    CheckSchema {
        #[command(flatten)]
        target: Target,
    },
}

impl Commands {
    fn target(&self) -> &Target {
        match self {
            Self::Init { target, .. }
            | Self::UpdateSchema { target }
            | Self::CheckSchema { target } => target,
        }
    }
}

#[derive(Args)]
struct Target {
    /// Config file format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Config path, relative to the root
    #[arg(long)]
    config: PathBuf,
    /// Schema path, relative to the root
    #[arg(long)]
    schema: Option<PathBuf>,
    /// JSON file holding the current schema
    #[arg(long)]
    schema_source: Option<PathBuf>,
    /// Root directory (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Yaml,
    Toml,
    Json,
    Binary,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let target = cli.command.target();

    let schema = match &target.schema_source {
        Some(path) => Some(serde_json::from_str::<Value>(&fs::read_to_string(path)?)?),
        None => None,
    };
    let schema: Producer<Value> = Producer::value(schema);

    match target.format {
        Format::Text => run(TextInitializer::new("").with_schema(schema), &cli.command),
        Format::Yaml => run(YamlInitializer::new("").with_schema(schema), &cli.command),
        Format::Toml => run(
            YamlInitializer::new("")
                .with_declaration_prefix(TOML_SCHEMA_DECLARATION)
                .with_schema(schema),
            &cli.command,
        ),
        Format::Json => run(JsonInitializer::new(Map::new()).with_schema(schema), &cli.command),
        Format::Binary => run(BinaryInitializer::new(Vec::new()).with_schema(schema), &cli.command),
    }
}

fn run<I>(initializer: I, command: &Commands) -> Result<()>
where
    I: ConfigInitializer,
    I::Raw: Placeholders,
{
    let target = command.target();
    let root = target.root.as_deref();

    match command {
        Commands::Init {
            default,
            template,
            overwrite,
            no_inject_schema,
            args,
            ..
        } => {
            let initializer = seed_default(initializer, default.as_deref())?;
            let manager = manager_for(initializer, target);

            let mut options = InitOptions::new()
                .with_overwrite(*overwrite)
                .with_inject_schema(!no_inject_schema);
            if let Some(root) = root {
                options = options.with_root(root);
            }
            if let Some(template) = template {
                options = options.with_template(template);
            }
            for (key, value) in args {
                options = options.with_arg(key.as_str(), value.as_str());
            }

            if manager.init(&options)? {
                println!("✓ Wrote {}", target.config.display());
            } else {
                println!("Config not written: {}", target.config.display());
            }
        }
        Commands::UpdateSchema { .. } => {
            manager_for(initializer, target).update_schema(root)?;
            tracing::info!("Schema updated");
        }
        Commands::CheckSchema { .. } => {
            if manager_for(initializer, target).check_schema(root)? {
                println!("✓ Schema is up to date");
            } else {
                eprintln!("Schema is out of date. Run: config-init update-schema");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn seed_default<I>(initializer: I, default: Option<&Path>) -> Result<I>
where
    I: ConfigInitializer,
    I::Raw: Placeholders,
{
    match default {
        Some(path) => {
            let content = initializer.read(path)?;
            Ok(initializer.with_default(Producer::template(content)))
        }
        None => Ok(initializer),
    }
}

fn manager_for<I: ConfigInitializer>(initializer: I, target: &Target) -> ConfigManager<Vec<u8>, I> {
    let manager = ConfigManager::new(&target.config, initializer);
    match &target.schema {
        Some(schema) => manager.with_schema_path(schema),
        None => manager,
    }
}
