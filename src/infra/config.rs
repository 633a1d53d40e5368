use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::params::FlowParams;

/// File names probed in the working directory, first hit wins
const CONFIG_FILES: [&str; 4] =
    ["commentflow.toml", "commentflow.yaml", "commentflow.json", ".commentflow.toml"];

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Pattern-mining thresholds
    pub flow: FlowParams,

    /// Default output settings
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig
{
    /// Default `flow` format: tree, json or jsonl
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig
{
    fn default() -> Self
    {
        Self { format: "tree".to_string(), pretty: false }
    }
}

/// Load the layered configuration: file, then `COMMENTFLOW__*` environment.
pub fn load_config() -> Result<Config>
{
    load_config_from(Path::new("."))
}

/// Same as [`load_config`] but probing files under `dir`.
pub fn load_config_from(dir: &Path) -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    for name in &CONFIG_FILES
    {
        let path = dir.join(name);
        if path.exists()
        {
            builder = builder.add_source(config::File::from(path));
            break;
        }
    }

    // Nested keys use a double underscore: COMMENTFLOW_FLOW__MAX_ROOTS=3
    builder = builder.add_source(
        config::Environment::with_prefix("COMMENTFLOW")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join(CONFIG_FILES[0]);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml()
    {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(text.contains("[flow]"));
        assert!(text.contains("min_continuations = 5"));

        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.flow, FlowParams::default());
        assert_eq!(back.output.format, "tree");
    }

    #[test]
    fn file_layer_overrides_defaults()
    {
        let dir = std::env::temp_dir().join(format!("commentflow-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("commentflow.toml"), "[flow]\nmax_roots = 2\n").unwrap();

        let cfg = load_config_from(&dir).unwrap();
        assert_eq!(cfg.flow.max_roots, 2);
        assert_eq!(cfg.flow.fallback_branches, 5);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
