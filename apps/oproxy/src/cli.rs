use std::path::PathBuf;

use clap::Parser;
use clap::builder::BoolishValueParser;

#[derive(Parser)]
#[command(name = "oproxy", about = "Ollama-compatible gateway for OpenAI-style chat providers")]
pub(crate) struct Cli {
    /// YAML file with `server` and `models` sections; created with an example profile
    /// when missing.
    #[arg(long, env = "CONFIG_PATH", default_value = "config.yaml")]
    pub(crate) config: PathBuf,
    /// Overrides `server.hostname`.
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Overrides `server.port`.
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[arg(long, env = "DEBUG", value_parser = BoolishValueParser::new())]
    pub(crate) debug: bool,
}
