use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "gargamel-server", version, about = "Dota 2 lobby manager")]
pub struct ServerCli {
    /// Path to the process config file.
    #[arg(long, default_value = "gargamel.toml")]
    pub config: PathBuf,

    /// Override the listen port from the config file / PORT env var.
    #[arg(long)]
    pub port: Option<u16>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum LogFormat {
    Text,
    Json,
}
