use std::path::PathBuf;

use clap::Parser;

use super::config::DEFAULT_CONFIG_FILENAME;

/// Fill in the participation form, submit it and report the status line.
#[derive(Debug, Parser)]
#[command(name = "participe", version)]
pub struct Args {
    /// RON configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Form endpoint, overriding the configured one.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Text field value. Repeatable.
    #[arg(long = "field", value_name = "NAME=VALUE", value_parser = parse_text_field)]
    pub fields: Vec<(String, String)>,

    /// File to attach to a file field. Repeatable.
    #[arg(long = "file", value_name = "NAME=PATH", value_parser = parse_file_field)]
    pub files: Vec<(String, PathBuf)>,

    /// Submit clicks fired before waiting for the response.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub clicks: u32,
}

fn split_assignment(raw: &str) -> Result<(&str, &str), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(format!("expected NAME=VALUE, got {raw:?}")),
    }
}

fn parse_text_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = split_assignment(raw)?;
    Ok((name.to_string(), value.to_string()))
}

fn parse_file_field(raw: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = split_assignment(raw)?;
    Ok((name.to_string(), PathBuf::from(path)))
}
