use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::batch::DEFAULT_BATCH_SIZE;

#[derive(Debug, Parser)]
#[command(author, version, about = "Upload spreadsheets into a remote table", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize a spreadsheet and replace the remote table with its rows
    Upload(UploadArgs),
    /// Display the remote table contents and the mean-age metric
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Input spreadsheet (.csv, .tsv, .xlsx, or .xls)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Remote table to replace
    #[arg(short, long, env = "SHEET_SYNC_TABLE", default_value = "planilhas")]
    pub table: String,
    /// Store project URL
    #[arg(long = "store-url", env = "SHEET_STORE_URL")]
    pub store_url: Option<String>,
    /// Store API key
    #[arg(long = "store-key", env = "SHEET_STORE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,
    /// Maximum records per insert request
    #[arg(long = "batch-size", default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_batch_size)]
    pub batch_size: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of a delimited input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Run the pipeline against an in-memory store without touching the network
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Remote table to read
    #[arg(short, long, env = "SHEET_SYNC_TABLE", default_value = "planilhas")]
    pub table: String,
    /// Store project URL
    #[arg(long = "store-url", env = "SHEET_STORE_URL")]
    pub store_url: Option<String>,
    /// Store API key
    #[arg(long = "store-key", env = "SHEET_STORE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,
}

pub fn parse_batch_size(value: &str) -> Result<usize, String> {
    let parsed: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a valid batch size"))?;
    if parsed == 0 {
        return Err("Batch size must be at least 1".to_string());
    }
    Ok(parsed)
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_batch_size_rejects_zero_and_junk() {
        assert_eq!(parse_batch_size("500").unwrap(), 500);
        assert!(parse_batch_size("0").is_err());
        assert!(parse_batch_size("many").is_err());
    }

    #[test]
    fn parse_delimiter_accepts_named_and_literal_forms() {
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
