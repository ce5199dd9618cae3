//! CLI definition for the settingsgen command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// settingsgen - settings pages from YAML definitions
///
/// Checks, renders and saves settings pages described by a page definition.
#[derive(Parser, Debug)]
#[command(name = "settingsgen")]
#[command(version)]
#[command(about = "Build, render and save settings pages from YAML definitions")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file to use instead of settingsgen.{toml,yaml,json}
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a page definition and summarise its tabs and fields
    Check {
        /// Page definition (YAML)
        definition: PathBuf,
    },
    /// Render the page as HTML from the stored record
    Render {
        /// Page definition (YAML)
        definition: PathBuf,
        /// Tab to show; unknown tabs fall back to the default
        #[arg(short, long)]
        tab: Option<String>,
        /// Capabilities held by the caller (defaults to the page's own)
        #[arg(long = "capability", value_name = "CAP")]
        capabilities: Vec<String>,
    },
    /// Submit values and print the resulting record
    Save {
        /// Page definition (YAML)
        definition: PathBuf,
        /// FIELD=VALUE pairs; repeating a field submits a list
        #[arg(value_name = "FIELD=VALUE", conflicts_with = "json")]
        values: Vec<String>,
        /// Submit a JSON object instead of pairs
        #[arg(long, value_name = "JSON")]
        json: Option<String>,
        /// Capabilities held by the caller (defaults to the page's own)
        #[arg(long = "capability", value_name = "CAP")]
        capabilities: Vec<String>,
    },
    /// Print the stored record as YAML
    Show {
        /// Page definition (YAML)
        definition: PathBuf,
        /// Capabilities held by the caller (defaults to the page's own)
        #[arg(long = "capability", value_name = "CAP")]
        capabilities: Vec<String>,
    },
}
