//! settingsgen CLI - settings pages from YAML definitions.
//!
//! Commands:
//! - `settingsgen check <definition>`: validate a definition and list its fields
//! - `settingsgen render <definition>`: print the page HTML from the stored record
//! - `settingsgen save <definition> FIELD=VALUE...`: submit values and print the record
//! - `settingsgen show <definition>`: print the stored record
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

use clap::Parser;
use settingsgen::commands;
use settingsgen::{Cli, Commands};
use settingsgen_common::init_tracing;
use settingsgen_config::load_configuration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let filter = if cli.debug {
        "settingsgen=debug,settingsgen_fields=debug,settingsgen_store=debug,settingsgen_config=debug"
    } else {
        config.log.filter.as_str()
    };
    init_tracing(filter);

    let store = commands::open_store(&config);
    let result = match cli.command {
        Commands::Check { definition } => commands::check(&definition).await,
        Commands::Render {
            definition,
            tab,
            capabilities,
        } => commands::render(&definition, store, tab, &capabilities).await,
        Commands::Save {
            definition,
            values,
            json,
            capabilities,
        } => commands::save(&definition, store, &values, json.as_deref(), &capabilities).await,
        Commands::Show {
            definition,
            capabilities,
        } => commands::show(&definition, store, &capabilities).await,
    };

    std::process::exit(result_to_exit(result));
}

/// Print the command output, or the error chain, and pick an exit code.
fn result_to_exit(result: anyhow::Result<String>) -> i32 {
    match result {
        Ok(output) => {
            print!("{output}");
            0
        }
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parsing_check() {
        let cli = Cli::parse_from(["settingsgen", "check", "page.yaml"]);
        assert!(!cli.debug);
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Commands::Check { definition } if definition == PathBuf::from("page.yaml")));
    }

    #[test]
    fn test_cli_parsing_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["settingsgen", "show", "page.yaml", "--debug", "--config", "x.toml"]);
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_cli_parsing_render_options() {
        let cli = Cli::parse_from([
            "settingsgen",
            "render",
            "page.yaml",
            "--tab",
            "advanced",
            "--capability",
            "edit_posts",
            "--capability",
            "manage_options",
        ]);
        match cli.command {
            Commands::Render {
                tab, capabilities, ..
            } => {
                assert_eq!(tab.as_deref(), Some("advanced"));
                assert_eq!(capabilities, ["edit_posts", "manage_options"]);
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_parsing_save_pairs_and_json_conflict() {
        let cli = Cli::parse_from(["settingsgen", "save", "page.yaml", "volume=7", "colors=red"]);
        match cli.command {
            Commands::Save { values, json, .. } => {
                assert_eq!(values, ["volume=7", "colors=red"]);
                assert!(json.is_none());
            }
            _ => panic!("Expected Save command"),
        }

        let conflict = Cli::try_parse_from([
            "settingsgen",
            "save",
            "page.yaml",
            "volume=7",
            "--json",
            "{}",
        ]);
        assert!(conflict.is_err());
    }

    #[test]
    fn test_result_to_exit() {
        assert_eq!(result_to_exit(Ok(String::new())), 0);
        assert_eq!(result_to_exit(Err(anyhow::anyhow!("boom"))), 1);
    }
}
