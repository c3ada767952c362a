// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Barbero - conversational scheduling assistant for a barbershop.
//!
//! This is the binary entry point.

mod serve;

use clap::{Parser, Subcommand};

/// Barbero - conversational scheduling assistant for a barbershop.
#[derive(Parser, Debug)]
#[command(name = "barbero", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot: Telegram polling, OAuth callback server, and the
    /// reminder scheduler.
    Serve,
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match barbero_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            barbero_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("error: could not render config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("barbero: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed).
        let config = barbero_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "barbero");
    }
}
