mod bots;
mod serve;

use anyhow::Result;
use console::style;
use std::path::PathBuf;

use crate::core::config::ConfigOverrides;
use crate::core::terminal::{self, print_command};

fn print_help() {
    terminal::print_banner();

    println!(" {}", style("Commands").bold());
    print_command("serve", "Run the bot hosting API (default)");
    print_command("bots <username>", "List a user's bots from the record store");
    print_command("help", "Show this message");
    println!();

    println!(" {}", style("Options").bold());
    print_command("--port <port>", "Listen port (env PORT, default 10000)");
    print_command("--host <host>", "Listen address (default 0.0.0.0)");
    print_command("--data-dir <dir>", "Where records and uploads live");
    print_command("--config <file>", "Read settings from this TOML file");

    println!(
        "\n {} {} <command> [options]\n",
        style("Usage:").bold(),
        style("botherd").green()
    );
}

pub(crate) fn parse_service_flags(args: &[String], start: usize) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::default();
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    overrides.port = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--host" => {
                if i + 1 < args.len() {
                    overrides.host = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--data-dir" => {
                if i + 1 < args.len() {
                    overrides.data_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    overrides.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    overrides
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(String::as_str).unwrap_or("serve");

    match cmd {
        "serve" => serve::run_service(parse_service_flags(&args, 2)).await,
        "bots" => {
            let Some(owner) = args.get(2).filter(|a| !a.starts_with('-')) else {
                anyhow::bail!("missing username. Usage: botherd bots <username> [--data-dir <dir>]");
            };
            bots::list_owner_bots(owner, parse_service_flags(&args, 3)).await
        }
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        flag if flag.starts_with('-') => serve::run_service(parse_service_flags(&args, 1)).await,
        other => {
            print_help();
            anyhow::bail!("Unknown command '{}'", other)
        }
    }
}
