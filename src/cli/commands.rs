use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::EngineConfig;
use crate::router::RouteEntry;
use crate::table::{parse_method, RouteTable};

/// Command-line interface for trierouter
///
/// Lists and resolves routes from a TOML route table.
#[derive(Parser)]
#[command(name = "trierouter")]
#[command(version, about = "trierouter route table tool", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List the routes in a route table
    Routes {
        /// Path to the TOML route table
        #[arg(short, long, env = "TRIEROUTER_TABLE")]
        table: PathBuf,

        /// Print JSON instead of aligned text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Resolve a method and path against a route table
    ///
    /// Prints the matched pattern, route name and bindings as JSON.
    /// Prints `"matched": false` and exits with status 1 when nothing matches.
    Resolve {
        /// Path to the TOML route table
        #[arg(short, long, env = "TRIEROUTER_TABLE")]
        table: PathBuf,

        /// HTTP method (case-insensitive)
        method: String,

        /// Request path, e.g. /users/42
        path: String,
    },
}

#[derive(Debug, Serialize)]
struct ListedRoute<'a> {
    method: &'a str,
    pattern: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Resolution<'a> {
    matched: bool,
    method: String,
    path: &'a str,
    pattern: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    params: BTreeMap<&'a str, &'a str>,
}

#[derive(Debug, Serialize)]
struct NoMatch<'a> {
    matched: bool,
    method: String,
    path: &'a str,
}

/// Parse the process arguments and run the selected command against stdout.
///
/// # Errors
///
/// Returns an error if the route table cannot be loaded or output fails.
pub fn run_cli() -> Result<ExitCode> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    execute(&cli, &mut stdout.lock())
}

/// Run `cli`, writing command output to `out`.
///
/// # Errors
///
/// Returns an error if the route table cannot be loaded, the method is
/// invalid, or writing to `out` fails.
pub fn execute(cli: &Cli, out: &mut impl Write) -> Result<ExitCode> {
    let config = EngineConfig::from_env();
    match &cli.command {
        Commands::Routes { table, json } => {
            let table = RouteTable::load(table)?;
            let router = table.build_router(&config)?;
            let routes = router.routes();
            let listed: Vec<ListedRoute<'_>> = routes
                .iter()
                .map(|entry| listed_route(&table, entry))
                .collect();

            if *json {
                serde_json::to_writer_pretty(&mut *out, &listed)?;
                writeln!(out)?;
            } else {
                for route in &listed {
                    match route.name {
                        Some(name) => writeln!(out, "{:<7} {}  ({name})", route.method, route.pattern)?,
                        None => writeln!(out, "{:<7} {}", route.method, route.pattern)?,
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Resolve {
            table,
            method,
            path,
        } => {
            let table = RouteTable::load(table)?;
            let router = table.build_router(&config)?;
            let method = parse_method(method)?;

            let Some(route_match) = router.route(&method, path) else {
                let miss = NoMatch {
                    matched: false,
                    method: method.to_string(),
                    path,
                };
                serde_json::to_writer_pretty(&mut *out, &miss)?;
                writeln!(out)?;
                return Ok(ExitCode::FAILURE);
            };

            let resolution = Resolution {
                matched: true,
                method: method.to_string(),
                path,
                pattern: &route_match.pattern,
                name: table.name_for(&method, &route_match.pattern),
                params: route_match
                    .path_params
                    .iter()
                    .map(|(k, v)| (k.as_ref(), v.as_str()))
                    .collect(),
            };
            serde_json::to_writer_pretty(&mut *out, &resolution)?;
            writeln!(out)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn listed_route<'a>(table: &'a RouteTable, entry: &'a RouteEntry) -> ListedRoute<'a> {
    let name = parse_method(&entry.method)
        .ok()
        .and_then(|method| table.name_for(&method, &entry.pattern));
    ListedRoute {
        method: &entry.method,
        pattern: &entry.pattern,
        name,
    }
}
