//! `applog` command-line interface

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

/// Print a command failure and exit with status 1
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({ "error": err.to_string(), "causes": chain });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
