//! Utility functions for CLI commands

use is_terminal::IsTerminal;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::config::Config;

/// Read a file, or stdin when the path is `-`
pub fn read_input(path: &Path) -> Result<String, String> {
    if path.as_os_str() != "-" {
        return fs::read_to_string(path)
            .map_err(|e| format_error("read file", &format!("{}: {}", path.display(), e)));
    }
    if io::stdin().is_terminal() {
        return Err("Nothing piped on stdin. Pass a file path instead of '-'".to_string());
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| format_error("read stdin", &e.to_string()))?;
    Ok(buf)
}

/// Load the configuration file if one was given, defaults otherwise
pub fn load_config(path: Option<&Path>) -> Result<Config, String> {
    match path {
        Some(p) => Config::load(p).map_err(|e| format_error("load config", &e.to_string())),
        None => Ok(Config::default()),
    }
}

/// Format error message consistently
pub fn format_error(operation: &str, details: &str) -> String {
    format!("Failed to {}: {}", operation, details)
}
