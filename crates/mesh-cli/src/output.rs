//! Shared output helpers.

use serde::Serialize;

use crate::OutputFormat;

/// Print a serializable value as pretty JSON.
///
/// Text output is command-specific, so only the JSON format prints here.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Json = format {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize output: {}", e),
        }
    }
}
