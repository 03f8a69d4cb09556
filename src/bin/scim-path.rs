//! # SCIM Path Tool
//!
//! A command-line utility for trying SCIM attribute paths and filters against
//! JSON resource files.
//!
//! ## Usage
//!
//! ### Read the values addressed by a path
//!
//! ```bash
//! cargo run --features cli --bin scim-path -- get 'emails[type eq "work"].value' user.json
//! ```
//!
//! ### Test a filter against a resource
//!
//! ```bash
//! cargo run --features cli --bin scim-path -- match 'userName sw "bj" and active eq true' user.json
//! ```
//!
//! ### Show how a filter parses
//!
//! ```bash
//! cargo run --features cli --bin scim-path -- parse 'a eq 1 and b eq 2 or c eq 3'
//! ```
//!
//! ## Output Examples
//!
//! ```text
//! $ scim-path parse 'a eq 1 and b eq 2 or c eq 3'
//! ✓ ((a eq 1 and b eq 2) or c eq 3)
//!
//! $ scim-path parse 'userName xx "bjensen"'
//! ❌ Invalid filter: Unrecognized attribute operator 'xx' at position 9. Expected: eq,ne,co,sw,ew,pr,gt,ge,lt,le
//!    userName xx "bjensen"
//!             ^
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: The command succeeded (for `match`, the filter matched)
//! - `1`: Parse error, unreadable file, or (for `match`) no match
//!
//! Set `RUST_LOG=trace` to see the parser's log output.

use scim_path::{Filter, FilterEvaluator, Path, ScimError, accessor};
use serde_json::Value;
use std::env;
use std::fs;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("scim-path");

    match args.get(1..).unwrap_or_default() {
        [command, path, file] if command == "get" => get(path, file),
        [command, filter, file] if command == "match" => match_filter(filter, file),
        [command, filter] if command == "parse" => parse(filter),
        _ => {
            eprintln!("Usage: {} <command> <args>", program);
            eprintln!();
            eprintln!("Commands:");
            eprintln!("  get <path> <resource.json>      Print the values addressed by a path");
            eprintln!("  match <filter> <resource.json>  Test a filter against a resource");
            eprintln!("  parse <filter>                  Print the parsed form of a filter");
            process::exit(1);
        }
    }
}

fn get(path: &str, file: &str) {
    let path = Path::parse(path).unwrap_or_else(|e| fail_parse(path, &e));
    let resource = load_resource(file);

    match accessor::get_values(&path, &resource) {
        Ok(values) if values.is_empty() => {
            println!("No values at '{}'", path);
        }
        Ok(values) => {
            for value in values {
                println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            }
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    }
}

fn match_filter(filter: &str, file: &str) {
    let filter = Filter::parse(filter).unwrap_or_else(|e| fail_parse(filter, &e));
    let resource = load_resource(file);

    match FilterEvaluator::default().evaluate(&filter, &resource) {
        Ok(true) => println!("✓ {} matches {}", file, filter),
        Ok(false) => {
            println!("✗ {} does not match {}", file, filter);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    }
}

fn parse(filter: &str) {
    match Filter::parse(filter) {
        Ok(parsed) => println!("✓ {}", parsed),
        Err(e) => fail_parse(filter, &e),
    }
}

fn load_resource(file: &str) -> Value {
    let content = fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("Error reading '{}': {}", file, e);
        process::exit(1);
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("❌ '{}' is not valid JSON: {}", file, e);
        process::exit(1);
    })
}

/// Prints a parse error with a caret under the offending character.
fn fail_parse(input: &str, error: &ScimError) -> ! {
    eprintln!("❌ {}", error);
    if let Some(position) = error.position() {
        let trimmed = input.trim();
        eprintln!("   {}", trimmed);
        eprintln!("   {}^", " ".repeat(position));
    }
    process::exit(1);
}
