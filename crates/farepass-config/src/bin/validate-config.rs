//! Config validation CLI tool
//!
//! Validates a farepass configuration file and reports any errors.

use farepass_api::PassTerms;
use farepass_config::{CURRENT_CONFIG_VERSION, ConfigError, load_config};
use farepass_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a farepass configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            eprintln!("  validate-config config.example.toml");
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match load_config(&config_path) {
        Ok(catalog) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", CURRENT_CONFIG_VERSION);
            println!("  Data directory: {}", catalog.service.data_dir.display());
            println!("  Passes: {}", catalog.passes.len());

            if !catalog.passes.is_empty() {
                println!();
                println!("Passes:");
                for spec in &catalog.passes {
                    let terms = match &spec.terms {
                        PassTerms::Unlimited => "unlimited".to_string(),
                        PassTerms::TimeBounded { expires_on } => {
                            format!("time-bounded (until {})", expires_on)
                        }
                        PassTerms::CountBounded { max_trips } => {
                            format!("count-bounded ({} trips)", max_trips)
                        }
                    };
                    println!("  - {} [{}]", spec.owner, terms);
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver, CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
