//! Miette diagnostic conversion for CLI errors.

use crate::error::{CliError, ConfigError};
use miette::Report;

/// Convert CliError to a miette Report.
///
/// Only the message chain is kept; the report never shows internal frames.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(ConfigError::InvalidValue { field, value, hint }) => {
            miette::miette!(
                help = hint,
                "Configuration error: invalid value for '{}': {}",
                field,
                value
            )
        }
        CliError::PortUnavailable { port, source } => {
            miette::miette!("Port {} is unavailable: {}", port, source)
        }
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_moves_hint_to_help() {
        let report = cli_error_to_miette(CliError::Config(ConfigError::InvalidValue {
            field: "port_scan_limit".to_string(),
            value: "0".to_string(),
            hint: "Scan at least one port".to_string(),
        }));
        assert_eq!(
            report.to_string(),
            "Configuration error: invalid value for 'port_scan_limit': 0"
        );
        let help = report.help().map(|h| h.to_string());
        assert_eq!(help.as_deref(), Some("Scan at least one port"));
    }

    #[test]
    fn test_other_errors_keep_their_message() {
        let report = cli_error_to_miette(CliError::PortExhausted {
            start: 5000,
            end: 5099,
        });
        assert!(report.to_string().starts_with("No free port between 5000 and 5099"));
    }
}
