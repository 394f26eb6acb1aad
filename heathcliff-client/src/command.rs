//! Command-line command selection.

use crate::error::CliError;
use heathcliff_core::MetricReport;
use std::path::PathBuf;
use std::str::FromStr;

pub const USAGE: &str =
    "heathcliff-client <entities|campaigns|adgroups|keywords|searchterms|creativesets> [--config <path>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Organization sweep over entity listings.
    Entities,
    /// One metric report.
    Report(MetricReport),
}

impl FromStr for Command {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entities" => Ok(Command::Entities),
            other => other
                .parse::<MetricReport>()
                .map(Command::Report)
                .map_err(|reason| CliError::Usage(format!("{}\n{}", reason, USAGE))),
        }
    }
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    /// Value of `--config`, if given.
    pub config_path: Option<PathBuf>,
}

impl Invocation {
    /// Parse arguments after the program name. The command is the first
    /// positional argument; further positionals are rejected.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, CliError> {
        let mut args = args.into_iter();
        let mut command = None;
        let mut config_path = None;
        while let Some(arg) = args.next() {
            if arg == "--config" {
                let path = args
                    .next()
                    .ok_or_else(|| CliError::Usage(format!("--config needs a path\n{}", USAGE)))?;
                config_path = Some(PathBuf::from(path));
            } else if command.is_none() {
                command = Some(arg.parse::<Command>()?);
            } else {
                return Err(CliError::Usage(format!("unexpected argument {}\n{}", arg, USAGE)));
            }
        }
        let command = command.ok_or_else(|| CliError::Usage(USAGE.to_string()))?;
        Ok(Self {
            command,
            config_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_after_config_flag() {
        let invocation = Invocation::from_args(args(&["--config", "h.toml", "keywords"])).unwrap();
        assert_eq!(invocation.command, Command::Report(MetricReport::Keywords));
        assert_eq!(invocation.config_path, Some(PathBuf::from("h.toml")));
    }

    #[test]
    fn test_config_flag_after_command() {
        let invocation =
            Invocation::from_args(args(&["entities", "--config", "/etc/h.toml"])).unwrap();
        assert_eq!(invocation.command, Command::Entities);
        assert_eq!(invocation.config_path, Some(PathBuf::from("/etc/h.toml")));
    }

    #[test]
    fn test_config_flag_is_optional() {
        let invocation = Invocation::from_args(args(&["campaigns"])).unwrap();
        assert_eq!(invocation.command, Command::Report(MetricReport::Campaigns));
        assert_eq!(invocation.config_path, None);
    }

    #[test]
    fn test_malformed_arguments_are_usage_errors() {
        let cases: [&[&str]; 5] = [
            &["--config", "h.toml"],
            &["budgets"],
            &["keywords", "--config"],
            &["keywords", "adgroups"],
            &[],
        ];
        for argv in cases {
            assert!(
                matches!(Invocation::from_args(args(argv)), Err(CliError::Usage(_))),
                "{:?}",
                argv
            );
        }
    }
}
