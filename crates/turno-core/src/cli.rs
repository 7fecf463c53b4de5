use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::{expand_command_abbrev, known_command_names};
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "turno",
    version,
    about = "Turno: three-person day rotation calendar",
    disable_help_subcommand = true,
    arg_required_else_help = false
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "turnorc")]
    pub turnorc: Option<PathBuf>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true, allow_negative_numbers = true)]
    pub rest: Vec<OsString>,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls `rc.key=value` / `rc.key:value` tokens out of argv before clap sees
/// them.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = if let Some((k, v)) = rest.split_once('=') {
                Some((format!("rc.{k}"), v.to_string()))
            } else if let Some((k, v)) = rest.split_once(':') {
                Some((format!("rc.{k}"), v.to_string()))
            } else {
                None
            };

            if let Some((k, v)) = parsed {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub command_args: Vec<String>,
}

impl Invocation {
    #[tracing::instrument(skip(cfg, rest))]
    pub fn parse(cfg: &Config, rest: Vec<OsString>) -> anyhow::Result<Self> {
        let tokens: Vec<String> = rest
            .into_iter()
            .map(|arg| arg.to_string_lossy().to_string())
            .collect();

        let Some((first, args)) = tokens.split_first() else {
            let cmd = cfg
                .get("default.command")
                .unwrap_or_else(|| "month".to_string());
            debug!(command = %cmd, "no explicit command, using default");
            return Ok(Self {
                command: cmd,
                command_args: vec![],
            });
        };

        if tokens.len() == 1 && first.parse::<i32>().is_ok() {
            debug!(token = %first, "single numeric token interpreted as month navigation");
            return Ok(Self {
                command: "next".to_string(),
                command_args: vec![first.clone()],
            });
        }

        let known = known_command_names();
        let command = expand_command_abbrev(first, &known)
            .ok_or_else(|| anyhow!("unknown or ambiguous command: {first}"))?;
        debug!(token = %first, expanded = %command, "resolved command token");

        Ok(Self {
            command: command.to_string(),
            command_args: args.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use clap::Parser;

    use super::{GlobalCli, Invocation, preprocess_args};
    use crate::config::Config;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn extracts_positional_rc_overrides() {
        let pre = preprocess_args(&os(&["turno", "rc.locale=en", "month", "rc.week.start:monday"]))
            .expect("preprocess");
        assert_eq!(pre.cleaned_args, os(&["turno", "month"]));
        assert_eq!(
            pre.rc_overrides,
            vec![
                ("rc.locale".to_string(), "en".to_string()),
                ("rc.week.start".to_string(), "monday".to_string()),
            ]
        );
    }

    #[test]
    fn parses_global_flags_and_rest() {
        let cli = GlobalCli::parse_from(os(&["turno", "-vv", "--rc", "color=off", "month", "2025-03"]));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.rc_overrides.len(), 1);
        assert_eq!(cli.rc_overrides[0].key, "color");
        assert_eq!(cli.rest, os(&["month", "2025-03"]));
    }

    #[test]
    fn negative_number_reaches_rest() {
        let cli = GlobalCli::parse_from(os(&["turno", "-2"]));
        assert_eq!(cli.rest, os(&["-2"]));
    }

    #[test]
    fn empty_invocation_uses_default_command() {
        let inv = Invocation::parse(&Config::default(), vec![]).expect("parse");
        assert_eq!(inv.command, "month");
        assert!(inv.command_args.is_empty());
    }

    #[test]
    fn lone_number_navigates() {
        let inv = Invocation::parse(&Config::default(), os(&["-3"])).expect("parse");
        assert_eq!(inv.command, "next");
        assert_eq!(inv.command_args, vec!["-3".to_string()]);
    }

    #[test]
    fn abbreviated_command_expands() {
        let inv = Invocation::parse(&Config::default(), os(&["leg"])).expect("parse");
        assert_eq!(inv.command, "legend");

        let inv = Invocation::parse(&Config::default(), os(&["mo", "marzo", "2025"])).expect("parse");
        assert_eq!(inv.command, "month");
        assert_eq!(inv.command_args, vec!["marzo".to_string(), "2025".to_string()]);
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Invocation::parse(&Config::default(), os(&["frobnicate"])).is_err());
    }
}
