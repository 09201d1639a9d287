#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `NANOSTATE_DEMO_*` prefix.

use std::env;
use std::process;

use nanostate::RegistryPolicy;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
nanostate demo: shared value containers replayed on a simulated host

USAGE:
    nanostate-demo [OPTIONS]

OPTIONS:
    --app=NAME           Demo to run: 'basic', 'values', or 'all' (default: all)
    --strict             Create keyed containers in strict mode
    --policy=NAME        Registry policy: 'clear' or 'retain' (default: clear)
    --trace-jsonl        Print the harness event trace as JSONL after each demo
    --help, -h           Show this help message
    --version, -V        Show version

APPS:
    basic    Several text inputs and a read-only view sharing one container
    values   Keyed counters, containers built from pairs and maps, a missing
             key, and a container dispatched to right after mount

ENVIRONMENT VARIABLES:
    NANOSTATE_DEMO_APP       Override --app
    NANOSTATE_DEMO_STRICT    Override --strict (1/true to enable)
    NANOSTATE_DEMO_POLICY    Override --policy
    RUST_LOG                 Log filter (default: nanostate=info)";

/// Which demo apps to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppChoice {
    Basic,
    Values,
    #[default]
    All,
}

impl AppChoice {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "values" => Some(Self::Values),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    #[must_use]
    pub fn runs_basic(self) -> bool {
        matches!(self, Self::Basic | Self::All)
    }

    #[must_use]
    pub fn runs_values(self) -> bool {
        matches!(self, Self::Values | Self::All)
    }
}

/// Parsed command-line options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opts {
    pub app: AppChoice,
    /// Keyed containers refuse unknown keys.
    pub strict: bool,
    /// Registry policy for every container the demos create.
    pub policy: RegistryPolicy,
    /// Emit the harness trace after each demo.
    pub trace_jsonl: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

fn truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("nanostate-demo {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(2);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(2);
            }
        }
    }

    fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = get_env("NANOSTATE_DEMO_APP")
            && let Some(app) = AppChoice::parse(&val)
        {
            opts.app = app;
        }
        if let Some(val) = get_env("NANOSTATE_DEMO_STRICT") {
            opts.strict = truthy(&val);
        }
        if let Some(val) = get_env("NANOSTATE_DEMO_POLICY")
            && let Some(policy) = RegistryPolicy::parse(&val)
        {
            opts.policy = policy;
        }

        for arg in args {
            match arg.as_ref() {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                "--strict" => opts.strict = true,
                "--trace-jsonl" => opts.trace_jsonl = true,
                other => {
                    if let Some(val) = other.strip_prefix("--app=") {
                        opts.app = AppChoice::parse(val).ok_or_else(|| ParseError::InvalidValue {
                            flag: "--app",
                            value: val.to_string(),
                        })?;
                    } else if let Some(val) = other.strip_prefix("--policy=") {
                        opts.policy =
                            RegistryPolicy::parse(val).ok_or_else(|| ParseError::InvalidValue {
                                flag: "--policy",
                                value: val.to_string(),
                            })?;
                    } else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    }
                }
            }
        }

        Ok(opts)
    }
}
