//! Command-line and environment configuration.
//! Precedence: flags, then MEMWATCH_* environment variables, then built-in defaults.

use std::path::PathBuf;

use thiserror::Error;
use tokio::time::Duration;
use url::Url;

use crate::fetch::DEFAULT_PROXY_BASE;
use crate::scheduler::{PollSettings, DEFAULT_ENDPOINT};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

pub const ENV_ENDPOINT: &str = "MEMWATCH_ENDPOINT";
pub const ENV_BASE_URL: &str = "MEMWATCH_BASE_URL";
pub const ENV_LOG: &str = "MEMWATCH_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Usage(String),
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("invalid value for {flag}: '{value}'")]
    InvalidValue { flag: String, value: String },
    #[error("unexpected argument '{0}'")]
    Unexpected(String),
    #[error("invalid base url '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--base-url URL|-b URL] [--interval-ms N] [--stale-ms N] [--no-proxy] \
         [--proxy-base URL] [--demo] [--headless] [--cycles N] [ENDPOINT]\n\
         \n\
         ENDPOINT defaults to {DEFAULT_ENDPOINT}; relative endpoints resolve against the base URL\n\
         (default {DEFAULT_BASE_URL}).\n\
         Environment: {ENV_ENDPOINT}, {ENV_BASE_URL}, {ENV_LOG}=<log file>, RUST_LOG=<filter>"
    )
}

/// Flags as given; unset options stay `None` so the environment can fill them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub endpoint: Option<String>,
    pub base_url: Option<String>,
    pub interval_ms: Option<u64>,
    pub stale_ms: Option<u64>,
    pub no_proxy: bool,
    pub proxy_base: Option<String>,
    pub demo: bool,
    pub headless: bool,
    pub cycles: Option<u64>,
}

fn parse_positive(flag: &str, v: Option<String>) -> Result<u64, ConfigError> {
    let v = v.ok_or_else(|| ConfigError::MissingValue(flag.to_string()))?;
    match v.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            flag: flag.to_string(),
            value: v,
        }),
    }
}

fn required(flag: &str, v: Option<String>) -> Result<String, ConfigError> {
    match v {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(ConfigError::MissingValue(flag.to_string())),
    }
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, ConfigError> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "memwatch".into());
    let mut p = ParsedArgs::default();

    while let Some(arg) = it.next() {
        // --flag=value form
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let value = |it: &mut I::IntoIter| inline.clone().or_else(|| it.next());

        match flag.as_str() {
            "-h" | "--help" => return Err(ConfigError::Usage(usage(&prog))),
            "--base-url" | "-b" => p.base_url = Some(required(&flag, value(&mut it))?),
            "--interval-ms" => p.interval_ms = Some(parse_positive(&flag, value(&mut it))?),
            "--stale-ms" => p.stale_ms = Some(parse_positive(&flag, value(&mut it))?),
            "--cycles" => p.cycles = Some(parse_positive(&flag, value(&mut it))?),
            "--proxy-base" => p.proxy_base = Some(required(&flag, value(&mut it))?),
            "--no-proxy" => p.no_proxy = true,
            "--demo" => p.demo = true,
            "--headless" => p.headless = true,
            _ if flag.starts_with('-') => return Err(ConfigError::Unexpected(arg)),
            _ => {
                if p.endpoint.is_some() {
                    return Err(ConfigError::Unexpected(arg));
                }
                p.endpoint = Some(arg);
            }
        }
    }
    Ok(p)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: String,
    pub base_url: Url,
    pub proxy_base: Option<String>,
    pub poll: PollSettings,
    pub demo: bool,
    pub headless: bool,
    pub cycles: Option<u64>,
    pub log_path: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(
        args: ParsedArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env = |k: &str| env(k).filter(|v| !v.trim().is_empty());

        let endpoint = args
            .endpoint
            .or_else(|| env(ENV_ENDPOINT))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let base = args
            .base_url
            .or_else(|| env(ENV_BASE_URL))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base).map_err(|source| ConfigError::BaseUrl {
            url: base.clone(),
            source,
        })?;
        let proxy_base = if args.no_proxy {
            None
        } else {
            Some(args.proxy_base.unwrap_or_else(|| DEFAULT_PROXY_BASE.to_string()))
        };

        let defaults = PollSettings::default();
        let poll = PollSettings {
            interval: args
                .interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval),
            stale_after: args
                .stale_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.stale_after),
        };

        Ok(Self {
            endpoint,
            base_url,
            proxy_base,
            poll,
            demo: args.demo,
            headless: args.headless,
            cycles: args.cycles,
            log_path: env(ENV_LOG).map(PathBuf::from),
        })
    }

    pub fn from_env(args: ParsedArgs) -> Result<Self, ConfigError> {
        Self::resolve(args, |k| std::env::var(k).ok())
    }
}
