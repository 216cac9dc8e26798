//! Service configuration.
//!
//! Built from command-line flags, with environment variables as fallbacks for
//! the most common settings. Flags win over the environment.

use anyhow::{Context, Result, bail};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_SYNONYMS_PATH: &str = "query_synonyms.json";
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LEMMATIZER_TIMEOUT_SECS: u64 = 60;

pub const USAGE: &str = "\
Usage: article-search [options]

  --bind <addr:port>           listen address (SEARCH_BIND, default 127.0.0.1:8080)
  --articles <path>            full article records, JSON array (SEARCH_ARTICLES)
  --normalized <path>          normalized articles, JSON array (SEARCH_NORMALIZED)
  --synonyms <path>            synonym dictionary (SEARCH_SYNONYMS, default query_synonyms.json)
  --lemmatizer-cmd <cmd>       external lemmatizer command line (SEARCH_LEMMATIZER_CMD)
  --lemmatizer-url <url>       HTTP lemmatizer endpoint (SEARCH_LEMMATIZER_URL)
  --no-lemmas                  disable lemmatization, terms pass through
  --scorer <substring|text-index>  scoring backend (SEARCH_SCORER, default substring)
  --search-log <path>          JSON-lines search log (SEARCH_LOG, in-memory if absent)
  --workers <n>                scoring workers (default: available cores)
  --timeout <secs>             whole-search timeout (default 120)
  --lemmatizer-timeout <secs>  lemmatizer call timeout (default 60)
  --verbose                    debug logging
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerKind {
    /// In-process field-weighted substring scan.
    Substring,
    /// The document store's own text search.
    TextIndex,
}

impl FromStr for ScorerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(ScorerKind::Substring),
            "text-index" | "text_index" | "textindex" => Ok(ScorerKind::TextIndex),
            other => bail!("Unknown scorer '{}', expected substring or text-index", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub articles_path: Option<PathBuf>,
    pub normalized_path: Option<PathBuf>,
    pub synonyms_path: PathBuf,
    pub lemmatizer_cmd: Option<String>,
    pub lemmatizer_url: Option<String>,
    pub lemmas_enabled: bool,
    pub scorer: ScorerKind,
    pub search_log_path: Option<PathBuf>,
    pub workers: usize,
    pub search_timeout: Duration,
    pub lemmatizer_timeout: Duration,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            articles_path: None,
            normalized_path: None,
            synonyms_path: PathBuf::from(DEFAULT_SYNONYMS_PATH),
            lemmatizer_cmd: None,
            lemmatizer_url: None,
            lemmas_enabled: true,
            scorer: ScorerKind::Substring,
            search_log_path: None,
            workers: default_workers(),
            search_timeout: Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS),
            lemmatizer_timeout: Duration::from_secs(DEFAULT_LEMMATIZER_TIMEOUT_SECS),
            verbose: false,
        }
    }
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl Config {
    /// Reads the process environment, then applies `args` (without the program name).
    pub fn from_env_and_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        Self::parse(|key| std::env::var(key).ok(), args)
    }

    pub fn parse(
        env: impl Fn(&str) -> Option<String>,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let mut config = Config::default();

        if let Some(bind) = env("SEARCH_BIND") {
            config.bind = bind
                .parse()
                .with_context(|| format!("SEARCH_BIND: invalid address '{}'", bind))?;
        }
        config.articles_path = env("SEARCH_ARTICLES").map(PathBuf::from);
        config.normalized_path = env("SEARCH_NORMALIZED").map(PathBuf::from);
        if let Some(path) = env("SEARCH_SYNONYMS") {
            config.synonyms_path = PathBuf::from(path);
        }
        config.lemmatizer_cmd = env("SEARCH_LEMMATIZER_CMD").filter(|c| !c.trim().is_empty());
        config.lemmatizer_url = env("SEARCH_LEMMATIZER_URL").filter(|u| !u.trim().is_empty());
        if let Some(scorer) = env("SEARCH_SCORER") {
            config.scorer = scorer.parse().context("SEARCH_SCORER")?;
        }
        config.search_log_path = env("SEARCH_LOG").map(PathBuf::from);

        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let mut value = || {
                args.next()
                    .with_context(|| format!("{} requires a value", flag))
            };

            match flag.as_str() {
                "--bind" => {
                    let v = value()?;
                    config.bind = v
                        .parse()
                        .with_context(|| format!("--bind: invalid address '{}'", v))?;
                }
                "--articles" => config.articles_path = Some(PathBuf::from(value()?)),
                "--normalized" => config.normalized_path = Some(PathBuf::from(value()?)),
                "--synonyms" => config.synonyms_path = PathBuf::from(value()?),
                "--lemmatizer-cmd" => config.lemmatizer_cmd = Some(value()?),
                "--lemmatizer-url" => config.lemmatizer_url = Some(value()?),
                "--no-lemmas" => config.lemmas_enabled = false,
                "--scorer" => config.scorer = value()?.parse()?,
                "--search-log" => config.search_log_path = Some(PathBuf::from(value()?)),
                "--workers" => {
                    let v = value()?;
                    config.workers = v
                        .parse::<usize>()
                        .with_context(|| format!("--workers: invalid number '{}'", v))?
                        .max(1);
                }
                "--timeout" => config.search_timeout = Duration::from_secs(parse_secs(value()?)?),
                "--lemmatizer-timeout" => {
                    config.lemmatizer_timeout = Duration::from_secs(parse_secs(value()?)?)
                }
                "--verbose" => config.verbose = true,
                other => bail!("Unknown argument: {}", other),
            }
        }

        Ok(config)
    }
}

fn parse_secs(raw: String) -> Result<u64> {
    let secs: u64 = raw
        .parse()
        .with_context(|| format!("invalid number of seconds '{}'", raw))?;
    if secs == 0 {
        bail!("timeouts must be at least one second");
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse(no_env, Vec::new()).unwrap();

        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.synonyms_path, PathBuf::from(DEFAULT_SYNONYMS_PATH));
        assert_eq!(config.scorer, ScorerKind::Substring);
        assert!(config.lemmas_enabled);
        assert!(config.workers >= 1);
        assert_eq!(config.search_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_flags_override_env() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SEARCH_BIND", "0.0.0.0:9000"),
            ("SEARCH_SCORER", "text-index"),
            ("SEARCH_SYNONYMS", "/etc/synonyms.json"),
        ]);
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let config = Config::parse(
            lookup,
            args(&["--bind", "127.0.0.1:7000", "--no-lemmas", "--timeout", "5"]),
        )
        .unwrap();

        assert_eq!(config.bind.port(), 7000);
        assert_eq!(config.scorer, ScorerKind::TextIndex);
        assert_eq!(config.synonyms_path, PathBuf::from("/etc/synonyms.json"));
        assert!(!config.lemmas_enabled);
        assert_eq!(config.search_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(Config::parse(no_env, args(&["--bogus"])).is_err());
        assert!(Config::parse(no_env, args(&["--bind"])).is_err());
        assert!(Config::parse(no_env, args(&["--scorer", "bm25"])).is_err());
        assert!(Config::parse(no_env, args(&["--timeout", "0"])).is_err());
    }

    #[test]
    fn test_blank_lemmatizer_env_is_ignored() {
        let config = Config::parse(
            |key: &str| (key == "SEARCH_LEMMATIZER_CMD").then(|| "  ".to_string()),
            Vec::new(),
        )
        .unwrap();

        assert!(config.lemmatizer_cmd.is_none());
    }
}
