//! Configuration loading and resolution.
//!
//! Each option resolves explicit flag, then environment variable, then the
//! library default.

use std::time::Duration;

use northgate::ScraperOptions;

pub const ENV_TIMEOUT_SECS: &str = "NORTHGATE_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "NORTHGATE_USER_AGENT";
pub const ENV_PAGE_SIZE: &str = "NORTHGATE_PAGE_SIZE";

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub page_size: Option<u32>,
    pub skip_results_status_check: bool,
}

/// Resolve scraper options from flags and the process environment.
pub fn resolve_options(overrides: &OptionOverrides) -> ScraperOptions {
    resolve_options_with(overrides, |key| std::env::var(key).ok())
}

/// Resolve scraper options with a custom environment lookup.
pub fn resolve_options_with(
    overrides: &OptionOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ScraperOptions {
    let defaults = ScraperOptions::default();

    let timeout = overrides
        .timeout_secs
        .or_else(|| env_parse(&env, ENV_TIMEOUT_SECS))
        .map(Duration::from_secs)
        .unwrap_or(defaults.timeout);

    let user_agent = overrides
        .user_agent
        .clone()
        .or_else(|| env(ENV_USER_AGENT).filter(|ua| !ua.trim().is_empty()))
        .unwrap_or(defaults.user_agent);

    let page_size = overrides
        .page_size
        .or_else(|| env_parse(&env, ENV_PAGE_SIZE))
        .unwrap_or(defaults.page_size);

    ScraperOptions {
        timeout,
        user_agent,
        page_size,
        check_results_status: !overrides.skip_results_status_check,
    }
}

fn env_parse<T: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring {key}={raw:?}: not a valid number");
            None
        }
    }
}
