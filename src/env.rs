//! Defines the environment variables to use.
//!
//! Every variable is optional and falls back to a default when unset or unparsable.

#![cfg(feature = "env")]

use crate::{
    static_lazy_lock,
    transactions::{DEFAULT_MAX_WORKERS, DEFAULT_PER_PAGE},
};

/// Parses an environment variable from [`String`] to something else, wrapping any error in [`anyhow::Error`].
#[macro_export]
macro_rules! parse_env {
    ($key:expr => |$var:ident| $expr:expr) => {
        std::env::var($key)
            .map_err(|e| anyhow::anyhow!(e))
            .and_then(|$var| $expr)
    };
    ($key:expr => |$var:ident| $expr:expr; anyhow) => {
        $crate::parse_env!($key => |$var| $expr.map_err(|e| anyhow::anyhow!(e)))
    };
}

pub use parse_env;

/// The default base URL of the GitHub REST API.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

static_lazy_lock! {
    /// The base URL of the GitHub REST API, without a trailing slash.
    pub GITHUB_API_URL: String = parse_env!("GITHUB_API_URL" => |s| Ok(s.trim_end_matches('/').to_owned()))
        .unwrap_or_else(|_| DEFAULT_GITHUB_API_URL.to_owned());
}

static_lazy_lock! {
    /// The maximum number of in-flight deletions.
    pub MAX_WORKERS: usize = parse_env!("MAX_WORKERS" => |s| s.parse::<usize>(); anyhow)
        .ok()
        .filter(|workers| *workers > 0)
        .unwrap_or(DEFAULT_MAX_WORKERS);
}

static_lazy_lock! {
    /// The page size when listing workflow runs.
    pub PER_PAGE: u8 = parse_env!("PER_PAGE" => |s| s.parse::<u8>(); anyhow)
        .ok()
        .filter(|per_page| (1..=DEFAULT_PER_PAGE).contains(per_page))
        .unwrap_or(DEFAULT_PER_PAGE);
}
