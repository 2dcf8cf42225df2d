//! API key resolution for AI drafting.
//!
//! The chat-completion key is resolved through a chain:
//!
//! 1. `--api-key <key>`: explicit per-command override
//! 2. `PERPLEXITY_API_KEY` env var: process/session level
//! 3. `[drafting] api-key` in `~/.incident-desk/config.toml`
//!
//! No key is not an error: drafting falls back to the offline template.

use std::env;

use crate::config::DraftingConfig;

/// Environment variable consulted for the drafting key.
pub const API_KEY_ENV: &str = "PERPLEXITY_API_KEY";

/// Resolve the drafting API key from the tiered resolution chain.
///
/// Empty values at any tier are skipped.
pub fn resolve_api_key(explicit: Option<&str>, config: &DraftingConfig) -> Option<String> {
    resolve_with(explicit, env::var(API_KEY_ENV).ok(), config)
}

fn resolve_with(
    explicit: Option<&str>,
    from_env: Option<String>,
    config: &DraftingConfig,
) -> Option<String> {
    // 1. Explicit --api-key flag.
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    // 2. Environment variable.
    if let Some(key) = from_env.filter(|k| !k.is_empty()) {
        return Some(key);
    }

    // 3. Config file.
    config.api_key.clone().filter(|k| !k.is_empty())
}
