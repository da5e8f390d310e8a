// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./chatmem.toml` > `~/.config/chatmem/chatmem.toml` >
//! `/etc/chatmem/chatmem.toml`, with environment variable overrides via the
//! `CHATMEM_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ChatmemConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG: &str = "/etc/chatmem/chatmem.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG: &str = "chatmem.toml";

/// Config sections recognised in `CHATMEM_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &[
    "storage",
    "recall",
    "compression",
    "chunking",
    "embedding",
    "summarizer",
    "logging",
];

/// Path of the per-user configuration file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chatmem").join("chatmem.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/chatmem/chatmem.toml`
/// 3. `~/.config/chatmem/chatmem.toml`
/// 4. `./chatmem.toml`
/// 5. `CHATMEM_*` environment variables
pub fn load_config() -> Result<ChatmemConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ChatmemConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatmemConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChatmemConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatmemConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ChatmemConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Only the first underscore after the section name becomes a dot, so
/// `CHATMEM_STORAGE_DATABASE_PATH` maps to `storage.database_path`.
fn env_provider() -> Env {
    Env::prefixed("CHATMEM_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key to its dotted config path.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
