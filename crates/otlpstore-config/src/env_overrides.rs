// Environment variable overrides
//
// Every field of RuntimeConfig can be set with an OTLPSTORE_<SECTION>_<FIELD> variable.
// Values are parsed with the same rules as the TOML file; a malformed value is an error
// rather than being silently ignored.

use crate::{BufferLayout, LogFormat, OnError, RuntimeConfig};
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Prefix shared by every configuration environment variable.
pub const ENV_PREFIX: &str = "OTLPSTORE_";

/// Read access to environment variables, keyed without [`ENV_PREFIX`].
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;

    /// Variable looked up by its full name.
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Apply every `OTLPSTORE_*` variable present in `env` on top of `config`.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Scan
    if let Some(on_error) = get_env_parsed::<E, OnError>(env, "SCAN_ON_ERROR")? {
        config.scan.on_error = on_error;
    }
    if let Some(max) = get_env_usize(env, "SCAN_MAX_DOCUMENT_BYTES")? {
        config.scan.max_document_bytes = max;
    }

    // Buffer
    if let Some(capacity) = get_env_usize(env, "BUFFER_CAPACITY")? {
        config.buffer.capacity = capacity;
    }
    if let Some(layout) = get_env_parsed::<E, BufferLayout>(env, "BUFFER_LAYOUT")? {
        config.buffer.layout = layout;
    }
    if let Some(chunk_rows) = get_env_usize(env, "BUFFER_CHUNK_ROWS")? {
        config.buffer.chunk_rows = chunk_rows;
    }

    // Receiver
    if let Some(depth) = get_env_usize(env, "RECEIVER_QUEUE_DEPTH")? {
        config.receiver.queue_depth = depth;
    }

    // Logging; RUST_LOG is honoured when no prefixed level is set
    if let Some(level) = get_env_string(env, "LOG_LEVEL")? {
        config.logging.level = level;
    } else if let Some(level) = env.get_raw("RUST_LOG") {
        config.logging.level = level;
    }
    if let Some(format) = get_env_parsed::<E, LogFormat>(env, "LOG_FORMAT")? {
        config.logging.format = format;
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Result<Option<String>> {
    Ok(env.get(key).filter(|value| !value.trim().is_empty()))
}

fn get_env_usize<E: EnvSource>(env: &E, key: &str) -> Result<Option<usize>> {
    match get_env_string(env, key)? {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<usize>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_parsed<E, T>(env: &E, key: &str) -> Result<Option<T>>
where
    E: EnvSource,
    T: FromStr<Err = anyhow::Error>,
{
    match get_env_string(env, key)? {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<T>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
