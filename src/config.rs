//! Option presets.
//!
//! A preset is an `adaptive.toml` file holding [`PictureOptions`] shared by
//! many pictures. Options are resolved in layers, each overriding the one
//! before:
//!
//! ```text
//! stock defaults  →  adaptive.toml  →  command-line flags / batch entry
//! ```
//!
//! ## Example
//!
//! ```toml
//! alt = "Gallery image"
//! formats = ["webp", "jpg"]
//! resolutions = [320, 640, 960, "1280w"]
//!
//! [sizes]
//! "(min-width: 1280px)" = "50vw"
//! "(min-width: 640px)" = "60vw"
//! fallback = "100vw"
//!
//! [transforms]
//! sharpen = { amount = 3 }
//! output = { format = "jpg", quality = 80 }
//! ```
//!
//! ## Merging
//!
//! Tables are merged key-by-key (`sizes`, `transforms` and each task's
//! parameters), everything else is replaced. Unknown keys are rejected to
//! catch typos early, and the merged result goes through the same
//! cross-validation as [`build_picture_tree`](crate::build_picture_tree).

use crate::options::PictureOptions;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Preset file looked up in a directory.
pub const CONFIG_FILE: &str = "adaptive.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("cannot use value as options: {0}")]
    Convert(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Option names also accepted in camelCase.
const CAMEL_CASE_KEYS: &[(&str, &str)] = &[("useValidator", "use_validator")];

// =============================================================================
// Loading, merging, and validation
// =============================================================================

/// Returns the stock default options as a `toml::Value::Table`.
///
/// This is the base layer every overlay is merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PictureOptions::default()).expect("default options must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
/// Keys already in `base` keep their position, new keys are appended.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut table), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match table.get_mut(&key) {
                    Some(slot) => {
                        let existing = std::mem::replace(slot, toml::Value::Boolean(false));
                        *slot = merge_toml(existing, value);
                    }
                    None => {
                        table.insert(key, value);
                    }
                }
            }
            toml::Value::Table(table)
        }
        (_, overlay) => overlay,
    }
}

/// Rename camelCase option keys to their canonical names so an overlay and
/// the base never carry the same option twice.
fn canonical_keys(value: toml::Value) -> toml::Value {
    match value {
        toml::Value::Table(table) => toml::Value::Table(
            table
                .into_iter()
                .map(|(key, value)| {
                    let key = CAMEL_CASE_KEYS
                        .iter()
                        .find(|(camel, _)| *camel == key)
                        .map_or(key, |(_, snake)| snake.to_string());
                    (key, value)
                })
                .collect(),
        ),
        other => other,
    }
}

/// Read a preset file as a raw TOML value.
pub fn load_raw_file(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load `adaptive.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no preset.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    load_raw_file(&path).map(Some)
}

/// Convert a JSON options object into a TOML overlay.
pub fn json_overlay(value: &serde_json::Value) -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(value)?)
}

/// Merge overlays onto `base` in order, accepting camelCase option names.
pub fn merge_layers<I>(base: toml::Value, overlays: I) -> toml::Value
where
    I: IntoIterator<Item = toml::Value>,
{
    overlays
        .into_iter()
        .fold(canonical_keys(base), |acc, overlay| {
            merge_toml(acc, canonical_keys(overlay))
        })
}

/// Merge overlays onto `base` in order, then deserialize and validate.
pub fn resolve_options<I>(base: toml::Value, overlays: I) -> Result<PictureOptions, ConfigError>
where
    I: IntoIterator<Item = toml::Value>,
{
    let options: PictureOptions = merge_layers(base, overlays).try_into()?;
    options
        .validate()
        .map_err(|e| ConfigError::Validation(e.to_string()))?;
    Ok(options)
}

/// Load options from `adaptive.toml` in `dir` on top of stock defaults.
pub fn load_options(dir: &Path) -> Result<PictureOptions, ConfigError> {
    resolve_options(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `adaptive.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Adaptive Picture Preset
# =======================
# Options shared by every picture built with this preset.
# Values left commented out are unset; the two active keys are the defaults.
# Flags given on the command line override this file.
# Unknown keys will cause an error.

# Attach a stable `key` attribute to every <source>, for virtual-DOM renderers.
keys = false

# Check every transformation task against its parameter ranges.
use_validator = true

# `alt` text for the <img> element.
# alt = "A lake at dawn"

# Output formats. One <source> per format (and per size, if sizes are set).
# formats = ["webp", "jpg"]

# Static display width of the image. Enables pixel densities ("1x", "2x"),
# which are the default resolutions when a width is set.
# width = "768px"

# srcset entries: pixel widths (320), width descriptors ("320w"), or pixel
# densities ("2x"). Widths need [sizes]; densities need `width` and exclude
# [sizes]. Without a width the default is 15 widths from 180 to 3024.
# resolutions = [320, 640, 960]

# Custom domain. Links are served from cdn.<cname>.
# cname = "example.com"

# ---------------------------------------------------------------------------
# Sizes: media query = display size, in order. `fallback` applies when no
# query matches and becomes the <img> element's own `sizes`.
# ---------------------------------------------------------------------------
# [sizes]
# "(min-width: 1280px)" = "50vw"
# "(min-width: 640px)" = "60vw"
# fallback = "100vw"

# ---------------------------------------------------------------------------
# Signed URLs
# ---------------------------------------------------------------------------
# [security]
# policy = "eyJleHBpcnkiOjE1MDg4MTk1NDF9"
# signature = "a6e8e1d6c1e7b3f2"

# ---------------------------------------------------------------------------
# Transformations applied to every link, in this order (`output` always
# runs last). Flags take `true`; other tasks take a table of parameters.
# ---------------------------------------------------------------------------
# [transforms]
# flip = true
# sharpen = { amount = 3 }
# output = { format = "jpg", quality = 80 }
"##
}
