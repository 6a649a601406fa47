//! File identifiers and security credentials.
//!
//! A picture always starts from one uploaded file. It is referenced either by
//! its plain handle, or by a storage-alias pair (source handle + the API key
//! of the account that owns it). The two shapes are dispatched explicitly by
//! [`FileHandle`]; nothing sniffs for field presence after parsing.

use crate::error::{PictureError, PictureResult};
use serde::{Deserialize, Serialize};

/// Identifier of the source image on the CDN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HandleRepr", into = "HandleRepr")]
pub enum FileHandle {
    /// Plain handle, e.g. `seW1thvcR1aQBfOCF8bX`.
    Plain(String),
    /// Storage alias: a handle living in another account's storage.
    StorageAlias { src_handle: String, api_key: String },
}

impl FileHandle {
    /// Plain handle. Fails on an empty or whitespace-containing string.
    pub fn new(handle: impl Into<String>) -> PictureResult<Self> {
        let handle = FileHandle::Plain(handle.into());
        handle.ensure_well_formed()?;
        Ok(handle)
    }

    /// Storage-alias pair.
    pub fn storage_alias(
        src_handle: impl Into<String>,
        api_key: impl Into<String>,
    ) -> PictureResult<Self> {
        let handle = FileHandle::StorageAlias {
            src_handle: src_handle.into(),
            api_key: api_key.into(),
        };
        handle.ensure_well_formed()?;
        Ok(handle)
    }

    /// Check the identifier's shape. Variants are public, so the assembler
    /// re-checks values that were built without the constructors.
    pub fn ensure_well_formed(&self) -> PictureResult<()> {
        match self {
            FileHandle::Plain(h) => check_token("handle", h),
            FileHandle::StorageAlias {
                src_handle,
                api_key,
            } => {
                check_token("srcHandle", src_handle)?;
                check_token("apiKey", api_key)
            }
        }
    }

    /// The handle of the file itself (the source handle for aliases).
    pub fn handle(&self) -> &str {
        match self {
            FileHandle::Plain(h) => h,
            FileHandle::StorageAlias { src_handle, .. } => src_handle,
        }
    }

    /// API key prefix of the URL, for storage aliases only.
    pub fn api_key(&self) -> Option<&str> {
        match self {
            FileHandle::Plain(_) => None,
            FileHandle::StorageAlias { api_key, .. } => Some(api_key),
        }
    }
}

fn check_token(field: &str, value: &str) -> PictureResult<()> {
    if value.is_empty() {
        return Err(PictureError::invalid_identifier(format!(
            "{field} must not be empty"
        )));
    }
    if value.contains(|c: char| c.is_whitespace() || c == '/') {
        return Err(PictureError::invalid_identifier(format!(
            "{field} `{value}` contains whitespace or `/`"
        )));
    }
    Ok(())
}

impl TryFrom<&serde_json::Value> for FileHandle {
    type Error = PictureError;

    /// Accepts a JSON string or an object with `srcHandle`/`apiKey`
    /// (snake_case spellings are accepted too). Anything else is an
    /// [`PictureError::InvalidIdentifier`].
    fn try_from(value: &serde_json::Value) -> PictureResult<Self> {
        use serde_json::Value;
        match value {
            Value::String(s) => FileHandle::new(s.as_str()),
            Value::Object(map) => {
                let field = |camel: &str, snake: &str| {
                    map.get(camel)
                        .or_else(|| map.get(snake))
                        .and_then(Value::as_str)
                };
                match (field("srcHandle", "src_handle"), field("apiKey", "api_key")) {
                    (Some(src), Some(key)) => FileHandle::storage_alias(src, key),
                    _ => Err(PictureError::invalid_identifier(
                        "storage alias needs string `srcHandle` and `apiKey` fields",
                    )),
                }
            }
            other => Err(PictureError::invalid_identifier(format!(
                "got {}",
                json_kind(other)
            ))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Wire shape of [`FileHandle`] for serde.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum HandleRepr {
    Plain(String),
    Alias {
        #[serde(rename = "srcHandle", alias = "src_handle")]
        src_handle: String,
        #[serde(rename = "apiKey", alias = "api_key")]
        api_key: String,
    },
}

impl TryFrom<HandleRepr> for FileHandle {
    type Error = PictureError;

    fn try_from(repr: HandleRepr) -> PictureResult<Self> {
        match repr {
            HandleRepr::Plain(h) => FileHandle::new(h),
            HandleRepr::Alias {
                src_handle,
                api_key,
            } => FileHandle::storage_alias(src_handle, api_key),
        }
    }
}

impl From<FileHandle> for HandleRepr {
    fn from(handle: FileHandle) -> Self {
        match handle {
            FileHandle::Plain(h) => HandleRepr::Plain(h),
            FileHandle::StorageAlias {
                src_handle,
                api_key,
            } => HandleRepr::Alias {
                src_handle,
                api_key,
            },
        }
    }
}

/// Signed-URL credential, injected into every link as a `security` task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Security {
    pub policy: String,
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_handle() {
        let h = FileHandle::new("seW1thvcR1aQBfOCF8bX").unwrap();
        assert_eq!(h.handle(), "seW1thvcR1aQBfOCF8bX");
        assert_eq!(h.api_key(), None);
    }

    #[test]
    fn storage_alias_exposes_source_handle_and_key() {
        let h = FileHandle::storage_alias("abc", "KEY").unwrap();
        assert_eq!(h.handle(), "abc");
        assert_eq!(h.api_key(), Some("KEY"));
    }

    #[test]
    fn empty_handle_is_invalid() {
        assert!(matches!(
            FileHandle::new(""),
            Err(PictureError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn handle_with_slash_is_invalid() {
        assert!(FileHandle::new("a/b").is_err());
    }

    #[test]
    fn public_variant_is_rechecked() {
        let h = FileHandle::StorageAlias {
            src_handle: "abc".into(),
            api_key: String::new(),
        };
        assert!(h.ensure_well_formed().is_err());
    }

    // =========================================================================
    // JSON conversions
    // =========================================================================

    #[test]
    fn from_json_string() {
        let h = FileHandle::try_from(&json!("abc")).unwrap();
        assert_eq!(h, FileHandle::Plain("abc".into()));
    }

    #[test]
    fn from_json_alias_object() {
        let h = FileHandle::try_from(&json!({"srcHandle": "abc", "apiKey": "KEY"})).unwrap();
        assert_eq!(h.api_key(), Some("KEY"));
    }

    #[test]
    fn from_json_number_is_invalid_identifier() {
        let err = FileHandle::try_from(&json!(42)).unwrap_err();
        assert!(matches!(err, PictureError::InvalidIdentifier(_)));
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn from_json_incomplete_alias_is_invalid_identifier() {
        let err = FileHandle::try_from(&json!({"srcHandle": "abc"})).unwrap_err();
        assert!(matches!(err, PictureError::InvalidIdentifier(_)));
    }

    #[test]
    fn serde_round_trip_keeps_camel_case() {
        let h = FileHandle::storage_alias("abc", "KEY").unwrap();
        let value = serde_json::to_value(&h).unwrap();
        assert_eq!(value, json!({"srcHandle": "abc", "apiKey": "KEY"}));
        let back: FileHandle = serde_json::from_value(value).unwrap();
        assert_eq!(back, h);
    }
}
