//! Turning a handle and an ordered task list into a CDN URL.
//!
//! [`TaskEncoder`] is the seam between the picture engine and the CDN's URL
//! grammar. The engine only decides *which* tasks go into a link and in
//! what order; the encoder validates and serializes them.
//!
//! URL layout:
//!
//! ```text
//! https://<host>[/<apiKey>]/<task>/<task>/.../<handle>
//! ```

use super::task::Task;
use super::validate::ValidationError;
use crate::handle::FileHandle;

/// Host used when no custom CNAME is configured.
pub const DEFAULT_HOST: &str = "cdn.filestackcontent.com";

/// Per-call switches for [`TaskEncoder::encode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions<'a> {
    /// Check every task against its parameter constraints.
    pub validate: bool,
    /// Custom domain; links go to `cdn.<cname>`.
    pub cname: Option<&'a str>,
}

/// Serializes tasks into a CDN link.
///
/// `tasks` arrive already in pipeline order. Implementations must be pure:
/// the same inputs always produce the same URL.
pub trait TaskEncoder: Sync {
    fn encode(
        &self,
        handle: &FileHandle,
        tasks: &[Task],
        options: &EncodeOptions<'_>,
    ) -> Result<String, ValidationError>;
}

/// The production encoder for the Filestack-style processing CDN.
#[derive(Debug, Clone)]
pub struct CdnEncoder {
    host: String,
}

impl CdnEncoder {
    pub fn with_host(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    fn origin(&self, cname: Option<&str>) -> String {
        match cname {
            Some(cname) => format!("https://cdn.{cname}"),
            None => format!("https://{}", self.host),
        }
    }
}

impl Default for CdnEncoder {
    fn default() -> Self {
        Self::with_host(DEFAULT_HOST)
    }
}

impl TaskEncoder for CdnEncoder {
    fn encode(
        &self,
        handle: &FileHandle,
        tasks: &[Task],
        options: &EncodeOptions<'_>,
    ) -> Result<String, ValidationError> {
        if options.validate {
            tasks.iter().try_for_each(Task::validate)?;
        }

        let mut parts = vec![self.origin(options.cname)];
        if let Some(key) = handle.api_key() {
            parts.push(key.to_string());
        }
        parts.extend(tasks.iter().map(Task::segment));
        parts.push(handle.handle().to_string());
        Ok(parts.join("/"))
    }
}
