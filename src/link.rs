//! CDN link builder.
//!
//! A [`LinkBuilder`] holds everything that is shared by all links of one
//! picture (handle, caller tasks, CNAME, validator switch) and produces one
//! URL per [`Variant`]. A variant only ever adds a `resize` width and/or an
//! `output` format on top of the shared tasks.
//!
//! ## Ordering
//!
//! Tasks keep their insertion order, except `output`, which is always moved
//! to the end: format conversion is the last step of the CDN pipeline.
//!
//! ## Validation
//!
//! Links of one set differ only in their resize width, so only the first
//! link of a set (index 0) is validated; the rest are encoded without
//! checks. A single link is always validated. `use_validator = false`
//! disables validation everywhere.

use crate::handle::FileHandle;
use crate::transform::{EncodeOptions, Task, TaskEncoder, TaskSet, ValidationError};

/// Per-link additions to the shared task set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Variant<'v> {
    pub width: Option<u32>,
    pub format: Option<&'v str>,
}

impl<'v> Variant<'v> {
    pub fn resized(width: u32) -> Self {
        Self {
            width: Some(width),
            format: None,
        }
    }

    pub fn formatted(format: &'v str) -> Self {
        Self {
            width: None,
            format: Some(format),
        }
    }

    pub fn with_format(self, format: Option<&'v str>) -> Self {
        Self { format, ..self }
    }
}

/// Builds the links of one picture.
pub struct LinkBuilder<'a, E: TaskEncoder + ?Sized> {
    encoder: &'a E,
    handle: &'a FileHandle,
    tasks: &'a TaskSet,
    cname: Option<&'a str>,
    use_validator: bool,
}

impl<'a, E: TaskEncoder + ?Sized> LinkBuilder<'a, E> {
    pub fn new(encoder: &'a E, handle: &'a FileHandle, tasks: &'a TaskSet) -> Self {
        Self {
            encoder,
            handle,
            tasks,
            cname: None,
            use_validator: true,
        }
    }

    pub fn cname(mut self, cname: Option<&'a str>) -> Self {
        self.cname = cname;
        self
    }

    pub fn use_validator(mut self, enabled: bool) -> Self {
        self.use_validator = enabled;
        self
    }

    pub fn handle(&self) -> &FileHandle {
        self.handle
    }

    /// A single, validated link.
    pub fn link(&self, variant: Variant<'_>) -> Result<String, ValidationError> {
        self.encode(variant, self.use_validator)
    }

    /// One link per variant, in order. Only the first one is validated.
    pub fn link_set(&self, variants: &[Variant<'_>]) -> Result<Vec<String>, ValidationError> {
        tracing::trace!(links = variants.len(), "composing link set");
        variants
            .iter()
            .enumerate()
            .map(|(i, v)| self.encode(*v, self.use_validator && i == 0))
            .collect()
    }

    fn encode(&self, variant: Variant<'_>, validate: bool) -> Result<String, ValidationError> {
        let mut tasks = self.tasks.clone();
        if let Some(width) = variant.width {
            tasks.set_resize_width(width);
        }
        if let Some(format) = variant.format {
            tasks.set_output_format(format);
        }
        let options = EncodeOptions {
            validate,
            cname: self.cname,
        };
        self.encoder
            .encode(self.handle, &pipeline_order(tasks), &options)
    }
}

/// Tasks in URL order: everything in insertion order, then `output`.
pub fn pipeline_order(tasks: TaskSet) -> Vec<Task> {
    let (output, mut ordered): (Vec<Task>, Vec<Task>) =
        tasks.into_iter().partition(Task::is_output);
    ordered.extend(output);
    ordered
}
