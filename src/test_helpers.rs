//! Shared test utilities for the adaptive-picture test suite.
//!
//! Provides the fixture handle, URL builders for expected links, and a
//! recording encoder.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let encoder = MockEncoder::new();
//! let tree = build_picture_tree_with(&encoder, &handle(), &options).unwrap();
//!
//! assert_eq!(tree.img.src, url("resize=width:768"));
//! assert_eq!(encoder.validate_flags(), vec![true, true, false]);
//! ```

use std::sync::Mutex;

use crate::handle::FileHandle;
use crate::transform::{CdnEncoder, EncodeOptions, Task, TaskEncoder, ValidationError};

// =========================================================================
// Fixtures
// =========================================================================

pub const HANDLE: &str = "seW1thvcR1aQBfOCF8bX";
pub const API_KEY: &str = "BBcu94EFL1STGYvkM6a8usz";
pub const BASE_URL: &str = "https://cdn.filestackcontent.com";

pub fn handle() -> FileHandle {
    FileHandle::new(HANDLE).unwrap()
}

/// Expected link for the fixture handle; `tasks` is the `/`-joined task path.
pub fn url(tasks: &str) -> String {
    if tasks.is_empty() {
        format!("{BASE_URL}/{HANDLE}")
    } else {
        format!("{BASE_URL}/{tasks}/{HANDLE}")
    }
}

/// `"<url> <descriptor>"` pairs joined the way a srcset joins them.
pub fn src_set(entries: &[(&str, &str)]) -> String {
    entries
        .iter()
        .map(|(tasks, descriptor)| format!("{} {descriptor}", url(tasks)))
        .collect::<Vec<_>>()
        .join(", ")
}

// =========================================================================
// Recording encoder
// =========================================================================

/// One recorded call to [`TaskEncoder::encode`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEncode {
    pub tasks: Vec<String>,
    pub validate: bool,
}

/// Encoder that records every call and delegates to [`CdnEncoder`].
/// Uses Mutex (not RefCell) so it is Sync.
#[derive(Default)]
pub struct MockEncoder {
    inner: CdnEncoder,
    calls: Mutex<Vec<RecordedEncode>>,
}

impl MockEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedEncode> {
        self.calls.lock().unwrap().clone()
    }

    pub fn validate_flags(&self) -> Vec<bool> {
        self.calls().iter().map(|c| c.validate).collect()
    }
}

impl TaskEncoder for MockEncoder {
    fn encode(
        &self,
        handle: &FileHandle,
        tasks: &[Task],
        options: &EncodeOptions<'_>,
    ) -> Result<String, ValidationError> {
        self.calls.lock().unwrap().push(RecordedEncode {
            tasks: tasks.iter().map(Task::segment).collect(),
            validate: options.validate,
        });
        self.inner.encode(handle, tasks, options)
    }
}

#[test]
fn mock_records_segments_and_flags() {
    let encoder = MockEncoder::new();
    let link = encoder
        .encode(
            &handle(),
            &[Task::Flip],
            &EncodeOptions {
                validate: true,
                cname: None,
            },
        )
        .unwrap();
    assert_eq!(link, url("flip"));
    assert_eq!(
        encoder.calls(),
        vec![RecordedEncode {
            tasks: vec!["flip".into()],
            validate: true,
        }]
    );
}
