//! # Adaptive Picture
//!
//! Responsive `<picture>` markup computed from a single CDN file handle.
//! Given a handle and a few options, the crate works out every `srcset`,
//! `sizes`, `media` and `type` attribute of a `<picture>` element and its
//! `img` fallback. Each candidate is a CDN link that resizes or converts the
//! original file on the fly, so nothing is ever processed locally.
//!
//! ```
//! use adaptive_picture::{FileHandle, PictureOptions, Sizes, build_picture_tree};
//!
//! let options = PictureOptions {
//!     sizes: Some(Sizes::new().with("(min-width: 640px)", "50vw").with("fallback", "100vw")),
//!     formats: Some(vec!["webp".into()]),
//!     ..Default::default()
//! };
//! let tree = build_picture_tree(&FileHandle::new("seW1thvcR1aQBfOCF8bX")?, &options)?;
//!
//! assert_eq!(tree.img.sizes.as_deref(), Some("100vw"));
//! assert_eq!(tree.sources().len(), 2);
//! # Ok::<(), adaptive_picture::PictureError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! options ──validate──▶ resolutions, task set
//!                          │
//!          LinkBuilder ◀───┘  (handle + tasks + encoder)
//!           │        │
//!     srcset::compose   sources::compose
//!           │        │
//!           └──▶ tree::build_picture_tree ──▶ PictureTree ──▶ Renderer
//! ```
//!
//! Building a tree is a pure, synchronous computation. The only seam is the
//! [`TaskEncoder`](transform::TaskEncoder) that turns tasks into URLs, which
//! tests replace with a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`tree`] | Entry point: assembles the `img` attributes and the `<source>` list |
//! | [`options`] | `PictureOptions`, resolution descriptors, ordered sizes, cross-validation |
//! | [`handle`] | Plain handles and storage aliases; signed-URL credentials |
//! | [`transform`] | CDN task catalogue, parameter constraints, URL encoding |
//! | [`link`] | Per-variant links: resize and format tasks injected, `output` last |
//! | [`srcset`] | `srcset` strings from widths or pixel densities |
//! | [`sources`] | `<source>` lists: per size, per format, or sizes × formats |
//! | [`render`] | `Renderer` trait, HTML (Maud) and hyperscript renderers |
//! | [`config`] | Layered `adaptive.toml` presets |
//! | [`batch`] | Parallel building of many pictures |
//! | [`output`] | CLI output formatting |
//! | [`units`] | CSS length parsing, presence checks, list helpers |
//! | [`error`] | `PictureError` |
//!
//! # Design Decisions
//!
//! ## Typed Tasks Over Option Bags
//!
//! Every CDN operation is a variant of [`Task`](transform::Task) carrying a
//! parameter struct. Ranges and enums are checked before a URL is produced,
//! and unknown task names or parameters fail at deserialization.
//!
//! ## Validate Once Per Set
//!
//! A `srcset` differs only in the injected width, so only its first link is
//! validated. That keeps large resolution lists cheap while still rejecting
//! bad caller tasks.
//!
//! ## Output Last
//!
//! The CDN applies tasks in URL order and `output` must come after every
//! other task. Links are therefore always encoded with `output` moved to
//! the end, wherever it was inserted.

pub mod batch;
pub mod config;
pub mod error;
pub mod handle;
pub mod link;
pub mod options;
pub mod output;
pub mod render;
pub mod sources;
pub mod srcset;
pub mod transform;
pub mod tree;
pub mod units;

pub use error::{Combination, PictureError, PictureResult};
pub use handle::{FileHandle, Security};
pub use options::{PictureOptions, Resolution, Sizes};
pub use render::{HtmlRenderer, Hyperscript, Renderer};
pub use tree::{
    ImgAttributes, PictureTree, SourceAttributes, build_picture_tree, build_picture_tree_with,
};

#[cfg(test)]
pub(crate) mod test_helpers;
