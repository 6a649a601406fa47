//! CLI output formatting.
//!
//! `tree` and `html` print machine-readable output. `inspect` and `check`
//! print a human summary instead, laid out like this:
//!
//! ## Inspect
//!
//! ```text
//! Picture seW1thvcR1aQBfOCF8bX
//! img
//!     src: https://cdn.filestackcontent.com/resize=width:768/seW1thvcR1aQBfOCF8bX
//!     srcset: 1x, 2x
//!     width: 768
//! Sources (4)
//! 001 (min-width: 640px) → 90vw
//!     image/webp: 640w, 1280w
//!     image/jpg: 640w, 1280w
//! 002 fallback → 80vw
//!     image/webp: 640w, 1280w
//!     image/jpg: 640w, 1280w
//! ```
//!
//! ## Check
//!
//! ```text
//! Options
//!     resolutions: 640w, 1280w
//!     sizes: 2 (fallback 80vw)
//!     formats: webp, jpg
//!     transforms: sharpen=amount:3
//!     validator: on
//! ```
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::link::pipeline_order;
use crate::options::PictureOptions;
use crate::sources::source_key;
use crate::transform::Task;
use crate::tree::{PictureTree, SourceAttributes};
use crate::units::chunk;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Descriptors of a `srcset`, in order. A lone link has none and shows as
/// `single link`.
fn descriptors(src_set: &str) -> String {
    let found: Vec<&str> = src_set
        .split(", ")
        .filter_map(|candidate| candidate.rsplit_once(' ').map(|(_, d)| d))
        .collect();
    if found.is_empty() {
        "single link".to_string()
    } else {
        found.join(", ")
    }
}

/// Header of one size group: media query (or `fallback`) and size.
fn group_header(index: usize, source: &SourceAttributes) -> String {
    let media = source.media.as_deref().unwrap_or("fallback");
    match source.sizes.as_deref() {
        Some(size) => format!("{} {} → {}", format_index(index), media, size),
        None => format!("{} {}", format_index(index), media),
    }
}

// ============================================================================
// Inspect
// ============================================================================

/// Human summary of a tree. `formats` is the number of formats each size is
/// rendered in, used to group sources by size.
pub fn format_tree(handle: &str, tree: &PictureTree, formats: usize) -> Vec<String> {
    let mut lines = vec![format!("Picture {}", handle), "img".to_string()];
    let img = &tree.img;
    lines.push(format!("{}src: {}", indent(1), img.src));
    if let Some(src_set) = &img.src_set {
        lines.push(format!("{}srcset: {}", indent(1), descriptors(src_set)));
    }
    if let Some(sizes) = &img.sizes {
        lines.push(format!("{}sizes: {}", indent(1), sizes));
    }
    if let Some(width) = img.width {
        lines.push(format!("{}width: {}", indent(1), width));
    }
    if let Some(alt) = &img.alt {
        lines.push(format!("{}alt: {}", indent(1), alt));
    }

    let sources = tree.sources();
    if sources.is_empty() {
        return lines;
    }
    lines.push(format!("Sources ({})", sources.len()));

    // Format-only sources carry no size, so each stands alone.
    let per_group = if sources.iter().any(|s| s.sizes.is_some()) {
        formats
    } else {
        1
    };
    for (i, group) in chunk(sources, per_group).iter().enumerate() {
        lines.push(group_header(i + 1, &group[0]));
        for source in group {
            let label = source.mime_type.as_deref().unwrap_or("any");
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                label,
                descriptors(&source.src_set)
            ));
            if let Some(key) = &source.key {
                lines.push(format!("{}key: {}", indent(2), key));
            }
        }
    }
    lines
}

pub fn print_tree(handle: &str, tree: &PictureTree, formats: usize) {
    for line in format_tree(handle, tree, formats) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Human summary of resolved options.
pub fn format_options(options: &PictureOptions) -> Vec<String> {
    let mut lines = vec!["Options".to_string()];
    let resolutions: Vec<String> = options
        .resolved_resolutions()
        .iter()
        .map(|r| r.descriptor())
        .collect();
    let origin = if options.resolutions.is_some() {
        ""
    } else {
        " (default)"
    };
    lines.push(format!(
        "{}resolutions: {}{}",
        indent(1),
        resolutions.join(", "),
        origin
    ));
    if let Some(width) = options.display_width() {
        lines.push(format!("{}width: {}", indent(1), width));
    }
    if let Some(sizes) = &options.sizes {
        let detail = match sizes.fallback() {
            Some(fallback) => format!(" (fallback {})", fallback),
            None => String::new(),
        };
        lines.push(format!("{}sizes: {}{}", indent(1), sizes.len(), detail));
    }
    if let Some(formats) = options.format_list() {
        lines.push(format!("{}formats: {}", indent(1), formats.join(", ")));
    }
    let tasks = pipeline_order(options.pipeline_tasks());
    if !tasks.is_empty() {
        let segments: Vec<String> = tasks.iter().map(Task::segment).collect();
        lines.push(format!("{}transforms: {}", indent(1), segments.join("/")));
    }
    if let Some(cname) = &options.cname {
        lines.push(format!("{}cname: {}", indent(1), cname));
    }
    if options.keys {
        // Same shape the sources get, shown once as a hint.
        lines.push(format!(
            "{}keys: {}",
            indent(1),
            source_key("<handle>", None, None, None)
        ));
    }
    let validator = if options.use_validator { "on" } else { "off" };
    lines.push(format!("{}validator: {}", indent(1), validator));
    lines
}

pub fn print_options(options: &PictureOptions) {
    for line in format_options(options) {
        println!("{}", line);
    }
}
