//! `<source>` list composition.
//!
//! Three shapes, depending on which options are present:
//!
//! | `sizes` | `formats` | Sources |
//! |---|---|---|
//! | – | ✓ | one per format, single format-converted link each |
//! | ✓ | – | one per size |
//! | ✓ | ✓ | sizes × formats, size-major |
//!
//! The `fallback` size never gets a `media` attribute, and without a format
//! it produces no source at all: the `img` element covers that case.

use crate::error::PictureResult;
use crate::link::LinkBuilder;
use crate::options::{Resolution, Sizes};
use crate::srcset::compose_src_set;
use crate::transform::TaskEncoder;
use crate::tree::SourceAttributes;
use crate::units::{cartesian_product, present};

/// The subset of picture options that shapes the sources.
#[derive(Debug, Clone, Copy)]
pub struct SourcesRequest<'r> {
    pub sizes: Option<&'r Sizes>,
    pub formats: Option<&'r [&'r str]>,
    pub resolutions: &'r [Resolution],
    pub keys: bool,
}

/// Build the ordered `<source>` list. Entries with nothing to show are
/// dropped, so the list may be empty.
pub fn compose_sources<E: TaskEncoder + ?Sized>(
    links: &LinkBuilder<'_, E>,
    request: &SourcesRequest<'_>,
) -> PictureResult<Vec<SourceAttributes>> {
    let cells: Vec<(Option<&str>, Option<&str>, Option<&str>)> =
        match (request.sizes, request.formats) {
            (None, Some(formats)) => formats.iter().map(|f| (None, None, Some(*f))).collect(),
            (Some(sizes), Some(formats)) => {
                let entries: Vec<(&str, &str)> = sizes.iter().collect();
                let rows = cartesian_product(&[
                    (0..entries.len()).collect::<Vec<usize>>(),
                    (0..formats.len()).collect(),
                ]);
                rows.iter()
                    .map(|row| {
                        let (media, size) = entries[row[0]];
                        (Some(media), Some(size), Some(formats[row[1]]))
                    })
                    .collect()
            }
            (Some(sizes), None) => sizes
                .iter()
                .map(|(media, size)| (Some(media), Some(size), None))
                .collect(),
            (None, None) => Vec::new(),
        };

    let mut sources = Vec::with_capacity(cells.len());
    for (media, size, format) in cells {
        if let Some(source) = compose_source(links, request, media, size, format)? {
            sources.push(source);
        }
    }
    tracing::trace!(sources = sources.len(), "composed sources");
    Ok(sources)
}

fn compose_source<E: TaskEncoder + ?Sized>(
    links: &LinkBuilder<'_, E>,
    request: &SourcesRequest<'_>,
    media: Option<&str>,
    size: Option<&str>,
    format: Option<&str>,
) -> PictureResult<Option<SourceAttributes>> {
    let is_fallback = media == Some(Sizes::FALLBACK);
    let format = present(format);
    if is_fallback && format.is_none() {
        return Ok(None);
    }

    let src_set = compose_src_set(links, request.resolutions, size, format)?;
    if src_set.is_empty() {
        return Ok(None);
    }

    let key = request
        .keys
        .then(|| source_key(links.handle().handle(), media, size, format));
    Ok(Some(SourceAttributes {
        media: present(media.filter(|_| !is_fallback)).map(str::to_string),
        sizes: present(size).map(str::to_string),
        src_set,
        mime_type: format.map(|f| format!("image/{f}")),
        key,
    }))
}

/// Stable identity of a source: `<handle>-<media>-<size>-<format>`, with
/// `fallback` / `auto` standing in for missing parts.
pub fn source_key(
    handle: &str,
    media: Option<&str>,
    size: Option<&str>,
    format: Option<&str>,
) -> String {
    format!(
        "{handle}-{}-{}-{}",
        present(media).unwrap_or(Sizes::FALLBACK),
        present(size).unwrap_or("auto"),
        present(format).unwrap_or("auto"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{HANDLE, handle, src_set, url};
    use crate::transform::{CdnEncoder, TaskSet};

    fn compose(request: &SourcesRequest<'_>) -> Vec<SourceAttributes> {
        let h = handle();
        let tasks = TaskSet::new();
        let encoder = CdnEncoder::default();
        let links = LinkBuilder::new(&encoder, &h, &tasks);
        compose_sources(&links, request).unwrap()
    }

    const WIDTHS: &[Resolution] = &[Resolution::Pixels(320), Resolution::Pixels(640)];

    // =========================================================================
    // Formats only
    // =========================================================================

    #[test]
    fn one_source_per_format() {
        let formats = ["webp", "jpg"];
        let sources = compose(&SourcesRequest {
            sizes: None,
            formats: Some(&formats),
            resolutions: WIDTHS,
            keys: false,
        });
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].src_set, url("output=format:webp"));
        assert_eq!(sources[0].mime_type.as_deref(), Some("image/webp"));
        assert_eq!(sources[0].media, None);
        assert_eq!(sources[0].sizes, None);
        assert_eq!(sources[1].mime_type.as_deref(), Some("image/jpg"));
    }

    // =========================================================================
    // Sizes
    // =========================================================================

    #[test]
    fn one_source_per_size() {
        let sizes = Sizes::new().with("(min-width: 640px)", "50vw");
        let sources = compose(&SourcesRequest {
            sizes: Some(&sizes),
            formats: None,
            resolutions: WIDTHS,
            keys: false,
        });
        assert_eq!(
            sources,
            vec![SourceAttributes {
                media: Some("(min-width: 640px)".into()),
                sizes: Some("50vw".into()),
                src_set: src_set(&[("resize=width:320", "320w"), ("resize=width:640", "640w")]),
                mime_type: None,
                key: None,
            }]
        );
    }

    #[test]
    fn fallback_without_format_is_dropped() {
        let sizes = Sizes::new()
            .with("(min-width: 1080px)", "100vw")
            .with("fallback", "300px");
        let sources = compose(&SourcesRequest {
            sizes: Some(&sizes),
            formats: None,
            resolutions: WIDTHS,
            keys: false,
        });
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].media.as_deref(), Some("(min-width: 1080px)"));
    }

    #[test]
    fn sizes_times_formats_is_size_major() {
        let sizes = Sizes::new()
            .with("(min-width: 640px)", "90vw")
            .with("fallback", "80vw");
        let formats = ["webp", "jpg"];
        let sources = compose(&SourcesRequest {
            sizes: Some(&sizes),
            formats: Some(&formats),
            resolutions: &[Resolution::Pixels(640)],
            keys: false,
        });
        let shape: Vec<_> = sources
            .iter()
            .map(|s| (s.media.as_deref(), s.sizes.as_deref(), s.mime_type.as_deref()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (Some("(min-width: 640px)"), Some("90vw"), Some("image/webp")),
                (Some("(min-width: 640px)"), Some("90vw"), Some("image/jpg")),
                (None, Some("80vw"), Some("image/webp")),
                (None, Some("80vw"), Some("image/jpg")),
            ]
        );
        assert_eq!(
            sources[3].src_set,
            src_set(&[("resize=width:640/output=format:jpg", "640w")])
        );
    }

    #[test]
    fn empty_formats_with_sizes_give_nothing() {
        let sizes = Sizes::new().with("(min-width: 640px)", "50vw");
        let sources = compose(&SourcesRequest {
            sizes: Some(&sizes),
            formats: Some(&[]),
            resolutions: WIDTHS,
            keys: false,
        });
        assert!(sources.is_empty());
    }

    #[test]
    fn sizes_without_resolutions_give_nothing() {
        let sizes = Sizes::new().with("(min-width: 640px)", "50vw");
        let sources = compose(&SourcesRequest {
            sizes: Some(&sizes),
            formats: None,
            resolutions: &[],
            keys: false,
        });
        assert!(sources.is_empty());
    }

    // =========================================================================
    // Keys
    // =========================================================================

    #[test]
    fn keys_name_every_part() {
        let sizes = Sizes::new()
            .with("(min-width: 640px)", "50vw")
            .with("fallback", "100vw");
        let formats = ["webp"];
        let sources = compose(&SourcesRequest {
            sizes: Some(&sizes),
            formats: Some(&formats),
            resolutions: WIDTHS,
            keys: true,
        });
        let keys: Vec<_> = sources.iter().map(|s| s.key.clone().unwrap()).collect();
        assert_eq!(
            keys,
            vec![
                format!("{HANDLE}-(min-width: 640px)-50vw-webp"),
                format!("{HANDLE}-fallback-100vw-webp"),
            ]
        );
    }

    #[test]
    fn format_only_key_uses_placeholders() {
        assert_eq!(source_key("H", None, None, Some("png")), "H-fallback-auto-png");
        assert_eq!(source_key("H", Some("m"), Some(""), None), "H-m-auto-auto");
    }
}
