//! Picture-tree assembly.
//!
//! [`build_picture_tree`] is the entry point of the crate: a handle and a
//! set of [`PictureOptions`] in, a [`PictureTree`] out. The tree holds the
//! attributes of one `img` element and, optionally, of the `<source>`
//! elements that precede it:
//!
//! ```text
//! PictureTree
//! ├── img      { src, srcSet?, sizes?, width?, alt? }
//! └── sources? [ { media?, sizes?, srcSet, type?, key? }, ... ]
//! ```
//!
//! Every attribute that would be empty is left out, and `sources` is either
//! absent or non-empty. The call is pure: no state survives it, and equal
//! inputs give equal trees.
//!
//! Assembly order:
//!
//! 1. check the handle;
//! 2. cross-validate `resolutions` / `sizes` / `width`;
//! 3. fill in default resolutions;
//! 4. fold the security credential into the task set;
//! 5. build `img`;
//! 6. build `sources` when `sizes` or `formats` are set.

use crate::error::PictureResult;
use crate::handle::FileHandle;
use crate::link::{LinkBuilder, Variant};
use crate::options::{PictureOptions, Resolution, Sizes, pixel_width};
use crate::sources::{SourcesRequest, compose_sources};
use crate::srcset::compose_src_set;
use crate::transform::{CdnEncoder, TaskEncoder};
use crate::units::{extract_unit, present, strip_empty};
use serde::{Deserialize, Serialize};

/// Attributes of the `img` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImgAttributes {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl ImgAttributes {
    /// HTML attribute pairs, empty ones left out.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        strip_empty([
            ("src", self.src.clone()),
            ("srcset", self.src_set.clone().unwrap_or_default()),
            ("sizes", self.sizes.clone().unwrap_or_default()),
            ("width", self.width.map(|w| w.to_string()).unwrap_or_default()),
            ("alt", self.alt.clone().unwrap_or_default()),
        ])
    }
}

/// Attributes of one `<source>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    pub src_set: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl SourceAttributes {
    /// HTML attribute pairs, empty ones left out. `key` is included; it is
    /// up to the renderer whether to emit it.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        strip_empty([
            ("media", self.media.clone().unwrap_or_default()),
            ("sizes", self.sizes.clone().unwrap_or_default()),
            ("srcset", self.src_set.clone()),
            ("type", self.mime_type.clone().unwrap_or_default()),
            ("key", self.key.clone().unwrap_or_default()),
        ])
    }
}

/// The computed `<picture>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PictureTree {
    pub img: ImgAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceAttributes>>,
}

impl PictureTree {
    /// Sources as a slice; empty when there are none.
    pub fn sources(&self) -> &[SourceAttributes] {
        self.sources.as_deref().unwrap_or_default()
    }
}

/// Build the picture tree for `handle` with the production CDN encoder.
pub fn build_picture_tree(
    handle: &FileHandle,
    options: &PictureOptions,
) -> PictureResult<PictureTree> {
    build_picture_tree_with(&CdnEncoder::default(), handle, options)
}

/// [`build_picture_tree`] with a caller-supplied encoder.
#[tracing::instrument(level = "debug", skip_all, fields(handle = handle.handle()))]
pub fn build_picture_tree_with<E: TaskEncoder + ?Sized>(
    encoder: &E,
    handle: &FileHandle,
    options: &PictureOptions,
) -> PictureResult<PictureTree> {
    handle.ensure_well_formed()?;
    options.validate()?;

    let resolutions = options.resolved_resolutions();
    let tasks = options.pipeline_tasks();
    let links = LinkBuilder::new(encoder, handle, &tasks)
        .cname(present(options.cname.as_deref()))
        .use_validator(options.use_validator);

    let img = compose_img(&links, options, &resolutions)?;

    let formats = options.format_list();
    let sources = if options.sizes.is_some() || formats.is_some() {
        let request = SourcesRequest {
            sizes: options.sizes.as_ref(),
            formats: formats.as_deref(),
            resolutions: &resolutions,
            keys: options.keys,
        };
        Some(compose_sources(&links, &request)?).filter(|s| !s.is_empty())
    } else {
        None
    };

    tracing::debug!(
        resolutions = resolutions.len(),
        sources = sources.as_ref().map_or(0, Vec::len),
        "picture tree assembled"
    );
    Ok(PictureTree { img, sources })
}

fn compose_img<E: TaskEncoder + ?Sized>(
    links: &LinkBuilder<'_, E>,
    options: &PictureOptions,
    resolutions: &[Resolution],
) -> PictureResult<ImgAttributes> {
    let alt = present(options.alt.clone());

    if let Some(width) = options.display_width() {
        let src = sized_link(links, width)?;
        let src_set = compose_src_set(links, resolutions, Some(width), None)?;
        return Ok(ImgAttributes {
            src,
            src_set: present(Some(src_set)),
            sizes: None,
            width: present(options.static_width()?),
            alt,
        });
    }

    let fallback = present(options.sizes.as_ref().and_then(Sizes::fallback));
    let src = match fallback {
        Some(fallback) => sized_link(links, fallback)?,
        None => links.link(Variant::default())?,
    };
    let src_set = match options.sizes {
        Some(_) => present(Some(compose_src_set(links, resolutions, fallback, None)?)),
        None => None,
    };
    Ok(ImgAttributes {
        src,
        src_set,
        sizes: fallback.map(str::to_string),
        width: None,
        alt,
    })
}

/// Link resized to a pixel length; relative lengths (`vw`, `em`, ...) give
/// the unresized link.
fn sized_link<E: TaskEncoder + ?Sized>(
    links: &LinkBuilder<'_, E>,
    length: &str,
) -> PictureResult<String> {
    let variant = match extract_unit(length) {
        "px" | "" => Variant::resized(pixel_width(length)?),
        _ => Variant::default(),
    };
    Ok(links.link(variant)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Combination, PictureError};
    use crate::handle::Security;
    use crate::test_helpers::{API_KEY, HANDLE, MockEncoder, handle, src_set, url};
    use serde_json::{Value, json};

    fn options(value: Value) -> PictureOptions {
        serde_json::from_value(value).unwrap()
    }

    fn tree_json(value: Value) -> Value {
        let tree = build_picture_tree(&handle(), &options(value)).unwrap();
        serde_json::to_value(tree).unwrap()
    }

    fn widths_320_640(prefix: &str) -> String {
        let narrow = format!("{prefix}resize=width:320");
        let wide = format!("{prefix}resize=width:640");
        src_set(&[(narrow.as_str(), "320w"), (wide.as_str(), "640w")])
    }

    // =========================================================================
    // Rejected input
    // =========================================================================

    #[test]
    fn width_descriptors_without_sizes_are_rejected() {
        for resolutions in [json!([320, 420]), json!(["320w", "420w"])] {
            let err = build_picture_tree(&handle(), &options(json!({"resolutions": resolutions})))
                .unwrap_err();
            assert_eq!(
                err,
                PictureError::InvalidOptionCombination(Combination::WidthDescriptorsWithoutSizes)
            );
        }
    }

    #[test]
    fn sizes_with_densities_are_rejected() {
        let opts = options(json!({
            "sizes": {"(min-width: 1080px)": "100vw", "fallback": "90vw"},
            "resolutions": ["1x", "2x"],
        }));
        assert!(matches!(
            build_picture_tree(&handle(), &opts),
            Err(PictureError::InvalidOptionCombination(_))
        ));
    }

    #[test]
    fn densities_without_width_are_rejected() {
        let opts = options(json!({"resolutions": ["1x", "2x"]}));
        assert_eq!(
            build_picture_tree(&handle(), &opts).unwrap_err(),
            PictureError::InvalidOptionCombination(Combination::DensityWithoutWidth)
        );
    }

    #[test]
    fn malformed_handle_is_rejected() {
        let h = FileHandle::Plain(String::new());
        assert!(matches!(
            build_picture_tree(&h, &PictureOptions::default()),
            Err(PictureError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn invalid_transform_is_rejected() {
        let opts = options(json!({"transforms": {"blur": {"amount": 100}}}));
        assert!(matches!(
            build_picture_tree(&handle(), &opts),
            Err(PictureError::Validation(_))
        ));
    }

    // =========================================================================
    // img only
    // =========================================================================

    #[test]
    fn no_options_gives_plain_img() {
        assert_eq!(tree_json(json!({})), json!({"img": {"src": url("")}}));
    }

    #[test]
    fn security_without_resolutions() {
        let tree = tree_json(json!({
            "resolutions": [],
            "security": {"policy": "abc", "signature": "xyz"},
        }));
        assert_eq!(
            tree,
            json!({"img": {"src": url("security=policy:abc,signature:xyz")}})
        );
    }

    #[test]
    fn static_width_uses_densities() {
        let tree = tree_json(json!({"width": "768px"}));
        assert_eq!(
            tree,
            json!({"img": {
                "src": url("resize=width:768"),
                "srcSet": src_set(&[("resize=width:768", "1x"), ("resize=width:1536", "2x")]),
                "width": 768,
            }})
        );
    }

    #[test]
    fn fallback_size_without_resolutions() {
        let tree = tree_json(json!({"sizes": {"fallback": "100vw"}, "resolutions": []}));
        assert_eq!(tree, json!({"img": {"src": url(""), "sizes": "100vw"}}));
    }

    #[test]
    fn fallback_size_with_resolutions() {
        let tree = tree_json(json!({"sizes": {"fallback": "100vw"}, "resolutions": [320, 640]}));
        assert_eq!(
            tree,
            json!({"img": {"src": url(""), "srcSet": widths_320_640(""), "sizes": "100vw"}})
        );
    }

    #[test]
    fn alt_is_passed_through() {
        let tree = tree_json(json!({"alt": "A lake at dawn"}));
        assert_eq!(tree["img"]["alt"], "A lake at dawn");
        let tree = tree_json(json!({"alt": ""}));
        assert!(tree["img"].get("alt").is_none());
    }

    // =========================================================================
    // Sources
    // =========================================================================

    #[test]
    fn one_source() {
        let tree = tree_json(json!({
            "sizes": {"(min-width: 640px)": "50vw"},
            "resolutions": [320, 640],
        }));
        assert_eq!(
            tree,
            json!({
                "img": {"src": url(""), "srcSet": widths_320_640("")},
                "sources": [{
                    "media": "(min-width: 640px)",
                    "sizes": "50vw",
                    "srcSet": widths_320_640(""),
                }],
            })
        );
    }

    #[test]
    fn one_source_with_pixel_fallback() {
        let tree = tree_json(json!({
            "sizes": {"(min-width: 640px)": "50vw", "fallback": "300px"},
            "resolutions": [320, 640],
        }));
        assert_eq!(
            tree["img"],
            json!({
                "src": url("resize=width:300"),
                "srcSet": widths_320_640(""),
                "sizes": "300px",
            })
        );
        assert_eq!(tree["sources"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn one_source_with_security() {
        let prefix = "security=policy:abc,signature:xyz/";
        let tree = tree_json(json!({
            "sizes": {"(min-width: 640px)": "50vw"},
            "resolutions": [320, 640],
            "security": {"policy": "abc", "signature": "xyz"},
        }));
        assert_eq!(
            tree,
            json!({
                "img": {
                    "src": url("security=policy:abc,signature:xyz"),
                    "srcSet": widths_320_640(prefix),
                },
                "sources": [{
                    "media": "(min-width: 640px)",
                    "sizes": "50vw",
                    "srcSet": widths_320_640(prefix),
                }],
            })
        );
    }

    #[test]
    fn one_source_one_format() {
        let tree = tree_json(json!({
            "sizes": {"(min-width: 640px)": "50vw"},
            "resolutions": [320, 640],
            "formats": ["webp"],
        }));
        let webp = src_set(&[
            ("resize=width:320/output=format:webp", "320w"),
            ("resize=width:640/output=format:webp", "640w"),
        ]);
        assert_eq!(
            tree,
            json!({
                "img": {"src": url(""), "srcSet": widths_320_640("")},
                "sources": [{
                    "media": "(min-width: 640px)",
                    "sizes": "50vw",
                    "srcSet": webp,
                    "type": "image/webp",
                }],
            })
        );
    }

    #[test]
    fn one_format() {
        let tree = tree_json(json!({"formats": ["webp"]}));
        assert_eq!(
            tree,
            json!({
                "img": {"src": url("")},
                "sources": [{"srcSet": url("output=format:webp"), "type": "image/webp"}],
            })
        );
    }

    #[test]
    fn one_format_with_pixel_fallback() {
        let tree = tree_json(json!({
            "formats": ["webp"],
            "resolutions": [640],
            "sizes": {"fallback": "700px"},
        }));
        assert_eq!(
            tree,
            json!({
                "img": {
                    "src": url("resize=width:700"),
                    "srcSet": src_set(&[("resize=width:640", "640w")]),
                    "sizes": "700px",
                },
                "sources": [{
                    "sizes": "700px",
                    "srcSet": src_set(&[("resize=width:640/output=format:webp", "640w")]),
                    "type": "image/webp",
                }],
            })
        );
    }

    #[test]
    fn two_sizes_two_formats_in_order() {
        let tree = tree_json(json!({
            "sizes": {"(min-width: 640px)": "50vw", "(min-width: 340px)": "33vw"},
            "formats": ["jpg", "webp"],
            "resolutions": ["320w", "640w"],
        }));
        let sources = tree["sources"].as_array().unwrap();
        let shape: Vec<_> = sources
            .iter()
            .map(|s| (s["media"].as_str().unwrap(), s["type"].as_str().unwrap()))
            .collect();
        assert_eq!(
            shape,
            vec![
                ("(min-width: 640px)", "image/jpg"),
                ("(min-width: 640px)", "image/webp"),
                ("(min-width: 340px)", "image/jpg"),
                ("(min-width: 340px)", "image/webp"),
            ]
        );
        assert_eq!(
            sources[3]["srcSet"],
            src_set(&[
                ("resize=width:320/output=format:webp", "320w"),
                ("resize=width:640/output=format:webp", "640w"),
            ])
        );
    }

    #[test]
    fn keys_are_attached_when_enabled() {
        let tree = tree_json(json!({"formats": ["webp"], "keys": true}));
        assert_eq!(
            tree["sources"][0]["key"],
            format!("{HANDLE}-fallback-auto-webp")
        );
    }

    #[test]
    fn empty_expansion_omits_sources() {
        let tree = tree_json(json!({"sizes": {"fallback": "100vw"}}));
        assert!(tree.get("sources").is_none());
        let tree = tree_json(json!({"formats": []}));
        assert!(tree.get("sources").is_none());
    }

    // =========================================================================
    // Transforms, aliases and hosts
    // =========================================================================

    #[test]
    fn storage_alias_with_transforms() {
        let alias = FileHandle::storage_alias(HANDLE, API_KEY).unwrap();
        let opts = options(json!({"width": "768px", "transforms": {"quality": {"value": 5}}}));
        let tree = build_picture_tree(&alias, &opts).unwrap();
        let base = format!("https://cdn.filestackcontent.com/{API_KEY}/quality=value:5");
        assert_eq!(tree.img.src, format!("{base}/resize=width:768/{HANDLE}"));
        let expected =
            format!("{base}/resize=width:768/{HANDLE} 1x, {base}/resize=width:1536/{HANDLE} 2x");
        assert_eq!(tree.img.src_set.as_deref(), Some(expected.as_str()));
        assert_eq!(tree.img.width, Some(768));
    }

    #[test]
    fn crop_and_partial_pixelate_on_img() {
        let tree = tree_json(json!({
            "width": "768px",
            "transforms": {
                "crop": {"dim": [1, 2, 3, 4]},
                "partial_pixelate": {"objects": [[92, 53, 214, 207]]},
            },
        }));
        let tasks = "crop=dim:[1,2,3,4]/partial_pixelate=objects:[[92,53,214,207]]";
        let narrow = format!("{tasks}/resize=width:768");
        let wide = format!("{tasks}/resize=width:1536");
        assert_eq!(
            tree,
            json!({"img": {
                "src": url(&narrow),
                "srcSet": src_set(&[(narrow.as_str(), "1x"), (wide.as_str(), "2x")]),
                "width": 768,
            }})
        );
    }

    #[test]
    fn static_width_overwrites_caller_resize() {
        let tree = tree_json(json!({
            "width": "768px",
            "transforms": {
                "blur_faces": {"minsize": 0.1},
                "crop": {"dim": [1, 2, 3, 4]},
                "flip": true,
                "resize": {"width": 100},
            },
        }));
        let tasks = "blur_faces=minsize:0.1/crop=dim:[1,2,3,4]/flip";
        let narrow = format!("{tasks}/resize=width:768");
        let wide = format!("{tasks}/resize=width:1536");
        assert_eq!(
            tree,
            json!({"img": {
                "src": url(&narrow),
                "srcSet": src_set(&[(narrow.as_str(), "1x"), (wide.as_str(), "2x")]),
                "width": 768,
            }})
        );
    }

    #[test]
    fn fractional_density_on_static_width() {
        let tree = tree_json(json!({"width": "768px", "resolutions": ["1x", "1.5x", "2x"]}));
        assert_eq!(
            tree["img"]["srcSet"],
            src_set(&[
                ("resize=width:768", "1x"),
                ("resize=width:1152", "1.5x"),
                ("resize=width:1536", "2x"),
            ])
        );
    }

    #[test]
    fn validator_can_be_disabled() {
        let opts = options(json!({
            "transforms": {"blur": {"amount": 100}},
            "useValidator": false,
        }));
        let tree = build_picture_tree(&handle(), &opts).unwrap();
        assert_eq!(tree.img.src, url("blur=amount:100"));
    }

    #[test]
    fn output_task_goes_last() {
        let tree = tree_json(json!({"transforms": {
            "quality": {"value": 5},
            "output": {"format": "webp"},
            "sepia": {"tone": 70},
        }}));
        assert_eq!(
            tree,
            json!({"img": {"src": url("quality=value:5/sepia=tone:70/output=format:webp")}})
        );
    }

    #[test]
    fn custom_cname() {
        let tree = tree_json(json!({"cname": "fs.test123.com", "width": "768px"}));
        let host = "https://cdn.fs.test123.com";
        assert_eq!(tree["img"]["src"], format!("{host}/resize=width:768/{HANDLE}"));
        assert_eq!(
            tree["img"]["srcSet"],
            format!("{host}/resize=width:768/{HANDLE} 1x, {host}/resize=width:1536/{HANDLE} 2x")
        );
    }

    #[test]
    fn caller_options_are_not_mutated() {
        let opts = PictureOptions {
            security: Some(Security {
                policy: "abc".into(),
                signature: "xyz".into(),
            }),
            width: Some("768px".into()),
            ..Default::default()
        };
        let before = opts.clone();
        build_picture_tree(&handle(), &opts).unwrap();
        assert_eq!(opts, before);
        assert!(opts.transforms.is_empty());
    }

    // =========================================================================
    // Encoder interaction
    // =========================================================================

    #[test]
    fn static_width_validates_src_and_first_density() {
        let encoder = MockEncoder::new();
        let opts = options(json!({"width": "768px"}));
        build_picture_tree_with(&encoder, &handle(), &opts).unwrap();
        assert_eq!(encoder.validate_flags(), vec![true, true, false]);
        let calls = encoder.calls();
        assert_eq!(calls[2].tasks, vec!["resize=width:1536".to_string()]);
    }

    #[test]
    fn relative_width_keeps_src_unresized() {
        let tree = tree_json(json!({"width": "50vw", "resolutions": ["1x"]}));
        assert_eq!(tree["img"]["src"], url(""));
        assert_eq!(tree["img"]["width"], 50);
    }

    #[test]
    fn html_attribute_names() {
        let tree = build_picture_tree(&handle(), &options(json!({"width": "768px"}))).unwrap();
        let names: Vec<_> = tree.img.attributes().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["src", "srcset", "width"]);
    }
}
