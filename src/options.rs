//! Caller-facing picture options.
//!
//! [`PictureOptions`] is what a caller hands to
//! [`build_picture_tree`](crate::build_picture_tree). It deserializes from a
//! preset file or JSON, and cross-validates `resolutions`, `sizes` and
//! `width` before anything is built:
//!
//! | Combination | Result |
//! |---|---|
//! | width descriptors (`320w`, `320`) without `sizes` | rejected |
//! | densities (`2x`) with `sizes` | rejected |
//! | densities (`2x`) without `width` | rejected |
//!
//! When no `resolutions` are given they default to [`DEFAULT_RESOLUTIONS`],
//! or to `1x, 2x` when a static `width` is set.

use crate::error::{Combination, PictureError, PictureResult};
use crate::handle::Security;
use crate::transform::{Task, TaskSet};
use crate::units::{extract_unit, parse_numeric, present};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Widths used when neither `resolutions` nor `width` are supplied.
pub const DEFAULT_RESOLUTIONS: [u32; 15] = [
    180, 360, 540, 720, 900, 1080, 1296, 1512, 1728, 1944, 2160, 2376, 2592, 2808, 3024,
];

// ============================================================================
// Resolution
// ============================================================================

/// One entry of a `srcset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResolutionRepr", into = "ResolutionRepr")]
pub enum Resolution {
    /// Bare number, a width in pixels. Rendered as `Nw`.
    Pixels(u32),
    /// Width descriptor `Nw`.
    Width(u32),
    /// Pixel-density descriptor `Nx`; fractions such as `1.5x` are allowed.
    Density(f64),
}

impl Resolution {
    /// The descriptor written after the URL in a `srcset`.
    pub fn descriptor(&self) -> String {
        match self {
            Resolution::Pixels(n) | Resolution::Width(n) => format!("{n}w"),
            Resolution::Density(d) => format!("{d}x"),
        }
    }

    pub fn is_width(&self) -> bool {
        !self.is_density()
    }

    pub fn is_density(&self) -> bool {
        matches!(self, Resolution::Density(_))
    }
}

impl FromStr for Resolution {
    type Err = PictureError;

    /// `"320"`, `"320w"`, `"2x"` or `"1.5x"`. Zero, fractional widths and
    /// any other unit are an [`PictureError::InvalidResolution`].
    fn from_str(s: &str) -> PictureResult<Self> {
        let invalid = || PictureError::InvalidResolution(s.to_string());
        let unit = extract_unit(s);
        let number = &s[..s.len() - unit.len()];
        match unit {
            "" | "w" => {
                if !is_digits(number) {
                    return Err(invalid());
                }
                let n: u32 = number.parse().map_err(|_| invalid())?;
                if n == 0 {
                    return Err(invalid());
                }
                Ok(if unit.is_empty() {
                    Resolution::Pixels(n)
                } else {
                    Resolution::Width(n)
                })
            }
            "x" => {
                let decimal = match number.split_once('.') {
                    Some((whole, fraction)) => is_digits(whole) && is_digits(fraction),
                    None => is_digits(number),
                };
                if !decimal {
                    return Err(invalid());
                }
                let d: f64 = number.parse().map_err(|_| invalid())?;
                if !(d.is_finite() && d > 0.0) {
                    return Err(invalid());
                }
                Ok(Resolution::Density(d))
            }
            _ => Err(invalid()),
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Pixels(n) => write!(f, "{n}"),
            other => f.write_str(&other.descriptor()),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ResolutionRepr {
    Number(u32),
    Text(String),
}

impl TryFrom<ResolutionRepr> for Resolution {
    type Error = PictureError;

    fn try_from(repr: ResolutionRepr) -> PictureResult<Self> {
        match repr {
            ResolutionRepr::Number(0) => Err(PictureError::InvalidResolution("0".into())),
            ResolutionRepr::Number(n) => Ok(Resolution::Pixels(n)),
            ResolutionRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Resolution> for ResolutionRepr {
    fn from(r: Resolution) -> Self {
        match r {
            Resolution::Pixels(n) => ResolutionRepr::Number(n),
            other => ResolutionRepr::Text(other.descriptor()),
        }
    }
}

// ============================================================================
// Sizes
// ============================================================================

/// Ordered media-query → size mapping.
///
/// The reserved key [`Sizes::FALLBACK`] holds the size used when no media
/// query matches; it drives the `img` element's own `sizes` and `src`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sizes(Vec<(String, String)>);

impl Sizes {
    pub const FALLBACK: &'static str = "fallback";

    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the size of an existing media query in place, or append.
    pub fn insert(&mut self, media: impl Into<String>, size: impl Into<String>) {
        let media = media.into();
        let size = size.into();
        match self.0.iter_mut().find(|(m, _)| *m == media) {
            Some(entry) => entry.1 = size,
            None => self.0.push((media, size)),
        }
    }

    pub fn with(mut self, media: impl Into<String>, size: impl Into<String>) -> Self {
        self.insert(media, size);
        self
    }

    pub fn get(&self, media: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(m, _)| m == media)
            .map(|(_, s)| s.as_str())
    }

    pub fn fallback(&self) -> Option<&str> {
        self.get(Self::FALLBACK)
    }

    /// Entries in insertion order, fallback included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(m, s)| (m.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<M: Into<String>, S: Into<String>> FromIterator<(M, S)> for Sizes {
    fn from_iter<I: IntoIterator<Item = (M, S)>>(iter: I) -> Self {
        let mut sizes = Sizes::new();
        for (media, size) in iter {
            sizes.insert(media, size);
        }
        sizes
    }
}

impl Serialize for Sizes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (media, size) in &self.0 {
            map.serialize_entry(media, size)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Sizes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SizesVisitor;

        impl<'de> Visitor<'de> for SizesVisitor {
            type Value = Sizes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of media query = size")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Sizes, A::Error> {
                let mut sizes = Sizes::new();
                while let Some((media, size)) = map.next_entry::<String, LengthValue>()? {
                    sizes.insert(media, size.0);
                }
                Ok(sizes)
            }
        }

        deserializer.deserialize_map(SizesVisitor)
    }
}

/// A CSS length given either as a string (`"50vw"`) or a bare pixel number.
struct LengthValue(String);

impl<'de> Deserialize<'de> for LengthValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LengthVisitor;

        impl Visitor<'_> for LengthVisitor {
            type Value = LengthValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a CSS length such as \"50vw\" or a number of pixels")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<LengthValue, E> {
                Ok(LengthValue(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<LengthValue, E> {
                Ok(LengthValue(format!("{v}px")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<LengthValue, E> {
                Ok(LengthValue(format!("{v}px")))
            }
        }

        deserializer.deserialize_any(LengthVisitor)
    }
}

fn length_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Some(LengthValue::deserialize(deserializer)?.0))
}

// ============================================================================
// PictureOptions
// ============================================================================

/// Everything that shapes one `<picture>` tree.
///
/// All fields are optional. Unknown keys are rejected so typos in preset
/// files surface immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PictureOptions {
    /// `alt` text for the `img` element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Output formats, one `<source>` per format (and per size).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolutions: Option<Vec<Resolution>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Sizes>,
    /// Static display width, e.g. `"768px"`. Enables density descriptors.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "length_value"
    )]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,
    /// Custom domain; links go to `cdn.<cname>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cname: Option<String>,
    /// Caller-supplied tasks applied to every link.
    #[serde(skip_serializing_if = "TaskSet::is_empty")]
    pub transforms: TaskSet,
    /// Attach a stable `key` to every source.
    ///
    /// Off by default, so a default tree carries no `key` on its sources.
    /// Older option tables list it as on; the produced trees never did.
    pub keys: bool,
    /// Check task parameters against their constraints.
    #[serde(alias = "useValidator")]
    pub use_validator: bool,
}

impl Default for PictureOptions {
    fn default() -> Self {
        Self {
            alt: None,
            formats: None,
            resolutions: None,
            sizes: None,
            width: None,
            security: None,
            cname: None,
            transforms: TaskSet::new(),
            keys: false,
            use_validator: true,
        }
    }
}

impl PictureOptions {
    /// Check the `resolutions` / `sizes` / `width` combination and the
    /// static width itself.
    pub fn validate(&self) -> PictureResult<()> {
        self.static_width()?;

        let resolutions = match self.resolutions.as_deref() {
            Some(r) if !r.is_empty() => r,
            _ => return Ok(()),
        };
        let has_widths = resolutions.iter().any(Resolution::is_width);
        let has_densities = resolutions.iter().any(Resolution::is_density);

        if has_widths && self.sizes.is_none() {
            return Err(Combination::WidthDescriptorsWithoutSizes.into());
        }
        if has_densities && self.sizes.is_some() {
            return Err(Combination::DensityWithSizes.into());
        }
        if has_densities && self.display_width().is_none() {
            return Err(Combination::DensityWithoutWidth.into());
        }
        Ok(())
    }

    /// The `width` string, if set and non-empty.
    pub fn display_width(&self) -> Option<&str> {
        present(self.width.as_deref())
    }

    /// Numeric part of `width` (`"768px"` → `768`).
    pub fn static_width(&self) -> PictureResult<Option<u32>> {
        self.display_width().map(pixel_width).transpose()
    }

    /// `resolutions`, or the defaults that apply to these options.
    pub fn resolved_resolutions(&self) -> Vec<Resolution> {
        match &self.resolutions {
            Some(r) => r.clone(),
            None if self.display_width().is_some() => {
                vec![Resolution::Density(1.0), Resolution::Density(2.0)]
            }
            None => DEFAULT_RESOLUTIONS.map(Resolution::Pixels).to_vec(),
        }
    }

    /// Caller tasks plus the security credential, if any.
    pub fn pipeline_tasks(&self) -> TaskSet {
        let mut tasks = self.transforms.clone();
        if let Some(security) = &self.security {
            tasks.insert(Task::Security(security.clone().into()));
        }
        tasks
    }

    /// Formats with empty entries removed.
    pub fn format_list(&self) -> Option<Vec<&str>> {
        self.formats
            .as_ref()
            .map(|f| f.iter().filter_map(|s| present(Some(s.as_str()))).collect())
    }
}

/// Leading integer of a CSS length, as a pixel count.
pub(crate) fn pixel_width(value: &str) -> PictureResult<u32> {
    parse_numeric(value)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| PictureError::InvalidWidth(value.to_string()))
}
