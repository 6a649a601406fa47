//! Parameter records for transformation tasks.
//!
//! Every record is a plain struct of optional fields that deserializes from a
//! TOML/JSON table (unknown keys are rejected) and knows two things:
//!
//! - how to list its parameters for the URL, in declaration order
//!   ([`TaskParams::params`]);
//! - which constraints each parameter must satisfy
//!   ([`TaskParams::validate`]).
//!
//! Records shared by two tasks (`pixelate_faces` / `blur_faces`,
//! `partial_pixelate` / `partial_blur`) validate against the task they are
//! attached to.

use super::validate::{Checked, ValidationError, all_in_range, in_range, non_empty, required};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One parameter value as written into a task segment.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    List(Vec<ParamValue>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Float(n) => write!(f, "{n}"),
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Int(n) => serializer.serialize_i64(*n),
            ParamValue::Float(n) => serializer.serialize_f64(*n),
            ParamValue::Text(s) => serializer.serialize_str(s),
            ParamValue::Bool(b) => serializer.serialize_bool(*b),
            ParamValue::List(items) => serializer.collect_seq(items),
        }
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl<T: Into<ParamValue>, const N: usize> From<[T; N]> for ParamValue {
    fn from(v: [T; N]) -> Self {
        ParamValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue> + Clone> From<&[T]> for ParamValue {
    fn from(v: &[T]) -> Self {
        ParamValue::List(v.iter().cloned().map(Into::into).collect())
    }
}

/// Ordered `key:value` pairs of one task.
#[derive(Debug, Default)]
pub(crate) struct ParamList(Vec<(&'static str, ParamValue)>);

impl ParamList {
    fn with<V: Into<ParamValue>>(mut self, key: &'static str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.0.push((key, v.into()));
        }
        self
    }

    fn finish(self) -> Vec<(&'static str, ParamValue)> {
        self.0
    }
}

/// Behaviour shared by every parameter record.
pub trait TaskParams {
    /// Parameters that are set, in declaration order.
    fn params(&self) -> Vec<(&'static str, ParamValue)>;

    /// Check every constraint; `task` is the name the record is attached to.
    fn validate(&self, task: &'static str) -> Checked;
}

// ============================================================================
// Keyword enums
// ============================================================================

macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl From<$name> for ParamValue {
            fn from(v: $name) -> Self {
                ParamValue::Text(v.as_str().to_string())
            }
        }
    };
}

keyword_enum!(
    /// How `resize` fits the image into the requested box.
    Fit { Clip => "clip", Crop => "crop", Scale => "scale", Max => "max" }
);

keyword_enum!(
    /// Anchor for `resize` with `fit = crop`.
    Align {
        Left => "left",
        Right => "right",
        Center => "center",
        Bottom => "bottom",
        Top => "top",
        Faces => "faces",
    }
);

keyword_enum!(BlurMode { Linear => "linear", Gaussian => "gaussian" });

keyword_enum!(Shape { Oval => "oval", Rect => "rect" });

keyword_enum!(Noise { None => "none", Low => "low", Medium => "medium", High => "high" });

keyword_enum!(Style { Artwork => "artwork", Photo => "photo" });

keyword_enum!(Colorspace { Rgb => "RGB", Cmyk => "CMYK", Input => "Input" });

keyword_enum!(CropFacesMode { Thumb => "thumb", Crop => "crop", Fill => "fill" });

keyword_enum!(FacesKeyword { All => "all" });

/// Which detected faces a face task applies to: a 1-based index or `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Faces {
    Index(u32),
    Keyword(FacesKeyword),
}

impl From<Faces> for ParamValue {
    fn from(v: Faces) -> Self {
        match v {
            Faces::Index(n) => n.into(),
            Faces::Keyword(k) => k.into(),
        }
    }
}

fn check_faces(task: &'static str, faces: Option<Faces>) -> Checked {
    match faces {
        Some(Faces::Index(n)) => in_range(task, "faces", Some(n), 1, 10_000),
        _ => Ok(()),
    }
}

// ============================================================================
// Geometry
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: Option<Fit>,
    pub align: Option<Align>,
}

impl TaskParams for ResizeParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("width", self.width)
            .with("height", self.height)
            .with("fit", self.fit)
            .with("align", self.align)
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "width", self.width, 1, 10_000)?;
        in_range(task, "height", self.height, 1, 10_000)
    }
}

/// `dim` is `[x, y, width, height]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropParams {
    pub dim: Option<[u32; 4]>,
}

impl TaskParams for CropParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default().with("dim", self.dim).finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        required(task, "dim", &self.dim)?;
        let [_, _, w, h] = self.dim.unwrap_or_default();
        in_range(task, "dim", Some(w.min(h)), 1, u32::MAX)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotateParams {
    pub deg: Option<u32>,
    pub exif: Option<bool>,
    pub color: Option<String>,
    pub background: Option<String>,
}

impl TaskParams for RotateParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("deg", self.deg)
            .with("exif", self.exif)
            .with("color", self.color.as_deref())
            .with("background", self.background.as_deref())
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        if self.exif != Some(true) {
            required(task, "deg", &self.deg)?;
        }
        in_range(task, "deg", self.deg, 1, 359)
    }
}

// ============================================================================
// Faces
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectFacesParams {
    pub minsize: Option<f64>,
    pub maxsize: Option<f64>,
    pub color: Option<String>,
    pub export: Option<bool>,
}

impl TaskParams for DetectFacesParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("minsize", self.minsize)
            .with("maxsize", self.maxsize)
            .with("color", self.color.as_deref())
            .with("export", self.export)
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "minsize", self.minsize, 0.0, 10_000.0)?;
        in_range(task, "maxsize", self.maxsize, 0.0, 10_000.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropFacesParams {
    pub mode: Option<CropFacesMode>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub faces: Option<Faces>,
    pub buffer: Option<u32>,
}

impl TaskParams for CropFacesParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("mode", self.mode)
            .with("width", self.width)
            .with("height", self.height)
            .with("faces", self.faces)
            .with("buffer", self.buffer)
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "width", self.width, 1, 10_000)?;
        in_range(task, "height", self.height, 1, 10_000)?;
        check_faces(task, self.faces)?;
        in_range(task, "buffer", self.buffer, 0, 1000)
    }
}

/// Shared by `pixelate_faces` and `blur_faces`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaceRegionParams {
    pub faces: Option<Faces>,
    pub minsize: Option<f64>,
    pub maxsize: Option<f64>,
    pub buffer: Option<u32>,
    pub amount: Option<u32>,
    pub blur: Option<f64>,
    #[serde(rename = "type")]
    pub shape: Option<Shape>,
}

impl TaskParams for FaceRegionParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("faces", self.faces)
            .with("minsize", self.minsize)
            .with("maxsize", self.maxsize)
            .with("buffer", self.buffer)
            .with("amount", self.amount)
            .with("blur", self.blur)
            .with("type", self.shape)
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        let (min_amount, max_amount) = match task {
            "pixelate_faces" => (2, 100),
            _ => (0, 20),
        };
        check_faces(task, self.faces)?;
        in_range(task, "minsize", self.minsize, 0.0, 10_000.0)?;
        in_range(task, "maxsize", self.maxsize, 0.0, 10_000.0)?;
        in_range(task, "buffer", self.buffer, 0, 1000)?;
        in_range(task, "amount", self.amount, min_amount, max_amount)?;
        in_range(task, "blur", self.blur, 0.0, 20.0)
    }
}

// ============================================================================
// Borders and frames
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoundedCornersParams {
    pub radius: Option<u32>,
    pub blur: Option<f64>,
    pub background: Option<String>,
}

impl TaskParams for RoundedCornersParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("radius", self.radius)
            .with("blur", self.blur)
            .with("background", self.background.as_deref())
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "radius", self.radius, 1, 10_000)?;
        in_range(task, "blur", self.blur, 0.0, 20.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VignetteParams {
    pub amount: Option<u32>,
    pub blurmode: Option<BlurMode>,
    pub background: Option<String>,
}

impl TaskParams for VignetteParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("amount", self.amount)
            .with("blurmode", self.blurmode)
            .with("background", self.background.as_deref())
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "amount", self.amount, 0, 100)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolaroidParams {
    pub color: Option<String>,
    pub rotate: Option<u32>,
    pub background: Option<String>,
}

impl TaskParams for PolaroidParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("color", self.color.as_deref())
            .with("rotate", self.rotate)
            .with("background", self.background.as_deref())
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "rotate", self.rotate, 0, 359)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TornEdgesParams {
    pub spread: Option<[u32; 2]>,
    pub background: Option<String>,
}

impl TaskParams for TornEdgesParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("spread", self.spread)
            .with("background", self.background.as_deref())
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        all_in_range(task, "spread", self.spread.as_ref().map(|s| &s[..]), 1, 10_000)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShadowParams {
    pub blur: Option<u32>,
    pub opacity: Option<u32>,
    pub vector: Option<[i32; 2]>,
    pub color: Option<String>,
    pub background: Option<String>,
}

impl TaskParams for ShadowParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("blur", self.blur)
            .with("opacity", self.opacity)
            .with("vector", self.vector)
            .with("color", self.color.as_deref())
            .with("background", self.background.as_deref())
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "blur", self.blur, 0, 20)?;
        in_range(task, "opacity", self.opacity, 0, 100)?;
        all_in_range(task, "vector", self.vector.as_ref().map(|v| &v[..]), -1000, 1000)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CircleParams {
    pub background: Option<String>,
}

impl TaskParams for CircleParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("background", self.background.as_deref())
            .finish()
    }

    fn validate(&self, _task: &'static str) -> Checked {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BorderParams {
    pub width: Option<u32>,
    pub color: Option<String>,
    pub background: Option<String>,
}

impl TaskParams for BorderParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("width", self.width)
            .with("color", self.color.as_deref())
            .with("background", self.background.as_deref())
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "width", self.width, 1, 1000)
    }
}

// ============================================================================
// Filters
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SharpenParams {
    pub amount: Option<u32>,
}

impl TaskParams for SharpenParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default().with("amount", self.amount).finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "amount", self.amount, 0, 20)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlurParams {
    pub amount: Option<u32>,
}

impl TaskParams for BlurParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default().with("amount", self.amount).finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "amount", self.amount, 2, 20)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlackWhiteParams {
    pub threshold: Option<u32>,
}

impl TaskParams for BlackWhiteParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default().with("threshold", self.threshold).finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "threshold", self.threshold, 0, 100)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SepiaParams {
    pub tone: Option<u32>,
}

impl TaskParams for SepiaParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default().with("tone", self.tone).finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "tone", self.tone, 0, 100)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PixelateParams {
    pub amount: Option<u32>,
}

impl TaskParams for PixelateParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default().with("amount", self.amount).finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "amount", self.amount, 2, 100)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OilPaintParams {
    pub amount: Option<u32>,
}

impl TaskParams for OilPaintParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default().with("amount", self.amount).finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "amount", self.amount, 2, 10)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModulateParams {
    pub brightness: Option<u32>,
    pub hue: Option<u32>,
    pub saturation: Option<u32>,
}

impl TaskParams for ModulateParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("brightness", self.brightness)
            .with("hue", self.hue)
            .with("saturation", self.saturation)
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "brightness", self.brightness, 0, 10_000)?;
        in_range(task, "hue", self.hue, 0, 359)?;
        in_range(task, "saturation", self.saturation, 0, 10_000)
    }
}

/// Shared by `partial_pixelate` and `partial_blur`. Each object is
/// `[x, y, width, height]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialRegionParams {
    pub amount: Option<u32>,
    pub blur: Option<f64>,
    #[serde(rename = "type")]
    pub shape: Option<Shape>,
    pub objects: Option<Vec<[u32; 4]>>,
}

impl TaskParams for PartialRegionParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("amount", self.amount)
            .with("blur", self.blur)
            .with("type", self.shape)
            .with("objects", self.objects.as_deref())
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        let (min_amount, max_amount) = match task {
            "partial_pixelate" => (2, 100),
            _ => (0, 20),
        };
        in_range(task, "amount", self.amount, min_amount, max_amount)?;
        in_range(task, "blur", self.blur, 0.0, 20.0)?;
        non_empty(task, "objects", self.objects.as_deref())
    }
}

// ============================================================================
// Composition and output
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollageParams {
    pub files: Option<Vec<String>>,
    pub margin: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub color: Option<String>,
    pub fit: Option<Fit>,
}

impl TaskParams for CollageParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("files", self.files.as_deref())
            .with("margin", self.margin)
            .with("width", self.width)
            .with("height", self.height)
            .with("color", self.color.as_deref())
            .with("fit", self.fit)
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        required(task, "files", &self.files)?;
        non_empty(task, "files", self.files.as_deref())?;
        in_range(task, "margin", self.margin, 1, 100)?;
        in_range(task, "width", self.width, 1, 10_000)?;
        in_range(task, "height", self.height, 1, 10_000)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpscaleParams {
    pub upscale: Option<bool>,
    pub noise: Option<Noise>,
    pub style: Option<Style>,
}

impl TaskParams for UpscaleParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("upscale", self.upscale)
            .with("noise", self.noise)
            .with("style", self.style)
            .finish()
    }

    fn validate(&self, _task: &'static str) -> Checked {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AsciiParams {
    pub background: Option<String>,
    pub foreground: Option<String>,
    pub colored: Option<bool>,
    pub size: Option<u32>,
    pub reverse: Option<bool>,
}

impl TaskParams for AsciiParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("background", self.background.as_deref())
            .with("foreground", self.foreground.as_deref())
            .with("colored", self.colored)
            .with("size", self.size)
            .with("reverse", self.reverse)
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "size", self.size, 10, 100)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityParams {
    pub value: Option<u32>,
}

impl TaskParams for QualityParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default().with("value", self.value).finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        required(task, "value", &self.value)?;
        in_range(task, "value", self.value, 1, 100)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityParams {
    pub policy: Option<String>,
    pub signature: Option<String>,
}

impl TaskParams for SecurityParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("policy", self.policy.as_deref())
            .with("signature", self.signature.as_deref())
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        required(task, "policy", &self.policy)
    }
}

impl From<crate::handle::Security> for SecurityParams {
    fn from(s: crate::handle::Security) -> Self {
        Self {
            policy: Some(s.policy),
            signature: Some(s.signature),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputParams {
    pub format: Option<String>,
    pub colorspace: Option<Colorspace>,
    pub strip: Option<bool>,
    pub quality: Option<u32>,
    pub page: Option<u32>,
    pub compress: Option<bool>,
    pub density: Option<u32>,
    pub background: Option<String>,
}

impl TaskParams for OutputParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("format", self.format.as_deref())
            .with("colorspace", self.colorspace)
            .with("strip", self.strip)
            .with("quality", self.quality)
            .with("page", self.page)
            .with("compress", self.compress)
            .with("density", self.density)
            .with("background", self.background.as_deref())
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        required(task, "format", &self.format)?;
        let format = self.format.as_deref().unwrap_or_default();
        if format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::new(
                task,
                "format",
                format!("`{format}` is not a file format"),
            ));
        }
        in_range(task, "quality", self.quality, 1, 100)?;
        in_range(task, "page", self.page, 1, 10_000)?;
        in_range(task, "density", self.density, 1, 500)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheParams {
    pub cache: Option<bool>,
    pub expiry: Option<u32>,
}

impl TaskParams for CacheParams {
    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        ParamList::default()
            .with("cache", self.cache)
            .with("expiry", self.expiry)
            .finish()
    }

    fn validate(&self, task: &'static str) -> Checked {
        in_range(task, "expiry", self.expiry, 1, 31_536_000)
    }
}
