//! The closed catalogue of CDN tasks and the ordered task set.
//!
//! In a preset file or JSON options a task set is a table keyed by task name:
//!
//! ```toml
//! [transforms]
//! flip = true
//! detect_faces = true
//! blur = { amount = 5 }
//! ```
//!
//! Flags take a boolean. Parameterised tasks take either a table of
//! parameters or `true` (the task with no parameters). `false` leaves the
//! task out.

use super::params::*;
use super::validate::Checked;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::mem::discriminant;

macro_rules! task_catalogue {
    (
        flags { $($flag:ident => $flag_name:literal),* $(,)? }
        params { $($variant:ident($record:ty) => $name:literal),* $(,)? }
    ) => {
        /// One image operation in the CDN pipeline.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Task {
            $($flag,)*
            $($variant($record),)*
        }

        /// Every task name, in catalogue order.
        pub const TASK_NAMES: &[&str] = &[$($flag_name,)* $($name,)*];

        impl Task {
            /// The task's name in the URL.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Task::$flag => $flag_name,)*
                    $(Task::$variant(_) => $name,)*
                }
            }

            /// Parameter record, `None` for flags.
            pub fn params(&self) -> Option<&dyn TaskParams> {
                match self {
                    $(Task::$flag => None,)*
                    $(Task::$variant(p) => Some(p as &dyn TaskParams),)*
                }
            }

            fn next_from_map<'de, A: MapAccess<'de>>(
                name: &str,
                map: &mut A,
            ) -> Result<Option<Task>, A::Error> {
                match name {
                    $($flag_name => Ok(map.next_value::<bool>()?.then_some(Task::$flag)),)*
                    $($name => Ok(map.next_value::<Toggle<$record>>()?.0.map(Task::$variant)),)*
                    other => Err(de::Error::unknown_field(other, TASK_NAMES)),
                }
            }
        }
    };
}

task_catalogue! {
    flags {
        Flip => "flip",
        Flop => "flop",
        Monochrome => "monochrome",
        Enhance => "enhance",
        Redeye => "redeye",
        Negative => "negative",
    }
    params {
        Resize(ResizeParams) => "resize",
        Crop(CropParams) => "crop",
        Rotate(RotateParams) => "rotate",
        DetectFaces(DetectFacesParams) => "detect_faces",
        CropFaces(CropFacesParams) => "crop_faces",
        PixelateFaces(FaceRegionParams) => "pixelate_faces",
        BlurFaces(FaceRegionParams) => "blur_faces",
        RoundedCorners(RoundedCornersParams) => "rounded_corners",
        Vignette(VignetteParams) => "vignette",
        Polaroid(PolaroidParams) => "polaroid",
        TornEdges(TornEdgesParams) => "torn_edges",
        Shadow(ShadowParams) => "shadow",
        Circle(CircleParams) => "circle",
        Border(BorderParams) => "border",
        Sharpen(SharpenParams) => "sharpen",
        Blur(BlurParams) => "blur",
        BlackWhite(BlackWhiteParams) => "blackwhite",
        Sepia(SepiaParams) => "sepia",
        Pixelate(PixelateParams) => "pixelate",
        OilPaint(OilPaintParams) => "oil_paint",
        Modulate(ModulateParams) => "modulate",
        PartialPixelate(PartialRegionParams) => "partial_pixelate",
        PartialBlur(PartialRegionParams) => "partial_blur",
        Collage(CollageParams) => "collage",
        Upscale(UpscaleParams) => "upscale",
        Ascii(AsciiParams) => "ascii",
        Quality(QualityParams) => "quality",
        Security(SecurityParams) => "security",
        Output(OutputParams) => "output",
        Cache(CacheParams) => "cache",
    }
}

impl Task {
    /// URL path segment: `name` or `name=key:value,key:value`.
    pub fn segment(&self) -> String {
        let params = self.params().map(|p| p.params()).unwrap_or_default();
        if params.is_empty() {
            return self.name().to_string();
        }
        let pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}:{v}")).collect();
        format!("{}={}", self.name(), pairs.join(","))
    }

    pub fn validate(&self) -> Checked {
        match self.params() {
            Some(p) => p.validate(self.name()),
            None => Ok(()),
        }
    }

    /// Format conversion must be the final pipeline step.
    pub fn is_output(&self) -> bool {
        matches!(self, Task::Output(_))
    }

    fn same_kind(&self, other: &Task) -> bool {
        discriminant(self) == discriminant(other)
    }
}

/// Task value in a table: `false`, `true` or a parameter table.
struct Toggle<T>(Option<T>);

impl<'de, T> Deserialize<'de> for Toggle<T>
where
    T: Deserialize<'de> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ToggleVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for ToggleVisitor<T>
        where
            T: Deserialize<'de> + Default,
        {
            type Value = Toggle<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("`true`, `false` or a table of task parameters")
            }

            fn visit_bool<E: de::Error>(self, on: bool) -> Result<Self::Value, E> {
                Ok(Toggle(on.then(T::default)))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                T::deserialize(de::value::MapAccessDeserializer::new(map)).map(|t| Toggle(Some(t)))
            }
        }

        deserializer.deserialize_any(ToggleVisitor(PhantomData))
    }
}

// ============================================================================
// TaskSet
// ============================================================================

/// Ordered set of tasks, at most one per kind.
///
/// Insertion order is preserved; it is the order tasks appear in a URL,
/// except that `output` always goes last (see
/// [`pipeline_order`](crate::link::pipeline_order)).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskSet(Vec<Task>);

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the task of the same kind in place, or append.
    /// Returns the replaced task.
    pub fn insert(&mut self, task: Task) -> Option<Task> {
        match self.0.iter_mut().find(|t| t.same_kind(&task)) {
            Some(slot) => Some(std::mem::replace(slot, task)),
            None => {
                self.0.push(task);
                None
            }
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, task: Task) -> Self {
        self.insert(task);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.0.iter().find(|t| t.name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inject a resize width. An existing `resize` keeps its other
    /// parameters and its position.
    pub fn set_resize_width(&mut self, width: u32) {
        for task in &mut self.0 {
            if let Task::Resize(p) = task {
                p.width = Some(width);
                return;
            }
        }
        self.0.push(Task::Resize(ResizeParams {
            width: Some(width),
            ..Default::default()
        }));
    }

    /// Inject an output format. An existing `output` keeps its other
    /// parameters.
    pub fn set_output_format(&mut self, format: &str) {
        for task in &mut self.0 {
            if let Task::Output(p) = task {
                p.format = Some(format.to_string());
                return;
            }
        }
        self.0.push(Task::Output(OutputParams {
            format: Some(format.to_string()),
            ..Default::default()
        }));
    }
}

impl IntoIterator for TaskSet {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TaskSet {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Task> for TaskSet {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        let mut set = TaskSet::new();
        for task in iter {
            set.insert(task);
        }
        set
    }
}

struct ParamTable<'a>(&'a [(&'static str, ParamValue)]);

impl Serialize for ParamTable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

impl Serialize for TaskSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for task in &self.0 {
            match task.params() {
                None => map.serialize_entry(task.name(), &true)?,
                Some(p) => {
                    let params = p.params();
                    if params.is_empty() {
                        map.serialize_entry(task.name(), &true)?;
                    } else {
                        map.serialize_entry(task.name(), &ParamTable(&params))?;
                    }
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TaskSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TaskSetVisitor;

        impl<'de> Visitor<'de> for TaskSetVisitor {
            type Value = TaskSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of transformation tasks")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TaskSet, A::Error> {
                let mut set = TaskSet::new();
                while let Some(name) = map.next_key::<String>()? {
                    if let Some(task) = Task::next_from_map(&name, &mut map)? {
                        set.insert(task);
                    }
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(TaskSetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blur(amount: u32) -> Task {
        Task::Blur(BlurParams {
            amount: Some(amount),
        })
    }

    // =========================================================================
    // Segments
    // =========================================================================

    #[test]
    fn flag_segment_is_bare_name() {
        assert_eq!(Task::Flip.segment(), "flip");
    }

    #[test]
    fn task_without_params_is_bare_name() {
        assert_eq!(Task::DetectFaces(Default::default()).segment(), "detect_faces");
    }

    #[test]
    fn param_segment() {
        let resize = Task::Resize(ResizeParams {
            width: Some(320),
            ..Default::default()
        });
        assert_eq!(resize.segment(), "resize=width:320");
    }

    #[test]
    fn security_segment() {
        let sec = Task::Security(SecurityParams {
            policy: Some("abc".into()),
            signature: Some("xyz".into()),
        });
        assert_eq!(sec.segment(), "security=policy:abc,signature:xyz");
    }

    #[test]
    fn partial_pixelate_nested_objects() {
        let task = Task::PartialPixelate(PartialRegionParams {
            amount: Some(10),
            blur: Some(0.1),
            shape: Some(Shape::Oval),
            objects: Some(vec![[92, 53, 214, 207]]),
        });
        assert_eq!(
            task.segment(),
            "partial_pixelate=amount:10,blur:0.1,type:oval,objects:[[92,53,214,207]]"
        );
    }

    #[test]
    fn crop_dim_array() {
        let task = Task::Crop(CropParams {
            dim: Some([1, 2, 3, 4]),
        });
        assert_eq!(task.segment(), "crop=dim:[1,2,3,4]");
    }

    // =========================================================================
    // TaskSet
    // =========================================================================

    #[test]
    fn insert_replaces_in_place() {
        let mut set = TaskSet::new().with(Task::Flip).with(blur(5)).with(Task::Flop);
        let old = set.insert(blur(8));
        assert_eq!(old, Some(blur(5)));
        let names: Vec<_> = set.iter().map(Task::name).collect();
        assert_eq!(names, ["flip", "blur", "flop"]);
        assert_eq!(set.get("blur"), Some(&blur(8)));
    }

    #[test]
    fn resize_width_merges_into_existing_resize() {
        let mut set = TaskSet::new()
            .with(Task::Resize(ResizeParams {
                width: Some(100),
                fit: Some(Fit::Crop),
                ..Default::default()
            }))
            .with(Task::Flip);
        set.set_resize_width(640);
        let first = set.iter().next().unwrap();
        assert_eq!(first.segment(), "resize=width:640,fit:crop");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn output_format_merges_into_existing_output() {
        let mut set = TaskSet::new().with(Task::Output(OutputParams {
            format: Some("png".into()),
            quality: Some(80),
            ..Default::default()
        }));
        set.set_output_format("webp");
        assert_eq!(
            set.get("output").unwrap().segment(),
            "output=format:webp,quality:80"
        );
    }

    #[test]
    fn validate_reports_first_failure() {
        let set = TaskSet::new().with(blur(100)).with(Task::Rotate(RotateParams {
            deg: Some(400),
            ..Default::default()
        }));
        let err = set.iter().try_for_each(Task::validate).unwrap_err();
        assert_eq!(err.task, "blur");
    }

    // =========================================================================
    // Serde
    // =========================================================================

    #[test]
    fn deserialize_keeps_document_order() {
        let set: TaskSet = serde_json::from_value(json!({
            "detect_faces": true,
            "flip": true,
            "blur": {"amount": 5},
            "flop": false,
        }))
        .unwrap();
        let segments: Vec<_> = set.iter().map(Task::segment).collect();
        assert_eq!(segments, ["detect_faces", "flip", "blur=amount:5"]);
    }

    #[test]
    fn deserialize_from_toml_table() {
        let set: TaskSet = toml::from_str(
            r#"
            rotate = { deg = 90 }
            monochrome = true
            "#,
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().next().unwrap().segment(), "rotate=deg:90");
    }

    #[test]
    fn unknown_task_is_rejected() {
        let result: Result<TaskSet, _> = serde_json::from_value(json!({"sparkle": true}));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("sparkle"));
    }

    #[test]
    fn flag_rejects_table() {
        let result: Result<TaskSet, _> = serde_json::from_value(json!({"flip": {"x": 1}}));
        assert!(result.is_err());
    }

    #[test]
    fn serialize_compact_table() {
        let set = TaskSet::new().with(Task::Flip).with(blur(5));
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({"flip": true, "blur": {"amount": 5}})
        );
    }

    #[test]
    fn catalogue_names_are_unique() {
        let mut names = TASK_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TASK_NAMES.len());
    }
}
