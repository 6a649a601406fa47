//! Primitive helpers shared by every composer.
//!
//! All functions here are pure and testable without a CDN or a renderer.
//!
//! | Helper | Used for |
//! |---|---|
//! | [`parse_numeric`] | leading integer of `"768px"`, `"320w"`, `"2x"` |
//! | [`extract_unit`] | trailing unit of a descriptor (`"w"`, `"x"`, `"vw"`) |
//! | [`present`] / [`strip_empty`] | sparse-attribute rule: falsy values are dropped |
//! | [`cartesian_product`] | size × format expansion of `<source>` entries |
//! | [`chunk`] | regrouping a flat source list back into per-size rows |

/// Parse the leading integer of a value, discarding any trailing unit.
///
/// Mirrors integer parsing of CSS-ish lengths: leading whitespace is skipped,
/// an optional sign is accepted, and parsing stops at the first non-digit.
/// Returns `None` when there are no leading digits (`"test"`, `"px"`, `""`).
///
/// ```
/// # use adaptive_picture::units::parse_numeric;
/// assert_eq!(parse_numeric("768px"), Some(768));
/// assert_eq!(parse_numeric("2x"), Some(2));
/// assert_eq!(parse_numeric("vw"), None);
/// ```
pub fn parse_numeric(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let number: i64 = digits[..end].parse().ok()?;
    Some(if negative { -number } else { number })
}

/// Return the trailing non-digit part of a descriptor.
///
/// `"2x"` → `"x"`, `"320w"` → `"w"`, `"50vw"` → `"vw"`. A value without any
/// unit (`"320"`) yields an empty string.
pub fn extract_unit(value: &str) -> &str {
    let start = value
        .rfind(|c: char| c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    &value[start..]
}

// ============================================================================
// Sparse attributes
// ============================================================================

/// Truthiness as used by the sparse-attribute rule.
///
/// `0`, `""`, `false`, `null` and absent values are all falsy. Note that a
/// literal `width: 0` is therefore dropped from any produced record.
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for &str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for u32 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for i64 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::is_truthy)
    }
}

impl Truthy for serde_json::Value {
    fn is_truthy(&self) -> bool {
        use serde_json::Value;
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_truthy(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

/// Keep a value only if it is truthy.
pub fn present<T: Truthy>(value: Option<T>) -> Option<T> {
    value.filter(Truthy::is_truthy)
}

/// Return a new record containing only the entries whose value is truthy.
///
/// Entry order is preserved.
pub fn strip_empty<K, V, I>(record: I) -> Vec<(K, V)>
where
    I: IntoIterator<Item = (K, V)>,
    V: Truthy,
{
    record.into_iter().filter(|(_, v)| v.is_truthy()).collect()
}

// ============================================================================
// List combinators
// ============================================================================

/// N-ary Cartesian product.
///
/// The first list is the outer loop (varies slowest), the last list the
/// innermost. An empty input yields a single empty row; any empty list
/// yields no rows.
///
/// ```
/// # use adaptive_picture::units::cartesian_product;
/// let rows = cartesian_product(&[vec!["webp", "png"], vec!["200w", "600w"]]);
/// assert_eq!(rows[1], vec!["webp", "600w"]);
/// ```
pub fn cartesian_product<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    lists.iter().fold(vec![Vec::new()], |rows, list| {
        rows.iter()
            .flat_map(|row| {
                list.iter().map(move |item| {
                    let mut next = row.clone();
                    next.push(item.clone());
                    next
                })
            })
            .collect()
    })
}

/// Split a flat sequence into consecutive groups of `size` (last may be shorter).
///
/// A `size` of zero is treated as one.
pub fn chunk<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    items.chunks(size.max(1)).map(<[T]>::to_vec).collect()
}
