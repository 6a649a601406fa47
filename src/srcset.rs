//! `srcset` composition.
//!
//! One link per resolution, each paired with its descriptor:
//!
//! ```text
//! <url resized to 320> 320w, <url resized to 640> 640w
//! ```
//!
//! Widths are taken as-is (`320`, `"320w"`), densities multiply the display
//! width (`"2x"` with `"768px"` → 1536). Order always follows the resolution
//! list.

use crate::error::{Combination, PictureError, PictureResult};
use crate::link::{LinkBuilder, Variant};
use crate::options::{Resolution, pixel_width};
use crate::transform::TaskEncoder;
use crate::units::present;

/// Pixel width a resolution resolves to, given the display width context.
///
/// A density multiplies the leading number of `display` whatever its unit,
/// and the product is rounded to the nearest pixel. Inside a `<source>` the
/// display is the source's size, so with a static `width`, `sizes` and the
/// default `1x, 2x`, a `"50vw"` size resolves to 50 and 100, and a size with
/// no leading number (`calc(...)`) is an `InvalidWidth`.
pub fn effective_width(resolution: &Resolution, display: Option<&str>) -> PictureResult<u32> {
    match resolution {
        Resolution::Pixels(n) | Resolution::Width(n) => Ok(*n),
        Resolution::Density(d) => {
            let display = present(display).ok_or(Combination::DensityWithoutWidth)?;
            let width = (f64::from(pixel_width(display)?) * d).round();
            if width > f64::from(u32::MAX) {
                return Err(PictureError::InvalidWidth(display.to_string()));
            }
            Ok(width as u32)
        }
    }
}

/// Build a `srcset` string.
///
/// `display` is the display width context: the static `width` for the
/// `img`, or the size of a `<source>`. Without one, a `format` yields a
/// single format-converted link with no descriptor.
pub fn compose_src_set<E: TaskEncoder + ?Sized>(
    links: &LinkBuilder<'_, E>,
    resolutions: &[Resolution],
    display: Option<&str>,
    format: Option<&str>,
) -> PictureResult<String> {
    let display = present(display);
    if let (None, Some(format)) = (display, format) {
        return Ok(links.link(Variant::formatted(format))?);
    }

    let variants = resolutions
        .iter()
        .map(|r| Ok(Variant::resized(effective_width(r, display)?).with_format(format)))
        .collect::<PictureResult<Vec<_>>>()?;
    let urls = links.link_set(&variants)?;

    let pairs: Vec<String> = urls
        .iter()
        .zip(resolutions)
        .map(|(url, r)| format!("{url} {}", r.descriptor()))
        .collect();
    Ok(pairs.join(", "))
}
