//! Turning a [`PictureTree`] into concrete markup.
//!
//! The engine never depends on a rendering technology. A [`Renderer`] takes
//! a finished tree and produces whatever node type it likes. Two are
//! provided:
//!
//! - [`HtmlRenderer`]: static HTML via [maud](https://maud.lambda.xyz/),
//!   auto-escaped;
//! - [`Hyperscript`]: wraps an `h(tag, attributes, children)` function, for
//!   virtual-DOM style node builders.
//!
//! In both, `<source>` elements come first and `img` last, as browsers
//! require.

use crate::error::PictureResult;
use crate::handle::FileHandle;
use crate::options::PictureOptions;
use crate::tree::{PictureTree, build_picture_tree};
use maud::{Markup, html};
use std::marker::PhantomData;

/// Produces a rendered node from a picture tree.
pub trait Renderer {
    type Output;

    fn render(&self, tree: &PictureTree) -> Self::Output;
}

/// Build the tree for `handle` and render it in one step.
pub fn render_picture<R: Renderer>(
    renderer: &R,
    handle: &FileHandle,
    options: &PictureOptions,
) -> PictureResult<R::Output> {
    let tree = build_picture_tree(handle, options)?;
    Ok(renderer.render(&tree))
}

/// Static HTML `<picture>` element. Source keys are not emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    type Output = Markup;

    fn render(&self, tree: &PictureTree) -> Markup {
        let img = &tree.img;
        html! {
            picture {
                @for source in tree.sources() {
                    source
                        media=[source.media.as_deref()]
                        sizes=[source.sizes.as_deref()]
                        srcset=(source.src_set)
                        type=[source.mime_type.as_deref()];
                }
                img
                    src=(img.src)
                    srcset=[img.src_set.as_deref()]
                    sizes=[img.sizes.as_deref()]
                    width=[img.width]
                    alt=[img.alt.as_deref()];
            }
        }
    }
}

/// Adapter for hyperscript-style node builders.
///
/// `h` receives a tag name, the non-empty attributes in document order, and
/// the already-built children.
pub struct Hyperscript<F, N> {
    h: F,
    node: PhantomData<fn() -> N>,
}

impl<F, N> Hyperscript<F, N>
where
    F: Fn(&str, Vec<(&'static str, String)>, Vec<N>) -> N,
{
    pub fn new(h: F) -> Self {
        Self {
            h,
            node: PhantomData,
        }
    }
}

impl<F, N> Renderer for Hyperscript<F, N>
where
    F: Fn(&str, Vec<(&'static str, String)>, Vec<N>) -> N,
{
    type Output = N;

    fn render(&self, tree: &PictureTree) -> N {
        let mut children: Vec<N> = tree
            .sources()
            .iter()
            .map(|s| (self.h)("source", s.attributes(), Vec::new()))
            .collect();
        children.push((self.h)("img", tree.img.attributes(), Vec::new()));
        (self.h)("picture", Vec::new(), children)
    }
}
