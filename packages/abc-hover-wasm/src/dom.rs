//! DOM-backed tooltips, rendered with abcjs.

use abc_hover::{
    CleanedBlock, HoverError, Orientation, Placement, PreviewConfig, Size, TooltipStyle,
    TooltipView, Viewport,
};
use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

use crate::fetch::describe;

/// A tooltip element and the container abcjs draws into.
#[derive(Debug, Clone)]
pub struct DomTooltip {
    id: u32,
    root: HtmlElement,
    score: HtmlElement,
}

impl DomTooltip {
    pub fn root(&self) -> &HtmlElement {
        &self.root
    }
}

impl PartialEq for DomTooltip {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

pub struct DomView {
    document: Document,
    style: TooltipStyle,
    scale: f64,
    next_id: u32,
}

impl DomView {
    pub fn new(document: Document, config: &PreviewConfig) -> Self {
        Self {
            document,
            style: config.style,
            scale: config.scale,
            next_id: 0,
        }
    }

    fn div(&self, class: &str) -> Result<HtmlElement, HoverError> {
        let element = self
            .document
            .create_element("div")
            .map_err(|e| HoverError::RenderFailure(describe(&e)))?;
        element.set_class_name(class);
        element
            .dyn_into::<HtmlElement>()
            .map_err(|_| HoverError::RenderFailure("div is not an HtmlElement".to_string()))
    }
}

/// `window.ABCJS.renderAbc`, with `ABCJS` as its receiver.
fn abcjs_renderer() -> Option<(JsValue, Function)> {
    let window = web_sys::window()?;
    let abcjs = Reflect::get(&window, &"ABCJS".into()).ok()?;
    if abcjs.is_undefined() || abcjs.is_null() {
        return None;
    }
    let render = Reflect::get(&abcjs, &"renderAbc".into()).ok()?;
    let render = render.dyn_into::<Function>().ok()?;
    Some((abcjs, render))
}

impl TooltipView for DomView {
    type Handle = DomTooltip;

    fn create(&mut self, header: &str) -> Result<DomTooltip, HoverError> {
        let root = self.div("abc-tooltip")?;
        let title = self.div("abc-tooltip-header")?;
        let score = self.div("abc-tooltip-music")?;
        title.set_text_content(Some(header));

        let append = |child: &HtmlElement| {
            root.append_child(child)
                .map(|_| ())
                .map_err(|e| HoverError::RenderFailure(describe(&e)))
        };
        append(&title)?;
        append(&score)?;

        let css = root.style();
        let _ = css.set_property("display", "none");
        let _ = css.set_property("transform", &format!("scale({})", self.scale));

        let body = self
            .document
            .body()
            .ok_or_else(|| HoverError::RenderFailure("document has no <body>".to_string()))?;
        body.append_child(&root)
            .map_err(|e| HoverError::RenderFailure(describe(&e)))?;

        self.next_id += 1;
        Ok(DomTooltip {
            id: self.next_id,
            root,
            score,
        })
    }

    fn render_score(
        &mut self,
        tooltip: &DomTooltip,
        notation: &CleanedBlock,
    ) -> Result<(), HoverError> {
        let (abcjs, render) = abcjs_renderer().ok_or(HoverError::RendererUnavailable)?;
        render
            .call2(&abcjs, &tooltip.score, &JsValue::from_str(notation.as_str()))
            .map(|_| ())
            .map_err(|e| HoverError::RenderFailure(describe(&e)))
    }

    fn show_message(&mut self, tooltip: &DomTooltip, message: &str) {
        tooltip.root.set_text_content(Some(message));
    }

    fn measure(&self, tooltip: &DomTooltip) -> Size {
        // Layout needs the element displayed; it stays invisible until placed.
        let css = tooltip.root.style();
        let _ = css.set_property("visibility", "hidden");
        let _ = css.set_property("display", "block");
        Size::new(
            f64::from(tooltip.root.offset_width()),
            f64::from(tooltip.root.offset_height()),
        )
    }

    fn viewport(&self) -> Viewport {
        let (width, height) = self
            .document
            .document_element()
            .map(|root| (f64::from(root.client_width()), f64::from(root.client_height())))
            .unwrap_or_default();
        let (scroll_left, scroll_top) = web_sys::window()
            .map(|window| {
                (
                    window.scroll_x().unwrap_or_default(),
                    window.scroll_y().unwrap_or_default(),
                )
            })
            .unwrap_or_default();
        Viewport::new(width, height).scrolled(scroll_left, scroll_top)
    }

    fn apply(&mut self, tooltip: &DomTooltip, placement: &Placement) {
        let css = tooltip.root.style();
        let _ = css.set_property("left", &format!("{}px", placement.left));
        let _ = css.set_property("top", &format!("{}px", placement.top));
        let _ = css.set_property("transform-origin", placement.orientation.transform_origin());

        if self.style == TooltipStyle::Arrow {
            let classes = tooltip.root.class_list();
            let other = match placement.orientation {
                Orientation::Below => Orientation::Above,
                Orientation::Above => Orientation::Below,
            };
            let _ = classes.remove_1(other.css_class());
            let _ = classes.add_1(placement.orientation.css_class());
        }

        let _ = css.set_property("display", "block");
        let _ = css.remove_property("visibility");
    }

    fn remove(&mut self, tooltip: &DomTooltip) {
        tooltip.root.remove();
    }
}
