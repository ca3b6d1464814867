//! Stylesheet for the tooltip box and its orientation arrows.

use abc_hover::TooltipStyle;
use wasm_bindgen::JsValue;
use web_sys::Document;

/// Tooltip background; the arrows must match it.
const BACKGROUND: &str = "#fbfce9";

fn base_css() -> String {
    format!(
        ".abc-tooltip {{
    position: absolute;
    background: {bg};
    border: 1px solid #ccc;
    border-radius: 4px;
    box-shadow: 0 2px 5px rgba(0, 0, 0, 0.2);
    font-size: 0.9em;
    padding: 5px;
    z-index: 1000;
}}
.abc-tooltip-header {{
    font-weight: bold;
    margin-bottom: 5px;
}}
",
        bg = BACKGROUND
    )
}

fn arrow_css() -> String {
    format!(
        ".abc-tooltip-below::before {{
    content: \"\";
    position: absolute;
    left: 50%;
    transform: translateX(-50%);
    top: -8px;
    border-left: 8px solid transparent;
    border-right: 8px solid transparent;
    border-bottom: 8px solid {bg};
}}
.abc-tooltip-above::before {{
    content: \"\";
    position: absolute;
    left: 50%;
    transform: translateX(-50%);
    bottom: -8px;
    border-left: 8px solid transparent;
    border-right: 8px solid transparent;
    border-top: 8px solid {bg};
}}
",
        bg = BACKGROUND
    )
}

/// Append the tooltip stylesheet to `<head>`.
pub fn inject(document: &Document, style: TooltipStyle) -> Result<(), JsValue> {
    let mut css = base_css();
    if style == TooltipStyle::Arrow {
        css.push_str(&arrow_css());
    }

    let element = document.create_element("style")?;
    element.set_text_content(Some(&css));
    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("document has no <head>"))?;
    head.append_child(&element)?;
    Ok(())
}
