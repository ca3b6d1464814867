//! Access to the MediaWiki `mw` global.

use abc_hover::FeatureFlag;
use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

fn mw() -> Option<JsValue> {
    let window = web_sys::window()?;
    let mw = Reflect::get(&window, &"mw".into()).ok()?;
    if mw.is_undefined() || mw.is_null() {
        return None;
    }
    Some(mw)
}

/// Walk `mw.<path...>`, returning `None` at the first missing property.
fn lookup(path: &[&str]) -> Option<JsValue> {
    path.iter().try_fold(mw()?, |value, key| {
        let next = Reflect::get(&value, &(*key).into()).ok()?;
        if next.is_undefined() || next.is_null() {
            None
        } else {
            Some(next)
        }
    })
}

/// Call `mw.<object>.<method>(arg)`.
fn call(object: &[&str], method: &str, arg: &str) -> Option<JsValue> {
    let target = lookup(object)?;
    let function: Function = Reflect::get(&target, &method.into()).ok()?.dyn_into().ok()?;
    function.call1(&target, &arg.into()).ok()
}

/// `mw.util.wikiScript('api')`, the action API endpoint of this wiki.
pub fn api_script() -> Option<String> {
    call(&["util"], "wikiScript", "api")?.as_string()
}

/// The user option enabling hover previews, as stored by the preferences form.
pub struct UserPreference {
    name: String,
}

impl UserPreference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl FeatureFlag for UserPreference {
    fn hover_preview_enabled(&self) -> bool {
        let Some(value) = call(&["user", "options"], "get", &self.name) else {
            return false;
        };
        value.as_string().as_deref() == Some("1")
            || value.as_f64() == Some(1.0)
            || value.as_bool() == Some(true)
    }
}
