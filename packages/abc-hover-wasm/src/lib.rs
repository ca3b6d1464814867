//! Browser entry point: attaches hover previews to the article links of a MediaWiki page.
//!
//! Load the module after abcjs, then call `init()` (optionally with a config object using
//! the same kebab-case keys as the YAML config, e.g. `{"hover-delay-ms": 500}`).

mod dom;
mod fetch;
mod logging;
mod mw;
mod style;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use abc_hover::{
    ContentSource, FetchCompleted, HoverError, HoverIn, LinkId, LinkScanner, Point, PreviewConfig,
    RawConfig, ShowTicket, TimerFired, TooltipController,
};
use tracing::{debug, info, trace, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, MouseEvent};

use crate::dom::{DomTooltip, DomView};
use crate::fetch::{describe, ApiContentSource};
use crate::mw::UserPreference;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logging::init();
}

/// Extract and clean the notation block of an article's wikitext.
#[wasm_bindgen]
pub fn extract_preview(content: &str) -> Result<String, JsValue> {
    abc_hover::preview(content)
        .map(|cleaned| cleaned.into_string())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Attach previews once the document is ready.
#[wasm_bindgen]
pub fn init(options: JsValue) -> Result<(), JsValue> {
    let mut raw: RawConfig = if options.is_undefined() || options.is_null() {
        RawConfig::default()
    } else {
        serde_wasm_bindgen::from_value(options)?
    };
    if raw.api_path.is_none() {
        raw.api_path = mw::api_script();
    }
    let config = PreviewConfig::from_raw(raw).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() == "loading" {
        let ready = Closure::once_into_js(move || {
            if let Err(e) = run(config) {
                warn!(error = %describe(&e), "hover previews not attached");
            }
        });
        document.add_event_listener_with_callback("DOMContentLoaded", ready.unchecked_ref())?;
        Ok(())
    } else {
        run(config)
    }
}

fn run(config: PreviewConfig) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let flag = UserPreference::new(config.preference.clone());
    let mut controller = TooltipController::new(&config, DomView::new(document.clone(), &config));

    let anchors = || match document.query_selector_all("a") {
        Ok(anchors) => (0..anchors.length())
            .filter_map(|i| anchors.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect::<Vec<Element>>(),
        Err(e) => {
            warn!(error = %describe(&e), "could not query links");
            Vec::new()
        }
    };
    let links = LinkScanner::new(config.article_path.clone()).attach(
        &flag,
        anchors,
        |element| element.get_attribute("href"),
        &mut controller,
    );
    if links.is_empty() {
        return Ok(());
    }

    style::inject(&document, config.style)?;

    let shell = Rc::new(Shell {
        controller: RefCell::new(controller),
        source: ApiContentSource::new(config.api_path.clone()),
        timer: Cell::new(None),
        tooltip_leave: RefCell::new(None),
    });
    for (id, element) in &links {
        shell.bind_link(*id, element)?;
    }
    info!(count = links.len(), "hover previews attached");
    Ok(())
}

/// No tooltip is the normal outcome for most links; a failed render is not.
fn log_dismissal(reason: &HoverError) {
    if reason.is_silent() {
        debug!(reason = %reason, "preview dismissed");
    } else {
        warn!(reason = %reason, "preview dismissed");
    }
}

type MouseListener = Closure<dyn FnMut(MouseEvent)>;

/// Timers, fetches and DOM listeners around the controller.
struct Shell {
    controller: RefCell<TooltipController<DomView>>,
    source: ApiContentSource,
    /// The running delay timer and the show it belongs to.
    timer: Cell<Option<(ShowTicket, i32)>>,
    /// Mouseleave listener of the shown tooltip. Replaced on the next show.
    tooltip_leave: RefCell<Option<MouseListener>>,
}

impl Shell {
    fn bind_link(self: &Rc<Self>, id: LinkId, element: &Element) -> Result<(), JsValue> {
        let shell = Rc::clone(self);
        let enter = MouseListener::new(move |event: MouseEvent| shell.on_hover_in(id, &event));
        element.add_event_listener_with_callback("mouseenter", enter.as_ref().unchecked_ref())?;
        enter.forget();

        let shell = Rc::clone(self);
        let leave = MouseListener::new(move |_event: MouseEvent| shell.on_hover_out(id));
        element.add_event_listener_with_callback("mouseleave", leave.as_ref().unchecked_ref())?;
        leave.forget();
        Ok(())
    }

    fn on_hover_in(self: &Rc<Self>, link: LinkId, event: &MouseEvent) {
        let anchor = Point::new(f64::from(event.page_x()), f64::from(event.page_y()));
        let outcome = self.controller.borrow_mut().hover_in(link, anchor);
        if let HoverIn::Schedule {
            ticket,
            delay,
            replaced,
        } = outcome
        {
            if let Some(replaced) = replaced {
                self.clear_timer(replaced);
            }
            self.schedule(ticket, delay);
        }
    }

    fn on_hover_out(&self, link: LinkId) {
        let out = self.controller.borrow_mut().hover_out(link);
        if let Some(cancelled) = out.cancelled {
            self.clear_timer(cancelled);
        }
    }

    fn schedule(self: &Rc<Self>, ticket: ShowTicket, delay: Duration) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let shell = Rc::clone(self);
        let callback = Closure::once_into_js(move || shell.on_timer(ticket));
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            Ok(handle) => self.timer.set(Some((ticket, handle))),
            Err(e) => warn!(error = %describe(&e), "could not schedule preview"),
        }
    }

    fn clear_timer(&self, ticket: ShowTicket) {
        match self.timer.get() {
            Some((running, handle)) if running == ticket => {
                if let Some(window) = web_sys::window() {
                    window.clear_timeout_with_handle(handle);
                }
                self.timer.set(None);
            }
            _ => {}
        }
    }

    fn on_timer(self: &Rc<Self>, ticket: ShowTicket) {
        if matches!(self.timer.get(), Some((running, _)) if running == ticket) {
            self.timer.set(None);
        }

        let fired = self.controller.borrow_mut().timer_fired(ticket);
        match fired {
            TimerFired::Fetch(request) => {
                let shell = Rc::clone(self);
                spawn_local(async move {
                    let content = shell.source.fetch_content(&request.title).await;
                    let completed = shell
                        .controller
                        .borrow_mut()
                        .fetch_completed(request.ticket, content.as_deref());
                    match completed {
                        FetchCompleted::Shown => shell.bind_tooltip_leave(),
                        FetchCompleted::Dismissed(reason) => log_dismissal(&reason),
                    }
                });
            }
            TimerFired::Shown => self.bind_tooltip_leave(),
            TimerFired::Dismissed(reason) => log_dismissal(&reason),
        }
    }

    fn bind_tooltip_leave(self: &Rc<Self>) {
        let Some(tooltip) = self.controller.borrow().active_tooltip().cloned() else {
            return;
        };

        let shell: Weak<Self> = Rc::downgrade(self);
        let handle = tooltip.clone();
        let listener = MouseListener::new(move |_event: MouseEvent| {
            if let Some(shell) = shell.upgrade() {
                shell.on_tooltip_leave(&handle);
            }
        });
        if let Err(e) = tooltip
            .root()
            .add_event_listener_with_callback("mouseleave", listener.as_ref().unchecked_ref())
        {
            warn!(error = %describe(&e), "could not watch tooltip");
            return;
        }
        // The previous tooltip is gone from the DOM, so its listener can be dropped.
        self.tooltip_leave.replace(Some(listener));
    }

    fn on_tooltip_leave(&self, tooltip: &DomTooltip) {
        if self.controller.borrow_mut().tooltip_mouse_leave(tooltip) {
            trace!("tooltip left");
        }
    }
}
