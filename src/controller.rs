//! # Tooltip Controller
//!
//! The hover state machine. It decides when a preview is fetched, caches extracted
//! blocks per link, renders and positions the tooltip, and tears it down again.
//!
//! ## States
//! Each link is `Idle`, `PendingShow` (delay timer running), `Fetching`, or `Shown`.
//! Across all links at most one tooltip is shown, and at most one show is pending.
//!
//! ## Host Interaction
//! The controller never touches a timer or the network itself. The host event loop drives
//! it with tickets:
//!
//! 1. [`TooltipController::hover_in`] returns a [`ShowTicket`] and a delay to wait
//! 2. After the delay the host calls [`TooltipController::timer_fired`], which either
//!    shows a cached block or asks for a fetch
//! 3. When the fetch resolves the host calls [`TooltipController::fetch_completed`]
//!
//! Every ticket carries a generation number. Hovering out, or hovering another link,
//! retires the current generation, so a timer or fetch that completes late is discarded
//! instead of popping a tooltip the user no longer wants.
//!
//! Drawing goes through the [`TooltipView`] owned by the controller.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::config::PreviewConfig;
use crate::error::HoverError;
use crate::extract::{find_block, CleanedBlock, NotationBlock};
use crate::placement::{Placement, Point, Size, TooltipPlacer, Viewport};
use crate::title::Title;

/// Identity of a link registered with a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(u32);

impl LinkId {
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One scheduled show. Stale once the controller has moved to a newer generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowTicket {
    link: LinkId,
    generation: u64,
}

impl ShowTicket {
    pub fn link(&self) -> LinkId {
        self.link
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The drawing surface for tooltips.
///
/// In the browser this is the DOM plus the score renderer; tests use a recording fake.
pub trait TooltipView {
    type Handle: Clone + PartialEq + fmt::Debug;

    /// Create a hidden tooltip with a header and an empty score surface.
    fn create(&mut self, header: &str) -> Result<Self::Handle, HoverError>;

    /// Draw the notation into the tooltip's score surface.
    fn render_score(
        &mut self,
        tooltip: &Self::Handle,
        notation: &CleanedBlock,
    ) -> Result<(), HoverError>;

    /// Replace the tooltip body with plain text.
    fn show_message(&mut self, tooltip: &Self::Handle, message: &str);

    fn measure(&self, tooltip: &Self::Handle) -> Size;

    fn viewport(&self) -> Viewport;

    /// Move the tooltip into place and make it visible.
    fn apply(&mut self, tooltip: &Self::Handle, placement: &Placement);

    fn remove(&mut self, tooltip: &Self::Handle);
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoverIn {
    /// A tooltip is already shown, or the link is unknown.
    Ignored,
    /// Call [`TooltipController::timer_fired`] with `ticket` after `delay`.
    Schedule {
        ticket: ShowTicket,
        delay: Duration,
        /// An earlier pending show this one supersedes; its timer can be cleared.
        replaced: Option<ShowTicket>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub ticket: ShowTicket,
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimerFired {
    /// Fetch the article and report back through [`TooltipController::fetch_completed`].
    Fetch(FetchRequest),
    /// The block was cached and the tooltip is now shown.
    Shown,
    /// Nothing to do. The reason is only worth logging.
    Dismissed(HoverError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchCompleted {
    Shown,
    Dismissed(HoverError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverOut {
    /// Pending show whose timer should be cleared.
    pub cancelled: Option<ShowTicket>,
    /// Whether a shown tooltip was torn down.
    pub dismissed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Waiting,
    Fetching,
}

#[derive(Debug)]
struct PendingShow {
    ticket: ShowTicket,
    anchor: Point,
    stage: Stage,
}

#[derive(Debug)]
struct LinkEntry<H> {
    title: Title,
    block: Option<NotationBlock>,
    tooltip: Option<H>,
}

#[derive(Debug)]
struct ActiveTooltip<H> {
    link: LinkId,
    handle: H,
}

pub struct TooltipController<V: TooltipView> {
    view: V,
    placer: TooltipPlacer,
    delay: Duration,
    header_label: String,
    links: HashMap<LinkId, LinkEntry<V::Handle>>,
    pending: Option<PendingShow>,
    active: Option<ActiveTooltip<V::Handle>>,
    generation: u64,
}

impl<V: TooltipView> TooltipController<V> {
    pub fn new(config: &PreviewConfig, view: V) -> Self {
        Self {
            view,
            placer: config.placer(),
            delay: config.hover_delay(),
            header_label: config.header_label.clone(),
            links: HashMap::new(),
            pending: None,
            active: None,
            generation: 0,
        }
    }

    pub fn register_link(&mut self, title: Title) -> LinkId {
        let id = LinkId(self.links.len() as u32);
        self.links.insert(
            id,
            LinkEntry {
                title,
                block: None,
                tooltip: None,
            },
        );
        id
    }

    pub fn hover_in(&mut self, link: LinkId, anchor: Point) -> HoverIn {
        if let Some(active) = &self.active {
            trace!(link = %link, active = %active.link, "tooltip already shown, hover ignored");
            return HoverIn::Ignored;
        }
        if !self.links.contains_key(&link) {
            return HoverIn::Ignored;
        }

        self.generation += 1;
        let ticket = ShowTicket {
            link,
            generation: self.generation,
        };
        let replaced = self
            .pending
            .replace(PendingShow {
                ticket,
                anchor,
                stage: Stage::Waiting,
            })
            .filter(|previous| previous.stage == Stage::Waiting)
            .map(|previous| previous.ticket);

        debug!(link = %link, generation = ticket.generation, "show scheduled");
        HoverIn::Schedule {
            ticket,
            delay: self.delay,
            replaced,
        }
    }

    pub fn timer_fired(&mut self, ticket: ShowTicket) -> TimerFired {
        let anchor = match &self.pending {
            Some(pending) if pending.ticket == ticket && pending.stage == Stage::Waiting => {
                pending.anchor
            }
            _ => return TimerFired::Dismissed(stale(ticket)),
        };

        let (cached, title) = match self.links.get(&ticket.link) {
            Some(entry) if self.active.is_none() => (entry.block.clone(), entry.title.clone()),
            _ => {
                self.pending = None;
                return TimerFired::Dismissed(stale(ticket));
            }
        };

        if let Some(block) = cached {
            self.pending = None;
            debug!(link = %ticket.link, "showing cached block");
            return match self.show(ticket.link, &block, anchor) {
                Ok(()) => TimerFired::Shown,
                Err(err) => TimerFired::Dismissed(err),
            };
        }

        if let Some(pending) = self.pending.as_mut() {
            pending.stage = Stage::Fetching;
        }
        debug!(link = %ticket.link, title = %title, "fetching article");
        TimerFired::Fetch(FetchRequest { ticket, title })
    }

    /// Resume after a fetch. A found block is cached even when the ticket went stale.
    pub fn fetch_completed(&mut self, ticket: ShowTicket, content: Option<&str>) -> FetchCompleted {
        let Some(entry) = self.links.get_mut(&ticket.link) else {
            return FetchCompleted::Dismissed(stale(ticket));
        };

        let found = match content {
            Some(content) => find_block(content),
            None => Err(HoverError::FetchFailure {
                title: entry.title.to_string(),
                message: "no content".to_string(),
            }),
        };
        if let Ok(block) = &found {
            entry.block.get_or_insert_with(|| block.clone());
        }

        let anchor = match &self.pending {
            Some(pending) if pending.ticket == ticket && pending.stage == Stage::Fetching => {
                pending.anchor
            }
            _ => {
                debug!(link = %ticket.link, generation = ticket.generation, "late fetch discarded");
                return FetchCompleted::Dismissed(stale(ticket));
            }
        };
        self.pending = None;
        if self.active.is_some() {
            return FetchCompleted::Dismissed(stale(ticket));
        }

        match found {
            Ok(block) => match self.show(ticket.link, &block, anchor) {
                Ok(()) => FetchCompleted::Shown,
                Err(err) => FetchCompleted::Dismissed(err),
            },
            Err(err) => {
                debug!(link = %ticket.link, reason = %err, "no preview");
                FetchCompleted::Dismissed(err)
            }
        }
    }

    pub fn hover_out(&mut self, link: LinkId) -> HoverOut {
        let mut out = HoverOut::default();

        if let Some(pending) = self.pending.take() {
            if pending.ticket.link == link {
                if pending.stage == Stage::Waiting {
                    out.cancelled = Some(pending.ticket);
                }
                trace!(
                    link = %link,
                    generation = pending.ticket.generation,
                    "pending show cancelled"
                );
            } else {
                self.pending = Some(pending);
            }
        }

        if self.active.as_ref().is_some_and(|active| active.link == link) {
            out.dismissed = self.teardown();
        }
        out
    }

    /// The pointer left the tooltip element itself.
    pub fn tooltip_mouse_leave(&mut self, handle: &V::Handle) -> bool {
        if self.active.as_ref().is_some_and(|active| &active.handle == handle) {
            self.teardown()
        } else {
            false
        }
    }

    pub fn is_shown(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_link(&self) -> Option<LinkId> {
        self.active.as_ref().map(|active| active.link)
    }

    pub fn active_tooltip(&self) -> Option<&V::Handle> {
        self.active.as_ref().map(|active| &active.handle)
    }

    pub fn pending_ticket(&self) -> Option<ShowTicket> {
        self.pending.as_ref().map(|pending| pending.ticket)
    }

    pub fn cached_block(&self, link: LinkId) -> Option<&NotationBlock> {
        self.links.get(&link)?.block.as_ref()
    }

    pub fn link_tooltip(&self, link: LinkId) -> Option<&V::Handle> {
        self.links.get(&link)?.tooltip.as_ref()
    }

    pub fn title(&self, link: LinkId) -> Option<&Title> {
        self.links.get(&link).map(|entry| &entry.title)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn show(
        &mut self,
        link: LinkId,
        block: &NotationBlock,
        anchor: Point,
    ) -> Result<(), HoverError> {
        let cleaned = block.clean();
        let handle = self.view.create(&self.header_label).map_err(|err| {
            warn!(link = %link, error = %err, "could not create tooltip");
            err
        })?;

        if let Err(err) = self.view.render_score(&handle, &cleaned) {
            warn!(link = %link, error = %err, "score rendering failed");
            self.view.show_message(&handle, err.user_message());
        }

        let size = self.view.measure(&handle);
        let placement = self.placer.place(size, anchor, self.view.viewport());
        self.view.apply(&handle, &placement);
        trace!(link = %link, left = placement.left, top = placement.top, "tooltip shown");

        if let Some(entry) = self.links.get_mut(&link) {
            entry.tooltip = Some(handle.clone());
        }
        self.active = Some(ActiveTooltip { link, handle });
        Ok(())
    }

    fn teardown(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        self.view.remove(&active.handle);
        if let Some(entry) = self.links.get_mut(&active.link) {
            entry.tooltip = None;
        }
        debug!(link = %active.link, "tooltip dismissed");
        true
    }
}

fn stale(ticket: ShowTicket) -> HoverError {
    HoverError::RaceStale {
        link: ticket.link.index(),
    }
}
