pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod placement;
pub mod scanner;
pub mod title;

pub use config::{PreviewConfig, RawConfig};
pub use controller::{
    FetchCompleted, FetchRequest, HoverIn, HoverOut, LinkId, ShowTicket, TimerFired,
    TooltipController, TooltipView,
};
pub use error::*;
pub use extract::{clean_block, extract_block, find_block, CleanedBlock, NotationBlock};
pub use fetch::{content_from_response, revision_query_url, ContentSource};
pub use placement::{
    Orientation, Placement, PlacementStrategy, Point, Size, TooltipPlacer, TooltipStyle, Viewport,
};
pub use scanner::{FeatureFlag, LinkScanner, ScannedLink};
pub use title::Title;

/// Extract and clean the incipit from article wikitext.
/// This is the whole text pipeline of a hover preview, without the tooltip.
pub fn preview(content: &str) -> Result<CleanedBlock, HoverError> {
    Ok(find_block(content)?.clean())
}

