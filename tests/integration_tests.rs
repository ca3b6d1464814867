//! Integration tests for abc-hover
//!
//! Drives the preview pipeline end to end: link scanning, the hover state machine, a
//! content source and the API response decoding, with a fake view standing in for the DOM.

use std::collections::HashMap;

use abc_hover::{
    content_from_response, preview, revision_query_url, CleanedBlock, ContentSource,
    FetchCompleted, HoverError, HoverIn, LinkId, LinkScanner, MissingPiece, Orientation, Placement,
    Point, PreviewConfig, Size, TimerFired, Title, TooltipController, TooltipView, Viewport,
};
use async_trait::async_trait;
use futures::executor::block_on;

const KESH: &str = "'''The Kesh''' is a jig.\n\n<score lang=\"ABC\">\nX:1\nT:The Kesh\nR:jig\nS:Trad.\nM:6/8\nL:1/8\nK:G\n|:GAG GAB|ABA ABd|edd gdd|edB dBA:|\n</score>\n";

/// Serves articles from memory, the way the API source serves them from a wiki.
struct MapSource {
    articles: HashMap<String, String>,
}

impl MapSource {
    fn new(articles: &[(&str, &str)]) -> Self {
        Self {
            articles: articles
                .iter()
                .map(|(title, text)| (title.to_string(), text.to_string()))
                .collect(),
        }
    }
}

#[async_trait(?Send)]
impl ContentSource for MapSource {
    async fn fetch_content(&self, title: &Title) -> Option<String> {
        self.articles.get(title.as_str()).cloned()
    }
}

#[derive(Default)]
struct ScreenView {
    next: u32,
    open: Vec<u32>,
    rendered: Vec<String>,
    placements: Vec<Placement>,
    renderer_missing: bool,
    messages: Vec<String>,
}

impl TooltipView for ScreenView {
    type Handle = u32;

    fn create(&mut self, _header: &str) -> Result<u32, HoverError> {
        self.next += 1;
        self.open.push(self.next);
        Ok(self.next)
    }

    fn render_score(&mut self, _tooltip: &u32, notation: &CleanedBlock) -> Result<(), HoverError> {
        if self.renderer_missing {
            return Err(HoverError::RendererUnavailable);
        }
        self.rendered.push(notation.to_string());
        Ok(())
    }

    fn show_message(&mut self, _tooltip: &u32, message: &str) {
        self.messages.push(message.to_string());
    }

    fn measure(&self, _tooltip: &u32) -> Size {
        Size::new(200.0, 80.0)
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(1024.0, 768.0)
    }

    fn apply(&mut self, _tooltip: &u32, placement: &Placement) {
        self.placements.push(*placement);
    }

    fn remove(&mut self, tooltip: &u32) {
        self.open.retain(|open| open != tooltip);
    }
}

fn page_links() -> Vec<&'static str> {
    vec![
        "/wiki/The_Kesh",
        "/wiki/Special:Random",
        "https://example.org/wiki/Elsewhere",
        "/wiki/Plain_Article",
        "/wiki/Drowsy_Maggie#Settings",
    ]
}

/// Run one hover to completion, fetching through `source` when needed.
fn hover(
    controller: &mut TooltipController<ScreenView>,
    source: &MapSource,
    link: LinkId,
    anchor: Point,
) -> Result<(), HoverError> {
    let ticket = match controller.hover_in(link, anchor) {
        HoverIn::Schedule { ticket, .. } => ticket,
        HoverIn::Ignored => panic!("hover ignored"),
    };
    match controller.timer_fired(ticket) {
        TimerFired::Fetch(request) => {
            let content = block_on(source.fetch_content(&request.title));
            match controller.fetch_completed(request.ticket, content.as_deref()) {
                FetchCompleted::Shown => Ok(()),
                FetchCompleted::Dismissed(err) => Err(err),
            }
        }
        TimerFired::Shown => Ok(()),
        TimerFired::Dismissed(err) => Err(err),
    }
}

#[test]
fn test_preview_pipeline() {
    let cleaned = preview(KESH).unwrap();
    assert_eq!(
        cleaned.as_str(),
        "X:1\nT:The Kesh\nR:jig\nM:6/8\nL:1/8\nK:G\n|:GAG GAB|ABA ABd|edd gdd|edB dBA:|"
    );
}

#[test]
fn test_preview_without_tune() {
    assert_eq!(
        preview("A page about fiddles.").unwrap_err(),
        HoverError::NotFound(MissingPiece::StartMarker)
    );
}

#[test]
fn test_scan_hover_fetch_and_show() {
    let config = PreviewConfig::default();
    let mut controller = TooltipController::new(&config, ScreenView::default());
    let source = MapSource::new(&[("The_Kesh", KESH), ("Plain_Article", "No tune here.")]);

    let links = LinkScanner::new(config.article_path.clone()).attach(
        &true,
        page_links,
        |href| Some(href.to_string()),
        &mut controller,
    );
    let hrefs: Vec<_> = links.iter().map(|(_, href)| *href).collect();
    assert_eq!(
        hrefs,
        vec![
            "/wiki/The_Kesh",
            "/wiki/Special:Random",
            "/wiki/Plain_Article",
            "/wiki/Drowsy_Maggie#Settings",
        ]
    );
    assert_eq!(controller.link_count(), 4);

    let kesh = links[0].0;
    hover(&mut controller, &source, kesh, Point::new(400.0, 300.0)).unwrap();
    assert_eq!(controller.view().open, vec![1]);
    assert_eq!(
        controller.view().placements,
        vec![Placement {
            left: 300.0,
            top: 310.0,
            orientation: Orientation::Below,
        }]
    );
    assert!(controller.view().rendered[0].starts_with("X:1\nT:The Kesh\nR:jig"));

    controller.hover_out(kesh);
    assert!(controller.view().open.is_empty());
}

#[test]
fn test_articles_without_tunes_show_nothing() {
    let config = PreviewConfig::default();
    let mut controller = TooltipController::new(&config, ScreenView::default());
    let source = MapSource::new(&[("Plain_Article", "No tune here.")]);
    let links = LinkScanner::new("/wiki/").attach(
        &true,
        page_links,
        |href| Some(href.to_string()),
        &mut controller,
    );

    let plain = links[2].0;
    assert_eq!(
        hover(&mut controller, &source, plain, Point::new(10.0, 10.0)),
        Err(HoverError::NotFound(MissingPiece::StartMarker))
    );

    // Unknown to the source: same silent outcome.
    let maggie = links[3].0;
    assert_eq!(controller.title(maggie).map(Title::as_str), Some("Drowsy_Maggie"));
    assert!(matches!(
        hover(&mut controller, &source, maggie, Point::new(10.0, 10.0)),
        Err(HoverError::FetchFailure { .. })
    ));
    assert!(controller.view().open.is_empty());
}

#[test]
fn test_missing_renderer_shows_message() {
    let config = PreviewConfig::default();
    let view = ScreenView {
        renderer_missing: true,
        ..ScreenView::default()
    };
    let mut controller = TooltipController::new(&config, view);
    let kesh = controller.register_link(Title::new("The_Kesh"));
    let source = MapSource::new(&[("The_Kesh", KESH)]);

    hover(&mut controller, &source, kesh, Point::new(10.0, 10.0)).unwrap();
    assert_eq!(controller.view().messages, vec!["abcjs is not available."]);
    assert!(controller.is_shown());
}

#[test]
fn test_disabled_preference_attaches_nothing() {
    let mut controller = TooltipController::new(&PreviewConfig::default(), ScreenView::default());
    let links = LinkScanner::new("/wiki/").attach(
        &false,
        page_links,
        |href| Some(href.to_string()),
        &mut controller,
    );
    assert!(links.is_empty());
    assert_eq!(controller.link_count(), 0);
}

#[test]
fn test_api_response_to_preview() {
    let title = Title::from_href("/wiki/The%20Kesh", "/wiki/").unwrap();
    assert_eq!(
        revision_query_url("/w/api.php", &title),
        "/w/api.php?action=query&format=json&prop=revisions&titles=The%20Kesh&rvslots=main&rvprop=content"
    );

    let body = serde_json::json!({
        "batchcomplete": "",
        "query": {
            "pages": {
                "12": {
                    "pageid": 12,
                    "ns": 0,
                    "title": "The Kesh",
                    "revisions": [{
                        "slots": {
                            "main": {
                                "contentmodel": "wikitext",
                                "contentformat": "text/x-wiki",
                                "*": KESH
                            }
                        }
                    }]
                }
            }
        }
    })
    .to_string();

    let content = content_from_response(&title, &body).unwrap();
    assert_eq!(content, KESH);
    assert!(preview(&content).unwrap().as_str().ends_with("edB dBA:|"));
}

#[test]
fn test_yaml_config_drives_controller() {
    let config = PreviewConfig::from_yaml(
        "hover-delay-ms: 500\nplacement: offset\nheader-label: Preview\ngap: 4\n",
    )
    .unwrap();
    let mut controller = TooltipController::new(&config, ScreenView::default());
    let kesh = controller.register_link(Title::new("The_Kesh"));

    match controller.hover_in(kesh, Point::new(900.0, 100.0)) {
        HoverIn::Schedule { delay, .. } => assert_eq!(delay.as_millis(), 500),
        HoverIn::Ignored => panic!("hover ignored"),
    }

    let source = MapSource::new(&[("The_Kesh", KESH)]);
    controller.hover_out(kesh);
    hover(&mut controller, &source, kesh, Point::new(900.0, 100.0)).unwrap();

    // Too close to the right edge for the offset box: flipped to the left of the cursor.
    let placement = controller.view().placements[0];
    assert_eq!(placement.left, 900.0 - 4.0 - 200.0);
    assert_eq!(placement.top, 104.0);
}
