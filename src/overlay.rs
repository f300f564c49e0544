//! Right-panel overlay: a static map image for the record's meeting place,
//! with a graceful coordinate-card fallback and an optional notes caption.
//!
//! The map fetch is the only network I/O in the crate. It is bounded by a
//! hard timeout and reports a tagged outcome; a failed fetch downgrades the
//! overlay to a placeholder and never aborts document generation.

use std::sync::LazyLock;
use std::time::Duration;

use base64::Engine as _;
use regex::Regex;

use crate::error::TeamcardResult;
use crate::layout::text_element;
use crate::svg::Element;
use crate::text::wrap_notes;

/// Overlay region geometry (canvas units).
pub const MAP_X: i32 = 430;
pub const MAP_WIDTH: u32 = 570;
pub const MAP_HEIGHT: u32 = 1000;

const MAP_ZOOM: u32 = 17;
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = concat!("teamcard/", env!("CARGO_PKG_VERSION"));

static COORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-?\d+\.?\d*),\s*(-?\d+\.?\d*)").expect("coordinate pattern"));

/// Result of one bounded map-image fetch.
#[derive(Clone, Debug)]
pub enum FetchOutcome {
    Image(Vec<u8>),
    TimedOut,
    Failed(String),
}

/// Map-image provider for a latitude/longitude pair.
///
/// Coordinates are passed through as the raw captured text so the request URL
/// and the fallback card show exactly what the source row contained.
pub trait MapFetcher {
    fn fetch(&self, lat: &str, lng: &str) -> FetchOutcome;
}

/// Google Static Maps client with a hard request timeout.
pub struct StaticMapFetcher {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
}

impl StaticMapFetcher {
    pub fn new(api_key: Option<String>) -> TeamcardResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| crate::error::TeamcardError::overlay(e.to_string()))?;
        Ok(Self { client, api_key })
    }

    fn map_url(&self, lat: &str, lng: &str) -> String {
        let mut url = format!(
            "https://maps.googleapis.com/maps/api/staticmap?center={lat},{lng}\
             &zoom={MAP_ZOOM}&size={MAP_WIDTH}x{MAP_HEIGHT}&maptype=roadmap\
             &markers=color:red%7C{lat},{lng}&language=ko&region=KR"
        );
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(key);
        }
        url
    }
}

impl MapFetcher for StaticMapFetcher {
    fn fetch(&self, lat: &str, lng: &str) -> FetchOutcome {
        let url = self.map_url(lat, lng);
        let response = match self.client.get(&url).send() {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return FetchOutcome::TimedOut,
            Err(e) => return FetchOutcome::Failed(e.to_string()),
        };
        if !response.status().is_success() {
            return FetchOutcome::Failed(format!("status {}", response.status()));
        }
        match response.bytes() {
            Ok(bytes) => FetchOutcome::Image(bytes.to_vec()),
            Err(e) if e.is_timeout() => FetchOutcome::TimedOut,
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}

/// No-network fetcher for offline runs; the overlay falls back to the
/// coordinate card.
pub struct OfflineFetcher;

impl MapFetcher for OfflineFetcher {
    fn fetch(&self, _lat: &str, _lng: &str) -> FetchOutcome {
        FetchOutcome::Failed("map fetch disabled".to_string())
    }
}

/// Extract the raw `(lat, lng)` text from a coordinate field, if present.
pub fn parse_coords(raw: &str) -> Option<(String, String)> {
    let caps = COORD_RE.captures(raw)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Compose the right-panel overlay fragment, or `None` when the record has no
/// parsable coordinates (callers render nothing there, they do not fail).
pub fn compose_overlay(
    fetcher: &dyn MapFetcher,
    coords: &str,
    notes: &str,
    label: &str,
) -> Option<Element> {
    let (lat, lng) = parse_coords(coords)?;

    let mut group = Element::new("g").with_attr("id", "map-section");
    group.push(
        Element::new("rect")
            .with_attr("x", MAP_X.to_string())
            .with_attr("y", "0")
            .with_attr("width", MAP_WIDTH.to_string())
            .with_attr("height", MAP_HEIGHT.to_string())
            .with_attr("fill", "#E8F4F8"),
    );

    match fetcher.fetch(&lat, &lng) {
        FetchOutcome::Image(bytes) => {
            tracing::debug!(team = label, kb = bytes.len() / 1024, "map image embedded");
            let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
            group.push(
                Element::new("image")
                    .with_attr("x", MAP_X.to_string())
                    .with_attr("y", "0")
                    .with_attr("width", MAP_WIDTH.to_string())
                    .with_attr("height", MAP_HEIGHT.to_string())
                    .with_attr("href", format!("data:image/png;base64,{encoded}"))
                    .with_attr("preserveAspectRatio", "xMidYMid slice"),
            );
        }
        outcome => {
            match outcome {
                FetchOutcome::TimedOut => {
                    tracing::warn!(team = label, "map fetch timed out, using placeholder")
                }
                FetchOutcome::Failed(reason) => {
                    tracing::warn!(team = label, %reason, "map fetch failed, using placeholder")
                }
                FetchOutcome::Image(_) => unreachable!(),
            }
            push_placeholder(&mut group, &lat, &lng, label);
        }
    }

    if !notes.is_empty() {
        push_caption(&mut group, notes);
    }

    Some(group)
}

fn push_placeholder(group: &mut Element, lat: &str, lng: &str, label: &str) {
    group.push(
        Element::new("rect")
            .with_attr("x", "440")
            .with_attr("y", "10")
            .with_attr("width", "550")
            .with_attr("height", "100")
            .with_attr("fill", "rgba(255,255,255,0.9)")
            .with_attr("stroke", "#333")
            .with_attr("stroke-width", "1")
            .with_attr("rx", "5"),
    );
    group.push(text_element(465, 35, 16, 600, "#333", "📍 지도 위치"));
    group.push(text_element(465, 55, 14, 500, "#666", &format!("위도: {lat}")));
    group.push(text_element(465, 75, 14, 500, "#666", &format!("경도: {lng}")));
    group.push(text_element(465, 95, 12, 400, "#999", &format!("{label} 집합장소")));
}

fn push_caption(group: &mut Element, notes: &str) {
    group.push(
        Element::new("rect")
            .with_attr("x", "440")
            .with_attr("y", "760")
            .with_attr("width", "550")
            .with_attr("height", "230")
            .with_attr("fill", "rgba(255,255,255,0.95)")
            .with_attr("stroke", "#333")
            .with_attr("stroke-width", "1")
            .with_attr("rx", "8"),
    );
    group.push(text_element(465, 815, 30, 700, "#333", "특이사항"));

    let block = wrap_notes(notes);
    for (idx, line) in block.lines.iter().enumerate() {
        let y = 850 + idx as i32 * block.line_height as i32;
        group.push(text_element(465, y, block.font_size, 500, "#444", line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always(FetchOutcome);

    impl MapFetcher for Always {
        fn fetch(&self, _lat: &str, _lng: &str) -> FetchOutcome {
            self.0.clone()
        }
    }

    #[test]
    fn coordinate_parsing_accepts_decimal_pairs() {
        assert_eq!(
            parse_coords("37.5,127.0"),
            Some(("37.5".to_string(), "127.0".to_string()))
        );
        assert_eq!(
            parse_coords("37.5665, 126.9780"),
            Some(("37.5665".to_string(), "126.9780".to_string()))
        );
        assert_eq!(
            parse_coords("-33.9, 18.4"),
            Some(("-33.9".to_string(), "18.4".to_string()))
        );
        assert_eq!(parse_coords(""), None);
        assert_eq!(parse_coords("서울시 어딘가"), None);
    }

    #[test]
    fn unparsable_coordinates_yield_no_overlay() {
        let fetcher = Always(FetchOutcome::Image(vec![1, 2, 3]));
        assert!(compose_overlay(&fetcher, "", "메모", "팀").is_none());
        assert!(compose_overlay(&fetcher, "없음", "", "팀").is_none());
    }

    #[test]
    fn successful_fetch_embeds_base64_image() {
        let fetcher = Always(FetchOutcome::Image(vec![0x89, 0x50, 0x4e, 0x47]));
        let overlay = compose_overlay(&fetcher, "37.5,127.0", "", "테스트팀").unwrap();
        let image = overlay.find(&|el| el.name == "image").unwrap();
        assert!(image.attr("href").unwrap().starts_with("data:image/png;base64,"));
        assert!(overlay.find(&|el| el.name == "text").is_none());
    }

    #[test]
    fn timeout_falls_back_to_coordinate_card() {
        let fetcher = Always(FetchOutcome::TimedOut);
        let overlay = compose_overlay(&fetcher, "37.5,127.0", "", "테스트팀").unwrap();
        assert!(overlay.find(&|el| el.name == "image").is_none());
        let serialized = overlay.serialize();
        assert!(serialized.contains("위도: 37.5"));
        assert!(serialized.contains("경도: 127.0"));
        assert!(serialized.contains("테스트팀 집합장소"));
    }

    #[test]
    fn image_and_placeholder_are_mutually_exclusive() {
        for outcome in [
            FetchOutcome::Image(vec![1]),
            FetchOutcome::Failed("x".to_string()),
        ] {
            let overlay =
                compose_overlay(&Always(outcome.clone()), "37.5,127.0", "", "팀").unwrap();
            let has_image = overlay.find(&|el| el.name == "image").is_some();
            let has_card = overlay.serialize().contains("지도 위치");
            assert!(has_image != has_card, "exactly one of image/placeholder");
        }
    }

    #[test]
    fn notes_add_a_caption_panel() {
        let fetcher = Always(FetchOutcome::Failed("offline".to_string()));
        let overlay =
            compose_overlay(&fetcher, "37.5,127.0", "우천 시 취소될 수 있음", "팀").unwrap();
        let serialized = overlay.serialize();
        assert!(serialized.contains("특이사항"));
        assert!(serialized.contains("우천 시 취소될 수 있음"));
    }

    #[test]
    fn static_map_url_includes_marker_and_key() {
        let fetcher = StaticMapFetcher::new(Some("k123".to_string())).unwrap();
        let url = fetcher.map_url("37.5", "127.0");
        assert!(url.contains("center=37.5,127.0"));
        assert!(url.contains("zoom=17"));
        assert!(url.contains("size=570x1000"));
        assert!(url.contains("markers=color:red%7C37.5,127.0"));
        assert!(url.ends_with("&key=k123"));
    }
}
