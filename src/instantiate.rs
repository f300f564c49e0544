//! Template instantiation: turn the base template plus one record into a
//! fully resolved card document.
//!
//! The base template is authored in a design tool and ships with artifacts
//! that have to go before a card can be built on top of it: the previous
//! brand group, outlined label glyphs and the placeholder background image.
//! Stripping happens on the parsed tree, so no balance repair is needed
//! afterwards.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context as _;
use regex::Regex;

use crate::color::{DEFAULT_TEAM_COLOR, Gradient, TeamColorPalette, derive_gradient};
use crate::error::{TeamcardError, TeamcardResult};
use crate::layout;
use crate::overlay::{self, MapFetcher};
use crate::record::Record;
use crate::svg::{self, Element};

/// Owner id of the stale brand group shipped inside the template.
const OWNER_GROUP_ID: &str = "VEGAVERY";
/// Stale full-bleed background image baked into the template.
const STALE_IMAGE_ID: &str = "image0_50_49";
/// The background shape whose fill gets repointed at the derived gradient.
const BACKGROUND_RECT_ID: &str = "Rectangle 12";
/// Left content panel boundary; black outline paths starting inside it are
/// authoring leftovers and get stripped.
const LEFT_PANEL_MAX_X: f64 = 430.0;

const BRAND_LOCKUP: &str = include_str!("../assets/brand_lockup.svgfrag");

/// Decimal character references confuse downstream raster parsers; the
/// original authoring export is littered with them.
static CHAR_REF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#\d+;").expect("char ref pattern"));

/// The immutable base template, loaded once per process.
#[derive(Clone, Debug)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn load(path: &Path) -> TeamcardResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            TeamcardError::template_not_loaded(format!("{}: {e}", path.display()))
        })?;
        tracing::info!(path = %path.display(), bytes = source.len(), "template loaded");
        Ok(Self::from_source(source))
    }

    pub fn from_source(source: impl Into<String>) -> Self {
        let source = CHAR_REF_RE.replace_all(&source.into(), "").into_owned();
        Self { source }
    }
}

/// Per-batch orchestrator: parses the template once and instantiates it for
/// each record. Holds only read-only state, so instantiation is repeatable.
pub struct Instantiator {
    base: Element,
    lockup: Element,
    palette: TeamColorPalette,
    fetcher: Box<dyn MapFetcher>,
}

impl Instantiator {
    pub fn new(
        template: &Template,
        palette: TeamColorPalette,
        fetcher: Box<dyn MapFetcher>,
    ) -> TeamcardResult<Self> {
        let base = svg::parse(&template.source)?;
        let lockup = svg::parse(BRAND_LOCKUP).context("parse embedded brand lockup")?;
        Ok(Self {
            base,
            lockup,
            palette,
            fetcher,
        })
    }

    /// Produce the resolved document for one record.
    ///
    /// Gradient and overlay sub-failures degrade gracefully; only structural
    /// template problems surface as errors.
    pub fn instantiate(&self, record: &Record) -> TeamcardResult<String> {
        let mut doc = self.base.clone();

        strip_stale_content(&mut doc);
        self.apply_gradient(&mut doc, record);

        let panel = layout::accumulate(record);
        for span in &panel.spans {
            doc.push(span.to_element());
        }

        if let Some(overlay) = overlay::compose_overlay(
            self.fetcher.as_ref(),
            &record.coords,
            &record.notes,
            record.display_name(),
        ) {
            doc.push(overlay);
        }

        doc.push(self.lockup.clone());
        doc.push(border_rect());

        Ok(doc.serialize())
    }

    fn apply_gradient(&self, doc: &mut Element, record: &Record) {
        let base_color = if record.color.is_empty() {
            self.palette.color_for(record.display_name()).to_string()
        } else {
            record.color.clone()
        };

        let gradient = derive_gradient(&base_color).unwrap_or_else(|e| {
            tracing::warn!(team = record.display_name(), %e, "bad record color, using default");
            derive_gradient(DEFAULT_TEAM_COLOR).expect("default color is valid")
        });

        let name = record.display_name();
        let gradient_id = format!(
            "gradient_{}",
            sanitize_identifier(if name.is_empty() { "default" } else { name })
        );

        doc.ensure_defs().push(gradient_element(&gradient_id, &gradient));

        match doc.find_mut(&|el| el.name == "rect" && el.attr("id") == Some(BACKGROUND_RECT_ID)) {
            Some(rect) => rect.set_attr("fill", format!("url(#{gradient_id})")),
            None => tracing::debug!("template has no '{BACKGROUND_RECT_ID}' background shape"),
        }
    }
}

/// Remove authoring artifacts the card is rebuilt on top of: the stale brand
/// group, every outlined glyph path (any `path` carrying an id), black paths
/// starting inside the left panel and the baked-in background image.
fn strip_stale_content(doc: &mut Element) {
    doc.remove_descendants(&|el| el.name == "g" && el.attr("id") == Some(OWNER_GROUP_ID));
    doc.remove_descendants(&|el| el.name == "path" && el.attr("id").is_some());
    doc.remove_descendants(&|el| {
        el.name == "path"
            && el.attr("fill") == Some("black")
            && first_moveto_x(el.attr("d").unwrap_or_default())
                .is_some_and(|x| x < LEFT_PANEL_MAX_X)
    });
    doc.remove_descendants(&|el| el.name == "image" && el.attr("id") == Some(STALE_IMAGE_ID));
}

/// The x coordinate of a path's first moveto, if the data starts with one.
fn first_moveto_x(d: &str) -> Option<f64> {
    let rest = d.trim_start();
    let rest = rest.strip_prefix(['M', 'm'])?;
    let rest = rest.trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

fn gradient_element(id: &str, gradient: &Gradient) -> Element {
    let mut el = Element::new("linearGradient")
        .with_attr("id", id)
        .with_attr("x1", "0%")
        .with_attr("y1", "0%")
        .with_attr("x2", "100%")
        .with_attr("y2", "100%");
    el.push(
        Element::new("stop")
            .with_attr("offset", "0%")
            .with_attr("style", format!("stop-color:{};stop-opacity:1", gradient.lighter)),
    );
    el.push(
        Element::new("stop")
            .with_attr("offset", "100%")
            .with_attr("style", format!("stop-color:{};stop-opacity:1", gradient.darker)),
    );
    el
}

fn border_rect() -> Element {
    Element::new("rect")
        .with_attr("x", "1")
        .with_attr("y", "1")
        .with_attr("width", "998")
        .with_attr("height", "998")
        .with_attr("fill", "none")
        .with_attr("stroke", "black")
        .with_attr("stroke-width", "2")
}

/// Keep only ASCII alphanumerics and Hangul syllables, matching the id and
/// file-name character policy of the original template assets.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || ('가'..='힣').contains(c))
        .collect()
}
