//! End-to-end instantiation against the fixture template.

use std::collections::BTreeMap;
use std::path::Path;

use teamcard::overlay::FetchOutcome;
use teamcard::{Instantiator, MapFetcher, Record, TeamColorPalette, Template};

struct StubFetcher(FetchOutcome);

impl MapFetcher for StubFetcher {
    fn fetch(&self, _lat: &str, _lng: &str) -> FetchOutcome {
        self.0.clone()
    }
}

fn fixture_template() -> Template {
    Template::load(Path::new("tests/data/template.svg")).unwrap()
}

fn scenario_record() -> Record {
    let row: BTreeMap<String, String> = [
        ("지역", "서울"),
        ("팀명", "테스트팀"),
        ("요일", "월"),
        ("좌표", "37.5,127.0"),
        ("노출여부", "Y"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    Record::from_row(&row)
}

fn instantiate_with(outcome: FetchOutcome) -> String {
    let instantiator = Instantiator::new(
        &fixture_template(),
        TeamColorPalette::default(),
        Box::new(StubFetcher(outcome)),
    )
    .unwrap();
    instantiator.instantiate(&scenario_record()).unwrap()
}

#[test]
fn scenario_record_produces_title_day_and_one_gradient() {
    let doc = instantiate_with(FetchOutcome::Image(vec![1, 2, 3]));

    assert_eq!(doc.matches("<linearGradient").count(), 1);
    assert!(doc.contains(">테스트팀</text>"));
    assert!(doc.contains(">월</text>"));
}

#[test]
fn scenario_overlay_is_image_xor_placeholder() {
    let with_image = instantiate_with(FetchOutcome::Image(vec![1, 2, 3]));
    assert!(with_image.contains("data:image/png;base64,AQID"));
    assert!(!with_image.contains("지도 위치"));

    let with_placeholder = instantiate_with(FetchOutcome::Failed("boom".to_string()));
    assert!(!with_placeholder.contains("data:image/png;base64,AQID"));
    assert!(with_placeholder.contains("지도 위치"));
    assert!(with_placeholder.contains("위도: 37.5"));
    assert!(with_placeholder.contains("경도: 127.0"));
}

#[test]
fn timed_out_fetch_still_yields_a_document() {
    let doc = instantiate_with(FetchOutcome::TimedOut);
    assert!(doc.contains("위도: 37.5"));
    assert!(doc.contains(">테스트팀</text>"));
}

#[test]
fn fixture_authoring_artifacts_are_gone() {
    let doc = instantiate_with(FetchOutcome::TimedOut);
    assert!(!doc.contains(r#"id="VEGAVERY""#));
    assert!(!doc.contains("image0_50_49\" width"));
    // Left-panel glyph outlines are stripped, right-panel artwork stays.
    assert!(!doc.contains("M143.52 187.3"));
    assert!(!doc.contains("M251.3 640.5"));
    assert!(doc.contains("M705.5 120.7"));
}

#[test]
fn output_markup_stays_well_formed() {
    let doc = instantiate_with(FetchOutcome::Image(vec![9]));
    assert_eq!(doc.matches("<g").count(), doc.matches("</g>").count());
    assert!(teamcard::svg::parse(&doc).is_ok());
}

#[test]
fn instantiate_twice_is_byte_identical() {
    let instantiator = Instantiator::new(
        &fixture_template(),
        TeamColorPalette::default(),
        Box::new(StubFetcher(FetchOutcome::TimedOut)),
    )
    .unwrap();
    let rec = scenario_record();
    assert_eq!(
        instantiator.instantiate(&rec).unwrap(),
        instantiator.instantiate(&rec).unwrap()
    );
}
