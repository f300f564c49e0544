//! Vertical layout of the left content panel.
//!
//! The panel is a fixed stack of known blocks, each conditionally present.
//! Title, day and time sit on fixed anchors; everything from the meeting
//! place down flows from a cursor that only advances when a block actually
//! emits. Processing is strictly sequential, so the final cursor depends only
//! on which fields are present.

use crate::record::Record;
use crate::svg::Element;
use crate::text::wrap_title;

pub const FONT_FAMILY: &str = "Freesentation, Arial, sans-serif";

/// Horizontal center of the left panel (canvas units).
pub const PANEL_CENTER_X: i32 = 215;
/// Cursor start for the flowing blocks (meeting place onward).
pub const FLOW_START_Y: i32 = 640;

const TITLE_LINE1_Y: i32 = 210;
const TITLE_LINE2_Y: i32 = 290;
const DAY_Y: i32 = 350;
const TIME_Y: i32 = 410;

/// Upward shift for the first meeting-place line when a second line follows,
/// keeping the two-line block visually centered on the one-line position.
const TWO_LINE_PLACE_SHIFT: i32 = 22;

const PLACE_ADVANCE: i32 = 45;
const COACH_ADVANCE: i32 = 25;
const STAFF_ADVANCE: i32 = 45;
const PARKING_ADVANCE: i32 = 40;

/// One positioned, center-anchored text element for the left panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSpan {
    pub y: i32,
    pub font_size: u32,
    pub font_weight: u32,
    pub fill: &'static str,
    pub content: String,
}

impl TextSpan {
    fn new(y: i32, font_size: u32, font_weight: u32, fill: &'static str, content: String) -> Self {
        Self {
            y,
            font_size,
            font_weight,
            fill,
            content,
        }
    }
}

/// A positioned `<text>` element in the card's house style.
pub fn text_element(
    x: i32,
    y: i32,
    font_size: u32,
    font_weight: u32,
    fill: &str,
    content: &str,
) -> Element {
    Element::new("text")
        .with_attr("x", x.to_string())
        .with_attr("y", y.to_string())
        .with_attr("font-family", FONT_FAMILY)
        .with_attr("font-size", font_size.to_string())
        .with_attr("font-weight", font_weight.to_string())
        .with_attr("fill", fill)
        .with_text(content)
}

impl TextSpan {
    /// Centered on the left panel axis.
    pub fn to_element(&self) -> Element {
        text_element(
            PANEL_CENTER_X,
            self.y,
            self.font_size,
            self.font_weight,
            self.fill,
            &self.content,
        )
        .with_attr("text-anchor", "middle")
    }
}

/// The accumulated panel: spans in paint order plus the final cursor.
#[derive(Clone, Debug, Default)]
pub struct LeftPanel {
    pub spans: Vec<TextSpan>,
    pub cursor: i32,
}

/// Walk the fixed block order for one record.
pub fn accumulate(record: &Record) -> LeftPanel {
    let mut spans = Vec::new();

    let [title1, title2, _] = wrap_title(record.display_name(), 8, 2);
    if !title1.is_empty() {
        spans.push(TextSpan::new(TITLE_LINE1_Y, 80, 900, "black", title1));
    }
    if !title2.is_empty() {
        spans.push(TextSpan::new(TITLE_LINE2_Y, 80, 900, "black", title2));
    }

    if !record.day.is_empty() {
        spans.push(TextSpan::new(DAY_Y, 48, 800, "black", record.day.clone()));
    }
    if !record.class_time.is_empty() {
        spans.push(TextSpan::new(TIME_Y, 48, 800, "black", record.class_time.clone()));
    }

    let mut cursor = FLOW_START_Y;

    if !record.meeting_place.is_empty() {
        let [place1, place2, _] = wrap_title(&record.meeting_place, 12, 2);
        let first_y = if place2.is_empty() {
            cursor
        } else {
            cursor - TWO_LINE_PLACE_SHIFT
        };
        spans.push(TextSpan::new(first_y, 36, 700, "black", format!("📍 {place1}")));
        cursor += PLACE_ADVANCE;
        if !place2.is_empty() {
            spans.push(TextSpan::new(cursor, 36, 700, "black", place2));
            cursor += PLACE_ADVANCE;
        }
    }

    if !record.coach.is_empty() {
        let coach = if record.assistant_coach.is_empty() {
            record.coach.clone()
        } else {
            format!("{} / {}", record.coach, record.assistant_coach)
        };
        spans.push(TextSpan::new(cursor, 28, 600, "black", format!("코치: {coach}")));
        cursor += COACH_ADVANCE;
    }

    if !record.manager.is_empty() || !record.leader.is_empty() {
        let mut staff = String::new();
        if !record.manager.is_empty() {
            staff.push_str(&format!("매니저: {}", record.manager));
        }
        if !record.leader.is_empty() {
            if !staff.is_empty() {
                staff.push_str(" / ");
            }
            staff.push_str(&format!("리더: {}", record.leader));
        }
        spans.push(TextSpan::new(cursor, 24, 500, "black", staff));
        cursor += STAFF_ADVANCE;
    }

    if !record.parking.is_empty() {
        let parking_lines = wrap_title(&record.parking, 15, 3);
        for (idx, line) in parking_lines.iter().filter(|l| !l.is_empty()).enumerate() {
            let content = if idx == 0 {
                format!("🚗 {line}")
            } else {
                line.clone()
            };
            spans.push(TextSpan::new(cursor, 28, 700, "#333", content));
            cursor += PARKING_ADVANCE;
        }
    }

    LeftPanel { spans, cursor }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(f: impl FnOnce(&mut Record)) -> Record {
        let mut rec = Record {
            team_name: "테스트팀".to_string(),
            ..Record::default()
        };
        f(&mut rec);
        rec
    }

    #[test]
    fn title_only_record_leaves_cursor_at_flow_start() {
        let panel = accumulate(&record_with(|_| {}));
        assert_eq!(panel.cursor, FLOW_START_Y);
        assert_eq!(panel.spans.len(), 1);
        assert_eq!(panel.spans[0].y, 210);
        assert_eq!(panel.spans[0].content, "테스트팀");
    }

    #[test]
    fn absent_blocks_do_not_advance_the_cursor() {
        let panel = accumulate(&record_with(|r| {
            r.day = "월".to_string();
            r.class_time = "10:00~12:00".to_string();
        }));
        // Day and time sit on fixed anchors, not the flow cursor.
        assert_eq!(panel.cursor, FLOW_START_Y);
        assert_eq!(panel.spans.len(), 3);
    }

    #[test]
    fn single_line_meeting_place_advances_once() {
        let panel = accumulate(&record_with(|r| r.meeting_place = "중앙공원".to_string()));
        assert_eq!(panel.cursor, FLOW_START_Y + 45);
        let place = panel.spans.last().unwrap();
        assert_eq!(place.y, FLOW_START_Y);
        assert_eq!(place.content, "📍 중앙공원");
    }

    #[test]
    fn two_line_meeting_place_shifts_first_line_up() {
        let panel = accumulate(&record_with(|r| {
            r.meeting_place = "수원 월드컵경기장 동문 주차장 앞".to_string();
        }));
        let place_spans: Vec<_> = panel.spans.iter().filter(|s| s.font_size == 36).collect();
        assert_eq!(place_spans.len(), 2);
        assert_eq!(place_spans[0].y, FLOW_START_Y - 22);
        assert_eq!(place_spans[1].y, FLOW_START_Y + 45);
        assert_eq!(panel.cursor, FLOW_START_Y + 90);
    }

    #[test]
    fn coach_pair_is_joined_with_slash() {
        let panel = accumulate(&record_with(|r| {
            r.coach = "김코치".to_string();
            r.assistant_coach = "이코치".to_string();
        }));
        let coach = panel.spans.last().unwrap();
        assert_eq!(coach.content, "코치: 김코치 / 이코치");
        assert_eq!(panel.cursor, FLOW_START_Y + 25);
    }

    #[test]
    fn staff_block_joins_manager_and_leader() {
        let panel = accumulate(&record_with(|r| {
            r.manager = "박매니저".to_string();
            r.leader = "최리더".to_string();
        }));
        let staff = panel.spans.last().unwrap();
        assert_eq!(staff.content, "매니저: 박매니저 / 리더: 최리더");
        assert_eq!(panel.cursor, FLOW_START_Y + 45);
    }

    #[test]
    fn leader_only_staff_has_no_separator() {
        let panel = accumulate(&record_with(|r| r.leader = "최리더".to_string()));
        assert_eq!(panel.spans.last().unwrap().content, "리더: 최리더");
    }

    #[test]
    fn full_record_cursor_is_sum_of_block_advances() {
        let panel = accumulate(&record_with(|r| {
            r.meeting_place = "중앙공원".to_string();
            r.coach = "김코치".to_string();
            r.manager = "박매니저".to_string();
            r.parking = "정문 옆 공영주차장".to_string();
        }));
        // 45 (place) + 25 (coach) + 45 (staff) + 40 * parking lines
        let parking_lines = panel.spans.iter().filter(|s| s.fill == "#333").count();
        assert_eq!(
            panel.cursor,
            FLOW_START_Y + 45 + 25 + 45 + 40 * parking_lines as i32
        );
    }

    #[test]
    fn parking_first_line_carries_marker() {
        let panel = accumulate(&record_with(|r| {
            r.parking = "정문 옆 공영주차장 이용 후 도보 이동".to_string();
        }));
        let parking: Vec<_> = panel.spans.iter().filter(|s| s.fill == "#333").collect();
        assert!(parking[0].content.starts_with("🚗 "));
        assert!(parking.len() > 1);
        assert!(!parking[1].content.starts_with("🚗"));
    }
}
