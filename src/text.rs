//! Greedy text wrapping for the fixed card panels.
//!
//! Two policies, both single-pass and heuristic (widths are counted in chars,
//! not measured): title wrapping packs into a fixed number of lines, note
//! wrapping first picks a font tier from the total length so the densest
//! reasonable rendering still fits the caption box.

/// Slots returned by [`wrap_title`]; unused trailing slots stay empty.
pub const TITLE_SLOTS: usize = 3;

/// Wrap a short heading into up to `max_lines` lines of at most `max_chars`
/// characters, returning exactly [`TITLE_SLOTS`] slots.
///
/// Explicit newlines split first; a line that already fits is emitted verbatim
/// (trimmed). Overflowing lines are re-split on whitespace, `/`, `,` and `-`
/// (separators stay with the packed text) and packed greedily. Input beyond
/// `max_lines` is dropped silently; there is no overflow indicator.
pub fn wrap_title(text: &str, max_chars: usize, max_lines: usize) -> [String; TITLE_SLOTS] {
    let mut result: [String; TITLE_SLOTS] = Default::default();
    if text.is_empty() {
        return result;
    }
    let max_lines = max_lines.min(TITLE_SLOTS);
    let mut current = 0usize;

    for line in text.split('\n') {
        if current >= max_lines {
            break;
        }

        if char_len(line) <= max_chars {
            result[current] = line.trim().to_string();
            current += 1;
            continue;
        }

        let mut packed = String::new();
        for token in split_keeping_separators(line) {
            if char_len(&packed) + char_len(token) <= max_chars {
                packed.push_str(token);
            } else {
                if !packed.trim().is_empty() && current < max_lines {
                    result[current] = packed.trim().to_string();
                    current += 1;
                }
                packed = token.to_string();
            }
        }
        if !packed.trim().is_empty() && current < max_lines {
            result[current] = packed.trim().to_string();
            current += 1;
        }
    }

    result
}

/// Wrapped free-form notes plus the font metrics the caller renders them with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteBlock {
    pub font_size: u32,
    pub line_height: u32,
    pub lines: Vec<String>,
}

impl NoteBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Wrap free-form notes for the caption box.
///
/// The tier thresholds (60/120/180 chars) and per-tier metrics are tuned for
/// the fixed 550x230 caption box and are not derived from text measurement;
/// keep them unless the canvas changes. Text past the tier's line budget is
/// dropped.
pub fn wrap_notes(text: &str) -> NoteBlock {
    let total = char_len(text);
    // (font_size, chars_per_line, max_lines, line_height)
    let (font_size, chars_per_line, max_lines, line_height) = if total <= 60 {
        (28, 22, 3, 35)
    } else if total <= 120 {
        (24, 26, 4, 32)
    } else if total <= 180 {
        (20, 30, 5, 30)
    } else {
        (18, 34, 6, 28)
    };

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    if !text.is_empty() {
        for word in text.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if char_len(&candidate) > chars_per_line && !current.is_empty() {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }

            if lines.len() >= max_lines - 1 {
                break;
            }
        }
        if !current.is_empty() && lines.len() < max_lines {
            lines.push(current);
        }
    }

    NoteBlock {
        font_size,
        line_height,
        lines,
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '/' || c == ',' || c == '-'
}

/// Split into words and single-char separator tokens, keeping both so the
/// greedy packer can re-attach separators to the preceding text.
fn split_keeping_separators(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0usize;
    for (idx, c) in line.char_indices() {
        if is_separator(c) {
            if idx > start {
                tokens.push(&line[start..idx]);
            }
            tokens.push(&line[idx..idx + c.len_utf8()]);
            start = idx + c.len_utf8();
        }
    }
    if start < line.len() {
        tokens.push(&line[start..]);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_yields_all_empty_slots() {
        assert_eq!(wrap_title("", 8, 2), ["", "", ""]);
    }

    #[test]
    fn short_title_takes_one_slot() {
        assert_eq!(wrap_title("테스트팀", 8, 2), ["테스트팀", "", ""]);
    }

    #[test]
    fn title_always_has_three_slots_with_trailing_empties() {
        let wrapped = wrap_title("서울 강남 테스트팀", 8, 2);
        assert_eq!(wrapped.len(), TITLE_SLOTS);
        assert!(!wrapped[0].is_empty());
        assert!(wrapped[2].is_empty());
    }

    #[test]
    fn explicit_newlines_split_first() {
        assert_eq!(wrap_title("위\n아래", 8, 2), ["위", "아래", ""]);
    }

    #[test]
    fn long_line_packs_on_separator_candidates() {
        let wrapped = wrap_title("alpha/beta gamma", 10, 2);
        assert_eq!(wrapped[0], "alpha/beta");
        assert_eq!(wrapped[1], "gamma");
    }

    #[test]
    fn excess_title_text_is_dropped() {
        let wrapped = wrap_title("하나 둘 셋 넷 다섯 여섯 일곱", 2, 2);
        assert_eq!(wrapped[2], "");
        assert!(!wrapped.concat().contains("일곱"));
    }

    #[test]
    fn parking_style_three_line_wrap() {
        let wrapped = wrap_title("주차장 입구는 건물 뒤편 골목으로 진입", 8, 3);
        assert!(!wrapped[0].is_empty());
        assert!(!wrapped[2].is_empty() || !wrapped[1].is_empty());
    }

    #[test]
    fn empty_notes_yield_no_lines() {
        let block = wrap_notes("");
        assert!(block.is_empty());
        assert_eq!(block.font_size, 28);
    }

    #[test]
    fn note_tiers_select_expected_metrics() {
        let short = "가".repeat(60);
        let medium = "가".repeat(61);
        let long = "가".repeat(121);
        let very_long = "가".repeat(181);
        assert_eq!(wrap_notes(&short).font_size, 28);
        assert_eq!(wrap_notes(&medium).font_size, 24);
        assert_eq!(wrap_notes(&medium).line_height, 32);
        assert_eq!(wrap_notes(&long).font_size, 20);
        assert_eq!(wrap_notes(&very_long).font_size, 18);
        assert_eq!(wrap_notes(&very_long).line_height, 28);
    }

    #[test]
    fn notes_never_exceed_tier_line_budget() {
        let text = "word ".repeat(200);
        let block = wrap_notes(text.trim());
        assert!(block.lines.len() <= 6);

        let short = "하나 둘 셋 넷 다섯 여섯 일곱 여덟 아홉 열 하나 둘 셋 넷 다섯 여섯";
        let block = wrap_notes(short);
        assert!(block.lines.len() <= 3, "short tier caps at 3 lines");
    }

    #[test]
    fn notes_pack_greedily_by_spaces() {
        let block = wrap_notes("차량은 정문 앞 공터에 주차");
        assert_eq!(block.lines.len(), 1);
        assert_eq!(block.lines[0], "차량은 정문 앞 공터에 주차");
    }
}
