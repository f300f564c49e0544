//! Source records: one row per team/location.
//!
//! Rows arrive as flat name→value mappings keyed by the upstream sheet's
//! Korean column headers; missing columns read as empty strings. Records are
//! immutable once built and a batch preserves row order, which drives
//! deterministic output naming.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;

use crate::error::{TeamcardError, TeamcardResult};

/// Upstream column headers. The coordinate column has two spellings in the
/// wild: the long authoring note and a plain alias.
mod columns {
    pub const REGION: &str = "지역";
    pub const CATEGORY: &str = "구분";
    pub const TEAM_NAME: &str = "팀명";
    pub const DAY: &str = "요일";
    pub const CLASS_TIME: &str = "수업시간";
    pub const COACH: &str = "메인코치";
    pub const ASSISTANT_COACH: &str = "부코치";
    pub const MANAGER: &str = "매니저";
    pub const LEADER: &str = "리더";
    pub const MEETING_PLACE: &str = "집합 장소명";
    pub const PARKING: &str = "주차장명";
    pub const COORDS: &str = "집합 장소 좌표\n구글에서 찾아넣기";
    pub const COORDS_ALIAS: &str = "좌표";
    pub const COLOR: &str = "지역컬러";
    pub const NOTES: &str = "특이사항";
    pub const VISIBLE: &str = "노출여부";
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub region: String,
    pub category: String,
    pub team_name: String,
    pub day: String,
    pub class_time: String,
    pub coach: String,
    pub assistant_coach: String,
    pub manager: String,
    pub leader: String,
    pub meeting_place: String,
    pub parking: String,
    pub coords: String,
    pub color: String,
    pub notes: String,
    pub visible: String,
}

impl Record {
    /// Build a record from one source row. Unknown keys are ignored, missing
    /// keys become empty strings.
    pub fn from_row(row: &BTreeMap<String, String>) -> Self {
        let field = |key: &str| row.get(key).cloned().unwrap_or_default();
        let coords = row
            .get(columns::COORDS)
            .or_else(|| row.get(columns::COORDS_ALIAS))
            .cloned()
            .unwrap_or_default();

        Self {
            region: field(columns::REGION),
            category: field(columns::CATEGORY),
            team_name: field(columns::TEAM_NAME),
            day: field(columns::DAY),
            class_time: field(columns::CLASS_TIME),
            coach: field(columns::COACH),
            assistant_coach: field(columns::ASSISTANT_COACH),
            manager: field(columns::MANAGER),
            leader: field(columns::LEADER),
            meeting_place: field(columns::MEETING_PLACE),
            parking: field(columns::PARKING),
            coords,
            color: field(columns::COLOR),
            notes: field(columns::NOTES),
            visible: field(columns::VISIBLE),
        }
    }

    /// Team name first, region as fallback.
    pub fn display_name(&self) -> &str {
        if self.team_name.is_empty() {
            &self.region
        } else {
            &self.team_name
        }
    }

    /// A row qualifies for generation only with both a region and a day.
    pub fn is_eligible(&self) -> bool {
        !self.region.trim().is_empty() && !self.day.trim().is_empty()
    }

    /// Eligible rows are included in a batch only when explicitly marked
    /// visible (`Y`/`y`).
    pub fn is_visible(&self) -> bool {
        self.visible == "Y" || self.visible == "y"
    }
}

/// Map raw rows to records and keep only eligible, visible ones, preserving
/// row order.
pub fn filter_batch(rows: &[BTreeMap<String, String>]) -> Vec<Record> {
    rows.iter()
        .map(Record::from_row)
        .filter(|r| {
            let keep = r.is_eligible() && r.is_visible();
            if !keep && r.is_eligible() {
                tracing::debug!(team = %r.display_name(), visible = %r.visible, "row hidden");
            }
            keep
        })
        .collect()
}

/// Load a batch from a JSON array of string maps.
pub fn load_records(path: &Path) -> TeamcardResult<Vec<Record>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read records '{}'", path.display()))?;
    let rows: Vec<BTreeMap<String, String>> =
        serde_json::from_str(&raw).map_err(|e| TeamcardError::serde(e.to_string()))?;
    let batch = filter_batch(&rows);
    tracing::info!(total = rows.len(), included = batch.len(), "records loaded");
    Ok(batch)
}
