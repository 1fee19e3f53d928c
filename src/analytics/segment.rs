use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::Serialize;

use super::AnalyticsConfig;
use super::summary::{Summary, summarize};
use crate::model::{OptionRecord, Snapshot};

/// Expiry bucket by days to expiration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    NearTerm,
    MidTerm,
    FarDated,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::NearTerm, Segment::MidTerm, Segment::FarDated];

    /// Bucket for `days`. Boundaries belong to the shorter segment.
    pub fn classify(days: i64, config: &AnalyticsConfig) -> Segment {
        if days <= config.near_term_max_days {
            Segment::NearTerm
        } else if days <= config.mid_term_max_days {
            Segment::MidTerm
        } else {
            Segment::FarDated
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Segment::NearTerm => "near_term",
            Segment::MidTerm => "mid_term",
            Segment::FarDated => "far_dated",
        }
    }

    /// Human-readable name with the configured day ranges.
    pub fn label(&self, config: &AnalyticsConfig) -> String {
        match self {
            Segment::NearTerm => format!("Near-term (0-{} days)", config.near_term_max_days),
            Segment::MidTerm => format!(
                "Mid-term ({}-{} days)",
                config.near_term_max_days + 1,
                config.mid_term_max_days
            ),
            Segment::FarDated => format!("Far-dated (>{} days)", config.mid_term_max_days),
        }
    }
}

/// A partition of a snapshot's records into the three segments.
#[derive(Debug, Clone, Default)]
pub struct Segments<'a> {
    pub near_term: Vec<&'a OptionRecord>,
    pub mid_term: Vec<&'a OptionRecord>,
    pub far_dated: Vec<&'a OptionRecord>,
}

impl<'a> Segments<'a> {
    pub fn get(&self, segment: Segment) -> &[&'a OptionRecord] {
        match segment {
            Segment::NearTerm => &self.near_term,
            Segment::MidTerm => &self.mid_term,
            Segment::FarDated => &self.far_dated,
        }
    }

    pub fn len(&self) -> usize {
        self.near_term.len() + self.mid_term.len() + self.far_dated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `snapshot` by days to expiration. Every record lands in exactly one segment.
pub fn segment<'a>(snapshot: &'a Snapshot, config: &AnalyticsConfig) -> Segments<'a> {
    let mut out = Segments::default();
    for r in snapshot.records() {
        match Segment::classify(r.days_to_expiration, config) {
            Segment::NearTerm => out.near_term.push(r),
            Segment::MidTerm => out.mid_term.push(r),
            Segment::FarDated => out.far_dated.push(r),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SegmentStats {
    pub segment: Segment,
    pub name: String,
    /// Distinct expiries in the segment, ascending.
    pub expirations: Vec<NaiveDate>,
    #[serde(flatten)]
    pub summary: Summary,
}

impl SegmentStats {
    fn compute(segment: Segment, records: &[&OptionRecord], config: &AnalyticsConfig) -> Self {
        let summary = if records.is_empty() {
            Summary::empty()
        } else {
            summarize(records.iter().copied(), config.top_n)
        };
        let mut expirations: Vec<NaiveDate> = records.iter().map(|r| r.expiration_date).collect();
        expirations.sort();
        expirations.dedup();
        SegmentStats {
            segment,
            name: segment.label(config),
            expirations,
            summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SegmentedData {
    pub near_term: SegmentStats,
    pub mid_term: SegmentStats,
    pub far_dated: SegmentStats,
}

impl SegmentedData {
    pub fn get(&self, segment: Segment) -> &SegmentStats {
        match segment {
            Segment::NearTerm => &self.near_term,
            Segment::MidTerm => &self.mid_term,
            Segment::FarDated => &self.far_dated,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SegmentStats> {
        Segment::ALL.into_iter().map(|s| self.get(s))
    }
}

/// Per-segment statistics. Empty segments yield a zero-valued summary.
pub fn segment_stats(snapshot: &Snapshot, config: &AnalyticsConfig) -> SegmentedData {
    let segments = segment(snapshot, config);
    SegmentedData {
        near_term: SegmentStats::compute(Segment::NearTerm, &segments.near_term, config),
        mid_term: SegmentStats::compute(Segment::MidTerm, &segments.mid_term, config),
        far_dated: SegmentStats::compute(Segment::FarDated, &segments.far_dated, config),
    }
}
