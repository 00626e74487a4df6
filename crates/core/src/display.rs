//! Presentation metadata for engine enums.
//!
//! Lookup tables only. Decision logic lives with the components that
//! produce these values.

use crate::types::{Priority, TrendDirection, Verdict};

/// Label, color and icon used when rendering a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMeta {
    pub label: &'static str,
    /// CSS-style color name.
    pub color: &'static str,
    pub icon: &'static str,
}

static VERDICT_META: [(Verdict, DisplayMeta); 5] = [
    (Verdict::VeryLow, DisplayMeta { label: "Very Low", color: "blue", icon: "⬇" }),
    (Verdict::Low, DisplayMeta { label: "Low", color: "teal", icon: "↓" }),
    (Verdict::Fair, DisplayMeta { label: "Fair", color: "green", icon: "✓" }),
    (Verdict::High, DisplayMeta { label: "High", color: "orange", icon: "↑" }),
    (Verdict::VeryHigh, DisplayMeta { label: "Very High", color: "red", icon: "⬆" }),
];

static TREND_META: [(TrendDirection, DisplayMeta); 4] = [
    (TrendDirection::Rising, DisplayMeta { label: "Rising", color: "green", icon: "📈" }),
    (TrendDirection::Falling, DisplayMeta { label: "Falling", color: "red", icon: "📉" }),
    (TrendDirection::Stable, DisplayMeta { label: "Stable", color: "gray", icon: "➖" }),
    (TrendDirection::Volatile, DisplayMeta { label: "Volatile", color: "purple", icon: "〰" }),
];

static PRIORITY_META: [(Priority, DisplayMeta); 3] = [
    (Priority::High, DisplayMeta { label: "High", color: "red", icon: "●" }),
    (Priority::Medium, DisplayMeta { label: "Medium", color: "amber", icon: "◐" }),
    (Priority::Low, DisplayMeta { label: "Low", color: "gray", icon: "○" }),
];

fn lookup<K: PartialEq + Copy>(table: &'static [(K, DisplayMeta)], key: K) -> &'static DisplayMeta {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, meta)| meta)
        // Tables cover every variant; see test_tables_are_complete.
        .unwrap_or(&table[0].1)
}

impl Verdict {
    pub fn meta(self) -> &'static DisplayMeta {
        lookup(&VERDICT_META, self)
    }
}

impl TrendDirection {
    pub fn meta(self) -> &'static DisplayMeta {
        lookup(&TREND_META, self)
    }
}

impl Priority {
    pub fn meta(self) -> &'static DisplayMeta {
        lookup(&PRIORITY_META, self)
    }
}
