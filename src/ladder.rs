//! The fixed quality ladder.
//!
//! Every photo shown in the gallery is offered in exactly eight variants:
//! the re-encoded `original` plus seven derived entries, each a pair of
//! (compression factor, fraction of the original width).
//!
//! | key | compression | width fraction |
//! |---|---|---|
//! | high | 0.8 | 0.8 |
//! | medium | 0.8 | 0.6 |
//! | low | 0.9 | 0.4 |
//! | low1 | 0.8 | 0.4 |
//! | low2 | 0.7 | 0.4 |
//! | low3 | 0.6 | 0.4 |
//! | low4 | 0.0 | 0.4 |
//!
//! The table is data, not a ranking. `low` encodes at a *higher* fidelity than
//! `high` and `medium`, and shares its width with `low1..low4`. Keys are kept
//! in this order for presentation only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name of one entry in the variant set.
///
/// The derived `Ord` follows declaration order, which is the selector strip
/// order. Nothing else should read meaning into it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VariantKey {
    #[default]
    Original,
    High,
    Medium,
    Low,
    Low1,
    Low2,
    Low3,
    Low4,
}

impl VariantKey {
    /// All keys in presentation order.
    pub const ALL: [VariantKey; 8] = [
        VariantKey::Original,
        VariantKey::High,
        VariantKey::Medium,
        VariantKey::Low,
        VariantKey::Low1,
        VariantKey::Low2,
        VariantKey::Low3,
        VariantKey::Low4,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VariantKey::Original => "original",
            VariantKey::High => "high",
            VariantKey::Medium => "medium",
            VariantKey::Low => "low",
            VariantKey::Low1 => "low1",
            VariantKey::Low2 => "low2",
            VariantKey::Low3 => "low3",
            VariantKey::Low4 => "low4",
        }
    }

    /// Human-readable label shown above the preview.
    pub fn label(self) -> &'static str {
        match self {
            VariantKey::Original => "Original Quality",
            VariantKey::High => "High Quality",
            VariantKey::Medium => "Medium Quality",
            VariantKey::Low => "Low Quality",
            VariantKey::Low1 => "Low1",
            VariantKey::Low2 => "Low2",
            VariantKey::Low3 => "Low3",
            VariantKey::Low4 => "Low4",
        }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown quality '{0}' (expected one of: original, high, medium, low, low1, low2, low3, low4)")]
pub struct UnknownVariantKey(pub String);

impl FromStr for VariantKey {
    type Err = UnknownVariantKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariantKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariantKey(s.to_string()))
    }
}

/// One derived entry of the ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderStep {
    pub key: VariantKey,
    /// 1.0 = maximum fidelity, 0.0 = maximum compression.
    pub compression: f32,
    /// Target width as a fraction of the original width.
    pub width_fraction: f64,
}

const fn step(key: VariantKey, compression: f32, width_fraction: f64) -> LadderStep {
    LadderStep {
        key,
        compression,
        width_fraction,
    }
}

/// The seven derived entries, in derivation order.
pub const LADDER: [LadderStep; 7] = [
    step(VariantKey::High, 0.8, 0.8),
    step(VariantKey::Medium, 0.8, 0.6),
    step(VariantKey::Low, 0.9, 0.4),
    step(VariantKey::Low1, 0.8, 0.4),
    step(VariantKey::Low2, 0.7, 0.4),
    step(VariantKey::Low3, 0.6, 0.4),
    step(VariantKey::Low4, 0.0, 0.4),
];

/// Compression factor used to re-encode the `original` entry.
pub const ORIGINAL_COMPRESSION: f32 = 1.0;
