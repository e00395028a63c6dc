// ⚖️ Weight Extraction - pull a weight range (pounds) out of free text
// Ordered patterns, first pattern with a usable match wins.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::sync::LazyLock;
use tracing::warn;

// ============================================================================
// WEIGHT RANGE
// ============================================================================

/// Closed interval of adult weight in pounds. Always `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeightRange {
    min: u32,
    max: u32,
}

impl WeightRange {
    /// Build a range from two ends in any order (inverted ends are swapped)
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b {
            WeightRange { min: a, max: b }
        } else {
            WeightRange { min: b, max: a }
        }
    }

    /// Single reported weight: both ends equal
    pub fn single(weight: u32) -> Self {
        WeightRange {
            min: weight,
            max: weight,
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    /// Heavier end; this is what size classification uses
    pub fn max(&self) -> u32 {
        self.max
    }
}

impl fmt::Display for WeightRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{} lbs", self.max)
        } else {
            write!(f, "{}-{} lbs", self.min, self.max)
        }
    }
}

// ============================================================================
// PATTERNS
// ============================================================================

static WEIGHS_POUNDS_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)weighs?\s*([0-9]+)\s*[-–]\s*([0-9]+)\s*pounds?").unwrap());

static POUNDS_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+)\s*[-–]\s*([0-9]+)\s*pounds?").unwrap());

static POUNDS_TO_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+)\s*to\s*([0-9]+)\s*pounds?").unwrap());

static LBS_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+)\s*[-–]\s*([0-9]+)\s*lbs?").unwrap());

static LBS_TO_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+)\s*to\s*([0-9]+)\s*lbs?").unwrap());

static POUNDS_SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+)\s*pounds?").unwrap());

static LBS_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)([0-9]+)\s*lbs?").unwrap());

/// Textual weight phrasings, most specific first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightPattern {
    /// "weighs 20-30 pounds"
    WeighsPoundsRange,
    /// "20-30 pounds"
    PoundsRange,
    /// "20 to 30 pounds"
    PoundsToRange,
    /// "20-30 lbs"
    LbsRange,
    /// "20 to 30 lbs"
    LbsToRange,
    /// "20 pounds"
    Pounds,
    /// "20 lbs"
    Lbs,
}

impl WeightPattern {
    /// Precedence order: earlier patterns are tried first
    pub const ORDER: [WeightPattern; 7] = [
        WeightPattern::WeighsPoundsRange,
        WeightPattern::PoundsRange,
        WeightPattern::PoundsToRange,
        WeightPattern::LbsRange,
        WeightPattern::LbsToRange,
        WeightPattern::Pounds,
        WeightPattern::Lbs,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            WeightPattern::WeighsPoundsRange => "weighs N-M pounds",
            WeightPattern::PoundsRange => "N-M pounds",
            WeightPattern::PoundsToRange => "N to M pounds",
            WeightPattern::LbsRange => "N-M lbs",
            WeightPattern::LbsToRange => "N to M lbs",
            WeightPattern::Pounds => "N pounds",
            WeightPattern::Lbs => "N lbs",
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            WeightPattern::WeighsPoundsRange => &WEIGHS_POUNDS_RANGE,
            WeightPattern::PoundsRange => &POUNDS_RANGE,
            WeightPattern::PoundsToRange => &POUNDS_TO_RANGE,
            WeightPattern::LbsRange => &LBS_RANGE,
            WeightPattern::LbsToRange => &LBS_TO_RANGE,
            WeightPattern::Pounds => &POUNDS_SINGLE,
            WeightPattern::Lbs => &LBS_SINGLE,
        }
    }

    fn is_range(&self) -> bool {
        !matches!(self, WeightPattern::Pounds | WeightPattern::Lbs)
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// A weight found in text, with the phrasing that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightMatch {
    pub range: WeightRange,
    pub pattern: WeightPattern,
}

/// Extract a weight range from a description.
///
/// Returns `None` when no supported phrasing yields a parseable number; that
/// is "no weight found", not zero.
pub fn extract_weight(description: &str) -> Option<WeightRange> {
    extract_weight_match(description).map(|m| m.range)
}

/// Like [`extract_weight`], but also reports which pattern matched.
pub fn extract_weight_match(description: &str) -> Option<WeightMatch> {
    for pattern in WeightPattern::ORDER {
        // Only the first match of each pattern is considered
        let Some(caps) = pattern.regex().captures(description) else {
            continue;
        };

        match parse_captures(&caps, pattern) {
            Some(range) => return Some(WeightMatch { range, pattern }),
            None => {
                warn!(
                    pattern = pattern.label(),
                    text = &caps[0],
                    "unparseable weight capture, trying next pattern"
                );
            }
        }
    }

    None
}

/// Patterns match ASCII digits only. A number too large for `u32` saturates
/// to `u32::MAX`: it is still a weight, and the heaviest one.
fn parse_captures(caps: &regex::Captures<'_>, pattern: WeightPattern) -> Option<WeightRange> {
    let first = parse_pounds(caps.get(1)?.as_str())?;

    if pattern.is_range() {
        let second = parse_pounds(caps.get(2)?.as_str())?;
        Some(WeightRange::new(first, second))
    } else {
        Some(WeightRange::single(first))
    }
}

fn parse_pounds(digits: &str) -> Option<u32> {
    match digits.parse::<u32>() {
        Ok(pounds) => Some(pounds),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u32::MAX),
        Err(_) => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
