//! Frame windows and the structured key that identifies a primitive task.
//!
//! Raw program files key their entries with a tuple literal such as
//! `((0, 10), (2, 8), None)`: the whole-body window followed by the optional
//! left-hand and right-hand windows. [`FrameRangeDef`] parses that text once
//! at load time and is used as a plain hashable key afterwards.

use regex::Regex;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::Error;

static FRAME_RANGE_DEF_RE: LazyLock<Regex> = LazyLock::new(|| {
    let range = r"[(\[]\s*(-?\d+)\s*,\s*(-?\d+)\s*[)\]]";
    let slot = format!(r"(?:{range}|None)");
    Regex::new(&format!(
        r"^\s*[(\[]\s*{range}\s*,\s*{slot}\s*,\s*{slot}\s*,?\s*[)\]]\s*$"
    ))
    .unwrap()
});

/// Half-open `[start, end)` frame interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRange {
    pub start: i64,
    pub end: i64,
}

impl FrameRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Number of frames covered; inverted ranges count as empty.
    pub fn len(&self) -> usize {
        if self.end <= self.start {
            return 0;
        }
        self.end.abs_diff(self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn frames(&self) -> Range<i64> {
        self.start..self.end.max(self.start)
    }

    pub fn contains(&self, frame: i64) -> bool {
        self.start <= frame && frame < self.end
    }

    /// The part of `other` that lies inside `self`. A disjoint `other`
    /// yields an empty range pinned to the nearer edge of `self`.
    pub fn clip(&self, other: &FrameRange) -> FrameRange {
        let end_bound = self.end.max(self.start);
        let start = self.start.max(other.start).min(end_bound);
        let end = end_bound.min(other.end).max(start);
        FrameRange { start, end }
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

/// One side of the body's hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    /// Key prefix used for this hand's parameters in annotation blobs.
    pub fn prefix(&self) -> &'static str {
        match self {
            Hand::Left => "lh",
            Hand::Right => "rh",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Which hands a primitive task engages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandInvolved {
    Left,
    Right,
    Both,
    Neither,
}

impl fmt::Display for HandInvolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandInvolved::Left => write!(f, "lh"),
            HandInvolved::Right => write!(f, "rh"),
            HandInvolved::Both => write!(f, "bh"),
            HandInvolved::Neither => write!(f, "none"),
        }
    }
}

/// Whole-body window plus the optional per-hand activity windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRangeDef {
    pub whole: FrameRange,
    pub lh: Option<FrameRange>,
    pub rh: Option<FrameRange>,
}

impl FrameRangeDef {
    pub fn new(whole: FrameRange, lh: Option<FrameRange>, rh: Option<FrameRange>) -> Self {
        Self { whole, lh, rh }
    }

    pub fn hand(&self, hand: Hand) -> Option<FrameRange> {
        match hand {
            Hand::Left => self.lh,
            Hand::Right => self.rh,
        }
    }

    pub fn hand_involved(&self) -> HandInvolved {
        match (self.lh, self.rh) {
            (Some(_), Some(_)) => HandInvolved::Both,
            (Some(_), None) => HandInvolved::Left,
            (None, Some(_)) => HandInvolved::Right,
            (None, None) => HandInvolved::Neither,
        }
    }
}

fn fmt_slot(slot: &Option<FrameRange>) -> String {
    match slot {
        Some(r) => r.to_string(),
        None => "None".to_string(),
    }
}

impl fmt::Display for FrameRangeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.whole,
            fmt_slot(&self.lh),
            fmt_slot(&self.rh)
        )
    }
}

impl FromStr for FrameRangeDef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = FRAME_RANGE_DEF_RE
            .captures(s)
            .ok_or_else(|| Error::FrameRangeParse(s.to_string()))?;
        let bound = |i: usize| -> Result<Option<i64>, Error> {
            caps.get(i)
                .map(|m| {
                    m.as_str()
                        .parse::<i64>()
                        .map_err(|_| Error::FrameRangeParse(s.to_string()))
                })
                .transpose()
        };
        let slot = |i: usize| -> Result<Option<FrameRange>, Error> {
            Ok(match (bound(i)?, bound(i + 1)?) {
                (Some(start), Some(end)) => Some(FrameRange::new(start, end)),
                _ => None,
            })
        };
        let whole = slot(1)?.ok_or_else(|| Error::FrameRangeParse(s.to_string()))?;
        Ok(Self {
            whole,
            lh: slot(3)?,
            rh: slot(5)?,
        })
    }
}

impl Serialize for FrameRangeDef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FrameRangeDef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DefVisitor;

        impl Visitor<'_> for DefVisitor {
            type Value = FrameRangeDef;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a frame range tuple literal such as ((0, 10), (2, 8), None)")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FrameRangeDef, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(DefVisitor)
    }
}
