//! Affine index ranges over a single tensor dimension.
//!
//! A `Span` is the triple `(first, step, last)` describing the coordinates
//! `first, first + step, first + 2 * step, ...` stopping before `last`.
//! Spans compose: a span expressed relative to another span can be rewritten
//! in absolute coordinates, which lets nested slicing collapse into a single
//! span per dimension.

use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::errors::{Result, TensorError};

/// Selection of indices along one dimension.
///
/// Zero based, half-open. The default span covers the whole dimension: its
/// `last` is the sentinel `Span::MAX`, which is only turned into a concrete
/// extent by the consumer (see `resolve`).
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawSpan"))]
pub struct Span {
    first: isize,
    step: isize,
    last: isize,
}

impl Span {
    /// Sentinel `last` meaning "until the extent of the dimension"
    pub const MAX: isize = isize::MAX;

    /// Span over the complete dimension, e.g. `a(:)`
    pub const fn full() -> Span {
        Span {
            first: 0,
            step: 1,
            last: Span::MAX,
        }
    }

    /// Span over `[0, l)`
    pub const fn upto(l: isize) -> Span {
        Span {
            first: 0,
            step: 1,
            last: l,
        }
    }

    /// Span over `[f, l)` with a unit step
    pub const fn range(f: isize, l: isize) -> Span {
        Span {
            first: f,
            step: 1,
            last: l,
        }
    }

    /// Span over `f, f + s, ...` stopping before `l`.
    ///
    /// A zero step is only accepted for the degenerate span `f == l`, which
    /// selects the single coordinate `f`.
    pub fn new(f: isize, s: isize, l: isize) -> Result<Span> {
        if s == 0 && f != l {
            return Err(TensorError::InvalidSpan { first: f, last: l });
        }
        Ok(Span {
            first: f,
            step: s,
            last: l,
        })
    }

    pub fn first(&self) -> isize {
        self.first
    }

    pub fn step(&self) -> isize {
        self.step
    }

    pub fn last(&self) -> isize {
        self.last
    }

    /// Whether `last` is still the "until the end" sentinel
    pub fn is_full(&self) -> bool {
        self.last == Span::MAX
    }

    /// Absolute coordinate of the `idx`-th selected position.
    ///
    /// This is not checked against `last`.
    pub fn at(&self, idx: usize) -> isize {
        self.first + idx as isize * self.step
    }

    /// Rewrite `inner`, whose coordinates are relative to `self`, in the
    /// coordinates `self` is expressed in.
    ///
    /// An inner span still carrying the `MAX` sentinel runs until the end of
    /// `self`, so composing with `Span::full()` on either side is the
    /// identity.
    ///
    /// Every field saturates at the bounds of `isize`.
    pub fn compose(&self, inner: &Span) -> Span {
        let last = if inner.is_full() {
            self.last
        } else {
            inner.last.saturating_mul(self.step).saturating_add(self.first)
        };
        Span {
            first: inner.first.saturating_mul(self.step)
                              .saturating_add(self.first),
            step: self.step.saturating_mul(inner.step),
            last: last,
        }
    }

    /// Replace the `MAX` sentinel by the concrete extent of a dimension.
    ///
    /// For a negative step the sentinel means "down to the first index", so
    /// it resolves to `-1`.
    pub fn resolve(&self, extent: usize) -> Span {
        if !self.is_full() {
            return *self;
        }
        let last = if self.step < 0 { -1 } else { extent as isize };
        Span {
            first: self.first,
            step: self.step,
            last: last,
        }
    }

    /// Number of selected positions.
    ///
    /// A degenerate span (zero step) selects exactly one position.
    pub fn len(&self) -> usize {
        let (first, step, last) = (self.first as i128, self.step as i128,
                                   self.last as i128);
        let count = if step == 0 {
            1
        } else if step > 0 && last > first {
            (last - first + step - 1) / step
        } else if step < 0 && first > last {
            (first - last - step - 1) / -step
        } else {
            0
        };
        count.min(usize::MAX as i128) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Deserialized fields, checked by `Span::new` before becoming a `Span`
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawSpan {
    first: isize,
    step: isize,
    last: isize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawSpan> for Span {
    type Error = TensorError;

    fn try_from(raw: RawSpan) -> Result<Span> {
        Span::new(raw.first, raw.step, raw.last)
    }
}

impl Default for Span {
    fn default() -> Span {
        Span::full()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}:{}:{}]", self.first, self.step, self.last)
    }
}

impl From<Range<isize>> for Span {
    fn from(r: Range<isize>) -> Span {
        Span::range(r.start, r.end)
    }
}

impl From<RangeTo<isize>> for Span {
    fn from(r: RangeTo<isize>) -> Span {
        Span::upto(r.end)
    }
}

impl From<RangeFrom<isize>> for Span {
    fn from(r: RangeFrom<isize>) -> Span {
        Span::range(r.start, Span::MAX)
    }
}

impl From<RangeFull> for Span {
    fn from(_: RangeFull) -> Span {
        Span::full()
    }
}

/// Shorthand for `Span::range(f, l)`
pub fn ran(f: isize, l: isize) -> Span {
    Span::range(f, l)
}

/// Shorthand for `Span::new(f, s, l)`
pub fn ran_step(f: isize, s: isize, l: isize) -> Result<Span> {
    Span::new(f, s, l)
}
