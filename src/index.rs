//! Multi-index addressing and placeholder indices

use std::fmt;

/// Flat storage offset of a multi-index: the sum of `strides[r] * indices[r]`.
///
/// Neither the arity nor the bounds are checked here: callers validate
/// them before addressing.
#[inline]
pub fn to_index(strides: &[isize], indices: &[usize]) -> isize {
    indices.iter().zip(strides)
                  .map(|(&i, &s)| i as isize * s)
                  .fold(0, |sum, x| sum + x)
}

/// A symbolic index used to declare a contraction before evaluating it.
///
/// Two placeholders denote the same index when their ids are equal.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placeholder(pub usize);

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "_{}", self.0)
    }
}

/// Predeclared placeholders
pub mod placeholders {
    use super::Placeholder;

    pub const I: Placeholder = Placeholder(1);
    pub const J: Placeholder = Placeholder(2);
    pub const K: Placeholder = Placeholder(3);
    pub const L: Placeholder = Placeholder(4);
    pub const M: Placeholder = Placeholder(5);
}
