//! Extents: per-dimension sizes of a tensor

use smallvec::SmallVec;
use std::fmt;
use std::iter::FromIterator;
use std::ops::Deref;

/// Most tensors have four or fewer dimensions, those stay on the stack
pub(crate) const STACK_DIMS: usize = 4;

/// Ordered sizes, one per dimension. The rank is the number of entries.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extents(SmallVec<[usize; STACK_DIMS]>);

impl Extents {
    pub fn new() -> Self {
        Extents(SmallVec::new())
    }

    /// Number of dimensions
    #[inline]
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements addressed by these extents.
    ///
    /// The empty extents describe a scalar and hold one element.
    #[inline]
    pub fn product(&self) -> usize {
        self.0.iter().product()
    }

    pub fn as_slice(&self) -> &[usize] {
        self.0.as_slice()
    }

    pub(crate) fn push(&mut self, extent: usize) {
        self.0.push(extent);
    }
}

impl Deref for Extents {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        self.0.as_slice()
    }
}

impl AsRef<[usize]> for Extents {
    fn as_ref(&self) -> &[usize] {
        self.0.as_slice()
    }
}

impl fmt::Debug for Extents {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Vec<usize>> for Extents {
    fn from(value: Vec<usize>) -> Self {
        Extents(value.into_iter().collect())
    }
}

impl From<&[usize]> for Extents {
    fn from(value: &[usize]) -> Self {
        Extents(value.iter().copied().collect())
    }
}

impl<const D: usize> From<[usize; D]> for Extents {
    fn from(value: [usize; D]) -> Self {
        Extents(value.into_iter().collect())
    }
}

impl<const D: usize> From<&[usize; D]> for Extents {
    fn from(value: &[usize; D]) -> Self {
        Extents(value.iter().copied().collect())
    }
}

impl FromIterator<usize> for Extents {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Extents(iter.into_iter().collect())
    }
}
