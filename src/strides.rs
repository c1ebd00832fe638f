//! Strides and the layout policies they are derived from

use smallvec::SmallVec;
use std::fmt;
use std::iter::FromIterator;
use std::ops::Deref;

use crate::errors::{Result, TensorError};
use crate::extents::{Extents, STACK_DIMS};

/// Element offsets between consecutive entries along each dimension.
///
/// Signed, so that views may walk a dimension backwards. Strides are in
/// elements, not bytes.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Strides(SmallVec<[isize; STACK_DIMS]>);

impl Strides {
    pub fn as_slice(&self) -> &[isize] {
        self.0.as_slice()
    }
}

impl Deref for Strides {
    type Target = [isize];

    fn deref(&self) -> &[isize] {
        self.0.as_slice()
    }
}

impl AsRef<[isize]> for Strides {
    fn as_ref(&self) -> &[isize] {
        self.0.as_slice()
    }
}

impl fmt::Debug for Strides {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Vec<isize>> for Strides {
    fn from(value: Vec<isize>) -> Self {
        Strides(value.into_iter().collect())
    }
}

impl<const D: usize> From<[isize; D]> for Strides {
    fn from(value: [isize; D]) -> Self {
        Strides(value.into_iter().collect())
    }
}

impl FromIterator<isize> for Strides {
    fn from_iter<T: IntoIterator<Item = isize>>(iter: T) -> Self {
        Strides(iter.into_iter().collect())
    }
}

/// Describe how a multi-index is laid out in linear storage.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layout {
    /// Fortran order: the first index varies fastest.
    /// For matrices this is column major storage.
    FirstOrder,
    /// C order: the last index varies fastest.
    /// For matrices this is row major storage.
    LastOrder,
    /// Dimensions listed from the fastest varying to the slowest varying.
    Permuted(SmallVec<[usize; STACK_DIMS]>),
}

impl Default for Layout {
    fn default() -> Layout {
        Layout::LastOrder
    }
}

impl Layout {
    /// Build a permuted layout, `order` must be a permutation of `0..order.len()`
    pub fn permuted(order: &[usize]) -> Result<Layout> {
        check_permutation(order)?;
        Ok(Layout::Permuted(order.iter().copied().collect()))
    }

    /// Compute the strides of contiguous storage for `extents`.
    ///
    /// A permuted layout fails if its length differs from the rank, or if
    /// it is not a permutation of the dimensions.
    pub fn to_strides(&self, extents: &Extents) -> Result<Strides> {
        match *self {
            Layout::FirstOrder => Ok(strides_first_order(extents)),
            Layout::LastOrder => Ok(strides_last_order(extents)),
            Layout::Permuted(ref order) => {
                if order.len() != extents.rank() {
                    return Err(TensorError::ArityMismatch {
                        expected: extents.rank(),
                        got: order.len(),
                    });
                }
                check_permutation(order)?;
                let mut strides = vec![0isize; extents.rank()];
                let mut prev = 1isize;
                for &dim in order.iter() {
                    strides[dim] = prev;
                    prev *= extents[dim] as isize;
                }
                Ok(strides.into())
            }
        }
    }
}

fn check_permutation(order: &[usize]) -> Result<()> {
    let mut seen = vec![false; order.len()];
    for &dim in order {
        if dim >= order.len() || seen[dim] {
            return Err(TensorError::InvalidLayout {
                order: order.to_vec(),
            });
        }
        seen[dim] = true;
    }
    Ok(())
}

/// Strides of `extents` laid out under `layout`
pub fn to_strides(extents: &Extents, layout: &Layout) -> Result<Strides> {
    layout.to_strides(extents)
}

pub(crate) fn strides_last_order(extents: &Extents) -> Strides {
    let mut strides: SmallVec<[isize; STACK_DIMS]> =
        SmallVec::from_elem(0, extents.rank());
    let mut prev = 1;
    for (stride, &dim) in strides.iter_mut().rev()
                                 .zip(extents.iter().rev()) {
        *stride = prev;
        prev *= dim as isize;
    }
    Strides(strides)
}

pub(crate) fn strides_first_order(extents: &Extents) -> Strides {
    let mut strides: SmallVec<[isize; STACK_DIMS]> =
        SmallVec::from_elem(0, extents.rank());
    let mut prev = 1;
    for (stride, &dim) in strides.iter_mut().zip(extents.iter()) {
        *stride = prev;
        prev *= dim as isize;
    }
    Strides(strides)
}
