//! Einstein notation: tensors bound to placeholder indices, and their
//! pairwise contraction.
//!
//! Binding a tensor (`Tensor::bind`) computes nothing, it records which
//! placeholder labels which dimension. `contract` then sums over every
//! placeholder shared by the two operands:
//!
//! ```
//! use dense_tensors::{Tensor, TensorOwned, Layout};
//! use dense_tensors::index::placeholders::{I, J, K};
//! use dense_tensors::einsum::contract;
//!
//! let a = Tensor::from_vec(vec![1., 2., 3., 4.], [2, 2], &Layout::LastOrder).unwrap();
//! let b: TensorOwned<f64> = Tensor::ones([2, 3]);
//! let c = contract(&a.bind(&[I, J]).unwrap(), &b.bind(&[J, K]).unwrap()).unwrap();
//! assert_eq!(c.to_vec(), vec![3., 3., 3., 7., 7., 7.]);
//! ```

use std::ops::Deref;

use log::debug;
use num::traits::Num;
use smallvec::SmallVec;

use crate::errors::{Result, TensorError};
use crate::extents::{Extents, STACK_DIMS};
use crate::index::Placeholder;
use crate::tensor::{Indices, Tensor, TensorOwned};

/// A tensor paired with one placeholder per dimension
#[derive(Debug)]
pub struct BoundTensor<'a, N: 'a, Storage: 'a>
where Storage: Deref<Target=[N]> {
    tensor: &'a Tensor<N, Storage>,
    indices: SmallVec<[Placeholder; STACK_DIMS]>,
}

impl<'a, N: 'a, Storage> BoundTensor<'a, N, Storage>
where Storage: Deref<Target=[N]> {

    /// The arity has been checked by `Tensor::bind`
    pub(crate) fn new(tensor: &'a Tensor<N, Storage>,
                      indices: &[Placeholder]) -> Self {
        BoundTensor {
            tensor: tensor,
            indices: indices.iter().copied().collect(),
        }
    }

    pub fn tensor(&self) -> &'a Tensor<N, Storage> {
        self.tensor
    }

    pub fn indices(&self) -> &[Placeholder] {
        &self.indices[..]
    }

    fn labelled_extents(&self) -> impl Iterator<Item=(Placeholder, usize)> + '_ {
        self.indices.iter().copied().zip(self.tensor.extents().iter().copied())
    }
}

#[derive(Debug)]
struct Label {
    placeholder: Placeholder,
    extent: usize,
    count: usize,
}

/// Distinct labels in order of appearance, and the label position of every
/// placeholder of `labelled`
fn collect_labels<I>(labelled: I) -> Result<(Vec<Label>, Vec<usize>)>
where I: IntoIterator<Item=(Placeholder, usize)> {
    let mut labels: Vec<Label> = Vec::new();
    let mut positions = Vec::new();
    for (placeholder, extent) in labelled {
        let found = labels.iter().position(|l| l.placeholder == placeholder);
        let pos = match found {
            Some(pos) => {
                let label = &mut labels[pos];
                if label.extent != extent {
                    return Err(TensorError::shape_mismatch(&[label.extent],
                                                           &[extent]));
                }
                label.count += 1;
                pos
            }
            None => {
                labels.push(Label {
                    placeholder: placeholder,
                    extent: extent,
                    count: 1,
                });
                labels.len() - 1
            }
        };
        positions.push(pos);
    }
    Ok((labels, positions))
}

/// Contract two bound tensors.
///
/// A placeholder occurring once across both operands is free and becomes a
/// dimension of the result, in order of appearance (`lhs` first). Every
/// other placeholder is summed over. Placeholders sharing a label must have
/// equal extents. Without free placeholders the result has rank zero.
pub fn contract<N, S1, S2>(lhs: &BoundTensor<N, S1>,
                           rhs: &BoundTensor<N, S2>) -> Result<TensorOwned<N>>
where N: Num + Copy,
      S1: Deref<Target=[N]>,
      S2: Deref<Target=[N]> {
    let (labels, positions) = collect_labels(lhs.labelled_extents()
                                                .chain(rhs.labelled_extents()))?;
    let (lhs_pos, rhs_pos) = positions.split_at(lhs.indices().len());
    let free: Vec<usize> = (0..labels.len()).filter(|&k| labels[k].count == 1)
                                            .collect();
    let summed: Vec<usize> = (0..labels.len()).filter(|&k| labels[k].count > 1)
                                              .collect();
    let out_extents: Extents = free.iter().map(|&k| labels[k].extent).collect();
    let sum_extents: Extents = summed.iter().map(|&k| labels[k].extent)
                                     .collect();
    debug!("contracting {:?} with {:?}: free {:?}, summed {:?}",
           lhs.indices(), rhs.indices(), out_extents, sum_extents);

    let mut assignment = vec![0usize; labels.len()];
    let mut lhs_idx = vec![0usize; lhs_pos.len()];
    let mut rhs_idx = vec![0usize; rhs_pos.len()];

    let mut values = Vec::with_capacity(out_extents.product());
    for out_idx in Indices::new(&out_extents) {
        for (&k, &i) in free.iter().zip(out_idx.iter()) {
            assignment[k] = i;
        }
        let mut acc = N::zero();
        for sum_idx in Indices::new(&sum_extents) {
            for (&k, &i) in summed.iter().zip(sum_idx.iter()) {
                assignment[k] = i;
            }
            for (slot, &k) in lhs_idx.iter_mut().zip(lhs_pos) {
                *slot = assignment[k];
            }
            for (slot, &k) in rhs_idx.iter_mut().zip(rhs_pos) {
                *slot = assignment[k];
            }
            let a = lhs.tensor.data()[lhs.tensor.offset_of(&lhs_idx)];
            let b = rhs.tensor.data()[rhs.tensor.offset_of(&rhs_idx)];
            acc = acc + a * b;
        }
        values.push(acc);
    }

    let mut out = TensorOwned::zeros(out_extents);
    out.write_c_order(values);
    Ok(out)
}
