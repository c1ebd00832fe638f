//! A strided tensor implementation

use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut, Index, IndexMut};

use log::{debug, trace};
use num::traits::Num;
use smallvec::SmallVec;

use crate::einsum::BoundTensor;
use crate::errors::{Result, TensorError};
use crate::expr::Expr;
use crate::extents::{Extents, STACK_DIMS};
use crate::index::{to_index, Placeholder};
use crate::span::Span;
use crate::strides::{strides_first_order, strides_last_order, Layout, Strides};
use crate::StorageOrder;

/// A dense tensor over a contiguous piece of memory, the data array, which
/// is interpreted using extents, strides and a base offset.
///
/// The storage type selects the variant: `Vec<N>` owns its elements,
/// `&[N]` and `&mut [N]` are views borrowing another tensor's storage.
#[derive(Debug)]
pub struct Tensor<N, Storage>
where Storage: Deref<Target=[N]> {
    data: Storage,
    extents: Extents,
    strides: Strides,
    offset: usize,
}

pub type TensorView<'a, N> = Tensor<N, &'a [N]>;
pub type TensorViewMut<'a, N> = Tensor<N, &'a mut [N]>;
pub type TensorOwned<N> = Tensor<N, Vec<N>>;

type DimVec<T> = SmallVec<[T; STACK_DIMS]>;

impl<N> Tensor<N, Vec<N>> {

    fn from_parts(data: Vec<N>, extents: Extents,
                  strides: Strides) -> TensorOwned<N> {
        debug!("allocating tensor of extents {:?} with strides {:?}",
               extents, strides);
        Tensor {
            data: data,
            extents: extents,
            strides: strides,
            offset: 0,
        }
    }

    /// Create a tensor of default-constructed elements in C order
    pub fn new<E: Into<Extents>>(extents: E) -> TensorOwned<N>
    where N: Default + Clone {
        Self::from_elem(extents, N::default())
    }

    /// Create a tensor where every element is `value`, in C order
    pub fn from_elem<E: Into<Extents>>(extents: E, value: N) -> TensorOwned<N>
    where N: Clone {
        let extents = extents.into();
        let strides = strides_last_order(&extents);
        let size = extents.product();
        Self::from_parts(vec![value; size], extents, strides)
    }

    /// Create an all-zero tensor in C order
    pub fn zeros<E: Into<Extents>>(extents: E) -> TensorOwned<N>
    where N: Num + Copy {
        Self::from_elem(extents, N::zero())
    }

    /// Create an all-zero tensor in F order
    pub fn zeros_f<E: Into<Extents>>(extents: E) -> TensorOwned<N>
    where N: Num + Copy {
        let extents = extents.into();
        let strides = strides_first_order(&extents);
        let size = extents.product();
        Self::from_parts(vec![N::zero(); size], extents, strides)
    }

    /// Create an all-zero tensor laid out under `layout`
    pub fn zeros_with_layout<E: Into<Extents>>(extents: E, layout: &Layout
                                              ) -> Result<TensorOwned<N>>
    where N: Num + Copy {
        let extents = extents.into();
        let strides = layout.to_strides(&extents)?;
        let size = extents.product();
        Ok(Self::from_parts(vec![N::zero(); size], extents, strides))
    }

    /// Create an all-one tensor in C order
    pub fn ones<E: Into<Extents>>(extents: E) -> TensorOwned<N>
    where N: Num + Copy {
        Self::from_elem(extents, N::one())
    }

    /// Wrap `data`, which is interpreted under `layout`
    pub fn from_vec<E: Into<Extents>>(data: Vec<N>, extents: E,
                                      layout: &Layout
                                     ) -> Result<TensorOwned<N>> {
        let extents = extents.into();
        let expected = extents.product();
        if data.len() != expected {
            return Err(TensorError::DataLength {
                expected: expected,
                got: data.len(),
            });
        }
        let strides = layout.to_strides(&extents)?;
        Ok(Self::from_parts(data, extents, strides))
    }

    /// Get the underlying data array as a vector
    pub fn into_data(self) -> Vec<N> {
        self.data
    }

    /// Replace this tensor by `other`.
    ///
    /// The fields are exchanged with `other`, which then drops this
    /// tensor's former storage. Nothing is copied.
    pub fn assign(&mut self, mut other: TensorOwned<N>) {
        debug!("swap-assigning tensor of extents {:?} over {:?}",
               other.extents, self.extents);
        self.swap(&mut other);
    }

    /// Replace this tensor by a copy of `src`.
    ///
    /// The copy is made before touching `self`: if it cannot be built the
    /// receiver is left unmodified.
    pub fn assign_from<S>(&mut self, src: &Tensor<N, S>)
    where N: Clone,
          S: Deref<Target=[N]> {
        let fresh = src.to_owned();
        self.assign(fresh);
    }
}

/// Methods available for all tensors regardless of their storage
impl<N, Storage> Tensor<N, Storage>
where Storage: Deref<Target=[N]> {

    /// The number of dimensions of this tensor
    pub fn rank(&self) -> usize {
        self.extents.rank()
    }

    /// Alias for `rank`
    pub fn order(&self) -> usize {
        self.rank()
    }

    /// Total number of elements addressed by this tensor
    pub fn size(&self) -> usize {
        self.extents.product()
    }

    /// Extent of dimension `r`
    pub fn extent(&self, r: usize) -> Result<usize> {
        self.extents.get(r).copied().ok_or(TensorError::DimensionOutOfRange {
            dim: r,
            rank: self.rank(),
        })
    }

    /// The extents of the tensor
    pub fn extents(&self) -> &Extents {
        &self.extents
    }

    /// The strides of the tensor.
    ///
    /// # Explanations on a matrix.
    ///
    /// self.strides()[0] gives the number of elements that must be skipped
    /// into self.data() to get to the element of the next row with the same
    /// column.
    /// self.strides()[1] gives the number of elements that must be skipped
    /// into self.data() to get to the element of the next column with the same
    /// row.
    ///
    /// For a row major matrix of extents (3, 4) with contiguous storage,
    /// the strides would be [4, 1].
    pub fn strides(&self) -> &Strides {
        &self.strides
    }

    /// Position in `data()` of the element at the all-zero index.
    /// Always zero for owned tensors.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Access to the tensor's backing storage
    ///
    /// For views this is the parent's storage. The element at index
    /// `[i0, i1, ...]` lives at `offset() + i0 * strides[0] + i1 * strides[1] + ...`
    pub fn data(&self) -> &[N] {
        &self.data[..]
    }

    /// Raw pointer to the backing storage
    pub fn as_ptr(&self) -> *const N {
        self.data.as_ptr()
    }

    /// Whether this tensor addresses no element
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Get the storage order of this tensor
    pub fn ordering(&self) -> StorageOrder {
        let ascending = self.strides.windows(2).all(|w| w[0] < w[1]);
        let descending = self.strides.windows(2).all(|w| w[0] > w[1]);
        match (ascending, descending) {
            (true, false) => StorageOrder::F,
            (false, true) => StorageOrder::C,
            _ => StorageOrder::Unordered,
        }
    }

    /// Dimensions sorted from the fastest varying to the slowest varying
    fn physical_order(&self) -> DimVec<usize> {
        let mut order: DimVec<usize> = (0..self.rank()).collect();
        order.sort_by_key(|&d| (self.strides[d].unsigned_abs(), d));
        order
    }

    /// Returns true if the addressed elements form a dense block of memory
    /// walked with positive strides
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 1isize;
        for dim in self.physical_order() {
            let extent = self.extents[dim];
            if extent == 1 {
                continue;
            }
            if self.strides[dim] != expected {
                return false;
            }
            expected *= extent as isize;
        }
        true
    }

    fn check_arity(&self, got: usize) -> Result<()> {
        if got != self.rank() {
            return Err(TensorError::ArityMismatch {
                expected: self.rank(),
                got: got,
            });
        }
        Ok(())
    }

    /// Storage position of a multi-index, checked against the storage only.
    /// An offset overflowing `isize` is reported as `isize::MAX`.
    fn storage_index(&self, indices: &[usize]) -> Result<usize> {
        self.check_arity(indices.len())?;
        match self.checked_offset(indices) {
            Some(index) => self.check_storage(index),
            None => Err(TensorError::OutOfRange {
                index: isize::MAX,
                size: self.data.len(),
            }),
        }
    }

    fn checked_offset(&self, indices: &[usize]) -> Option<isize> {
        indices.iter().zip(self.strides.iter())
               .try_fold(self.offset as isize, |sum, (&i, &s)| {
                   isize::try_from(i).ok()
                                     .and_then(|i| i.checked_mul(s))
                                     .and_then(|x| sum.checked_add(x))
               })
    }

    fn check_storage(&self, index: isize) -> Result<usize> {
        if index < 0 || index as usize >= self.data.len() {
            return Err(TensorError::OutOfRange {
                index: index,
                size: self.data.len(),
            });
        }
        Ok(index as usize)
    }

    /// Storage position of an in-bounds multi-index
    pub(crate) fn offset_of(&self, indices: &[usize]) -> usize {
        (self.offset as isize + to_index(&self.strides, indices)) as usize
    }

    /// Element access with a multi-index.
    ///
    /// Fails if the number of indices differs from the rank, or if the
    /// addressed position lies outside the storage. Individual indices are
    /// not checked against their extents, see `get` for that.
    pub fn at(&self, indices: &[usize]) -> Result<&N> {
        let index = self.storage_index(indices)?;
        Ok(&self.data[index])
    }

    /// Element access with a flat position into the backing storage
    pub fn at_flat(&self, i: usize) -> Result<&N> {
        let index = self.check_storage(i as isize)?;
        Ok(&self.data[index])
    }

    /// Element access checking every index against its extent
    pub fn get(&self, indices: &[usize]) -> Option<&N> {
        if !self.in_bounds(indices) {
            return None;
        }
        Some(&self.data[self.offset_of(indices)])
    }

    fn in_bounds(&self, indices: &[usize]) -> bool {
        indices.len() == self.rank()
            && indices.iter().zip(self.extents.iter()).all(|(i, e)| i < e)
    }

    fn walk(&self) -> Walk {
        let order = self.physical_order();
        Walk {
            base: self.offset as isize,
            extents: order.iter().map(|&d| self.extents[d]).collect(),
            strides: order.iter().map(|&d| self.strides[d]).collect(),
            front: 0,
            back: self.size(),
        }
    }

    /// Iterate over the elements in storage order.
    ///
    /// For owned tensors this is the flat storage sequence, whose logical
    /// order depends on the layout. Use `.rev()` for reverse iteration.
    pub fn iter(&self) -> Iter<N> {
        Iter {
            data: &self.data[..],
            walk: self.walk(),
        }
    }

    /// Iterate over every multi-index in C order
    pub fn indices(&self) -> Indices {
        Indices::new(&self.extents)
    }

    /// The elements in C order of their multi-index
    pub fn to_vec(&self) -> Vec<N>
    where N: Clone {
        self.indices().map(|idx| self.data[self.offset_of(&idx)].clone())
                      .collect()
    }

    /// Copy the addressed elements into a new owned tensor.
    ///
    /// The copy keeps the order in which dimensions vary in memory, so the
    /// copy of an owned tensor has the same strides.
    pub fn to_owned(&self) -> TensorOwned<N>
    where N: Clone {
        let order = self.physical_order();
        let mut strides: DimVec<isize> = SmallVec::from_elem(0, self.rank());
        let mut prev = 1;
        for &dim in order.iter() {
            strides[dim] = prev;
            prev *= self.extents[dim] as isize;
        }
        let data = self.iter().cloned().collect();
        TensorOwned::from_parts(data, self.extents.clone(),
                                strides.into_iter().collect())
    }

    /// Resolve one span per dimension into the extents, strides and
    /// offset of a view
    fn view_parts(&self, spans: &[Span]) -> Result<(Extents, Strides, usize)> {
        self.check_arity(spans.len())?;
        let mut extents = Extents::new();
        let mut strides: DimVec<isize> = SmallVec::new();
        let mut offset = self.offset as isize;
        for (dim, span) in spans.iter().enumerate() {
            let extent = self.extents[dim];
            let stride = self.strides[dim];
            let span = span.resolve(extent);
            let len = span.len();
            let out_of_bounds = TensorError::SpanOutOfBounds {
                dim: dim,
                extent: extent,
            };
            if len > 0 {
                let first = span.first();
                let last = isize::try_from(len - 1).ok()
                                .and_then(|n| n.checked_mul(span.step()))
                                .and_then(|d| d.checked_add(first));
                let inside = |x: isize| x >= 0 && x < extent as isize;
                match last {
                    Some(last) if inside(first) && inside(last) => {}
                    _ => return Err(out_of_bounds),
                }
                offset = first.checked_mul(stride)
                              .and_then(|d| offset.checked_add(d))
                              .ok_or(out_of_bounds.clone())?;
            }
            // a single position never moves along its dimension
            let view_stride = if len <= 1 {
                stride
            } else {
                stride.checked_mul(span.step()).ok_or(out_of_bounds)?
            };
            trace!("dimension {}: span {} selects {} of {}",
                   dim, span, len, extent);
            extents.push(len);
            strides.push(view_stride);
        }
        Ok((extents, strides.into_iter().collect(), offset as usize))
    }

    /// Get a view selecting `spans[r]` along each dimension `r`.
    ///
    /// The view borrows this tensor's storage: no element is copied.
    /// Viewing a view is equivalent to viewing the parent with the composed
    /// spans.
    pub fn view(&self, spans: &[Span]) -> Result<TensorView<N>> {
        let (extents, strides, offset) = self.view_parts(spans)?;
        debug!("view of extents {:?} at offset {}", extents, offset);
        Ok(TensorView {
            data: &self.data[..],
            extents: extents,
            strides: strides,
            offset: offset,
        })
    }

    /// Get a view into this whole tensor
    pub fn borrowed(&self) -> TensorView<N> {
        TensorView {
            data: &self.data[..],
            extents: self.extents.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }

    /// Pair this tensor with placeholder indices for a later contraction.
    ///
    /// Nothing is computed here, see `einsum::contract`.
    pub fn bind(&self, indices: &[Placeholder]) -> Result<BoundTensor<N, Storage>> {
        self.check_arity(indices.len())?;
        Ok(BoundTensor::new(self, indices))
    }

    /// Exchange extents, strides and storage with `other`
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.extents, &mut other.extents);
        mem::swap(&mut self.strides, &mut other.strides);
        mem::swap(&mut self.data, &mut other.data);
        mem::swap(&mut self.offset, &mut other.offset);
    }
}

impl<N, Storage> Tensor<N, Storage>
where Storage: DerefMut<Target=[N]> {

    /// Mutable access to the tensor's backing storage
    pub fn data_mut(&mut self) -> &mut [N] {
        &mut self.data[..]
    }

    /// Raw mutable pointer to the backing storage
    pub fn as_mut_ptr(&mut self) -> *mut N {
        self.data.as_mut_ptr()
    }

    /// Mutable element access with a multi-index, see `at`
    pub fn at_mut(&mut self, indices: &[usize]) -> Result<&mut N> {
        let index = self.storage_index(indices)?;
        Ok(&mut self.data[index])
    }

    /// Mutable element access with a flat position into the backing storage
    pub fn at_flat_mut(&mut self, i: usize) -> Result<&mut N> {
        let index = self.check_storage(i as isize)?;
        Ok(&mut self.data[index])
    }

    /// Mutable element access checking every index against its extent
    pub fn get_mut(&mut self, indices: &[usize]) -> Option<&mut N> {
        if !self.in_bounds(indices) {
            return None;
        }
        let index = self.offset_of(indices);
        Some(&mut self.data[index])
    }

    /// Iterate mutably over the elements in storage order
    pub fn iter_mut(&mut self) -> IterMut<N> {
        let walk = self.walk();
        IterMut {
            ptr: self.data.as_mut_ptr(),
            len: self.data.len(),
            walk: walk,
            marker: PhantomData,
        }
    }

    /// Set every addressed element to `value`
    pub fn fill(&mut self, value: N)
    where N: Clone {
        for x in self.iter_mut() {
            *x = value.clone();
        }
    }

    /// Get a mutable view selecting `spans[r]` along each dimension `r`.
    ///
    /// Writes through the view land in this tensor's storage.
    pub fn view_mut(&mut self, spans: &[Span]) -> Result<TensorViewMut<N>> {
        let (extents, strides, offset) = self.view_parts(spans)?;
        debug!("mutable view of extents {:?} at offset {}", extents, offset);
        Ok(TensorViewMut {
            data: &mut self.data[..],
            extents: extents,
            strides: strides,
            offset: offset,
        })
    }

    /// Get a mutable view into this whole tensor
    pub fn borrowed_mut(&mut self) -> TensorViewMut<N> {
        let extents = self.extents.clone();
        let strides = self.strides.clone();
        TensorViewMut {
            data: &mut self.data[..],
            extents: extents,
            strides: strides,
            offset: self.offset,
        }
    }

    /// Evaluate `expr` into this tensor, see `expr::evaluate`
    pub fn assign_expr(&mut self, expr: &Expr<N>) -> Result<()>
    where N: Num + Copy {
        crate::expr::evaluate(self, expr)
    }

    /// Write `values`, given in C order of their multi-index
    pub(crate) fn write_c_order<I>(&mut self, values: I)
    where I: IntoIterator<Item=N> {
        let positions: Vec<usize> = self.indices()
                                        .map(|idx| self.offset_of(&idx))
                                        .collect();
        for (pos, value) in positions.into_iter().zip(values) {
            self.data[pos] = value;
        }
    }
}

impl<N, S1, S2> PartialEq<Tensor<N, S2>> for Tensor<N, S1>
where N: PartialEq,
      S1: Deref<Target=[N]>,
      S2: Deref<Target=[N]> {
    /// Tensors are equal when their extents and addressed elements are
    fn eq(&self, other: &Tensor<N, S2>) -> bool {
        self.extents == other.extents
            && self.indices().all(|idx| {
                self.data[self.offset_of(&idx)]
                    == other.data[other.offset_of(&idx)]
            })
    }
}

fn panic_on<T>(res: Result<T>) -> T {
    match res {
        Ok(x) => x,
        Err(e) => panic!("{}", e),
    }
}

/// Indexing with a multi-index goes through `at` and panics where `at` fails
impl<N, Storage, const D: usize> Index<[usize; D]> for Tensor<N, Storage>
where Storage: Deref<Target=[N]> {

    type Output = N;

    fn index(&self, index: [usize; D]) -> &N {
        panic_on(self.at(&index))
    }
}

impl<N, Storage, const D: usize> IndexMut<[usize; D]> for Tensor<N, Storage>
where Storage: DerefMut<Target=[N]> {

    fn index_mut(&mut self, index: [usize; D]) -> &mut N {
        panic_on(self.at_mut(&index))
    }
}

impl<'i, N, Storage> Index<&'i [usize]> for Tensor<N, Storage>
where Storage: Deref<Target=[N]> {

    type Output = N;

    fn index(&self, index: &'i [usize]) -> &N {
        panic_on(self.at(index))
    }
}

impl<'i, N, Storage> IndexMut<&'i [usize]> for Tensor<N, Storage>
where Storage: DerefMut<Target=[N]> {

    fn index_mut(&mut self, index: &'i [usize]) -> &mut N {
        panic_on(self.at_mut(index))
    }
}

/// Indexing with a single integer addresses the backing storage, through
/// `at_flat`
impl<N, Storage> Index<usize> for Tensor<N, Storage>
where Storage: Deref<Target=[N]> {

    type Output = N;

    fn index(&self, index: usize) -> &N {
        panic_on(self.at_flat(index))
    }
}

impl<N, Storage> IndexMut<usize> for Tensor<N, Storage>
where Storage: DerefMut<Target=[N]> {

    fn index_mut(&mut self, index: usize) -> &mut N {
        panic_on(self.at_flat_mut(index))
    }
}

/// Walk over the positions of a tensor, fastest varying dimension first
#[derive(Clone, Debug)]
struct Walk {
    base: isize,
    extents: DimVec<usize>,
    strides: DimVec<isize>,
    front: usize,
    back: usize,
}

impl Walk {
    fn storage_index(&self, mut pos: usize) -> usize {
        let mut index = self.base;
        for (&extent, &stride) in self.extents.iter().zip(&self.strides) {
            index += (pos % extent) as isize * stride;
            pos /= extent;
        }
        index as usize
    }

    fn next(&mut self) -> Option<usize> {
        if self.front == self.back {
            return None;
        }
        let index = self.storage_index(self.front);
        self.front += 1;
        Some(index)
    }

    fn next_back(&mut self) -> Option<usize> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.storage_index(self.back))
    }

    fn len(&self) -> usize {
        self.back - self.front
    }
}

/// Iterator over the elements of a tensor in storage order
pub struct Iter<'a, N: 'a> {
    data: &'a [N],
    walk: Walk,
}

impl<'a, N: 'a> Iterator for Iter<'a, N> {
    type Item = &'a N;

    fn next(&mut self) -> Option<&'a N> {
        let data = self.data;
        self.walk.next().map(|i| &data[i])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.len(), Some(self.walk.len()))
    }
}

impl<'a, N: 'a> DoubleEndedIterator for Iter<'a, N> {
    fn next_back(&mut self) -> Option<&'a N> {
        let data = self.data;
        self.walk.next_back().map(|i| &data[i])
    }
}

impl<'a, N: 'a> ExactSizeIterator for Iter<'a, N> {}

/// Mutable iterator over the elements of a tensor in storage order
pub struct IterMut<'a, N: 'a> {
    ptr: *mut N,
    len: usize,
    walk: Walk,
    marker: PhantomData<&'a mut N>,
}

impl<'a, N: 'a> IterMut<'a, N> {
    fn element(&mut self, i: usize) -> &'a mut N {
        assert!(i < self.len);
        // distinct walk positions address distinct storage elements, so
        // no element is handed out twice
        unsafe { &mut *self.ptr.add(i) }
    }
}

impl<'a, N: 'a> Iterator for IterMut<'a, N> {
    type Item = &'a mut N;

    fn next(&mut self) -> Option<&'a mut N> {
        let i = self.walk.next()?;
        Some(self.element(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.len(), Some(self.walk.len()))
    }
}

impl<'a, N: 'a> DoubleEndedIterator for IterMut<'a, N> {
    fn next_back(&mut self) -> Option<&'a mut N> {
        let i = self.walk.next_back()?;
        Some(self.element(i))
    }
}

impl<'a, N: 'a> ExactSizeIterator for IterMut<'a, N> {}

/// Iterator over the multi-indices of some extents, last index fastest
#[derive(Clone, Debug)]
pub struct Indices {
    extents: DimVec<usize>,
    current: Option<DimVec<usize>>,
}

impl Indices {
    pub(crate) fn new(extents: &Extents) -> Indices {
        let current = if extents.iter().any(|&e| e == 0) {
            None
        } else {
            Some(SmallVec::from_elem(0, extents.rank()))
        };
        Indices {
            extents: extents.iter().copied().collect(),
            current: current,
        }
    }
}

impl Iterator for Indices {
    type Item = DimVec<usize>;

    fn next(&mut self) -> Option<DimVec<usize>> {
        let index = self.current.take()?;
        let mut next = index.clone();
        for dim in (0..next.len()).rev() {
            next[dim] += 1;
            if next[dim] < self.extents[dim] {
                self.current = Some(next);
                break;
            }
            next[dim] = 0;
        }
        Some(index)
    }
}

#[cfg(test)]
mod tests {

    use smallvec::smallvec;

    use super::{Tensor, TensorOwned};
    use crate::errors::TensorError;
    use crate::span::Span;
    use crate::strides::Layout;
    use crate::StorageOrder;

    fn iota(extents: [usize; 2], layout: &Layout) -> TensorOwned<f64> {
        let size = extents[0] * extents[1];
        let data = (0..size).map(|x| x as f64).collect();
        Tensor::from_vec(data, extents, layout).unwrap()
    }

    #[test]
    fn queries() {
        let tensor: TensorOwned<f64> = Tensor::zeros([3, 4, 2]);
        assert_eq!(tensor.rank(), 3);
        assert_eq!(tensor.order(), 3);
        assert_eq!(tensor.size(), 24);
        assert_eq!(tensor.extent(1), Ok(4));
        assert_eq!(tensor.extent(3),
                   Err(TensorError::DimensionOutOfRange { dim: 3, rank: 3 }));
        assert_eq!(&tensor.extents()[..], &[3, 4, 2]);
        assert_eq!(&tensor.strides()[..], &[8, 2, 1]);
        assert_eq!(tensor.data().len(), 24);
        assert!(!tensor.is_empty());
        assert_eq!(tensor.ordering(), StorageOrder::C);
        assert!(tensor.is_contiguous());

        let tensor: TensorOwned<f64> = Tensor::zeros_f([3, 4, 2]);
        assert_eq!(&tensor.strides()[..], &[1, 3, 12]);
        assert_eq!(tensor.ordering(), StorageOrder::F);

        let empty: TensorOwned<f64> = Tensor::zeros([3, 0]);
        assert!(empty.is_empty());
        assert_eq!(empty.iter().count(), 0);
    }

    #[test]
    fn default_construction() {
        let tensor: TensorOwned<i32> = Tensor::new([2, 3]);
        assert!(tensor.iter().all(|&x| x == 0));
        let tensor: TensorOwned<String> = Tensor::new([2]);
        assert!(tensor.iter().all(|x| x.is_empty()));
    }

    #[test]
    fn at_row_major() {
        let mut tensor: TensorOwned<f64> = Tensor::zeros([2, 3]);
        *tensor.at_mut(&[1, 2]).unwrap() = 7.;
        assert_eq!(tensor.data()[5], 7.);
        assert_eq!(tensor.at(&[1, 2]), Ok(&7.));
        assert_eq!(tensor.at_flat(5), Ok(&7.));
        assert_eq!(tensor[[1, 2]], 7.);
        assert_eq!(tensor[5], 7.);
    }

    #[test]
    fn at_column_major() {
        let mut tensor: TensorOwned<f64> = Tensor::zeros_f([2, 3]);
        tensor[[1, 0]] = 3.;
        tensor[[0, 1]] = 4.;
        assert_eq!(tensor.data(), &[0., 3., 4., 0., 0., 0.]);
    }

    #[test]
    fn arity_mismatch() {
        let mut tensor: TensorOwned<f64> = Tensor::zeros([3, 4, 2]);
        let err = TensorError::ArityMismatch { expected: 3, got: 2 };
        assert_eq!(tensor.at(&[1, 2]), Err(err.clone()));
        assert_eq!(tensor.at_mut(&[1, 2]), Err(err));
        assert_eq!(tensor.get(&[1, 2]), None);
    }

    #[test]
    fn out_of_range() {
        let tensor: TensorOwned<f64> = Tensor::zeros([2, 3]);
        assert_eq!(tensor.at(&[2, 0]),
                   Err(TensorError::OutOfRange { index: 6, size: 6 }));
        assert_eq!(tensor.at_flat(6),
                   Err(TensorError::OutOfRange { index: 6, size: 6 }));
        // stays inside the storage, so only `get` notices
        assert_eq!(tensor.at(&[0, 4]), Ok(&0.));
        assert_eq!(tensor.get(&[0, 4]), None);
        assert_eq!(tensor.get(&[1, 2]), Some(&0.));
    }

    #[test]
    #[should_panic(expected = "does not match tensor order")]
    fn index_panics_on_arity() {
        let tensor: TensorOwned<f64> = Tensor::zeros([3, 4, 2]);
        let _x = tensor[[1, 2]];
    }

    #[test]
    fn fill() {
        let mut tensor: TensorOwned<f64> = Tensor::zeros([3, 4, 2]);
        tensor.fill(2.5);
        assert_eq!(tensor.iter().count(), tensor.size());
        assert!(tensor.iter().all(|&x| x == 2.5));
    }

    #[test]
    fn swap_assign() {
        let mut a = Tensor::from_elem([2, 2], 1);
        let b = Tensor::from_elem([2, 2], 2);
        let b_ptr = b.as_ptr();
        a.assign(b);
        assert!(a.iter().all(|&x| x == 2));
        assert_eq!(a.as_ptr(), b_ptr);

        let mut a = Tensor::from_elem([2, 2], 1);
        let mut b = Tensor::from_elem([2, 2], 2);
        a.swap(&mut b);
        assert!(a.iter().all(|&x| x == 2));
        assert!(b.iter().all(|&x| x == 1));
        assert_ne!(a.as_ptr(), b.as_ptr());
        a[[0, 0]] = 5;
        assert_eq!(b[[0, 0]], 1);
    }

    #[test]
    fn swap_exchanges_shapes() {
        let mut a: TensorOwned<f64> = Tensor::zeros([2, 3]);
        let mut b: TensorOwned<f64> = Tensor::ones([4]);
        a.swap(&mut b);
        assert_eq!(&a.extents()[..], &[4]);
        assert_eq!(&b.extents()[..], &[2, 3]);
        assert_eq!(&b.strides()[..], &[3, 1]);
    }

    #[test]
    fn assign_from_copies() {
        let src = iota([2, 3], &Layout::LastOrder);
        let mut dst: TensorOwned<f64> = Tensor::zeros([2, 3]);
        dst.assign_from(&src);
        assert_eq!(dst, src);
        assert_ne!(dst.as_ptr(), src.as_ptr());

        let view = src.view(&[Span::full(), Span::range(1, 3)]).unwrap();
        dst.assign_from(&view);
        assert_eq!(&dst.extents()[..], &[2, 2]);
        assert_eq!(dst.to_vec(), vec![1., 2., 4., 5.]);
    }

    #[test]
    fn from_vec_checks_length() {
        let res = Tensor::from_vec(vec![1, 2, 3], [2, 2], &Layout::LastOrder);
        assert_eq!(res.unwrap_err(),
                   TensorError::DataLength { expected: 4, got: 3 });
    }

    #[test]
    fn iteration_follows_storage() {
        let tensor = iota([2, 3], &Layout::FirstOrder);
        let forward: Vec<f64> = tensor.iter().cloned().collect();
        assert_eq!(forward, tensor.data());
        let backward: Vec<f64> = tensor.iter().rev().cloned().collect();
        assert_eq!(backward, vec![5., 4., 3., 2., 1., 0.]);
        // logical order differs from storage order in F layout
        assert_eq!(tensor.to_vec(), vec![0., 2., 4., 1., 3., 5.]);
    }

    #[test]
    fn iter_mut_rev() {
        let mut tensor: TensorOwned<i32> = Tensor::zeros([2, 2]);
        for (k, x) in tensor.iter_mut().rev().enumerate() {
            *x = k as i32;
        }
        assert_eq!(tensor.data(), &[3, 2, 1, 0]);
    }

    #[test]
    fn view_aliases_parent() {
        let mut tensor = iota([3, 4], &Layout::LastOrder);
        {
            let view = tensor.view(&[Span::range(1, 3),
                                     Span::new(0, 2, 4).unwrap()]).unwrap();
            assert_eq!(&view.extents()[..], &[2, 2]);
            assert_eq!(&view.strides()[..], &[4, 2]);
            assert_eq!(view.offset(), 4);
            assert_eq!(view.to_vec(), vec![4., 6., 8., 10.]);
            assert_eq!(view.as_ptr(), tensor.as_ptr());
        }
        {
            let mut view = tensor.view_mut(&[Span::range(1, 3),
                                             Span::new(0, 2, 4).unwrap()])
                                 .unwrap();
            view[[1, 1]] = -1.;
        }
        assert_eq!(tensor[[2, 2]], -1.);
        assert_eq!(tensor[[0, 0]], 0.);
    }

    #[test]
    fn view_fill_only_touches_view() {
        let mut tensor = iota([3, 4], &Layout::LastOrder);
        tensor.view_mut(&[Span::full(), Span::upto(1)]).unwrap().fill(0.);
        assert_eq!(tensor.to_vec(), vec![0., 1., 2., 3.,
                                         0., 5., 6., 7.,
                                         0., 9., 10., 11.]);
    }

    #[test]
    fn view_of_view_composes() {
        let tensor = iota([6, 6], &Layout::LastOrder);
        let outer = [Span::new(1, 2, 6).unwrap(), Span::range(2, 6)];
        let inner = [Span::range(1, 3), Span::new(0, 2, 4).unwrap()];
        let nested = tensor.view(&outer).unwrap()
                           .view(&inner).unwrap().to_owned();
        let composed: Vec<Span> = outer.iter().zip(&inner)
                                       .map(|(o, i)| o.compose(i))
                                       .collect();
        let direct = tensor.view(&composed).unwrap();
        assert_eq!(nested, direct);
        assert_eq!(direct.to_vec(), vec![20., 22., 32., 34.]);
    }

    #[test]
    fn view_negative_step() {
        let tensor = iota([2, 3], &Layout::LastOrder);
        let reversed = tensor.view(&[Span::full(),
                                     Span::new(2, -1, Span::MAX).unwrap()])
                             .unwrap();
        assert_eq!(reversed.to_vec(), vec![2., 1., 0., 5., 4., 3.]);
        assert!(!reversed.is_contiguous());
        let copy = reversed.to_owned();
        assert_eq!(copy, reversed);
        assert!(copy.is_contiguous());
    }

    #[test]
    fn view_single_point_keeps_rank() {
        let tensor = iota([3, 4], &Layout::LastOrder);
        let col = tensor.view(&[Span::full(), Span::new(2, 0, 2).unwrap()])
                        .unwrap();
        assert_eq!(&col.extents()[..], &[3, 1]);
        assert_eq!(col.to_vec(), vec![2., 6., 10.]);
    }

    #[test]
    fn view_errors() {
        let tensor = iota([3, 4], &Layout::LastOrder);
        assert_eq!(tensor.view(&[Span::full()]).unwrap_err(),
                   TensorError::ArityMismatch { expected: 2, got: 1 });
        assert_eq!(tensor.view(&[Span::range(0, 4), Span::full()]).unwrap_err(),
                   TensorError::SpanOutOfBounds { dim: 0, extent: 3 });
        let empty = tensor.view(&[Span::range(2, 2), Span::full()]).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn view_with_huge_step() {
        let tensor = iota([3, 4], &Layout::LastOrder);
        let view = tensor.view(&[Span::new(1, isize::MAX, 5).unwrap(),
                                 Span::full()]).unwrap();
        assert_eq!(&view.extents()[..], &[1, 4]);
        assert_eq!(&view.strides()[..], &[4, 1]);
        assert_eq!(view.to_vec(), vec![4., 5., 6., 7.]);

        let res = tensor.view(&[Span::new(0, isize::MAX / 2, isize::MAX - 1)
                                    .unwrap(),
                                Span::full()]);
        assert_eq!(res.unwrap_err(),
                   TensorError::SpanOutOfBounds { dim: 0, extent: 3 });
        let res = tensor.view(&[Span::new(2, -1, isize::MIN).unwrap(),
                                Span::full()]);
        assert_eq!(res.unwrap_err(),
                   TensorError::SpanOutOfBounds { dim: 0, extent: 3 });
        let res = tensor.view(&[Span::new(2, isize::MIN + 1, isize::MIN)
                                    .unwrap(),
                                Span::full()]);
        assert_eq!(res.unwrap_err(),
                   TensorError::SpanOutOfBounds { dim: 0, extent: 3 });
    }

    #[test]
    fn at_with_overflowing_index() {
        let mut tensor: TensorOwned<f64> = Tensor::zeros([2, 3]);
        let err = TensorError::OutOfRange { index: isize::MAX, size: 6 };
        assert_eq!(tensor.at(&[1usize << 62, 0]), Err(err.clone()));
        assert_eq!(tensor.at(&[usize::MAX, 0]), Err(err.clone()));
        assert_eq!(tensor.at_mut(&[0, usize::MAX]), Err(err));
        assert_eq!(tensor.get(&[1usize << 62, 0]), None);
    }

    #[test]
    fn permuted_layout() {
        let layout = Layout::permuted(&[1, 2, 0]).unwrap();
        let tensor = Tensor::from_vec((0..12).collect(), [2, 3, 2],
                                      &layout).unwrap();
        assert_eq!(&tensor.strides()[..], &[6, 1, 3]);
        assert_eq!(tensor.ordering(), StorageOrder::Unordered);
        assert!(tensor.is_contiguous());
        assert_eq!(tensor.at(&[1, 2, 1]), Ok(&11));
        assert_eq!(tensor.at(&[0, 1, 0]), Ok(&1));
        assert_eq!(tensor[[0, 0, 1]], 3);
        let forward: Vec<i32> = tensor.iter().cloned().collect();
        assert_eq!(forward, (0..12).collect::<Vec<i32>>());
        assert_eq!(tensor.to_vec(), vec![0, 3, 1, 4, 2, 5,
                                         6, 9, 7, 10, 8, 11]);

        let zeros: TensorOwned<f64> =
            Tensor::zeros_with_layout([2, 3, 2], &layout).unwrap();
        assert_eq!(zeros.strides(), tensor.strides());
    }

    #[test]
    fn unchecked_permuted_variant_is_rejected() {
        let bad = Layout::Permuted(smallvec![0, 0]);
        let res = Tensor::from_vec(vec![0, 1, 2, 3], [2, 2], &bad);
        assert_eq!(res.unwrap_err(),
                   TensorError::InvalidLayout { order: vec![0, 0] });
        let res: Result<TensorOwned<f64>, _> =
            Tensor::zeros_with_layout([2], &Layout::Permuted(smallvec![5]));
        assert_eq!(res.unwrap_err(),
                   TensorError::InvalidLayout { order: vec![5] });
    }

    #[test]
    fn to_owned_keeps_layout() {
        let tensor = iota([2, 3], &Layout::FirstOrder);
        let copy = tensor.to_owned();
        assert_eq!(copy.strides(), tensor.strides());
        assert_eq!(copy.data(), tensor.data());
    }

    #[test]
    fn equality_is_logical() {
        let c = iota([2, 3], &Layout::LastOrder);
        let f = Tensor::from_vec(vec![0., 3., 1., 4., 2., 5.], [2, 3],
                                 &Layout::FirstOrder).unwrap();
        assert_eq!(c, f);
        let other: TensorOwned<f64> = Tensor::zeros([3, 2]);
        assert!(c != other);
    }

    #[test]
    fn indices_c_order() {
        let tensor: TensorOwned<u8> = Tensor::zeros([2, 2]);
        let all: Vec<Vec<usize>> = tensor.indices().map(|i| i.to_vec())
                                         .collect();
        assert_eq!(all, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);

        let scalar: TensorOwned<u8> = Tensor::zeros(Vec::<usize>::new());
        assert_eq!(scalar.indices().count(), 1);
        assert_eq!(scalar.size(), 1);
    }
}
