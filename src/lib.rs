/*!

This crate contains strided dense tensor implementations.

Tensors are defined as a contiguous piece of memory, the data array,
which is interpreted using its extents and stride information. Owned
tensors and views share one type, `Tensor<N, Storage>`, the storage
deciding whether the elements are owned (`Vec<N>`) or borrowed from
another tensor (`&[N]`, `&mut [N]`).

Views are selected with one `Span` per dimension. Spans compose, so a view
of a view addresses the same elements as a single view of the parent with
the composed spans.

```
use dense_tensors::{Tensor, TensorOwned, Span};

let mut t: TensorOwned<f64> = Tensor::zeros([3, 4, 2]);
assert_eq!(t.rank(), 3);
assert_eq!(t.size(), 24);

*t.at_mut(&[1, 2, 0]).unwrap() = 1.;
let v = t.view(&[Span::range(1, 3), Span::full(), Span::upto(1)]).unwrap();
assert_eq!(v.at(&[0, 2, 0]), Ok(&1.));
```
*/

pub mod einsum;
pub mod errors;
pub mod expr;
pub mod extents;
pub mod index;
pub mod span;
pub mod strides;
pub mod tensor;


pub use errors::{Result, TensorError};
pub use expr::Expr;
pub use extents::Extents;
pub use index::{to_index, Placeholder};
pub use span::{ran, ran_step, Span};
pub use strides::{to_strides, Layout, Strides};
pub use tensor::{Tensor, TensorOwned, TensorView, TensorViewMut};

/// Describe the storage order of a tensor, as observed from its strides.
#[derive(PartialEq, Debug)]
pub enum StorageOrder {
    /// F storage order, ie column major storage for matrices
    /// The dimensions are sorted in increasing order of stride
    F,
    /// C storage order, ie row major storage for matrices
    /// The dimensions are sorted in decreasing order of stride
    C,
    /// Nothing special can be assumed about the order
    Unordered
}
