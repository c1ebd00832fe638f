//! Elementwise tensor expressions and their evaluation.
//!
//! An expression is a tree whose leaves are tensor views or scalars and
//! whose nodes are elementwise operations. Building one computes nothing;
//! `evaluate` walks the tree once per destination element.
//!
//! ```
//! use dense_tensors::{Tensor, TensorOwned, Expr};
//!
//! let a: TensorOwned<f64> = Tensor::ones([2, 2]);
//! let b: TensorOwned<f64> = Tensor::from_elem([2, 2], 3.);
//! let mut c: TensorOwned<f64> = Tensor::zeros([2, 2]);
//! c.assign_expr(&(Expr::tensor(&a) + Expr::tensor(&b) * Expr::scalar(2.))).unwrap();
//! assert!(c.iter().all(|&x| x == 7.));
//! ```

use std::ops::{Add, Deref, DerefMut, Div, Mul, Neg, Sub};

use log::debug;
use num::traits::Num;

use crate::errors::{Result, TensorError};
use crate::extents::Extents;
use crate::tensor::{Tensor, TensorView};

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum UnaryOp {
    Neg,
}

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// An elementwise expression tree
#[derive(Debug)]
pub enum Expr<'a, N: 'a> {
    /// A tensor operand, read through a view
    Tensor(TensorView<'a, N>),
    /// A value used at every position
    Scalar(N),
    Unary(UnaryOp, Box<Expr<'a, N>>),
    Binary(BinaryOp, Box<Expr<'a, N>>, Box<Expr<'a, N>>),
}

impl<'a, N: 'a> Expr<'a, N> {

    pub fn tensor<S>(tensor: &'a Tensor<N, S>) -> Expr<'a, N>
    where S: Deref<Target=[N]> {
        Expr::Tensor(tensor.borrowed())
    }

    pub fn scalar(value: N) -> Expr<'a, N> {
        Expr::Scalar(value)
    }

    fn binary(op: BinaryOp, lhs: Expr<'a, N>, rhs: Expr<'a, N>) -> Expr<'a, N> {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// The extents every tensor operand agrees on, `None` for an expression
    /// made of scalars only
    pub fn extents(&self) -> Result<Option<&Extents>> {
        match *self {
            Expr::Tensor(ref view) => Ok(Some(view.extents())),
            Expr::Scalar(_) => Ok(None),
            Expr::Unary(_, ref operand) => operand.extents(),
            Expr::Binary(_, ref lhs, ref rhs) => {
                match (lhs.extents()?, rhs.extents()?) {
                    (Some(l), Some(r)) if l != r => {
                        Err(TensorError::shape_mismatch(l, r))
                    }
                    (Some(l), _) => Ok(Some(l)),
                    (None, r) => Ok(r),
                }
            }
        }
    }

    /// Value of the expression at a multi-index of the common extents
    fn value_at(&self, index: &[usize]) -> N
    where N: Num + Copy {
        match *self {
            Expr::Tensor(ref view) => view.data()[view.offset_of(index)],
            Expr::Scalar(value) => value,
            Expr::Unary(UnaryOp::Neg, ref operand) => {
                N::zero() - operand.value_at(index)
            }
            Expr::Binary(op, ref lhs, ref rhs) => {
                let l = lhs.value_at(index);
                let r = rhs.value_at(index);
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                }
            }
        }
    }
}

impl<'a, N: 'a> Add for Expr<'a, N> {
    type Output = Expr<'a, N>;

    fn add(self, rhs: Expr<'a, N>) -> Expr<'a, N> {
        Expr::binary(BinaryOp::Add, self, rhs)
    }
}

impl<'a, N: 'a> Sub for Expr<'a, N> {
    type Output = Expr<'a, N>;

    fn sub(self, rhs: Expr<'a, N>) -> Expr<'a, N> {
        Expr::binary(BinaryOp::Sub, self, rhs)
    }
}

impl<'a, N: 'a> Mul for Expr<'a, N> {
    type Output = Expr<'a, N>;

    fn mul(self, rhs: Expr<'a, N>) -> Expr<'a, N> {
        Expr::binary(BinaryOp::Mul, self, rhs)
    }
}

impl<'a, N: 'a> Div for Expr<'a, N> {
    type Output = Expr<'a, N>;

    fn div(self, rhs: Expr<'a, N>) -> Expr<'a, N> {
        Expr::binary(BinaryOp::Div, self, rhs)
    }
}

impl<'a, N: 'a> Neg for Expr<'a, N> {
    type Output = Expr<'a, N>;

    fn neg(self) -> Expr<'a, N> {
        Expr::Unary(UnaryOp::Neg, Box::new(self))
    }
}

/// Write the value of `expr` into every element of `dest`.
///
/// The tensor operands of `expr` must all have the extents of `dest`,
/// scalars are used everywhere. On a shape mismatch `dest` is untouched.
/// Values are computed before any of them is written.
pub fn evaluate<N, S>(dest: &mut Tensor<N, S>, expr: &Expr<N>) -> Result<()>
where N: Num + Copy,
      S: DerefMut<Target=[N]> {
    if let Some(extents) = expr.extents()? {
        if extents != dest.extents() {
            return Err(TensorError::shape_mismatch(dest.extents(), extents));
        }
    }
    debug!("evaluating expression into tensor of extents {:?}",
           dest.extents());
    let values: Vec<N> = dest.indices().map(|idx| expr.value_at(&idx))
                                       .collect();
    dest.write_c_order(values);
    Ok(())
}
