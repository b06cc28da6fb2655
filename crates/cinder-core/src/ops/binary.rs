use derive_new::new;

use crate::{InvariantError, Operation, Shape, StorageView, Tensor, TensorDType};
#[cfg(test)]
use test_strategy::Arbitrary;

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Elementwise arithmetic over a broadcast pair.
#[derive(new, Debug, Clone)]
pub struct Binary<T: TensorDType> {
    pub lhs: Tensor<T>,
    pub rhs: Tensor<T>,
    op: BinaryOp,
}

impl<T: TensorDType> Binary<T> {
    pub fn op(&self) -> BinaryOp {
        self.op
    }
}

impl<T: TensorDType> Operation for Binary<T> {
    fn name(&self) -> &'static str {
        match self.op {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
        }
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        Shape::broadcast_pair(self.lhs.shape(), self.rhs.shape()).map(|_| ())
    }

    fn compute_view(&self) -> Result<StorageView, InvariantError> {
        let broadcasted = Shape::broadcast_pair(self.lhs.shape(), self.rhs.shape())?;
        Ok(StorageView::contiguous(broadcasted))
    }
}
