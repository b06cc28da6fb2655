use derive_new::new;

use crate::{
    Enforcer, InvariantError, Operation, Shape, StorageView, Tensor, TensorDType, TensorError,
};

/// Batched matrix product of two equal-rank tensors.
#[derive(new, Debug, Clone)]
pub struct Matmul<T: TensorDType> {
    pub lhs: Tensor<T>,
    pub rhs: Tensor<T>,
}

impl<T: TensorDType> Matmul<T> {
    /// Views of both operands with the contraction dimension moved to axis -3.
    pub(crate) fn operands(&self) -> Result<(Tensor<T>, Tensor<T>), TensorError> {
        let lhs = self.lhs.expand_dims(-3)?.swap_axes(-1, -3)?;
        let rhs = self.rhs.expand_dims(-3)?.swap_axes(-2, -3)?;
        Ok((lhs, rhs))
    }
}

impl<T: TensorDType> Operation for Matmul<T> {
    fn name(&self) -> &'static str {
        "matmul"
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        let (lhs, rhs) = (self.lhs.shape(), self.rhs.shape());
        Enforcer::assert_min_rank(self.name(), lhs, 2)?;
        Enforcer::assert_min_rank(self.name(), rhs, 2)?;
        Enforcer::assert_equal_ranks(&[lhs, rhs])?;
        Ok(())
    }

    fn compute_view(&self) -> Result<StorageView, InvariantError> {
        let (lhs, rhs) = (self.lhs.shape(), self.rhs.shape());
        let rank = lhs.rank();
        let (m, n) = (lhs[rank - 2], lhs[rank - 1]);
        let (k, p) = (rhs[rank - 2], rhs[rank - 1]);

        // [.., n, m, 1] against [.., k, 1, p]
        let mut expanded_lhs = lhs.slice(0..rank - 2);
        expanded_lhs.push(n);
        expanded_lhs.push(m);
        expanded_lhs.push(1);
        let mut expanded_rhs = rhs.slice(0..rank - 2);
        expanded_rhs.push(k);
        expanded_rhs.push(1);
        expanded_rhs.push(p);

        let mut shape: Shape = Shape::broadcast_pair(&expanded_lhs, &expanded_rhs)?;
        shape.remove(rank - 2);
        Ok(StorageView::contiguous(shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;

    #[test]
    fn test_output_view() {
        let a = Tensor::<f32>::zeros(shape![4, 2, 3]);
        let b = Tensor::<f32>::zeros(shape![4, 3, 5]);
        let view = Matmul::new(a, b).compute_view().unwrap();
        assert_eq!(view.shape(), &shape![4, 2, 5]);
    }

    #[test]
    fn test_operands_are_aliases() {
        let a = Tensor::<f32>::zeros(shape![2, 3]);
        let b = Tensor::<f32>::zeros(shape![3, 5]);
        let op = Matmul::new(a.clone(), b.clone());
        let (lhs, rhs) = op.operands().unwrap();
        assert_eq!(lhs.shape(), &shape![3, 2, 1]);
        assert_eq!(rhs.shape(), &shape![3, 1, 5]);
        assert!(lhs.shares_storage(&a));
        assert!(rhs.shares_storage(&b));
    }
}
