use derive_new::new;

use crate::{InvariantError, Operation, Shape, StorageView, Tensor, TensorDType};

/// Stretches unit dimensions of `src` to `to` without copying.
#[derive(new, Debug, Clone)]
pub struct Broadcast<T: TensorDType> {
    pub src: Tensor<T>,
    to: Shape,
}

impl<T: TensorDType> Broadcast<T> {
    pub fn to(&self) -> &Shape {
        &self.to
    }
}

impl<T: TensorDType> Operation for Broadcast<T> {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    //For rules, see https://numpy.org/doc/stable/user/basics.broadcasting.html
    //Ranks must already agree, no leading dimensions are added.
    fn check_invariants(&self) -> Result<(), InvariantError> {
        let src_shape = self.src.shape();
        if src_shape.rank() != self.to.rank() {
            return Err(InvariantError::BroadcastRank {
                lhs: src_shape.rank(),
                rhs: self.to.rank(),
            });
        }
        let compatible = src_shape
            .iter()
            .zip(self.to.iter())
            .all(|(&s, &t)| s == t || s == 1);
        if !compatible {
            return Err(InvariantError::BroadcastingFailed {
                lhs: src_shape.clone(),
                rhs: self.to.clone(),
            });
        }
        Ok(())
    }

    fn compute_view(&self) -> Result<StorageView, InvariantError> {
        let src_shape = self.src.shape();
        if *src_shape == self.to {
            return Ok(self.src.view().clone());
        }

        let strides = src_shape
            .iter()
            .zip(self.to.iter())
            .zip(self.src.strides().iter())
            .map(|((&s, &t), &stride)| if s == t { stride } else { 0 })
            .collect();
        Ok(StorageView::new(self.to.clone(), strides))
    }
}
