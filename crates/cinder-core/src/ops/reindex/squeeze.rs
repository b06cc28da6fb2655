use derive_new::new;

use crate::{Enforcer, InvariantError, Operation, StorageView, Tensor, TensorDType};

/// Removes a unit dimension.
#[derive(new, Debug, Clone)]
pub struct Squeeze<T: TensorDType> {
    pub src: Tensor<T>,
    axis: isize,
}

impl<T: TensorDType> Operation for Squeeze<T> {
    fn name(&self) -> &'static str {
        "squeeze"
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        let axis = Enforcer::normalize_axis(self.axis, self.src.rank())?;
        let size = self.src.shape()[axis];
        if size != 1 {
            return Err(InvariantError::SqueezeNonUnit { axis, size });
        }
        Ok(())
    }

    fn compute_view(&self) -> Result<StorageView, InvariantError> {
        let axis = Enforcer::normalize_axis(self.axis, self.src.rank())?;
        let (mut shape, mut strides) = (self.src.shape().clone(), self.src.strides().clone());
        shape.remove(axis);
        strides.remove(axis);
        Ok(StorageView::new(shape, strides))
    }
}

/// Inserts a unit dimension. `axis` may be anywhere in `[-(rank + 1), rank]`.
#[derive(new, Debug, Clone)]
pub struct ExpandDims<T: TensorDType> {
    pub src: Tensor<T>,
    axis: isize,
}

impl<T: TensorDType> Operation for ExpandDims<T> {
    fn name(&self) -> &'static str {
        "expand_dims"
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        Enforcer::normalize_axis(self.axis, self.src.rank() + 1).map(|_| ())
    }

    fn compute_view(&self) -> Result<StorageView, InvariantError> {
        let rank = self.src.rank();
        let axis = Enforcer::normalize_axis(self.axis, rank + 1)?;
        let (mut shape, mut strides) = (self.src.shape().clone(), self.src.strides().clone());
        let stride = if axis < rank {
            strides[axis] * shape[axis] as isize
        } else {
            1
        };
        shape.insert(axis, 1);
        strides.insert(axis, stride);
        Ok(StorageView::new(shape, strides))
    }
}

#[cfg(test)]
mod tests {
    use crate::{shape, ErrorKind, InvariantError, Tensor, TensorError};

    #[test]
    fn test_expand_positions() {
        let a = Tensor::<f32>::zeros(shape![2, 3]);
        let front = a.expand_dims(0).unwrap();
        assert_eq!(front.shape(), &shape![1, 2, 3]);
        assert_eq!(front.strides().to_vec(), vec![6, 3, 1]);
        let back = a.expand_dims(-1).unwrap();
        assert_eq!(back.shape(), &shape![2, 3, 1]);
        assert_eq!(back.strides().to_vec(), vec![3, 1, 1]);
        let middle = a.expand_dims(-3).unwrap();
        assert_eq!(middle.shape(), &shape![1, 2, 3]);
        assert!(middle.shares_storage(&a));
        assert_eq!(a.expand_dims(3).unwrap_err().kind(), ErrorKind::Axis);
    }

    #[test]
    fn test_squeeze() {
        let a = Tensor::<f32>::from_data([1., 2., 3.], shape![1, 3]);
        let s = a.squeeze(0).unwrap();
        assert_eq!(s.shape(), &shape![3]);
        assert_eq!(s.to_vec(), vec![1., 2., 3.]);

        let err = a.squeeze(-1).unwrap_err();
        assert_eq!(
            err,
            TensorError::InvariantError(InvariantError::SqueezeNonUnit { axis: 1, size: 3 })
        );
        assert_eq!(a.squeeze(2).unwrap_err().kind(), ErrorKind::Axis);
    }

    #[test]
    fn test_expand_then_squeeze() {
        let a = Tensor::<f32>::from_data([1., 2., 3., 4.], shape![2, 2]);
        let b = a.expand_dims(1).unwrap().squeeze(1).unwrap();
        assert_eq!(b.view(), a.view());
    }
}
