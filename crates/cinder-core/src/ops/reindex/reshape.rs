use derive_new::new;

use crate::{
    rvec, InvariantError, Operation, RVec, Shape, StorageView, Strides, Tensor, TensorDType,
};

/// How a reshape is carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReshapePlan {
    /// The resolved shape is the current one.
    Unchanged,
    /// The new shape is expressible over the existing buffer.
    Strided(StorageView),
    /// The layout cannot be expressed with strides; copy into a fresh buffer.
    Materialize(StorageView),
}

#[derive(new, Debug, Clone)]
pub struct Reshape<T: TensorDType> {
    pub src: Tensor<T>,
    dims: RVec<isize>,
}

impl<T: TensorDType> Reshape<T> {
    pub fn dims(&self) -> &[isize] {
        &self.dims
    }

    pub fn plan(&self) -> Result<ReshapePlan, InvariantError> {
        let src = self.src.view();
        let target = Shape::infer(&self.dims, src.numel())?;
        if &target == src.shape() {
            return Ok(ReshapePlan::Unchanged);
        }
        Ok(match restride(src.shape(), src.strides(), &target) {
            Some(strides) => ReshapePlan::Strided(StorageView::new(target, strides)),
            None => ReshapePlan::Materialize(StorageView::contiguous(target)),
        })
    }
}

/// Strides that lay `target` over the same elements as `shape`/`strides`.
///
/// Walks both shapes from the innermost axis outwards. The current source
/// dimension is split whenever the next target size divides it. Otherwise it
/// is folded into its outer neighbour when it is unit sized or contiguous
/// with it, taking the inner stride. Anything else needs a copy.
fn restride(shape: &Shape, strides: &Strides, target: &Shape) -> Option<Strides> {
    if shape.is_empty() || target.numel() == 0 {
        return Some(Strides::from(target));
    }
    let mut old_shape = shape.inner().clone();
    let mut old_strides = strides.inner().clone();
    let mut new_strides: RVec<isize> = rvec![0; target.rank()];

    let mut io = old_shape.len() - 1;
    let mut inew = target.rank();
    while inew > 0 {
        let d = inew - 1;
        let size = target[d];
        if old_shape[io] % size == 0 {
            new_strides[d] = old_strides[io];
            old_strides[io] *= size as isize;
            old_shape[io] /= size;
            inew -= 1;
        } else if io > 0 && old_shape[io] == 1 {
            io -= 1;
        } else if io > 0 && old_strides[io - 1] == old_shape[io] as isize * old_strides[io] {
            old_shape[io - 1] *= old_shape[io];
            old_strides[io - 1] = old_strides[io];
            io -= 1;
        } else {
            return None;
        }
    }
    Some(Strides::new(new_strides))
}

impl<T: TensorDType> Operation for Reshape<T> {
    fn name(&self) -> &'static str {
        "reshape"
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        Shape::infer(&self.dims, self.src.numel()).map(|_| ())
    }

    fn compute_view(&self) -> Result<StorageView, InvariantError> {
        Ok(match self.plan()? {
            ReshapePlan::Unchanged => self.src.view().clone(),
            ReshapePlan::Strided(view) | ReshapePlan::Materialize(view) => view,
        })
    }
}
