use crate::{shape, InvariantError, RVec};
use std::ops::RangeTo;

#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(RVec<usize>);

impl Shape {
    pub fn new(shape: RVec<usize>) -> Self {
        Self(shape)
    }

    pub fn inner(&self) -> &RVec<usize> {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&usize> {
        self.0.get(index)
    }

    pub fn insert(&mut self, index: usize, dim: usize) {
        self.0.insert(index, dim);
    }

    pub fn remove(&mut self, index: usize) -> usize {
        self.0.remove(index)
    }

    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.0.to_vec()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rank(&self) -> usize {
        self.len()
    }

    pub fn push(&mut self, dim: usize) {
        self.0.push(dim);
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        self.0.swap(a, b);
    }

    pub fn slice(&self, range: std::ops::Range<usize>) -> Self {
        Shape(self.0[range].to_vec().into())
    }

    /// Resolves a requested shape against an element count.
    ///
    /// At most one entry may be negative; it is inferred so the product
    /// matches `numel`.
    pub fn infer(dims: &[isize], numel: usize) -> Result<Shape, InvariantError> {
        let mut inferred = None;
        let mut known = 1usize;
        for (i, &dim) in dims.iter().enumerate() {
            if dim < 0 {
                if inferred.is_some() {
                    return Err(InvariantError::MultipleInferred(dims.into()));
                }
                inferred = Some(i);
            } else {
                known *= dim as usize;
            }
        }

        let mut shape: Shape = dims.iter().map(|&d| d.max(0) as usize).collect();
        if let Some(i) = inferred {
            if known == 0 || numel % known != 0 {
                return Err(InvariantError::SizeMismatch {
                    numel,
                    dims: dims.into(),
                });
            }
            shape[i] = numel / known;
        }

        if shape.numel() != numel {
            return Err(InvariantError::SizeMismatch {
                numel,
                dims: dims.into(),
            });
        }
        Ok(shape)
    }

    /// Common shape of two equal-rank shapes.
    ///
    /// Per dimension the sizes must be equal, or one of them must be 1.
    //For rules, see https://numpy.org/doc/stable/user/basics.broadcasting.html
    pub fn broadcast_pair(lhs: &Shape, rhs: &Shape) -> Result<Shape, InvariantError> {
        if lhs.rank() != rhs.rank() {
            return Err(InvariantError::BroadcastRank {
                lhs: lhs.rank(),
                rhs: rhs.rank(),
            });
        }
        let mut shape: Shape = shape![];
        for (&l, &r) in lhs.iter().zip(rhs.iter()) {
            let dim = match (l, r) {
                (l, r) if l == r => l,
                (l, 1) => l,
                (1, r) => r,
                _ => {
                    return Err(InvariantError::BroadcastingFailed {
                        lhs: lhs.clone(),
                        rhs: rhs.clone(),
                    })
                }
            };
            shape.push(dim);
        }
        Ok(shape)
    }
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut shape = format!("[{}", self.0.first().unwrap_or(&0));
        for dim in self.0.iter().skip(1) {
            shape.push_str(&format!("x{}", dim));
        }
        write!(f, "{}]", shape)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl std::ops::Index<usize> for Shape {
    type Output = usize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl std::ops::IndexMut<usize> for Shape {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl std::ops::Index<RangeTo<usize>> for Shape {
    type Output = [usize];

    fn index(&self, index: RangeTo<usize>) -> &Self::Output {
        &self.0[index]
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<usize>> for Shape {
    fn from(shape: Vec<usize>) -> Self {
        Self(shape.into())
    }
}

impl From<&[usize]> for Shape {
    fn from(slice: &[usize]) -> Self {
        Shape(slice.into())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape(dims.iter().copied().collect())
    }
}

macro_rules! impl_try_from_shape {
    ($($N:expr),*) => {
        $(
            impl TryFrom<&Shape> for [usize; $N] {
                type Error = anyhow::Error;

                fn try_from(shape: &Shape) -> Result<[usize; $N], Self::Error> {
                    if shape.0.len() == $N {
                        let mut arr = [0; $N];
                        for (i, &item) in shape.0.iter().enumerate().take($N) {
                            arr[i] = item;
                        }
                        Ok(arr)
                    } else {
                        Err(anyhow::anyhow!("Shape has length {} but expected {}", shape.0.len(), $N))
                    }
                }
            }
        )*
    };
}

impl_try_from_shape!(1, 2, 3, 4);

#[cfg(test)]
mod tests {
    use crate::{shape, ErrorKind, InvariantError, Shape};
    use proptest::prelude::*;
    use proptest::strategy::{BoxedStrategy, Strategy};
    use std::ops::RangeInclusive;

    impl Arbitrary for Shape {
        type Parameters = Vec<RangeInclusive<usize>>;
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
            args.prop_map(Into::<Shape>::into).boxed()
        }
    }

    #[test]
    fn test_infer_placeholder() {
        let shape = Shape::infer(&[-1, 2, 2, 2], 16).unwrap();
        assert_eq!(shape, shape![2, 2, 2, 2]);
        let shape = Shape::infer(&[3, -1], 12).unwrap();
        assert_eq!(shape, shape![3, 4]);
    }

    #[test]
    fn test_infer_rejects_bad_requests() {
        let err = Shape::infer(&[-1, -1], 4).unwrap_err();
        assert!(matches!(err, InvariantError::MultipleInferred(_)));
        assert_eq!(err.kind(), ErrorKind::Shape);

        let err = Shape::infer(&[3, 3], 8).unwrap_err();
        assert!(matches!(err, InvariantError::SizeMismatch { numel: 8, .. }));

        let err = Shape::infer(&[3, -1], 8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn test_broadcast_pair() {
        let out = Shape::broadcast_pair(&shape![3, 1], &shape![3, 4]).unwrap();
        assert_eq!(out, shape![3, 4]);
        let out = Shape::broadcast_pair(&shape![3, 1], &shape![1, 4]).unwrap();
        assert_eq!(out, shape![3, 4]);

        let err = Shape::broadcast_pair(&shape![3, 2], &shape![3, 4]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Broadcast);
        let err = Shape::broadcast_pair(&shape![3], &shape![1, 3]).unwrap_err();
        assert!(matches!(err, InvariantError::BroadcastRank { lhs: 1, rhs: 2 }));
    }

    #[test]
    fn test_iter_both_ends() {
        let shape = shape![2, 3, 4];
        assert_eq!(shape.iter().len(), 3);
        let reversed: Vec<usize> = shape.iter().rev().copied().collect();
        assert_eq!(reversed, vec![4, 3, 2]);
    }

    #[test]
    fn test_formatting() {
        let shape = shape![2, 3, 4];
        assert_eq!(format!("{:?}", shape), "[2x3x4]");
        assert_eq!(format!("{}", shape), "[2, 3, 4]");
    }

    #[test]
    fn test_try_into_array() -> anyhow::Result<()> {
        let [m, n]: [usize; 2] = (&shape![5, 7]).try_into()?;
        assert_eq!((m, n), (5, 7));
        let failed: anyhow::Result<[usize; 3]> = (&shape![5, 7]).try_into();
        assert!(failed.is_err());
        Ok(())
    }

    proptest! {
        #[test]
        fn test_infer_any_axis(
            shape in Shape::arbitrary_with(vec![1..=4, 1..=4, 1..=4]),
            axis in 0usize..3,
        ) {
            let mut dims: Vec<isize> = shape.iter().map(|&d| d as isize).collect();
            dims[axis] = -1;
            prop_assert_eq!(Shape::infer(&dims, shape.numel()).unwrap(), shape);
        }
    }
}
