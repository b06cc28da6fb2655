use std::ops::RangeInclusive;

use crate::{RVec, Shape};

/// Coarse classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum ErrorKind {
    Shape,
    Axis,
    Broadcast,
    Rank,
    Singular,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    #[error("Cannot reshape {numel} elements into {dims:?}.")]
    SizeMismatch { numel: usize, dims: RVec<isize> },
    #[error("Only one dimension can be inferred, got {0:?}.")]
    MultipleInferred(RVec<isize>),
    #[error("Cannot squeeze axis {axis} with size {size}.")]
    SqueezeNonUnit { axis: usize, size: usize },
    #[error("Axis {axis} is out of range for rank {rank}.")]
    AxisOutOfRange { axis: isize, rank: usize },
    #[error("Invalid permutation {dims:?} for rank {rank}.")]
    InvalidPermutation { dims: RVec<usize>, rank: usize },
    #[error("Cannot broadcast rank {lhs} against rank {rhs}.")]
    BroadcastRank { lhs: usize, rhs: usize },
    #[error("Failed to broadcast {lhs} with {rhs}.")]
    BroadcastingFailed { lhs: Shape, rhs: Shape },
    #[error("{op} requires rank >= {minimum}, got {actual}.")]
    RankTooLow {
        op: &'static str,
        minimum: usize,
        actual: usize,
    },
    #[error("Rank mismatch. {accepted:?} != {actual}.")]
    RankMismatch {
        accepted: RangeInclusive<usize>,
        actual: usize,
    },
    #[error("Expected square matrices, got {0}.")]
    NotSquare(Shape),
}

impl InvariantError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InvariantError::SizeMismatch { .. }
            | InvariantError::MultipleInferred(_)
            | InvariantError::SqueezeNonUnit { .. } => ErrorKind::Shape,
            InvariantError::AxisOutOfRange { .. } | InvariantError::InvalidPermutation { .. } => {
                ErrorKind::Axis
            }
            InvariantError::BroadcastRank { .. } | InvariantError::BroadcastingFailed { .. } => {
                ErrorKind::Broadcast
            }
            InvariantError::RankTooLow { .. }
            | InvariantError::RankMismatch { .. }
            | InvariantError::NotSquare(_) => ErrorKind::Rank,
        }
    }
}

/// # Enforcer
///
/// Enforcer enforces common invariants on shapes before any data is touched.
pub struct Enforcer;

impl Enforcer {
    /// Maps an axis in `[-rank, rank)` onto `[0, rank)`.
    pub fn normalize_axis(axis: isize, rank: usize) -> Result<usize, InvariantError> {
        let signed = rank as isize;
        if axis >= signed || axis < -signed {
            return Err(InvariantError::AxisOutOfRange { axis, rank });
        }
        Ok(if axis < 0 { axis + signed } else { axis } as usize)
    }

    pub fn assert_min_rank(
        op: &'static str,
        shape: &Shape,
        minimum: usize,
    ) -> Result<(), InvariantError> {
        let actual = shape.rank();
        if actual < minimum {
            return Err(InvariantError::RankTooLow {
                op,
                minimum,
                actual,
            });
        }
        Ok(())
    }

    pub fn assert_equal_ranks(shapes: &[&Shape]) -> Result<usize, InvariantError> {
        let rank = shapes[0].rank();
        for shape in shapes.iter().skip(1) {
            if rank != shape.rank() {
                return Err(InvariantError::RankMismatch {
                    accepted: rank..=rank,
                    actual: shape.rank(),
                });
            }
        }
        Ok(rank)
    }

    pub fn assert_square(shape: &Shape) -> Result<usize, InvariantError> {
        let rank = shape.rank();
        let (rows, cols) = (shape[rank - 2], shape[rank - 1]);
        if rows != cols {
            return Err(InvariantError::NotSquare(shape.clone()));
        }
        Ok(rows)
    }

    /// `dims` must name every axis in `[0, rank)` exactly once.
    pub fn check_permutation(dims: &[usize], rank: usize) -> Result<(), InvariantError> {
        let mut seen: RVec<bool> = crate::rvec![false; rank];
        let valid = dims.len() == rank
            && dims.iter().all(|&d| {
                let fresh = d < rank && !seen[d];
                if fresh {
                    seen[d] = true;
                }
                fresh
            });
        if !valid {
            return Err(InvariantError::InvalidPermutation {
                dims: dims.into(),
                rank,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;
    use test_strategy::proptest;

    #[test]
    fn test_normalize_axis() {
        assert_eq!(Enforcer::normalize_axis(-1, 3).unwrap(), 2);
        assert_eq!(Enforcer::normalize_axis(-3, 3).unwrap(), 0);
        assert_eq!(Enforcer::normalize_axis(2, 3).unwrap(), 2);
        assert!(Enforcer::normalize_axis(3, 3).is_err());
        let err = Enforcer::normalize_axis(-4, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Axis);
    }

    #[test]
    fn test_permutations() {
        assert!(Enforcer::check_permutation(&[2, 0, 1], 3).is_ok());
        assert!(Enforcer::check_permutation(&[0, 0, 1], 3).is_err());
        assert!(Enforcer::check_permutation(&[0, 1], 3).is_err());
        assert!(Enforcer::check_permutation(&[0, 1, 3], 3).is_err());
    }

    #[test]
    fn test_rank_checks() {
        let err = Enforcer::assert_min_rank("sum", &shape![4], 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rank);
        assert_eq!(err.to_string(), "sum requires rank >= 2, got 1.");

        let err = Enforcer::assert_equal_ranks(&[&shape![2, 2], &shape![1, 2, 2]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rank);

        assert_eq!(Enforcer::assert_square(&shape![3, 4, 4]).unwrap(), 4);
        assert!(Enforcer::assert_square(&shape![4, 3]).is_err());
    }

    #[proptest]
    fn test_normalized_axis_in_range(#[strategy(1usize..8)] rank: usize, #[strategy(-8isize..8)] axis: isize) {
        match Enforcer::normalize_axis(axis, rank) {
            Ok(normalized) => {
                assert!(normalized < rank);
                assert!(axis >= -(rank as isize) && axis < rank as isize);
            }
            Err(e) => assert_eq!(e.kind(), ErrorKind::Axis),
        }
    }
}
