use half::{bf16, f16};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash, strum_macros::Display)]
pub enum DType {
    F16,
    BF16,
    #[default]
    F32,
    F64,
}

impl DType {
    /// Returns the size of the type in bytes.
    pub fn size_of(self) -> usize {
        match self {
            DType::F16 => 2,
            DType::BF16 => 2,
            DType::F32 => 4,
            DType::F64 => 8,
        }
    }
}

/// Element types a [`crate::Tensor`] can hold.
///
/// Every element type is a float: inversion divides, and the diagnostics
/// rendering prints fixed decimals.
pub trait TensorDType:
    Copy
    + std::fmt::Debug
    + std::fmt::Display
    + PartialEq
    + 'static
    + num_traits::Float
    + Send
    + Sync
    + bytemuck::Pod
{
    fn dt() -> DType;
}

macro_rules! map_type {
    ($t:ty, $v:ident) => {
        impl TensorDType for $t {
            fn dt() -> DType {
                DType::$v
            }
        }
    };
}

map_type!(f32, F32);
map_type!(f64, F64);
map_type!(f16, F16);
map_type!(bf16, BF16);

/// Default element type, chosen at build time with the `f64` feature.
#[cfg(not(feature = "f64"))]
pub type Elem = f32;
#[cfg(feature = "f64")]
pub type Elem = f64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_of_matches_layout() {
        assert_eq!(DType::F16.size_of(), std::mem::size_of::<f16>());
        assert_eq!(DType::BF16.size_of(), std::mem::size_of::<bf16>());
        assert_eq!(DType::F32.size_of(), std::mem::size_of::<f32>());
        assert_eq!(DType::F64.size_of(), std::mem::size_of::<f64>());
    }

    #[test]
    fn test_default_elem() {
        #[cfg(not(feature = "f64"))]
        assert_eq!(Elem::dt(), DType::F32);
        #[cfg(feature = "f64")]
        assert_eq!(Elem::dt(), DType::F64);
    }
}
