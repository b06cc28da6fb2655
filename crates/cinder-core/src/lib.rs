//! Strided N-dimensional arrays over shared, reference-counted buffers.
//!
//! A [`Tensor`] is a view: a [`Shape`] and [`Strides`] over a [`Storage`] that
//! may be aliased by any number of other views. Permutes, broadcasts and most
//! reshapes only rewrite the view; a reshape that strides cannot express
//! falls back to a contiguous copy.
mod cpu;
mod cursor;
mod dtype;
mod enforcer;
mod format;
#[cfg(feature = "testing")]
mod ndarray_ext;
mod op;
mod ops;
mod shape;
mod storage;
mod strides;
mod tensor;

pub use cpu::*;
pub use cursor::*;
pub use dtype::*;
pub use enforcer::*;
pub use op::*;
pub use ops::*;
pub use shape::*;
pub use storage::*;
pub use strides::*;
pub use tensor::*;

use smallvec::SmallVec;
pub type RVec<T> = SmallVec<[T; 4]>;

//https://github.com/sonos/tract/blob/main/data/src/macros.rs#L2
#[macro_export]
macro_rules! rvec {
    (@one $x:expr) => (1usize);
    ($elem:expr; $n:expr) => ({
        $crate::RVec::from_elem($elem, $n)
    });
    ($($x:expr),*$(,)*) => ({
        let count = 0usize $(+ rvec![@one $x])*;
        #[allow(unused_mut)]
        let mut vec = $crate::RVec::new();
        if count <= vec.inline_size() {
            $(vec.push($x);)*
            vec
        } else {
            $crate::RVec::from_vec(vec![$($x,)*])
        }
    });
}

#[macro_export]
macro_rules! shape {
    ($($x:expr),*$(,)*) => ({
        use $crate::rvec;
        $crate::Shape::new(rvec![$($x,)*])
    });
}

pub mod prelude {
    pub use crate::{rvec, shape, Elem, PivotPolicy, Shape, Tensor, TensorError};
}
