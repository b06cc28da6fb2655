mod binary;
mod inverse;
mod matmul;
mod reduce;
mod reindex;

pub use binary::*;
pub use inverse::*;
pub use matmul::*;
pub use reduce::*;
pub use reindex::*;
