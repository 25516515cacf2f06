pub mod area;
pub mod error;
pub mod function;
pub mod value;

pub use area::*;
pub use error::*;
pub use function::*;
pub use value::*;
