pub mod clearing;
pub mod orders;
pub mod settle;

pub use clearing::*;
pub use orders::*;
pub use settle::*;
