pub mod trader;

pub use trader::*;
