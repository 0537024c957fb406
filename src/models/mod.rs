pub mod house;
pub mod search;

pub use house::*;
pub use search::*;
