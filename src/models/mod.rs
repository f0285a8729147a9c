pub mod file;
pub mod mapping;

pub use file::*;
pub use mapping::*;
