pub mod data;
pub mod matrix;
pub mod neural;
pub mod prelude;
pub mod random;
pub mod viz;
