pub mod coordinates;
pub mod linalg;
