pub mod cell;
pub mod convert;
pub mod orth;
