pub mod parameters;
pub mod simulate;
