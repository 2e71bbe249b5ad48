pub mod campaign;
pub mod mothers;
