pub mod adjust_speed;
pub mod build;
pub mod check;
pub mod validate;
