pub mod compile;
pub mod emit;
pub mod expr;
pub mod message;
pub mod rules;
pub mod types;
pub mod validate;
