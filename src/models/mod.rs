pub mod cart;
pub mod common;
pub mod dashboard;
pub mod order;
pub mod product;
pub mod user;
