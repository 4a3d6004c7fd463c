pub mod direction;
pub mod order;
pub mod trade;
