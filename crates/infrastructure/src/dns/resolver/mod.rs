pub mod core;
pub mod exchange;

pub use core::RecursiveResolver;
pub use exchange::{Exchange, WireExchange};
