pub mod codec;
pub mod resolver;
pub mod root_hints;
pub mod server;
pub mod transport;

pub use resolver::{Exchange, RecursiveResolver, WireExchange};
pub use server::DnsServerHandler;
