pub mod chain;
pub mod request;
pub mod token;

pub use chain::*;
pub use request::*;
pub use token::*;

pub const PROTOCOL_VERSION: &str = "1.0";
