pub mod board;
pub mod config;
pub mod fold;
pub mod stack;

pub use board::*;
pub use config::*;
pub use fold::*;
pub use stack::*;
