pub mod cli;
pub mod engine;
pub mod error;
pub mod frame;
pub mod identity;
pub mod model;
pub mod packet;
pub mod render;
pub mod session;
pub mod transport;
