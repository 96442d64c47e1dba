pub mod api;
pub mod common;
pub mod configs;
pub mod library;
pub mod segmenter;
pub mod server;
pub mod session;
pub mod transport;
