pub mod config;
pub mod consts;
pub mod engine;
pub mod identity;
pub mod init;
pub mod logging;
pub mod server;
pub mod tuple;
