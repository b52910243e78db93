//! HTTP - 调用方接口
//!
//! 字段与 GenerationRequest 一一对应的 JSON API；
//! 数值范围与文本长度由调用方预校验，核心收到越界值时拒绝

pub mod dto;
pub mod error;
pub mod handlers;
mod middleware;
mod routes;
mod server;
mod state;

pub use error::ApiError;
pub use server::{HttpServer, ServerConfig};
pub use state::AppState;
