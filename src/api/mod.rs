// 远端 API 模块

pub mod models;
pub mod operations;

pub use operations::{ApiClient, LotteryApi};
