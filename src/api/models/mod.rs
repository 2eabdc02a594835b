// API 数据结构模块
// 与服务端交互的请求/响应结构

pub mod common;
pub mod lottery;
pub mod user;

// 重新导出常用类型
pub use common::*;
pub use lottery::*;
pub use user::*;
