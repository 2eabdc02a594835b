/// 持久化数据模型

pub mod token;

pub use token::*;
