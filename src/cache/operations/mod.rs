/// 令牌读写操作

pub mod session;
pub mod token;

pub use session::SessionToken;
pub use token::*;
