// 客户端状态
// 会话 store 与推荐列表 store，由 LotteryApp 统一创建

pub mod lottery;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use lottery::{Cursor, FetchOutcome, LotteryStore};
pub use session::SessionStore;
