// ==========================================
// CRM 线索导入 - 应用层
// ==========================================
// 职责: 连接前端壳与导入核心（共享资源 / 会话协作方）
// ==========================================

pub mod session_provider;
pub mod state;

// 重导出
pub use session_provider::{InMemorySessionProvider, SessionProvider};
pub use state::AppState;
