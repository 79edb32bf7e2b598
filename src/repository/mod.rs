// ==========================================
// CRM 线索导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod lead_repo;
pub mod lead_repo_impl;

// 重导出核心仓储
pub use error::{PersistError, PersistResult};
pub use lead_repo::LeadRepository;
pub use lead_repo_impl::SqliteLeadRepository;
