// ==========================================
// CRM 线索导入 - 领域模型层
// ==========================================
// 职责: 定义线索实体、类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod lead;
pub mod types;

// 重导出核心类型
pub use lead::{Lead, LeadInput, RawRow, User};
pub use types::{EmailPolicy, LeadStatus, UnknownEmailPolicy, UnknownLeadStatus};
