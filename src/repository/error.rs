// ==========================================
// CRM 线索导入 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: PersistError 为行级可恢复错误，导入会话记录后继续处理后续行
// ==========================================

use thiserror::Error;

/// 线索持久化错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    #[error("线索冲突: {0}")]
    Conflict(String),

    #[error("线索被拒绝: {0}")]
    Rejected(String),

    #[error("持久化服务不可用: {0}")]
    Unavailable(String),
}

impl PersistError {
    /// 稳定的原因代码（用于汇总报告）
    pub fn code(&self) -> &'static str {
        match self {
            PersistError::Conflict(_) => "conflict",
            PersistError::Rejected(_) => "rejected",
            PersistError::Unavailable(_) => "unavailable",
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for PersistError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let message = msg.unwrap_or_else(|| e.to_string());
                if message.contains("UNIQUE") {
                    PersistError::Conflict(message)
                } else {
                    PersistError::Rejected(message)
                }
            }
            _ => PersistError::Unavailable(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type PersistResult<T> = Result<T, PersistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_error_codes() {
        assert_eq!(PersistError::Conflict("dup".into()).code(), "conflict");
        assert_eq!(PersistError::Rejected("bad".into()).code(), "rejected");
        assert_eq!(PersistError::Unavailable("down".into()).code(), "unavailable");
    }

    #[test]
    fn test_from_rusqlite_non_constraint_is_unavailable() {
        let err: PersistError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, PersistError::Unavailable(_)));
    }
}
