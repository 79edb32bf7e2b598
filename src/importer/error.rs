// ==========================================
// CRM 线索导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分层:
// - ParseError: 整个文件不可导入（空文件/超限/编码错误），会话回到 Idle
// - MapError: 行级，可恢复，记录到该行结果后继续
// - PersistError: 行级，可恢复，来自持久化协作方（见 repository::error）
// ==========================================

use crate::i18n::t_with_args;
use crate::importer::import_session::SessionState;
use crate::repository::error::PersistError;
use thiserror::Error;

// ==========================================
// ParseError - 文件级解析错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("文件为空: 没有可导入的行")]
    Empty,

    #[error("文件过大: {size} 字节（上限 {limit} 字节）")]
    TooLarge { size: usize, limit: usize },

    #[error("CSV 解析失败: {0}")]
    Malformed(String),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Malformed(err.to_string())
    }
}

// ==========================================
// MapError - 行级映射错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("名称缺失: 未找到 name 列或该行名称为空")]
    MissingName,

    #[error("邮箱格式错误: {0}")]
    InvalidEmail(String),

    #[error("线索状态无法识别: {0}")]
    InvalidStatus(String),

    #[error("列数不匹配: 表头 {expected} 列，实际 {actual} 列")]
    ColumnCountMismatch { expected: usize, actual: usize },
}

impl MapError {
    /// 稳定的原因代码（用于汇总报告/前端定位）
    pub fn code(&self) -> &'static str {
        match self {
            MapError::MissingName => "MissingName",
            MapError::InvalidEmail(_) => "InvalidEmail",
            MapError::InvalidStatus(_) => "InvalidStatus",
            MapError::ColumnCountMismatch { .. } => "ColumnCountMismatch",
        }
    }
}

// ==========================================
// SessionError - 会话状态机误用
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("无效的状态转换: 当前状态 {state}，不允许执行 {action}")]
    InvalidTransition {
        state: SessionState,
        action: &'static str,
    },
}

// ==========================================
// ImportError - 导入模块统一错误
// ==========================================
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    // ===== 持久化错误（仓储初始化） =====
    #[error(transparent)]
    Persist(#[from] PersistError),

    // ===== 会话错误 =====
    #[error(transparent)]
    Session(#[from] SessionError),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 导出错误 =====
    #[error("失败行导出失败: {0}")]
    ExportError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 面向用户的阻断提示（按当前语言）
    pub fn user_message(&self) -> String {
        match self {
            ImportError::Parse(ParseError::Empty) => t_with_args("import.empty_file", &[]),
            ImportError::Parse(ParseError::TooLarge { size, limit }) => t_with_args(
                "import.file_too_large",
                &[("size", &size.to_string()), ("limit", &limit.to_string())],
            ),
            ImportError::Parse(ParseError::Malformed(detail)) => {
                t_with_args("import.malformed_file", &[("detail", detail)])
            }
            ImportError::FileNotFound(path) => {
                t_with_args("import.file_not_found", &[("path", path)])
            }
            ImportError::UnsupportedFormat(ext) => {
                t_with_args("import.unsupported_format", &[("ext", ext)])
            }
            other => t_with_args("common.unexpected_error", &[("detail", &other.to_string())]),
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>（导出阶段）
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
