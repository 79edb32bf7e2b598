// ==========================================
// CRM 线索导入 - 导入层
// ==========================================
// 职责: CSV 上传 → 解析 → 预览 → 确认 → 映射 → 落库
// ==========================================

// 模块声明
pub mod csv_parser;
pub mod error;
pub mod import_session;
pub mod lead_importer_trait;
pub mod lead_mapper;
pub mod outcome;
pub mod preview;

// 重导出核心类型
pub use csv_parser::CsvParser;
pub use error::{ImportError, ImportResult, MapError, ParseError, SessionError};
pub use import_session::{CancelHandle, ImportSession, SessionState, ANONYMOUS_IMPORTER};
pub use lead_mapper::{is_valid_email, ColumnIndex, LeadRowMapper};
pub use outcome::{ImportSummary, OutcomeLedger, RowIssue, RowOutcome};
pub use preview::{Preview, PreviewProjector};

// 重导出 Trait 接口
pub use lead_importer_trait::{FileParser, MappedRow, RowMapper};
