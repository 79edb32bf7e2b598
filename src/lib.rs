// ==========================================
// CRM 线索导入 - 核心库
// ==========================================
// 流程: CSV 上传 → 解析 → 预览 → 确认 → 映射 → 落库
// 系统定位: UI 无关的导入核心（前端壳只负责渲染与事件）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 线索持久化协作方
pub mod repository;

// 导入层 - 解析/预览/映射/会话
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 应用层 - 共享状态与会话协作方
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{EmailPolicy, Lead, LeadInput, LeadStatus, RawRow, User};

// 导入
pub use importer::{
    CsvParser, ImportError, ImportResult, ImportSession, ImportSummary, LeadRowMapper, MapError,
    ParseError, Preview, PreviewProjector, RowOutcome, SessionState,
};

// 仓储
pub use repository::{LeadRepository, PersistError, SqliteLeadRepository};

// 配置
pub use config::{ConfigManager, ImportConfig, ImportConfigReader};

// 应用
pub use app::{AppState, InMemorySessionProvider, SessionProvider};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "CRM 线索导入";
