// ==========================================
// CRM 线索导入 - 配置层
// ==========================================
// 职责: 导入配置读取，支持默认值 / JSON / config_kv 表覆写
// ==========================================

pub mod config_manager;
pub mod import_config;
pub mod import_config_trait;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use import_config::ImportConfig;
pub use import_config_trait::ImportConfigReader;
