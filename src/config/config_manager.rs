// ==========================================
// CRM 线索导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config::{
    DEFAULT_DELIMITER, DEFAULT_MAX_FILE_BYTES, DEFAULT_PREVIEW_LIMIT,
};
use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::types::{EmailPolicy, LeadStatus};
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// 配置键
pub mod config_keys {
    pub const DELIMITER: &str = "import.delimiter";
    pub const PREVIEW_LIMIT: &str = "import.preview_limit";
    pub const MAX_FILE_BYTES: &str = "import.max_file_bytes";
    pub const EMAIL_POLICY: &str = "import.email_policy";
    pub const DEFAULT_STATUS: &str = "import.default_status";
}

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(Self::db_error)?;
        ensure_schema(&conn).map_err(Self::db_error)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager（与 SqliteLeadRepository 共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))?;
            ensure_schema(&guard).map_err(Self::db_error)?;
        }
        Ok(Self { conn })
    }

    fn db_error(err: rusqlite::Error) -> ImportError {
        ImportError::ConfigReadError {
            key: "*".to_string(),
            message: err.to_string(),
        }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))?;

        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// 写入（覆盖）配置值
    pub fn set_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![GLOBAL_SCOPE, key, value],
        )
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        debug!(key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 读取并解析配置值，不存在时返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ImportResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|e| ImportError::ConfigValueError {
                key: key.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_delimiter(&self) -> ImportResult<char> {
        match self.get_config_value(config_keys::DELIMITER)? {
            None => Ok(DEFAULT_DELIMITER),
            // "\t" 允许以转义形式存储
            Some(raw) if raw == "\\t" => Ok('\t'),
            Some(raw) => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ImportError::ConfigValueError {
                        key: config_keys::DELIMITER.to_string(),
                        value: raw.clone(),
                        message: "分隔符必须是单个字符".to_string(),
                    }),
                }
            }
        }
    }

    async fn get_preview_limit(&self) -> ImportResult<usize> {
        self.get_parsed_or_default(config_keys::PREVIEW_LIMIT, DEFAULT_PREVIEW_LIMIT)
    }

    async fn get_max_file_bytes(&self) -> ImportResult<usize> {
        self.get_parsed_or_default(config_keys::MAX_FILE_BYTES, DEFAULT_MAX_FILE_BYTES)
    }

    async fn get_email_policy(&self) -> ImportResult<EmailPolicy> {
        self.get_parsed_or_default(config_keys::EMAIL_POLICY, EmailPolicy::Strict)
    }

    async fn get_default_status(&self) -> ImportResult<LeadStatus> {
        self.get_parsed_or_default(config_keys::DEFAULT_STATUS, LeadStatus::New)
    }
}
