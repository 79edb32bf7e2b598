// ==========================================
// CRM 线索导入 - 导入配置快照
// ==========================================
// 职责: 导入会话使用的不可变配置（会话创建时读取一次）
// 来源: 默认值 / JSON / 任意 ImportConfigReader
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::types::{EmailPolicy, LeadStatus};
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 默认预览行数
pub const DEFAULT_PREVIEW_LIMIT: usize = 10;

/// 默认文件大小上限: 5 MiB
pub const DEFAULT_MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// 默认分隔符
pub const DEFAULT_DELIMITER: char = ',';

// ==========================================
// ImportConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub delimiter: char,
    pub preview_limit: usize,
    pub max_file_bytes: usize,
    pub email_policy: EmailPolicy,
    pub default_status: LeadStatus,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            email_policy: EmailPolicy::Strict,
            default_status: LeadStatus::New,
        }
    }
}

impl ImportConfig {
    /// 从 JSON 字符串加载（缺失字段取默认值）
    pub fn from_json_str(json: &str) -> ImportResult<Self> {
        let config: ImportConfig =
            serde_json::from_str(json).map_err(|e| ImportError::ConfigValueError {
                key: "import_config".to_string(),
                value: json.to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// 从任意配置读取器生成快照
    pub async fn load<C: ImportConfigReader + ?Sized>(reader: &C) -> ImportResult<Self> {
        let config = Self {
            delimiter: reader.get_delimiter().await?,
            preview_limit: reader.get_preview_limit().await?,
            max_file_bytes: reader.get_max_file_bytes().await?,
            email_policy: reader.get_email_policy().await?,
            default_status: reader.get_default_status().await?,
        };
        config.validate()?;
        Ok(config)
    }

    /// 分隔符必须是单字节 ASCII 字符（csv 读取器限制）
    pub fn validate(&self) -> ImportResult<()> {
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '\n' | '\r') {
            return Err(ImportError::ConfigValueError {
                key: "delimiter".to_string(),
                value: self.delimiter.to_string(),
                message: "分隔符必须是非换行的 ASCII 字符".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_email_policy(mut self, policy: EmailPolicy) -> Self {
        self.email_policy = policy;
        self
    }

    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }

    pub fn with_max_file_bytes(mut self, limit: usize) -> Self {
        self.max_file_bytes = limit;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// 单字节分隔符（validate 之后调用）
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}

#[async_trait]
impl ImportConfigReader for ImportConfig {
    async fn get_delimiter(&self) -> ImportResult<char> {
        Ok(self.delimiter)
    }

    async fn get_preview_limit(&self) -> ImportResult<usize> {
        Ok(self.preview_limit)
    }

    async fn get_max_file_bytes(&self) -> ImportResult<usize> {
        Ok(self.max_file_bytes)
    }

    async fn get_email_policy(&self) -> ImportResult<EmailPolicy> {
        Ok(self.email_policy)
    }

    async fn get_default_status(&self) -> ImportResult<LeadStatus> {
        Ok(self.default_status)
    }
}
