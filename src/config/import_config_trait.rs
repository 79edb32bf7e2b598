// ==========================================
// CRM 线索导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::{EmailPolicy, LeadStatus};
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ImportConfig（静态配置）/ ConfigManager（config_kv 表）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// CSV 字段分隔符
    ///
    /// # 默认值
    /// - ','
    async fn get_delimiter(&self) -> ImportResult<char>;

    /// 预览行数上限（不含表头）
    ///
    /// # 默认值
    /// - 10
    async fn get_preview_limit(&self) -> ImportResult<usize>;

    /// 上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 5 MiB
    async fn get_max_file_bytes(&self) -> ImportResult<usize>;

    /// 邮箱格式非法时的处理策略
    ///
    /// # 默认值
    /// - STRICT（整行拒绝）
    async fn get_email_policy(&self) -> ImportResult<EmailPolicy>;

    /// status 列缺失或为空时使用的默认状态
    ///
    /// # 默认值
    /// - new
    async fn get_default_status(&self) -> ImportResult<LeadStatus>;
}
