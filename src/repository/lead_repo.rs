// ==========================================
// CRM 线索导入 - 线索仓储 Trait
// ==========================================
// 职责: 定义线索持久化协作方接口（不包含实现）
// 红线: 导入核心只依赖 create_lead 的签名与错误形态，不关心存储方式
// ==========================================

use crate::domain::lead::{Lead, LeadInput};
use crate::repository::error::PersistError;
use async_trait::async_trait;
use std::sync::Arc;

// ==========================================
// LeadRepository Trait
// ==========================================
// 实现者: SqliteLeadRepository / 测试中的 Mock 实现
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// 创建线索
    ///
    /// # 参数
    /// - input: 线索可创建字段（按值消费，每行只提交一次）
    ///
    /// # 返回
    /// - Ok(Lead): 已落库线索（含外部分配的 id 与时间戳）
    /// - Err(PersistError): 冲突/被拒绝/服务不可用
    async fn create_lead(&self, input: LeadInput) -> Result<Lead, PersistError>;
}

// 共享仓储（AppState 持有 Arc，逐会话复用）
#[async_trait]
impl<T> LeadRepository for Arc<T>
where
    T: LeadRepository + ?Sized,
{
    async fn create_lead(&self, input: LeadInput) -> Result<Lead, PersistError> {
        (**self).create_lead(input).await
    }
}
