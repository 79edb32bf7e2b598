// ==========================================
// CRM 线索导入 - 线索领域模型
// ==========================================
// 职责: 线索实体 / 可创建字段子集 / 原始行 / 当前用户
// 红线: 线索 id 与时间戳由持久化协作方分配，导入层不生成
// ==========================================

use crate::domain::types::LeadStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 原始行：上传文件中的一条记录（按列顺序的字符串单元格）
///
/// 第 0 行为表头，定义列名。
pub type RawRow = Vec<String>;

// ==========================================
// Lead - 线索实体
// ==========================================
// 用途: 持久化协作方返回的已落库线索
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,            // 唯一标识（外部分配）
    pub name: String,          // 线索名称（非空）
    pub email: Option<String>, // 邮箱
    pub phone: Option<String>, // 电话
    pub status: LeadStatus,    // 线索状态

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// LeadInput - 线索可创建字段
// ==========================================
// 生命周期: 由 LeadRowMapper 构造 → 持久化协作方按值消费一次 → 丢弃
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: LeadStatus,
}

impl LeadInput {
    /// 以名称创建默认状态（new）的线索输入
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
            status: LeadStatus::New,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = status;
        self
    }
}

// ==========================================
// User - 当前登录用户
// ==========================================
// 由会话协作方提供，导入层仅用于标记导入人
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}
