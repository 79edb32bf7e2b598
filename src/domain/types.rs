// ==========================================
// CRM 线索导入 - 领域类型定义
// ==========================================
// 依据: CRM 线索状态流转 (new → contacted → qualified → negotiating → closed/lost)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// 线索状态 (Lead Status)
// ==========================================
// 序列化格式: lowercase (与前端约定一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,         // 新线索
    Contacted,   // 已联系
    Qualified,   // 已确认意向
    Negotiating, // 商务谈判中
    Closed,      // 已成交
    Lost,        // 已流失
}

impl LeadStatus {
    /// 全部状态（按流转顺序）
    pub const ALL: [LeadStatus; 6] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Negotiating,
        LeadStatus::Closed,
        LeadStatus::Lost,
    ];

    /// 转换为数据库存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Negotiating => "negotiating",
            LeadStatus::Closed => "closed",
            LeadStatus::Lost => "lost",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// 无法识别的线索状态
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown lead status: {0}")]
pub struct UnknownLeadStatus(pub String);

impl FromStr for LeadStatus {
    type Err = UnknownLeadStatus;

    /// 大小写不敏感，忽略首尾空白
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.to_db_str() == normalized)
            .ok_or_else(|| UnknownLeadStatus(s.trim().to_string()))
    }
}

// ==========================================
// 邮箱校验策略 (Email Policy)
// ==========================================
// Strict: 邮箱格式非法 → 整行拒绝
// Lenient: 邮箱格式非法 → 丢弃邮箱字段，行仍可导入（记录警告）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailPolicy {
    #[default]
    Strict,
    Lenient,
}

impl fmt::Display for EmailPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailPolicy::Strict => write!(f, "STRICT"),
            EmailPolicy::Lenient => write!(f, "LENIENT"),
        }
    }
}

/// 无法识别的邮箱校验策略
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知的邮箱校验策略: {0}")]
pub struct UnknownEmailPolicy(pub String);

impl FromStr for EmailPolicy {
    type Err = UnknownEmailPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STRICT" => Ok(EmailPolicy::Strict),
            "LENIENT" => Ok(EmailPolicy::Lenient),
            _ => Err(UnknownEmailPolicy(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_status_parse_case_insensitive() {
        assert_eq!("Qualified".parse::<LeadStatus>(), Ok(LeadStatus::Qualified));
        assert_eq!("  LOST ".parse::<LeadStatus>(), Ok(LeadStatus::Lost));

        let err = "archived".parse::<LeadStatus>().unwrap_err();
        assert_eq!(err, UnknownLeadStatus("archived".to_string()));
        assert_eq!(err.to_string(), "unknown lead status: archived");
    }

    #[test]
    fn test_lead_status_serde_lowercase() {
        let json = serde_json::to_string(&LeadStatus::Negotiating).unwrap();
        assert_eq!(json, "\"negotiating\"");
        assert_eq!(LeadStatus::default(), LeadStatus::New);
    }

    #[test]
    fn test_email_policy_parse() {
        assert_eq!("lenient".parse::<EmailPolicy>(), Ok(EmailPolicy::Lenient));
        let err = "maybe".parse::<EmailPolicy>().unwrap_err();
        assert_eq!(err.to_string(), "未知的邮箱校验策略: maybe");
    }
}
