// ==========================================
// CRM 线索导入 - 行映射器实现
// ==========================================
// 职责: 表头列名匹配 → LeadInput + 行级校验
// 校验顺序:
// 1. 列数与表头一致
// 2. name 列存在且非空
// 3. email 非空时须符合 local@domain（严格: 拒绝；宽松: 丢弃并警告）
// 4. phone 空值 → None
// 5. status 缺失/空 → 默认状态；无法识别 → InvalidStatus
// 未知列忽略
// ==========================================

use crate::config::ImportConfig;
use crate::domain::lead::{LeadInput, RawRow};
use crate::domain::types::{EmailPolicy, LeadStatus};
use crate::importer::error::MapError;
use crate::importer::lead_importer_trait::{MappedRow, RowMapper};

const NAME_ALIASES: &[&str] = &["name", "full name", "lead name", "contact name"];
const EMAIL_ALIASES: &[&str] = &["email", "e-mail", "email address", "mail"];
const PHONE_ALIASES: &[&str] = &["phone", "phone number", "mobile", "telephone", "tel"];
const STATUS_ALIASES: &[&str] = &["status", "stage", "lead status"];

/// 表头列名标准化: 去 BOM / 空白，小写，下划线视为空格
fn normalize_header(cell: &str) -> String {
    cell.trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace('_', " ")
}

fn find_column(header: &RawRow, aliases: &[&str]) -> Option<usize> {
    header
        .iter()
        .position(|cell| aliases.contains(&normalize_header(cell).as_str()))
}

/// 邮箱最小形态校验: local@domain
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

// ==========================================
// ColumnIndex - 表头解析结果
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnIndex {
    pub name: Option<usize>,
    pub email: Option<usize>,
    pub phone: Option<usize>,
    pub status: Option<usize>,
}

impl ColumnIndex {
    pub fn resolve(header: &RawRow) -> Self {
        Self {
            name: find_column(header, NAME_ALIASES),
            email: find_column(header, EMAIL_ALIASES),
            phone: find_column(header, PHONE_ALIASES),
            status: find_column(header, STATUS_ALIASES),
        }
    }

    /// 取单元格（TRIM 后为空视为缺失）
    fn cell<'r>(row: &'r RawRow, column: Option<usize>) -> Option<&'r str> {
        column
            .and_then(|idx| row.get(idx))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

// ==========================================
// LeadRowMapper
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadRowMapper {
    email_policy: EmailPolicy,
    default_status: LeadStatus,
}

impl LeadRowMapper {
    pub fn new(email_policy: EmailPolicy, default_status: LeadStatus) -> Self {
        Self {
            email_policy,
            default_status,
        }
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.email_policy, config.default_status)
    }
}

impl RowMapper for LeadRowMapper {
    fn map_row(&self, header: &RawRow, row: &RawRow) -> Result<MappedRow, MapError> {
        if row.len() != header.len() {
            return Err(MapError::ColumnCountMismatch {
                expected: header.len(),
                actual: row.len(),
            });
        }

        let columns = ColumnIndex::resolve(header);
        let mut warnings = Vec::new();

        let name = ColumnIndex::cell(row, columns.name).ok_or(MapError::MissingName)?;

        let email = match ColumnIndex::cell(row, columns.email) {
            None => None,
            Some(value) if is_valid_email(value) => Some(value.to_string()),
            Some(value) => match self.email_policy {
                EmailPolicy::Strict => return Err(MapError::InvalidEmail(value.to_string())),
                EmailPolicy::Lenient => {
                    warnings.push(MapError::InvalidEmail(value.to_string()));
                    None
                }
            },
        };

        let phone = ColumnIndex::cell(row, columns.phone).map(str::to_string);

        let status = match ColumnIndex::cell(row, columns.status) {
            None => self.default_status,
            Some(value) => value
                .parse::<LeadStatus>()
                .map_err(|_| MapError::InvalidStatus(value.to_string()))?,
        };

        Ok(MappedRow {
            lead: LeadInput {
                name: name.to_string(),
                email,
                phone,
                status,
            },
            warnings,
        })
    }
}
