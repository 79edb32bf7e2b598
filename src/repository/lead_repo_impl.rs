// ==========================================
// CRM 线索导入 - 线索 Repository 实现
// ==========================================
// 职责: 基于 rusqlite 的线索持久化协作方参考实现
// 红线: Repository 不含业务规则，只做数据 CRUD
// 约束: 邮箱（忽略大小写）唯一，重复 → PersistError::Conflict
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::lead::{Lead, LeadInput};
use crate::domain::types::LeadStatus;
use crate::repository::error::{PersistError, PersistResult};
use crate::repository::lead_repo::LeadRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

// ==========================================
// SqliteLeadRepository
// ==========================================
pub struct SqliteLeadRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLeadRepository {
    /// 创建新的 Repository 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 为内存库）
    pub fn new(db_path: &str) -> PersistResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与 ConfigManager 共享同一连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> PersistResult<Self> {
        {
            let guard = Self::lock(&conn)?;
            ensure_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    fn lock(conn: &Arc<Mutex<Connection>>) -> PersistResult<MutexGuard<'_, Connection>> {
        conn.lock()
            .map_err(|e| PersistError::Unavailable(format!("锁获取失败: {}", e)))
    }

    fn row_to_lead(row: &Row<'_>) -> rusqlite::Result<Lead> {
        let status_raw: String = row.get(4)?;
        // 库内只会写入合法状态，非法值按 new 兜底
        let status = status_raw.parse::<LeadStatus>().unwrap_or_default();
        Ok(Lead {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            status,
            created_at: row.get::<_, DateTime<Utc>>(5)?,
            updated_at: row.get::<_, DateTime<Utc>>(6)?,
        })
    }

    /// 按 id 查询线索
    pub fn get_lead(&self, id: &str) -> PersistResult<Option<Lead>> {
        let conn = Self::lock(&self.conn)?;
        let lead = conn
            .query_row(
                "SELECT id, name, email, phone, status, created_at, updated_at
                 FROM leads WHERE id = ?1",
                params![id],
                Self::row_to_lead,
            )
            .optional()?;
        Ok(lead)
    }

    /// 查询全部线索（按创建时间、名称排序）
    pub fn list_leads(&self) -> PersistResult<Vec<Lead>> {
        let conn = Self::lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT id, name, email, phone, status, created_at, updated_at
             FROM leads ORDER BY created_at, rowid",
        )?;
        let leads = stmt
            .query_map([], Self::row_to_lead)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(leads)
    }

    /// 线索总数
    pub fn count_leads(&self) -> PersistResult<usize> {
        let conn = Self::lock(&self.conn)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM leads", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl LeadRepository for SqliteLeadRepository {
    async fn create_lead(&self, input: LeadInput) -> Result<Lead, PersistError> {
        if input.name.trim().is_empty() {
            return Err(PersistError::Rejected("name 不能为空".to_string()));
        }

        let now = Utc::now();
        let lead = Lead {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            status: input.status,
            created_at: now,
            updated_at: now,
        };

        let conn = Self::lock(&self.conn)?;
        conn.execute(
            "INSERT INTO leads (id, name, email, phone, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                lead.id,
                lead.name,
                lead.email,
                lead.phone,
                lead.status.to_db_str(),
                lead.created_at,
                lead.updated_at,
            ],
        )?;

        debug!(lead_id = %lead.id, "线索已落库");
        Ok(lead)
    }
}
