// ==========================================
// CRM 线索导入 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享资源（数据库连接 / 仓储 / 配置 / 会话）
// 说明: 每次导入创建独立的 ImportSession，不使用全局“当前会话”
// ==========================================

use crate::app::session_provider::SessionProvider;
use crate::config::{ConfigManager, ImportConfig};
use crate::db::open_sqlite_connection;
use crate::importer::{ImportError, ImportResult, ImportSession};
use crate::repository::SqliteLeadRepository;
use std::sync::{Arc, Mutex};
use tracing::info;

/// 应用状态
///
/// 线索仓储与配置管理器共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 线索仓储
    pub lead_repo: Arc<SqliteLeadRepository>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 会话协作方
    pub session_provider: Arc<dyn SessionProvider>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 为内存库）
    /// - session_provider: 会话协作方
    pub fn new(db_path: &str, session_provider: Arc<dyn SessionProvider>) -> ImportResult<Self> {
        info!(db_path = db_path, "初始化AppState");

        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ImportError::InternalError(format!("无法打开数据库: {}", e)))?;
        let conn = Arc::new(Mutex::new(conn));

        let lead_repo = SqliteLeadRepository::from_connection(conn.clone())?;
        let config_manager = ConfigManager::from_connection(conn)?;

        Ok(Self {
            db_path: db_path.to_string(),
            lead_repo: Arc::new(lead_repo),
            config_manager: Arc::new(config_manager),
            session_provider,
        })
    }

    /// 开始一次新的导入（读取最新配置快照）
    pub async fn start_import(&self) -> ImportResult<ImportSession<Arc<SqliteLeadRepository>>> {
        let config = ImportConfig::load(self.config_manager.as_ref()).await?;
        let session = ImportSession::new(self.lead_repo.clone(), config)?
            .with_session_provider(self.session_provider.clone());
        Ok(session)
    }
}
