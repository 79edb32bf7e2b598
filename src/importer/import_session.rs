// ==========================================
// CRM 线索导入 - 导入会话（状态机）
// ==========================================
// 状态: Idle → FileSelected → Parsed → PreviewConfirmed → Submitting → Completed
// 流程: 选择文件 → 解析 → 预览确认 → 逐行映射并提交 → 汇总
// 红线:
// - 解析失败: 回到 Idle，不保留任何中间状态
// - 单行映射/持久化失败不中断会话
// - 按行号升序逐行提交，结果按行号升序落定
// - 提交阶段取消: 在途行照常完成，后续行标记 Skipped
// ==========================================

use crate::app::session_provider::SessionProvider;
use crate::config::ImportConfig;
use crate::domain::lead::RawRow;
use crate::importer::csv_parser::CsvParser;
use crate::importer::error::{ImportError, ImportResult, ParseError, SessionError};
use crate::importer::lead_importer_trait::{FileParser, RowMapper};
use crate::importer::lead_mapper::LeadRowMapper;
use crate::importer::outcome::{ImportSummary, OutcomeLedger, RowIssue, RowOutcome};
use crate::importer::preview::{Preview, PreviewProjector};
use crate::repository::lead_repo::LeadRepository;
use chrono::Utc;
use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 未登录时的导入人标记
pub const ANONYMOUS_IMPORTER: &str = "anonymous";

// ==========================================
// SessionState - 会话状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Idle,
    FileSelected,
    Parsed,
    PreviewConfirmed,
    Submitting,
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "IDLE"),
            SessionState::FileSelected => write!(f, "FILE_SELECTED"),
            SessionState::Parsed => write!(f, "PARSED"),
            SessionState::PreviewConfirmed => write!(f, "PREVIEW_CONFIRMED"),
            SessionState::Submitting => write!(f, "SUBMITTING"),
            SessionState::Completed => write!(f, "COMPLETED"),
        }
    }
}

// ==========================================
// CancelHandle - 提交阶段取消句柄
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// 请求取消：不中断在途行，后续行不再提交
    ///
    /// 仅在 Submitting 期间生效；提交开始前的请求在 submit() 入口被清除
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ==========================================
// ImportSession
// ==========================================
pub struct ImportSession<R>
where
    R: LeadRepository,
{
    // 持久化协作方
    repo: R,

    // 会话创建时的配置快照
    config: ImportConfig,

    // 导入组件
    parser: Box<dyn FileParser>,
    mapper: Box<dyn RowMapper>,

    // 会话协作方（可选，用于标记导入人）
    session_provider: Option<Arc<dyn SessionProvider>>,

    // 状态广播（UI 订阅）
    state_tx: watch::Sender<SessionState>,
    cancel: CancelHandle,

    // 会话数据
    file_name: Option<String>,
    content: Option<Vec<u8>>,
    rows: Vec<RawRow>,
    ledger: OutcomeLedger,
    summary: Option<ImportSummary>,
}

impl<R> ImportSession<R>
where
    R: LeadRepository,
{
    /// 创建新的导入会话（Idle）
    ///
    /// # 参数
    /// - repo: 线索持久化协作方
    /// - config: 导入配置快照
    pub fn new(repo: R, config: ImportConfig) -> ImportResult<Self> {
        config.validate()?;
        let (state_tx, _) = watch::channel(SessionState::Idle);

        Ok(Self {
            repo,
            parser: Box::new(CsvParser::new(config.delimiter_byte())),
            mapper: Box::new(LeadRowMapper::from_config(&config)),
            config,
            session_provider: None,
            state_tx,
            cancel: CancelHandle::default(),
            file_name: None,
            content: None,
            rows: Vec::new(),
            ledger: OutcomeLedger::default(),
            summary: None,
        })
    }

    pub fn with_session_provider(mut self, provider: Arc<dyn SessionProvider>) -> Self {
        self.session_provider = Some(provider);
        self
    }

    pub fn with_parser(mut self, parser: Box<dyn FileParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_mapper(mut self, mapper: Box<dyn RowMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    // ==========================================
    // 状态查询
    // ==========================================

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// 订阅状态变化（UI 边界以观察者方式驱动对话框等）
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// 已解析的全部行（含表头）
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn outcome(&self, row: usize) -> Option<&RowOutcome> {
        self.ledger.get(row)
    }

    pub fn ledger(&self) -> &OutcomeLedger {
        &self.ledger
    }

    pub fn summary(&self) -> Option<&ImportSummary> {
        self.summary.as_ref()
    }

    // ==========================================
    // 状态转换
    // ==========================================

    fn transition(&self, to: SessionState) {
        // send_replace: 无订阅者时同样更新
        let from = self.state_tx.send_replace(to);
        debug!(from = %from, to = %to, "导入会话状态变更");
    }

    fn expect_state(&self, expected: SessionState, action: &'static str) -> Result<(), SessionError> {
        let state = self.state();
        if state != expected {
            return Err(SessionError::InvalidTransition { state, action });
        }
        Ok(())
    }

    /// 丢弃全部会话数据并回到 Idle
    fn reset(&mut self) {
        self.file_name = None;
        self.content = None;
        self.rows.clear();
        self.ledger = OutcomeLedger::default();
        self.summary = None;
        self.cancel.reset();
        self.transition(SessionState::Idle);
    }

    /// 选择文件（Idle → FileSelected）
    pub fn select_file(
        &mut self,
        content: impl Into<Vec<u8>>,
        file_name: Option<String>,
    ) -> ImportResult<()> {
        self.expect_state(SessionState::Idle, "select_file")?;

        let content = content.into();
        info!(file_name = ?file_name, bytes = content.len(), "已选择导入文件");

        self.file_name = file_name;
        self.content = Some(content);
        self.transition(SessionState::FileSelected);
        Ok(())
    }

    /// 按路径选择 .csv 文件（Idle → FileSelected）
    ///
    /// 文件超出 max_file_bytes 时不读取内容，直接返回 ParseError::TooLarge，会话保持 Idle
    pub fn select_path<P: AsRef<Path>>(&mut self, path: P) -> ImportResult<()> {
        self.expect_state(SessionState::Idle, "select_file")?;
        let path = path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 超限文件不读入内存
        let size = usize::try_from(std::fs::metadata(path)?.len()).unwrap_or(usize::MAX);
        if size > self.config.max_file_bytes {
            warn!(path = %path.display(), size = size, "导入文件超出大小上限");
            return Err(ParseError::TooLarge {
                size,
                limit: self.config.max_file_bytes,
            }
            .into());
        }

        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        self.select_file(content, file_name)
    }

    /// 解析文件（FileSelected → Parsed）
    ///
    /// # 返回
    /// - Ok(usize): 数据行数（不含表头）
    /// - Err(ParseError): 会话回到 Idle
    pub fn parse(&mut self) -> ImportResult<usize> {
        self.expect_state(SessionState::FileSelected, "parse")?;

        let content = self.content.take().unwrap_or_default();
        let parsed = if content.len() > self.config.max_file_bytes {
            Err(ParseError::TooLarge {
                size: content.len(),
                limit: self.config.max_file_bytes,
            })
        } else {
            self.parser.parse_rows(&content)
        };

        match parsed {
            Ok(rows) => {
                let data_rows = rows.len().saturating_sub(1);
                self.ledger = OutcomeLedger::with_pending(data_rows);
                self.rows = rows;
                self.transition(SessionState::Parsed);
                info!(data_rows = data_rows, "文件解析完成");
                Ok(data_rows)
            }
            Err(e) => {
                warn!(error = %e, "文件解析失败，会话回到 Idle");
                self.reset();
                Err(e.into())
            }
        }
    }

    /// 当前预览（Parsed 之后可用）
    pub fn preview(&self) -> Option<Preview<'_>> {
        match self.state() {
            SessionState::Idle | SessionState::FileSelected => None,
            _ => PreviewProjector::project(&self.rows, self.config.preview_limit),
        }
    }

    /// 确认预览（Parsed → PreviewConfirmed），返回展示用预览
    pub fn confirm(&mut self) -> ImportResult<Preview<'_>> {
        self.expect_state(SessionState::Parsed, "confirm")?;
        self.transition(SessionState::PreviewConfirmed);

        PreviewProjector::project(&self.rows, self.config.preview_limit)
            .ok_or_else(|| ImportError::InternalError("已解析的会话缺少表头".to_string()))
    }

    /// 放弃会话（回到 Idle）
    ///
    /// 提交前取消无任何副作用；完成后调用即关闭会话。
    /// 已落库的线索不会回滚。
    pub fn cancel(&mut self) {
        if self.state() != SessionState::Idle {
            info!(state = %self.state(), "导入会话已放弃");
            self.reset();
        }
    }

    /// 提交导入（PreviewConfirmed → Submitting → Completed）
    ///
    /// 处理全部数据行（预览样本仅用于展示），逐行映射并提交。
    #[instrument(skip(self), fields(batch_id))]
    pub async fn submit(&mut self) -> ImportResult<ImportSummary> {
        self.expect_state(SessionState::PreviewConfirmed, "submit")?;

        // 取消句柄只作用于提交阶段: 进入 Submitting 前的取消请求作废
        if self.cancel.is_cancelled() {
            debug!("忽略提交前的取消请求");
            self.cancel.reset();
        }

        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        let started_at = Utc::now();
        let start_time = Instant::now();

        self.transition(SessionState::Submitting);
        info!(batch_id = %batch_id, "开始提交线索导入");

        let mut warnings = Vec::new();
        if let Some((header, data_rows)) = self.rows.split_first() {
            for (idx, row) in data_rows.iter().enumerate() {
                let row_number = idx + 1;

                if self.cancel.is_cancelled() {
                    self.ledger.set(row_number, RowOutcome::Skipped);
                    continue;
                }

                let mapped = match self.mapper.map_row(header, row) {
                    Ok(mapped) => mapped,
                    Err(e) => {
                        warn!(row = row_number, reason = e.code(), error = %e, "行映射失败");
                        self.ledger.set(row_number, RowOutcome::Rejected(e));
                        continue;
                    }
                };

                warnings.extend(
                    mapped
                        .warnings
                        .iter()
                        .map(|w| RowIssue::from_map_error(row_number, w)),
                );
                self.ledger.set(row_number, RowOutcome::Mapped);

                match self.repo.create_lead(mapped.lead).await {
                    Ok(lead) => {
                        debug!(row = row_number, lead_id = %lead.id, "线索已创建");
                        self.ledger
                            .set(row_number, RowOutcome::Persisted { lead_id: lead.id });
                    }
                    Err(e) => {
                        warn!(row = row_number, reason = e.code(), error = %e, "线索创建失败");
                        self.ledger.set(row_number, RowOutcome::Failed(e));
                    }
                }
            }
        }

        let cancelled = self.cancel.is_cancelled();
        let errors = self
            .ledger
            .iter()
            .filter_map(|(row, outcome)| {
                outcome.failure_reason().map(|(reason, message)| RowIssue {
                    row,
                    reason: reason.to_string(),
                    message,
                })
            })
            .collect();

        let summary = ImportSummary {
            batch_id,
            file_name: self.file_name.clone(),
            imported_by: self.imported_by(),
            total_rows: self.ledger.len(),
            succeeded: self
                .ledger
                .count(|o| matches!(o, RowOutcome::Persisted { .. })),
            failed: self.ledger.count(RowOutcome::is_failure),
            skipped: self.ledger.count(|o| matches!(o, RowOutcome::Skipped)),
            cancelled,
            errors,
            warnings,
            started_at,
            completed_at: Utc::now(),
            elapsed_ms: start_time.elapsed().as_millis() as i64,
        };

        self.summary = Some(summary.clone());
        self.transition(SessionState::Completed);

        info!(
            batch_id = %summary.batch_id,
            total = summary.total_rows,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            elapsed_ms = summary.elapsed_ms,
            "线索导入完成"
        );

        Ok(summary)
    }

    fn imported_by(&self) -> String {
        self.session_provider
            .as_ref()
            .and_then(|provider| provider.current_user())
            .map(|user| user.name)
            .unwrap_or_else(|| ANONYMOUS_IMPORTER.to_string())
    }

    /// 导出失败/跳过的行（含表头，单元格原样）供修正后重新导入
    pub fn export_failed_rows(&self) -> ImportResult<String> {
        self.expect_state(SessionState::Completed, "export_failed_rows")?;

        let mut writer = WriterBuilder::new()
            .delimiter(self.config.delimiter_byte())
            .quote_style(QuoteStyle::Never)
            .flexible(true)
            .from_writer(Vec::new());

        if let Some(header) = self.rows.first() {
            writer.write_record(header)?;
        }
        for (row, outcome) in self.ledger.iter() {
            if outcome.is_failure() || matches!(outcome, RowOutcome::Skipped) {
                if let Some(raw) = self.rows.get(row) {
                    writer.write_record(raw)?;
                }
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ImportError::ExportError(e.error().to_string()))?;
        String::from_utf8(bytes).map_err(|e| ImportError::ExportError(e.to_string()))
    }
}
