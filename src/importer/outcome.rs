// ==========================================
// CRM 线索导入 - 行结果台账与导入汇总
// ==========================================
// 行号约定: 表头为第 0 行，数据行从 1 开始
// 终态: Rejected / Persisted / Failed / Skipped
// ==========================================

use crate::i18n::t_with_args;
use crate::importer::error::MapError;
use crate::repository::error::PersistError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// RowOutcome - 单行结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Pending,
    Mapped,
    Rejected(MapError),
    Persisted { lead_id: String },
    Failed(PersistError),
    /// 提交阶段被取消，未提交
    Skipped,
}

impl RowOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RowOutcome::Pending | RowOutcome::Mapped)
    }

    /// 是否计入失败（映射失败或持久化失败）
    pub fn is_failure(&self) -> bool {
        matches!(self, RowOutcome::Rejected(_) | RowOutcome::Failed(_))
    }

    /// 失败原因（原因代码, 描述）
    pub fn failure_reason(&self) -> Option<(&'static str, String)> {
        match self {
            RowOutcome::Rejected(e) => Some((e.code(), e.to_string())),
            RowOutcome::Failed(e) => Some((e.code(), e.to_string())),
            _ => None,
        }
    }
}

// ==========================================
// OutcomeLedger - 行结果台账
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct OutcomeLedger {
    outcomes: BTreeMap<usize, RowOutcome>,
    // 终态写入顺序，用于校验按行号升序落定
    completion_order: Vec<usize>,
}

impl OutcomeLedger {
    /// 为 1..=data_rows 行创建 Pending 记录
    pub fn with_pending(data_rows: usize) -> Self {
        Self {
            outcomes: (1..=data_rows).map(|row| (row, RowOutcome::Pending)).collect(),
            completion_order: Vec::with_capacity(data_rows),
        }
    }

    pub fn set(&mut self, row: usize, outcome: RowOutcome) {
        if outcome.is_terminal() {
            self.completion_order.push(row);
        }
        self.outcomes.insert(row, outcome);
    }

    pub fn get(&self, row: usize) -> Option<&RowOutcome> {
        self.outcomes.get(&row)
    }

    /// 按行号升序遍历
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RowOutcome)> {
        self.outcomes.iter().map(|(row, outcome)| (*row, outcome))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn completion_order(&self) -> &[usize] {
        &self.completion_order
    }

    /// 所有行均已落定终态
    pub fn is_complete(&self) -> bool {
        self.outcomes.values().all(RowOutcome::is_terminal)
    }

    pub fn count(&self, predicate: impl Fn(&RowOutcome) -> bool) -> usize {
        self.outcomes.values().filter(|o| predicate(*o)).count()
    }
}

// ==========================================
// RowIssue - 汇总中的行级问题
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    pub row: usize,
    pub reason: String,  // 稳定原因代码（MissingName / conflict 等）
    pub message: String, // 可读描述
}

impl RowIssue {
    pub fn from_map_error(row: usize, err: &MapError) -> Self {
        Self {
            row,
            reason: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

// ==========================================
// ImportSummary - 导入汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub imported_by: String,
    pub total_rows: usize, // 数据行数（不含表头）
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: bool,
    pub errors: Vec<RowIssue>,
    pub warnings: Vec<RowIssue>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub elapsed_ms: i64,
}

impl ImportSummary {
    /// (行号, 原因代码) 列表，按行号升序
    pub fn error_pairs(&self) -> Vec<(usize, &str)> {
        self.errors
            .iter()
            .map(|issue| (issue.row, issue.reason.as_str()))
            .collect()
    }

    /// 是否全部成功
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    /// 面向用户的一句话汇总（按当前语言）
    pub fn headline(&self) -> String {
        let key = if self.cancelled {
            "summary.cancelled"
        } else if self.failed == 0 {
            "summary.all_succeeded"
        } else {
            "summary.partial"
        };
        t_with_args(
            key,
            &[
                ("total", &self.total_rows.to_string()),
                ("succeeded", &self.succeeded.to_string()),
                ("failed", &self.failed.to_string()),
                ("skipped", &self.skipped.to_string()),
            ],
        )
    }
}
