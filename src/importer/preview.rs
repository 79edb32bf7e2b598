// ==========================================
// CRM 线索导入 - 预览投影
// ==========================================
// 红线:
// - 表头永远是第 0 行，样本永不包含表头
// - 样本行数 = min(limit, 总行数 - 1)
// - 只读投影，不修改源数据，单元格原样展示
// ==========================================

use crate::domain::lead::RawRow;
use serde::Serialize;

/// 预览表：前端表格直接渲染的行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preview<'a> {
    pub header: &'a RawRow,
    pub sample: &'a [RawRow],
    /// 全部数据行数（不含表头），用于提示“仅显示前 N 行”
    pub total_data_rows: usize,
}

impl Preview<'_> {
    /// 样本是否少于全部数据行
    pub fn is_truncated(&self) -> bool {
        self.sample.len() < self.total_data_rows
    }
}

pub struct PreviewProjector;

impl PreviewProjector {
    /// 投影表头与预览样本
    ///
    /// # 返回
    /// - None: 源数据为空（无表头）
    pub fn project(rows: &[RawRow], limit: usize) -> Option<Preview<'_>> {
        let (header, data) = rows.split_first()?;
        let sample_len = limit.min(data.len());

        Some(Preview {
            header,
            sample: &data[..sample_len],
            total_data_rows: data.len(),
        })
    }
}
