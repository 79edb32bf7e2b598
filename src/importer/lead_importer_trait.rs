// ==========================================
// CRM 线索导入 - 导入管道 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 阶段: 文件解析 → 行映射（持久化见 repository::LeadRepository）
// ==========================================

use crate::domain::lead::{LeadInput, RawRow};
use crate::importer::error::{MapError, ParseError};

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 1）
// 实现者: CsvParser
pub trait FileParser: Send + Sync {
    /// 解析原始文件内容为有序的原始行（第 0 行为表头）
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 至少一行
    /// - Err(ParseError): 空文件 / 编码错误
    fn parse_rows(&self, content: &[u8]) -> Result<Vec<RawRow>, ParseError>;
}

// ==========================================
// MappedRow - 单行映射结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRow {
    pub lead: LeadInput,
    /// 不阻断导入的问题（宽松策略下被丢弃的邮箱等）
    pub warnings: Vec<MapError>,
}

// ==========================================
// RowMapper Trait
// ==========================================
// 用途: 行映射接口（阶段 2）
// 实现者: LeadRowMapper
// 红线: 纯函数，相同输入必得相同输出
pub trait RowMapper: Send + Sync {
    /// 将一条原始行映射为线索输入
    ///
    /// # 参数
    /// - header: 表头行（按列名查找）
    /// - row: 数据行
    fn map_row(&self, header: &RawRow, row: &RawRow) -> Result<MappedRow, MapError>;
}
