// ==========================================
// CRM 线索导入 - CSV 解析器实现
// ==========================================
// 规则:
// - 记录分隔符为 \n（\r\n 视为同一分隔符），单独的 \r 不是分隔符
// - 行数 = 记录分隔符数 + 1；仅忽略结尾的一个记录分隔符
// - 空行保留为 [""]，由行映射阶段标记（行号与文件行一一对应）
// - 不处理引号转义，引号按普通字符保留
// - 单元格原样保留（不 TRIM），预览需逐字展示
// - 列数不一致的行原样保留，由行映射阶段标记
// ==========================================

use crate::config::import_config::DEFAULT_DELIMITER;
use crate::domain::lead::RawRow;
use crate::importer::error::ParseError;
use crate::importer::lead_importer_trait::FileParser;
use csv::{ReaderBuilder, StringRecord, Terminator};

// ==========================================
// CsvParser 实现
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct CsvParser {
    delimiter: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER as u8)
    }
}

impl CsvParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// 解析文本内容
    pub fn parse_text(&self, text: &str) -> Result<Vec<RawRow>, ParseError> {
        self.parse_rows(text.as_bytes())
    }

    /// 按字段分隔符切分单条记录（记录内不含 \n）
    fn split_record(&self, record: &str) -> Result<RawRow, ParseError> {
        if record.is_empty() {
            return Ok(vec![String::new()]);
        }

        // 记录已按 \n 切好；Terminator::Any(b'\n') 保证记录内的 \r 按普通字符处理
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .delimiter(self.delimiter)
            .terminator(Terminator::Any(b'\n'))
            .from_reader(record.as_bytes());

        let mut fields = StringRecord::new();
        if reader.read_record(&mut fields)? {
            Ok(fields.iter().map(str::to_string).collect())
        } else {
            Ok(vec![String::new()])
        }
    }
}

impl FileParser for CsvParser {
    fn parse_rows(&self, content: &[u8]) -> Result<Vec<RawRow>, ParseError> {
        let text =
            std::str::from_utf8(content).map_err(|e| ParseError::Malformed(e.to_string()))?;

        // 仅忽略结尾的一个记录分隔符
        let body = match text.strip_suffix('\n') {
            Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
            None => text,
        };

        if body.is_empty() {
            return Err(ParseError::Empty);
        }

        body.split('\n')
            .map(|record| self.split_record(record.strip_suffix('\r').unwrap_or(record)))
            .collect()
    }
}
