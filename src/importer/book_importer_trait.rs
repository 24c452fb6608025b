// ==========================================
// 图书目录批量导入系统 - 导入器接口定义
// ==========================================
// 职责: 定义文件解析与批量导入的抽象接口
// ==========================================

use crate::domain::types::ImportReport;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::ParsedFile;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// FileParser Trait - 文件解析接口
// ==========================================
// 实现者: CsvParser；未来的制表符/竖线分隔格式走同一接口
pub trait FileParser: Send + Sync {
    /// 把磁盘文件解析为表头 + 原始行记录
    ///
    /// 文件不存在、扩展名不支持、CSV 语法损坏均返回结构性错误。
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<ParsedFile>;
}

// ==========================================
// BookImporter Trait - 批量导入接口
// ==========================================
#[async_trait]
pub trait BookImporter: Send + Sync {
    /// 执行一次完整导入批次
    ///
    /// 结构性错误（文件/表头问题）直接返回 Err，任何数据行都不会处理；
    /// 行级错误累积在报告里，批次正常结束并返回 Ok(ImportReport)。
    async fn import_from_file(&self, file_path: &Path) -> Result<ImportReport, ImportError>;
}
