// ==========================================
// 图书目录批量导入系统 - 导入模块
// ==========================================
// 管线: 文件解析 → 表头校验 → 行反序列化 → 自然键解析 → 对账 → 报告
// ==========================================

pub mod book_importer_impl;
pub mod book_importer_trait;
pub mod converters;
pub mod error;
pub mod field_schema;
pub mod file_parser;
pub mod header_validator;
pub mod reconciler;
pub mod reporter;
pub mod resolver;
pub mod row_deserializer;

#[cfg(test)]
pub(crate) mod test_support;

pub use book_importer_impl::BookImporterImpl;
pub use book_importer_trait::{BookImporter, FileParser};
pub use error::{ImportError, ImportResult};
pub use field_schema::{FieldSchema, FieldSpec};
pub use file_parser::{CsvParser, ParsedFile};
pub use reconciler::{Reconciler, RowReconciliation};
pub use reporter::{BufferReporter, ChannelReporter, ImportReporter, ReportLine};
pub use resolver::NaturalKeyResolver;
