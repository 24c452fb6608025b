// ==========================================
// 图书目录批量导入系统 - 领域层
// ==========================================
// 职责: 目录实体与导入过程的领域类型
// 红线: 领域类型不依赖持久化细节
// ==========================================

pub mod catalog;
pub mod types;

// 重导出核心类型
pub use catalog::{normalize_name, Author, Book, CandidateBook, Publisher};
pub use types::{ImportBatch, ImportReport, ImportSummary, RowOutcome, Severity};
