// ==========================================
// 图书目录批量导入系统 - 库入口
// ==========================================
// 组成: 领域模型 / 持久化 / 配置 / 导入管线 / 基础设施
// ==========================================

// 初始化 i18n（locales 目录，默认中文）
rust_i18n::i18n!("locales", fallback = "zh-CN");

pub mod config;
pub mod db;
pub mod domain;
pub mod i18n;
pub mod importer;
pub mod logging;
pub mod repository;

// 常用类型再导出
pub use config::{ConfigManager, ImportConfigReader};
pub use domain::catalog::{Author, Book, CandidateBook, Publisher};
pub use domain::types::{ImportBatch, ImportReport, ImportSummary, RowOutcome, Severity};
pub use importer::{
    BookImporter, BookImporterImpl, BufferReporter, ChannelReporter, CsvParser, ImportError,
    ImportReporter,
};
pub use repository::{CatalogGateway, SqliteCatalogRepository};

/// 应用名称
pub const APP_NAME: &str = "catalog-import";

/// 应用版本（与 Cargo.toml 同步）
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
