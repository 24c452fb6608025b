// ==========================================
// 图书目录批量导入系统 - CLI 入口
// ==========================================
// 用法: catalog-import <CSV 文件> [数据库路径]
// ==========================================

use catalog_import::config::config_manager::ConfigManager;
use catalog_import::config::import_config_trait::ImportConfigReader;
use catalog_import::importer::book_importer_trait::BookImporter;
use catalog_import::importer::{BookImporterImpl, ChannelReporter, CsvParser};
use catalog_import::repository::sqlite_catalog_repo::SqliteCatalogRepository;
use catalog_import::{db, i18n, logging};
use std::error::Error;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("用法: {} <CSV 文件> [数据库路径]", catalog_import::APP_NAME);
        std::process::exit(2);
    }

    let file_path = args[1].clone();
    let db_path = args
        .get(2)
        .cloned()
        .unwrap_or_else(db::default_catalog_path);

    if let Err(err) = run(&file_path, &db_path).await {
        error!(error = %err, "导入失败");
        eprintln!("导入失败: {}", err);
        std::process::exit(1);
    }
}

async fn run(file_path: &str, db_path: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!(db = %db_path, file = %file_path, "启动 {} v{}", catalog_import::APP_NAME, catalog_import::VERSION);

    // 单连接共享给仓库与配置（统一 PRAGMA + 幂等建表）
    let conn = db::open_sqlite_connection(db_path)?;
    db::init_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let repository = Arc::new(SqliteCatalogRepository::from_connection(conn.clone()));
    let config = Arc::new(ConfigManager::from_connection(conn)?);

    // 界面语言取配置，失败退回默认
    if let Ok(locale) = config.get_locale().await {
        i18n::set_locale(&locale);
    }

    // 审计行经通道转发到标准输出，与导入工作并发消费
    let (reporter, mut rx) = ChannelReporter::new();
    let printer = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            println!("{}", line.render());
        }
    });

    let importer = BookImporterImpl::new(
        repository,
        config,
        Box::new(CsvParser),
        Arc::new(reporter),
    );

    let result = importer.import_from_file(Path::new(file_path)).await;

    // 发送端随导入器销毁关闭，消费完余下审计行再退出
    drop(importer);
    let _ = printer.await;

    let report = result?;
    info!(batch_id = %report.batch.batch_id, "批次完成");
    Ok(())
}
