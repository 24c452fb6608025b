// ==========================================
// 图书目录批量导入系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键/busy_timeout）
// - 提供目录 schema 的一次性建表入口
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 默认目录数据库路径（用户数据目录下）
pub fn default_catalog_path() -> String {
    let mut dir: PathBuf = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push("catalog-import");
    let _ = std::fs::create_dir_all(&dir);
    dir.push("catalog.db");
    dir.to_string_lossy().to_string()
}

/// 初始化目录 schema（幂等）
///
/// 表:
/// - books / authors / publishers：实体表，自然键唯一索引
/// - book_author / book_publisher：多对多关系
/// - import_batch：批次审计
/// - config_kv：配置键值
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            isbn TEXT NOT NULL,
            publication_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_books_isbn ON books(isbn);

        CREATE TABLE IF NOT EXISTS authors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            normalized_name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_authors_normalized_name
            ON authors(normalized_name);

        CREATE TABLE IF NOT EXISTS publishers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            normalized_name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_publishers_normalized_name
            ON publishers(normalized_name);

        CREATE TABLE IF NOT EXISTS book_author (
            book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
            PRIMARY KEY (book_id, author_id)
        );

        CREATE TABLE IF NOT EXISTS book_publisher (
            book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            publisher_id INTEGER NOT NULL REFERENCES publishers(id) ON DELETE CASCADE,
            PRIMARY KEY (book_id, publisher_id)
        );

        CREATE TABLE IF NOT EXISTS import_batch (
            batch_id TEXT PRIMARY KEY,
            file_name TEXT,
            file_path TEXT,
            total_rows INTEGER NOT NULL,
            created_rows INTEGER NOT NULL,
            updated_rows INTEGER NOT NULL,
            unchanged_rows INTEGER NOT NULL,
            rejected_rows INTEGER NOT NULL,
            failed_rows INTEGER NOT NULL,
            imported_at TEXT NOT NULL,
            elapsed_ms INTEGER NOT NULL,
            summary_json TEXT
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )
}
