// ==========================================
// 集成测试辅助函数
// ==========================================
#![allow(dead_code)]

use catalog_import::db;
use rusqlite::Connection;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::{Builder, NamedTempFile};

/// 创建带完整 schema 的临时数据库
///
/// 返回 (临时文件句柄, 共享连接)；句柄析构时文件自动清理
pub fn create_test_db() -> (NamedTempFile, Arc<Mutex<Connection>>) {
    let temp_file = NamedTempFile::new().expect("创建临时数据库失败");
    let conn = db::open_sqlite_connection(&temp_file.path().to_string_lossy())
        .expect("打开临时数据库失败");
    db::init_schema(&conn).expect("初始化 schema 失败");
    (temp_file, Arc::new(Mutex::new(conn)))
}

/// 写入一个临时 CSV 文件
pub fn write_csv(content: &str) -> NamedTempFile {
    let mut temp_file = Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("创建临时 CSV 失败");
    write!(temp_file, "{}", content).expect("写入临时 CSV 失败");
    temp_file
}

/// 统计表行数
pub fn count_rows(conn: &Arc<Mutex<Connection>>, table: &str) -> i64 {
    let guard = conn.lock().unwrap();
    guard
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .unwrap()
}
