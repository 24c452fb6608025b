// ==========================================
// 图书目录批量导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 配置键常量
pub mod config_keys {
    /// 行间延时（毫秒），仅用于进度可视化
    pub const ROW_DELAY_MS: &str = "import.row_delay_ms";
    /// 界面语言
    pub const LOCALE: &str = "app.locale";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置值（INSERT OR REPLACE）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;

        Ok(())
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_row_delay_ms(&self) -> Result<u64, Box<dyn Error + Send + Sync>> {
        let raw = self.get_config_or_default(config_keys::ROW_DELAY_MS, "0")?;
        let delay = raw
            .parse::<u64>()
            .map_err(|_| format!("配置值格式错误 (key: {}): {}", config_keys::ROW_DELAY_MS, raw))?;
        Ok(delay)
    }

    async fn get_locale(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.get_config_or_default(config_keys::LOCALE, "zh-CN")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use tempfile::NamedTempFile;

    fn create_config_manager() -> (NamedTempFile, ConfigManager) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();

        let conn = db::open_sqlite_connection(&db_path).unwrap();
        db::init_schema(&conn).unwrap();

        let manager = ConfigManager::new(&db_path).unwrap();
        (temp_file, manager)
    }

    #[tokio::test]
    async fn test_row_delay_default() {
        let (_tmp, manager) = create_config_manager();
        assert_eq!(manager.get_row_delay_ms().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_row_delay_set_and_get() {
        let (_tmp, manager) = create_config_manager();
        manager
            .set_config_value(config_keys::ROW_DELAY_MS, "250")
            .unwrap();
        assert_eq!(manager.get_row_delay_ms().await.unwrap(), 250);
    }

    #[tokio::test]
    async fn test_row_delay_invalid_value() {
        let (_tmp, manager) = create_config_manager();
        manager
            .set_config_value(config_keys::ROW_DELAY_MS, "abc")
            .unwrap();
        assert!(manager.get_row_delay_ms().await.is_err());
    }

    #[tokio::test]
    async fn test_locale_default() {
        let (_tmp, manager) = create_config_manager();
        assert_eq!(manager.get_locale().await.unwrap(), "zh-CN");
    }
}
