// ==========================================
// 图书目录批量导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取行间延时（毫秒）
    ///
    /// 仅用于让人工观察者看得到进度，对正确性无影响。
    ///
    /// # 默认值
    /// - 0（不延时）
    async fn get_row_delay_ms(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;

    /// 获取界面语言（"zh-CN" / "en"）
    ///
    /// # 默认值
    /// - zh-CN
    async fn get_locale(&self) -> Result<String, Box<dyn Error + Send + Sync>>;
}
