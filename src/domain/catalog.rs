// ==========================================
// 图书目录批量导入系统 - 目录领域模型
// ==========================================
// 职责: Book / Author / Publisher 实体与候选记录
// 红线: 集合成员判定一律走自然键（归一化），禁止对象同一性比较
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 自然键归一化：TRIM + 大小写折叠
///
/// 作者/出版社按归一化显示名判重，ISBN 按 TRIM 后忽略大小写比较。
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// ==========================================
// Author - 作者实体
// ==========================================
// 自然键: 归一化显示名
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: Option<i64>,   // 持久化后由存储分配
    pub name: String,      // 显示名（保留原始拼写）
    pub created_at: DateTime<Utc>,
}

impl Author {
    /// 构造占位实体（仅填显示名，其余默认）
    pub fn placeholder(name: &str) -> Self {
        Self {
            id: None,
            name: name.trim().to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn natural_key(&self) -> String {
        normalize_name(&self.name)
    }
}

// ==========================================
// Publisher - 出版社实体
// ==========================================
// 自然键: 归一化显示名
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publisher {
    pub id: Option<i64>,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Publisher {
    pub fn placeholder(name: &str) -> Self {
        Self {
            id: None,
            name: name.trim().to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn natural_key(&self) -> String {
        normalize_name(&self.name)
    }
}

// ==========================================
// Book - 图书实体
// ==========================================
// 自然键: ISBN
// 用途: 导入层经由网关写入；关系集合随实体整体读写
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    // ===== 主键 =====
    pub id: Option<i64>,

    // ===== 标量字段 =====
    pub title: String,
    pub isbn: String,                         // 自然键
    pub publication_date: Option<NaiveDate>,

    // ===== 关系集合（按自然键判重）=====
    pub authors: Vec<Author>,
    pub publishers: Vec<Publisher>,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn natural_key(&self) -> String {
        normalize_name(&self.isbn)
    }
}

// ==========================================
// CandidateBook - 候选记录（一行一条）
// ==========================================
// 生命周期: 反序列化产出 → 一次对账 → 丢弃
// 红线: errors 非空的候选永不触达持久化
#[derive(Debug, Clone, Default)]
pub struct CandidateBook {
    pub row_number: usize,

    pub title: Option<String>,
    pub isbn: Option<String>,
    pub publication_date: Option<NaiveDate>,

    // 引用集合：仅显示名，未解析（解析交给 NaturalKeyResolver）
    pub authors: Vec<String>,
    pub publishers: Vec<String>,

    // 行级错误（有序累积，随行一并输出）
    pub errors: Vec<String>,
}

impl CandidateBook {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            ..Default::default()
        }
    }

    pub fn add_error(&mut self, message: String) {
        self.errors.push(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 展示用标题（无标题行以占位符呈现）
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => "(无标题)",
        }
    }
}
