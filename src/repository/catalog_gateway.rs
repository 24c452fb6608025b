// ==========================================
// 图书目录批量导入系统 - 目录持久化网关 Trait
// ==========================================
// 职责: 定义导入核心消费的查找/插入/更新契约（不包含实现）
// 红线: 每次调用自身原子；网关之上不做多行事务
// ==========================================

use crate::domain::catalog::{Author, Book, Publisher};
use crate::domain::types::ImportBatch;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// CatalogGateway Trait
// ==========================================
// 用途: 目录实体按自然键查找、占位插入、整体更新
// 实现者: SqliteCatalogRepository（使用 rusqlite）
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    // ===== 图书（自然键: ISBN）=====

    /// 按 ISBN 查找图书（TRIM 后忽略大小写），关系集合一并装载
    ///
    /// # 返回
    /// - Ok(Some(Book)): 找到
    /// - Ok(None): 不存在
    async fn find_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>, Box<dyn Error + Send + Sync>>;

    /// 插入新图书（含关系行）
    ///
    /// # 前置条件
    /// - book.authors / book.publishers 中的实体均已持久化（id 非空）
    ///
    /// # 返回
    /// - Ok(Book): 带存储分配 id 的实体
    async fn insert_book(&self, book: Book) -> Result<Book, Box<dyn Error + Send + Sync>>;

    /// 更新既有图书：标量字段就地更新，关系行整体替换
    async fn update_book(&self, book: Book) -> Result<Book, Box<dyn Error + Send + Sync>>;

    // ===== 作者（自然键: 归一化显示名）=====

    /// 按归一化显示名查找作者
    async fn find_author_by_name(&self, normalized: &str)
        -> Result<Option<Author>, Box<dyn Error + Send + Sync>>;

    /// 插入作者占位实体
    async fn insert_author(&self, author: Author) -> Result<Author, Box<dyn Error + Send + Sync>>;

    // ===== 出版社（自然键: 归一化显示名）=====

    /// 按归一化显示名查找出版社
    async fn find_publisher_by_name(
        &self,
        normalized: &str,
    ) -> Result<Option<Publisher>, Box<dyn Error + Send + Sync>>;

    /// 插入出版社占位实体
    async fn insert_publisher(&self, publisher: Publisher) -> Result<Publisher, Box<dyn Error + Send + Sync>>;

    // ===== 批次审计 =====

    /// 记录导入批次（每次导入一条）
    async fn record_import_batch(&self, batch: ImportBatch) -> Result<(), Box<dyn Error + Send + Sync>>;
}
