// ==========================================
// 图书目录批量导入系统 - 自然键解析器
// ==========================================
// 职责: 裸引用（仅显示名）→ 已持久化实体，不存在则占位创建
// 红线: 同一批次内同名只插入一次（批内缓存，按归一化键）
// ==========================================

use crate::domain::catalog::{normalize_name, Author, Publisher};
use crate::repository::catalog_gateway::CatalogGateway;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// NaturalKeyResolver - 按自然键查找或创建
// ==========================================
// 生命周期: 一次导入批次一个实例；缓存随批次丢弃
pub struct NaturalKeyResolver {
    gateway: Arc<dyn CatalogGateway>,

    // 批内缓存（归一化名 → 已持久化实体），首次解析时惰性填充
    author_cache: HashMap<String, Author>,
    publisher_cache: HashMap<String, Publisher>,
}

impl NaturalKeyResolver {
    pub fn new(gateway: Arc<dyn CatalogGateway>) -> Self {
        Self {
            gateway,
            author_cache: HashMap::new(),
            publisher_cache: HashMap::new(),
        }
    }

    /// 解析作者引用：缓存 → 存储查找 → 占位插入
    ///
    /// 同名（归一化后）在一个批次内只产生一个持久化实体。
    pub async fn resolve_author(&mut self, name: &str) -> Result<Author, Box<dyn Error + Send + Sync>> {
        let key = normalize_name(name);

        if let Some(cached) = self.author_cache.get(&key) {
            return Ok(cached.clone());
        }

        let author = match self.gateway.find_author_by_name(&key).await? {
            Some(existing) => {
                debug!(name = %name, id = ?existing.id, "作者已存在");
                existing
            }
            None => {
                let inserted = self.gateway.insert_author(Author::placeholder(name)).await?;
                debug!(name = %name, id = ?inserted.id, "作者占位创建");
                inserted
            }
        };

        self.author_cache.insert(key, author.clone());
        Ok(author)
    }

    /// 解析出版社引用：缓存 → 存储查找 → 占位插入
    pub async fn resolve_publisher(&mut self, name: &str) -> Result<Publisher, Box<dyn Error + Send + Sync>> {
        let key = normalize_name(name);

        if let Some(cached) = self.publisher_cache.get(&key) {
            return Ok(cached.clone());
        }

        let publisher = match self.gateway.find_publisher_by_name(&key).await? {
            Some(existing) => {
                debug!(name = %name, id = ?existing.id, "出版社已存在");
                existing
            }
            None => {
                let inserted = self
                    .gateway
                    .insert_publisher(Publisher::placeholder(name))
                    .await?;
                debug!(name = %name, id = ?inserted.id, "出版社占位创建");
                inserted
            }
        };

        self.publisher_cache.insert(key, publisher.clone());
        Ok(publisher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::test_support::MemoryGateway;

    #[tokio::test]
    async fn test_resolve_creates_placeholder_once() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut resolver = NaturalKeyResolver::new(gateway.clone());

        let first = resolver.resolve_author("J.R.R. Tolkien").await.unwrap();
        // 同名不同大小写/空白，仍命中缓存
        let second = resolver.resolve_author("  j.r.r. tolkien ").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(gateway.author_insert_count(), 1);
        // 第二次解析不再触达网关
        assert_eq!(gateway.author_find_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_returns_existing_entity() {
        let gateway = Arc::new(MemoryGateway::new());
        let seeded = gateway.seed_author("HarperCollins 编辑部");

        let mut resolver = NaturalKeyResolver::new(gateway.clone());
        let resolved = resolver.resolve_author("HarperCollins 编辑部").await.unwrap();

        assert_eq!(resolved.id, seeded.id);
        assert_eq!(gateway.author_insert_count(), 0);
    }

    #[tokio::test]
    async fn test_author_and_publisher_caches_are_independent() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut resolver = NaturalKeyResolver::new(gateway.clone());

        resolver.resolve_author("Penguin").await.unwrap();
        resolver.resolve_publisher("Penguin").await.unwrap();

        // 同名但不同实体类型，各插一条
        assert_eq!(gateway.author_insert_count(), 1);
        assert_eq!(gateway.publisher_insert_count(), 1);
    }
}
