// ==========================================
// 图书目录批量导入系统 - 测试用内存网关
// ==========================================
// 职责: CatalogGateway 的内存实现 + 调用计数，供单元测试断言
// ==========================================

use crate::domain::catalog::{normalize_name, Author, Book, Publisher};
use crate::domain::types::ImportBatch;
use crate::repository::catalog_gateway::CatalogGateway;
use async_trait::async_trait;
use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct Store {
    books: Vec<Book>,
    authors: Vec<Author>,
    publishers: Vec<Publisher>,
    batches: Vec<ImportBatch>,
}

/// 内存网关：按自然键查找/插入/更新，并统计网关调用次数
#[derive(Default)]
pub struct MemoryGateway {
    store: Mutex<Store>,
    next_id: AtomicI64,

    // 注入故障：让写操作失败，验证持久化错误不终止批次
    fail_writes: AtomicBool,

    book_finds: AtomicUsize,
    book_inserts: AtomicUsize,
    book_updates: AtomicUsize,
    author_finds: AtomicUsize,
    author_inserts: AtomicUsize,
    publisher_finds: AtomicUsize,
    publisher_inserts: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    fn alloc_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err("UNIQUE constraint failed (注入故障)".into())
        } else {
            Ok(())
        }
    }

    /// 之后的所有写操作都将失败
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    // ===== 预置数据 =====

    pub fn seed_author(&self, name: &str) -> Author {
        let mut author = Author::placeholder(name);
        author.id = Some(self.alloc_id());
        self.store.lock().unwrap().authors.push(author.clone());
        author
    }

    pub fn seed_publisher(&self, name: &str) -> Publisher {
        let mut publisher = Publisher::placeholder(name);
        publisher.id = Some(self.alloc_id());
        self.store.lock().unwrap().publishers.push(publisher.clone());
        publisher
    }

    pub fn seed_book(&self, mut book: Book) -> Book {
        book.id = Some(self.alloc_id());
        self.store.lock().unwrap().books.push(book.clone());
        book
    }

    // ===== 断言辅助 =====

    pub fn book_find_count(&self) -> usize {
        self.book_finds.load(Ordering::SeqCst)
    }

    pub fn book_insert_count(&self) -> usize {
        self.book_inserts.load(Ordering::SeqCst)
    }

    pub fn book_update_count(&self) -> usize {
        self.book_updates.load(Ordering::SeqCst)
    }

    pub fn author_find_count(&self) -> usize {
        self.author_finds.load(Ordering::SeqCst)
    }

    pub fn author_insert_count(&self) -> usize {
        self.author_inserts.load(Ordering::SeqCst)
    }

    pub fn publisher_insert_count(&self) -> usize {
        self.publisher_inserts.load(Ordering::SeqCst)
    }

    /// 网关调用总数（拒绝行零触达断言用）
    pub fn total_calls(&self) -> usize {
        self.book_finds.load(Ordering::SeqCst)
            + self.book_inserts.load(Ordering::SeqCst)
            + self.book_updates.load(Ordering::SeqCst)
            + self.author_finds.load(Ordering::SeqCst)
            + self.author_inserts.load(Ordering::SeqCst)
            + self.publisher_finds.load(Ordering::SeqCst)
            + self.publisher_inserts.load(Ordering::SeqCst)
    }

    pub fn books(&self) -> Vec<Book> {
        self.store.lock().unwrap().books.clone()
    }

    pub fn authors(&self) -> Vec<Author> {
        self.store.lock().unwrap().authors.clone()
    }

    pub fn publishers(&self) -> Vec<Publisher> {
        self.store.lock().unwrap().publishers.clone()
    }

    pub fn batches(&self) -> Vec<ImportBatch> {
        self.store.lock().unwrap().batches.clone()
    }
}

#[async_trait]
impl CatalogGateway for MemoryGateway {
    async fn find_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>, Box<dyn Error + Send + Sync>> {
        self.book_finds.fetch_add(1, Ordering::SeqCst);
        let key = isbn.trim().to_lowercase();
        Ok(self
            .store
            .lock()
            .unwrap()
            .books
            .iter()
            .find(|b| b.isbn.trim().to_lowercase() == key)
            .cloned())
    }

    async fn insert_book(&self, mut book: Book) -> Result<Book, Box<dyn Error + Send + Sync>> {
        self.book_inserts.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        book.id = Some(self.alloc_id());
        self.store.lock().unwrap().books.push(book.clone());
        Ok(book)
    }

    async fn update_book(&self, book: Book) -> Result<Book, Box<dyn Error + Send + Sync>> {
        self.book_updates.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        let mut store = self.store.lock().unwrap();
        let slot = store
            .books
            .iter_mut()
            .find(|b| b.id == book.id)
            .ok_or_else(|| format!("图书不存在: id={:?}", book.id))?;
        *slot = book.clone();
        Ok(book)
    }

    async fn find_author_by_name(
        &self,
        normalized: &str,
    ) -> Result<Option<Author>, Box<dyn Error + Send + Sync>> {
        self.author_finds.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .store
            .lock()
            .unwrap()
            .authors
            .iter()
            .find(|a| normalize_name(&a.name) == normalized)
            .cloned())
    }

    async fn insert_author(&self, mut author: Author) -> Result<Author, Box<dyn Error + Send + Sync>> {
        self.author_inserts.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        author.id = Some(self.alloc_id());
        self.store.lock().unwrap().authors.push(author.clone());
        Ok(author)
    }

    async fn find_publisher_by_name(
        &self,
        normalized: &str,
    ) -> Result<Option<Publisher>, Box<dyn Error + Send + Sync>> {
        self.publisher_finds.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .store
            .lock()
            .unwrap()
            .publishers
            .iter()
            .find(|p| normalize_name(&p.name) == normalized)
            .cloned())
    }

    async fn insert_publisher(&self, mut publisher: Publisher) -> Result<Publisher, Box<dyn Error + Send + Sync>> {
        self.publisher_inserts.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        publisher.id = Some(self.alloc_id());
        self.store.lock().unwrap().publishers.push(publisher.clone());
        Ok(publisher)
    }

    async fn record_import_batch(&self, batch: ImportBatch) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.store.lock().unwrap().batches.push(batch);
        Ok(())
    }
}
