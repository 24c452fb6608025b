// ==========================================
// 图书目录批量导入系统 - 目录仓储实现 (rusqlite)
// ==========================================
// 职责: CatalogGateway 的 SQLite 实现
// 约束: 每个方法自成原子单元（单语句或单事务）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::catalog::{normalize_name, Author, Book, Publisher};
use crate::domain::types::ImportBatch;
use crate::repository::catalog_gateway::CatalogGateway;
use crate::repository::error::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row, Transaction};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteCatalogRepository
// ==========================================
pub struct SqliteCatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

/// rusqlite 错误统一映射（分类 UNIQUE / FOREIGN KEY）
fn map_db_err(err: rusqlite::Error) -> Box<dyn Error + Send + Sync> {
    Box::new(RepositoryError::from(err))
}

impl SqliteCatalogRepository {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（连接需已应用统一 PRAGMA）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, Box<dyn Error + Send + Sync>> {
        self.conn
            .lock()
            .map_err(|e| Box::new(RepositoryError::LockError(e.to_string())) as Box<dyn Error + Send + Sync>)
    }

    fn row_to_author(row: &Row) -> rusqlite::Result<Author> {
        Ok(Author {
            id: Some(row.get::<_, i64>(0)?),
            name: row.get(1)?,
            created_at: row.get::<_, DateTime<Utc>>(2)?,
        })
    }

    fn row_to_publisher(row: &Row) -> rusqlite::Result<Publisher> {
        Ok(Publisher {
            id: Some(row.get::<_, i64>(0)?),
            name: row.get(1)?,
            created_at: row.get::<_, DateTime<Utc>>(2)?,
        })
    }

    /// 装载图书的作者集合（按 id 排序，保证确定性）
    fn load_authors(conn: &Connection, book_id: i64) -> rusqlite::Result<Vec<Author>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT a.id, a.name, a.created_at
            FROM authors a
            JOIN book_author ba ON ba.author_id = a.id
            WHERE ba.book_id = ?1
            ORDER BY a.id
            "#,
        )?;
        let rows = stmt.query_map(params![book_id], Self::row_to_author)?;
        rows.collect()
    }

    /// 装载图书的出版社集合
    fn load_publishers(conn: &Connection, book_id: i64) -> rusqlite::Result<Vec<Publisher>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT p.id, p.name, p.created_at
            FROM publishers p
            JOIN book_publisher bp ON bp.publisher_id = p.id
            WHERE bp.book_id = ?1
            ORDER BY p.id
            "#,
        )?;
        let rows = stmt.query_map(params![book_id], Self::row_to_publisher)?;
        rows.collect()
    }

    /// 在事务中重写关系行（先删后插）
    fn rewrite_relations(tx: &Transaction, book: &Book, book_id: i64) -> Result<(), Box<dyn Error + Send + Sync>> {
        tx.execute("DELETE FROM book_author WHERE book_id = ?1", params![book_id])
            .map_err(map_db_err)?;
        tx.execute(
            "DELETE FROM book_publisher WHERE book_id = ?1",
            params![book_id],
        )
        .map_err(map_db_err)?;

        for author in &book.authors {
            let author_id = author.id.ok_or_else(|| {
                Box::new(RepositoryError::FieldValueError {
                    field: "authors".to_string(),
                    message: format!("作者未持久化即写入关系: {}", author.name),
                }) as Box<dyn Error + Send + Sync>
            })?;
            tx.execute(
                "INSERT OR IGNORE INTO book_author (book_id, author_id) VALUES (?1, ?2)",
                params![book_id, author_id],
            )
            .map_err(map_db_err)?;
        }

        for publisher in &book.publishers {
            let publisher_id = publisher.id.ok_or_else(|| {
                Box::new(RepositoryError::FieldValueError {
                    field: "publishers".to_string(),
                    message: format!("出版社未持久化即写入关系: {}", publisher.name),
                }) as Box<dyn Error + Send + Sync>
            })?;
            tx.execute(
                "INSERT OR IGNORE INTO book_publisher (book_id, publisher_id) VALUES (?1, ?2)",
                params![book_id, publisher_id],
            )
            .map_err(map_db_err)?;
        }

        Ok(())
    }
}

#[async_trait]
impl CatalogGateway for SqliteCatalogRepository {
    async fn find_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>, Box<dyn Error + Send + Sync>> {
        let conn = self.lock_conn()?;

        let result = conn.query_row(
            r#"
            SELECT id, title, isbn, publication_date, created_at, updated_at
            FROM books
            WHERE isbn = ?1 COLLATE NOCASE
            "#,
            params![isbn.trim()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, DateTime<Utc>>(4)?,
                    row.get::<_, DateTime<Utc>>(5)?,
                ))
            },
        );

        let (id, title, isbn, pub_date, created_at, updated_at) = match result {
            Ok(fields) => fields,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(map_db_err(e)),
        };

        let publication_date = pub_date
            .as_deref()
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
            .transpose()
            .map_err(|e| {
                Box::new(RepositoryError::FieldValueError {
                    field: "publication_date".to_string(),
                    message: e.to_string(),
                }) as Box<dyn Error + Send + Sync>
            })?;

        let authors = Self::load_authors(&conn, id).map_err(map_db_err)?;
        let publishers = Self::load_publishers(&conn, id).map_err(map_db_err)?;

        Ok(Some(Book {
            id: Some(id),
            title,
            isbn,
            publication_date,
            authors,
            publishers,
            created_at,
            updated_at,
        }))
    }

    async fn insert_book(&self, mut book: Book) -> Result<Book, Box<dyn Error + Send + Sync>> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction().map_err(map_db_err)?;

        let now = Utc::now();
        tx.execute(
            r#"
            INSERT INTO books (title, isbn, publication_date, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                book.title,
                book.isbn.trim(),
                book.publication_date.map(|d| d.format("%Y-%m-%d").to_string()),
                now,
                now,
            ],
        )
        .map_err(map_db_err)?;

        let book_id = tx.last_insert_rowid();
        Self::rewrite_relations(&tx, &book, book_id)?;

        tx.commit().map_err(map_db_err)?;

        book.id = Some(book_id);
        book.created_at = now;
        book.updated_at = now;
        Ok(book)
    }

    async fn update_book(&self, mut book: Book) -> Result<Book, Box<dyn Error + Send + Sync>> {
        let book_id = book.id.ok_or_else(|| {
            Box::new(RepositoryError::FieldValueError {
                field: "id".to_string(),
                message: "更新图书时 id 不能为空".to_string(),
            }) as Box<dyn Error + Send + Sync>
        })?;

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction().map_err(map_db_err)?;

        let now = Utc::now();
        let affected = tx
            .execute(
                r#"
                UPDATE books
                SET title = ?1, isbn = ?2, publication_date = ?3, updated_at = ?4
                WHERE id = ?5
                "#,
                params![
                    book.title,
                    book.isbn.trim(),
                    book.publication_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    now,
                    book_id,
                ],
            )
            .map_err(map_db_err)?;

        if affected == 0 {
            return Err(Box::new(RepositoryError::NotFound {
                entity: "Book".to_string(),
                key: book_id.to_string(),
            }));
        }

        Self::rewrite_relations(&tx, &book, book_id)?;
        tx.commit().map_err(map_db_err)?;

        book.updated_at = now;
        Ok(book)
    }

    async fn find_author_by_name(
        &self,
        normalized: &str,
    ) -> Result<Option<Author>, Box<dyn Error + Send + Sync>> {
        let conn = self.lock_conn()?;

        let result = conn.query_row(
            "SELECT id, name, created_at FROM authors WHERE normalized_name = ?1",
            params![normalized],
            Self::row_to_author,
        );

        match result {
            Ok(author) => Ok(Some(author)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(map_db_err(e)),
        }
    }

    async fn insert_author(&self, mut author: Author) -> Result<Author, Box<dyn Error + Send + Sync>> {
        let conn = self.lock_conn()?;

        conn.execute(
            "INSERT INTO authors (name, normalized_name, created_at) VALUES (?1, ?2, ?3)",
            params![author.name, normalize_name(&author.name), author.created_at],
        )
        .map_err(map_db_err)?;

        author.id = Some(conn.last_insert_rowid());
        Ok(author)
    }

    async fn find_publisher_by_name(
        &self,
        normalized: &str,
    ) -> Result<Option<Publisher>, Box<dyn Error + Send + Sync>> {
        let conn = self.lock_conn()?;

        let result = conn.query_row(
            "SELECT id, name, created_at FROM publishers WHERE normalized_name = ?1",
            params![normalized],
            Self::row_to_publisher,
        );

        match result {
            Ok(publisher) => Ok(Some(publisher)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(map_db_err(e)),
        }
    }

    async fn insert_publisher(&self, mut publisher: Publisher) -> Result<Publisher, Box<dyn Error + Send + Sync>> {
        let conn = self.lock_conn()?;

        conn.execute(
            "INSERT INTO publishers (name, normalized_name, created_at) VALUES (?1, ?2, ?3)",
            params![
                publisher.name,
                normalize_name(&publisher.name),
                publisher.created_at
            ],
        )
        .map_err(map_db_err)?;

        publisher.id = Some(conn.last_insert_rowid());
        Ok(publisher)
    }

    async fn record_import_batch(&self, batch: ImportBatch) -> Result<(), Box<dyn Error + Send + Sync>> {
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, file_name, file_path, total_rows,
                created_rows, updated_rows, unchanged_rows, rejected_rows, failed_rows,
                imported_at, elapsed_ms, summary_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                batch.batch_id,
                batch.file_name,
                batch.file_path,
                batch.total_rows,
                batch.created_rows,
                batch.updated_rows,
                batch.unchanged_rows,
                batch.rejected_rows,
                batch.failed_rows,
                batch.imported_at,
                batch.elapsed_ms,
                batch.summary_json,
            ],
        )
        .map_err(map_db_err)?;

        Ok(())
    }
}
