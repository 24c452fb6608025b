// ==========================================
// 图书目录批量导入系统 - 对账引擎
// ==========================================
// 职责: 候选记录 ↔ 目录现状 对账，产出 Created/Updated/Unchanged/Rejected/Failed
// 红线: errors 非空的候选零触达网关；关系增删先按归一化名计算，
//       保留成员复用既有实体，只有新增引用才经过解析器
// ==========================================

use crate::domain::catalog::{normalize_name, Author, Book, CandidateBook, Publisher};
use crate::domain::types::{RowOutcome, Severity};
use crate::importer::error::ImportError;
use crate::importer::reporter::ReportLine;
use crate::importer::resolver::NaturalKeyResolver;
use crate::repository::catalog_gateway::CatalogGateway;
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, warn};

// ==========================================
// RowReconciliation - 单行对账产出
// ==========================================
// lines 按产出顺序排列，由调用方整体刷给 Reporter
#[derive(Debug)]
pub struct RowReconciliation {
    pub outcome: RowOutcome,
    pub lines: Vec<ReportLine>,
}

impl RowReconciliation {
    fn new(outcome: RowOutcome) -> Self {
        Self {
            outcome,
            lines: Vec::new(),
        }
    }

    fn tagged(&mut self, severity: Severity, text: String) {
        self.lines.push(ReportLine {
            severity: Some(severity),
            text,
        });
    }

    fn plain(&mut self, text: String) {
        self.lines.push(ReportLine {
            severity: None,
            text,
        });
    }
}

/// 出版日期的审计行展示
fn fmt_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => "无".to_string(),
    }
}

// ==========================================
// Reconciler - 对账引擎
// ==========================================
pub struct Reconciler {
    gateway: Arc<dyn CatalogGateway>,
}

impl Reconciler {
    pub fn new(gateway: Arc<dyn CatalogGateway>) -> Self {
        Self { gateway }
    }

    /// 对一条候选记录执行完整对账
    ///
    /// 永不返回 Err：行级的一切问题折算进 RowOutcome 与审计行，
    /// 调用方据此继续处理后续行。
    pub async fn reconcile(
        &self,
        resolver: &mut NaturalKeyResolver,
        candidate: &CandidateBook,
    ) -> RowReconciliation {
        // 带字段错误的行：只汇报，零触达持久化
        if candidate.has_errors() {
            let mut result = RowReconciliation::new(RowOutcome::Rejected);
            result.tagged(
                Severity::Error,
                format!(
                    "第 {} 行 '{}' 被拒绝:",
                    candidate.row_number,
                    candidate.display_title()
                ),
            );
            for error in &candidate.errors {
                result.plain(format!("    {}", error));
            }
            return result;
        }

        match self.reconcile_valid(resolver, candidate).await {
            Ok(result) => result,
            Err(err) => {
                // 网关拒绝（唯一约束、连接故障等）：该行放弃，批次继续
                warn!(row = candidate.row_number, error = %err, "行持久化失败");
                let persistence = ImportError::Persistence {
                    row: candidate.row_number,
                    message: err.to_string(),
                };
                let mut result = RowReconciliation::new(RowOutcome::Failed);
                result.tagged(
                    Severity::Error,
                    format!("{} ('{}')", persistence, candidate.display_title()),
                );
                result
            }
        }
    }

    async fn reconcile_valid(
        &self,
        resolver: &mut NaturalKeyResolver,
        candidate: &CandidateBook,
    ) -> Result<RowReconciliation, Box<dyn Error + Send + Sync>> {
        // 必填校验已在反序列化阶段完成，此处缺失属于内部不一致
        let isbn = candidate
            .isbn
            .as_deref()
            .ok_or_else(|| ImportError::InternalError("候选记录缺少 ISBN".to_string()))?;
        let title = candidate
            .title
            .as_deref()
            .ok_or_else(|| ImportError::InternalError("候选记录缺少标题".to_string()))?;

        // 先按自然键定位现状，再决定需要解析哪些引用
        match self.gateway.find_book_by_isbn(isbn).await? {
            None => {
                // 新建：全部引用都是新增，逐一解析
                let mut authors = Vec::with_capacity(candidate.authors.len());
                for name in &candidate.authors {
                    authors.push(resolver.resolve_author(name).await?);
                }
                let mut publishers = Vec::with_capacity(candidate.publishers.len());
                for name in &candidate.publishers {
                    publishers.push(resolver.resolve_publisher(name).await?);
                }

                let now = Utc::now();
                let book = Book {
                    id: None,
                    title: title.to_string(),
                    isbn: isbn.to_string(),
                    publication_date: candidate.publication_date,
                    authors,
                    publishers,
                    created_at: now,
                    updated_at: now,
                };
                let inserted = self.gateway.insert_book(book).await?;
                debug!(row = candidate.row_number, id = ?inserted.id, "图书新建");

                let mut result = RowReconciliation::new(RowOutcome::Created);
                result.tagged(
                    Severity::Info,
                    format!(
                        "第 {} 行: 新建图书 '{}' (ISBN {})",
                        candidate.row_number, inserted.title, inserted.isbn
                    ),
                );
                Ok(result)
            }
            Some(existing) => {
                self.reconcile_existing(resolver, candidate, existing, title, isbn)
                    .await
            }
        }
    }

    /// 自然键已存在：计算标量差异 + 关系增删，差异为空则零解析、不写库
    async fn reconcile_existing(
        &self,
        resolver: &mut NaturalKeyResolver,
        candidate: &CandidateBook,
        existing: Book,
        title: &str,
        isbn: &str,
    ) -> Result<RowReconciliation, Box<dyn Error + Send + Sync>> {
        let mut scalar_changes: Vec<String> = Vec::new();

        // 标量比较：标题/ISBN 忽略大小写与首尾空白，日期按值（含置空）
        if normalize_name(&existing.title) != normalize_name(title) {
            scalar_changes.push(format!("标题: '{}' -> '{}'", existing.title, title));
        }
        if normalize_name(&existing.isbn) != normalize_name(isbn) {
            scalar_changes.push(format!("ISBN: '{}' -> '{}'", existing.isbn, isbn));
        }
        if existing.publication_date != candidate.publication_date {
            scalar_changes.push(format!(
                "出版日期: {} -> {}",
                fmt_date(existing.publication_date),
                fmt_date(candidate.publication_date)
            ));
        }

        // 关系差异：先在归一化显示名上双向比较，不触达网关
        let existing_author_keys: HashSet<String> =
            existing.authors.iter().map(|a| a.natural_key()).collect();
        let incoming_author_keys: HashSet<String> = candidate
            .authors
            .iter()
            .map(|n| normalize_name(n))
            .collect();
        let added_authors: Vec<&str> = candidate
            .authors
            .iter()
            .filter(|n| !existing_author_keys.contains(&normalize_name(n)))
            .map(|n| n.as_str())
            .collect();
        let removed_authors: Vec<&str> = existing
            .authors
            .iter()
            .filter(|a| !incoming_author_keys.contains(&a.natural_key()))
            .map(|a| a.name.as_str())
            .collect();

        let existing_publisher_keys: HashSet<String> = existing
            .publishers
            .iter()
            .map(|p| p.natural_key())
            .collect();
        let incoming_publisher_keys: HashSet<String> = candidate
            .publishers
            .iter()
            .map(|n| normalize_name(n))
            .collect();
        let added_publishers: Vec<&str> = candidate
            .publishers
            .iter()
            .filter(|n| !existing_publisher_keys.contains(&normalize_name(n)))
            .map(|n| n.as_str())
            .collect();
        let removed_publishers: Vec<&str> = existing
            .publishers
            .iter()
            .filter(|p| !incoming_publisher_keys.contains(&p.natural_key()))
            .map(|p| p.name.as_str())
            .collect();

        let relations_changed = !added_authors.is_empty()
            || !removed_authors.is_empty()
            || !added_publishers.is_empty()
            || !removed_publishers.is_empty();

        if scalar_changes.is_empty() && !relations_changed {
            debug!(row = candidate.row_number, isbn = %isbn, "图书无变化");
            let mut result = RowReconciliation::new(RowOutcome::Unchanged);
            result.tagged(
                Severity::Info,
                format!(
                    "第 {} 行: '{}' 已是最新，跳过",
                    candidate.row_number, existing.title
                ),
            );
            return Ok(result);
        }

        // 审计行先于写库组装，写库失败时由上层统一汇报
        let mut result = RowReconciliation::new(RowOutcome::Updated);
        result.tagged(
            Severity::Info,
            format!(
                "第 {} 行: 更新图书 '{}' (ISBN {})",
                candidate.row_number, existing.title, existing.isbn
            ),
        );
        for change in &scalar_changes {
            result.plain(format!("    {}", change));
        }
        for name in &added_authors {
            result.plain(format!("    + 作者: {}", name));
        }
        for name in &removed_authors {
            result.plain(format!("    - 作者: {}", name));
        }
        for name in &added_publishers {
            result.plain(format!("    + 出版社: {}", name));
        }
        for name in &removed_publishers {
            result.plain(format!("    - 出版社: {}", name));
        }

        // 保留成员复用既有实体；只有新增引用才经过解析器
        let mut authors: Vec<Author> = Vec::with_capacity(candidate.authors.len());
        for name in &candidate.authors {
            let key = normalize_name(name);
            match existing.authors.iter().find(|a| a.natural_key() == key) {
                Some(kept) => authors.push(kept.clone()),
                None => authors.push(resolver.resolve_author(name).await?),
            }
        }
        let mut publishers: Vec<Publisher> = Vec::with_capacity(candidate.publishers.len());
        for name in &candidate.publishers {
            let key = normalize_name(name);
            match existing.publishers.iter().find(|p| p.natural_key() == key) {
                Some(kept) => publishers.push(kept.clone()),
                None => publishers.push(resolver.resolve_publisher(name).await?),
            }
        }

        let updated = Book {
            id: existing.id,
            title: title.to_string(),
            isbn: isbn.to_string(),
            publication_date: candidate.publication_date,
            authors,
            publishers,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.gateway.update_book(updated).await?;
        debug!(row = candidate.row_number, isbn = %isbn, "图书更新");

        Ok(result)
    }
}
