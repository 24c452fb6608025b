// ==========================================
// 图书目录批量导入系统 - 导入器实现
// ==========================================
// 职责: 编排 解析 → 表头校验 → 逐行反序列化/对账 → 批次落账
// 红线: 结构性错误快速失败；行级错误只汇报不终止
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::types::{ImportBatch, ImportReport, ImportSummary, RowOutcome, Severity};
use crate::i18n;
use crate::importer::book_importer_trait::{BookImporter, FileParser};
use crate::importer::error::ImportError;
use crate::importer::field_schema::FieldSchema;
use crate::importer::header_validator::validate_headers;
use crate::importer::reconciler::Reconciler;
use crate::importer::reporter::{ImportReporter, ReportLine};
use crate::importer::resolver::NaturalKeyResolver;
use crate::importer::row_deserializer::deserialize_row;
use crate::repository::catalog_gateway::CatalogGateway;
use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// BookImporterImpl - 导入器
// ==========================================
pub struct BookImporterImpl {
    gateway: Arc<dyn CatalogGateway>,
    config: Arc<dyn ImportConfigReader>,
    parser: Box<dyn FileParser>,
    reporter: Arc<dyn ImportReporter>,
}

impl BookImporterImpl {
    pub fn new(
        gateway: Arc<dyn CatalogGateway>,
        config: Arc<dyn ImportConfigReader>,
        parser: Box<dyn FileParser>,
        reporter: Arc<dyn ImportReporter>,
    ) -> Self {
        Self {
            gateway,
            config,
            parser,
            reporter,
        }
    }

    /// 把一行对账产出的审计行整体刷给报告器（行间不穿插）
    fn flush_lines(&self, lines: &[ReportLine]) {
        for line in lines {
            match line.severity {
                Some(severity) => self.reporter.append_tagged_line(severity, &line.text),
                None => self.reporter.append_line(&line.text),
            }
        }
    }

    fn report_summary(&self, summary: &ImportSummary, elapsed_ms: i64) {
        self.reporter.append_line("========================================");
        self.reporter.append_tagged_line(
            Severity::Info,
            &format!(
                "{}: 共 {} 行, 新建 {}, 更新 {}, 无变化 {}, 拒绝 {}, 失败 {} ({} ms)",
                i18n::t("import.run_finished"),
                summary.total_rows,
                summary.created,
                summary.updated,
                summary.unchanged,
                summary.rejected,
                summary.failed,
                elapsed_ms
            ),
        );
    }
}

#[async_trait]
impl BookImporter for BookImporterImpl {
    #[instrument(skip(self), fields(file = %file_path.display()))]
    async fn import_from_file(&self, file_path: &Path) -> Result<ImportReport, ImportError> {
        let started = Instant::now();
        info!("开始导入批次");
        self.reporter
            .append_tagged_line(Severity::Info, &i18n::t("import.run_started"));

        // ===== 阶段 1: 解析（结构性错误 → 整批中止）=====
        let parsed = match self.parser.parse_to_raw_rows(file_path) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.reporter
                    .append_tagged_line(Severity::Error, &err.to_string());
                return Err(err);
            }
        };

        // ===== 阶段 2: 表头校验（任何数据行之前）=====
        let schema = FieldSchema::book();
        if let Err(err) = validate_headers(&parsed.headers, &schema) {
            self.reporter
                .append_tagged_line(Severity::Error, &err.to_string());
            return Err(err);
        }

        if parsed.rows.is_empty() {
            self.reporter
                .append_tagged_line(Severity::Warning, &i18n::t("import.no_rows"));
        }

        // 行间延时仅影响观感，配置读取失败退回 0
        let row_delay_ms = match self.config.get_row_delay_ms().await {
            Ok(delay) => delay,
            Err(err) => {
                warn!(error = %err, "行间延时配置读取失败，使用 0");
                0
            }
        };

        // ===== 阶段 3: 逐行反序列化 + 对账 =====
        let reconciler = Reconciler::new(self.gateway.clone());
        let mut resolver = NaturalKeyResolver::new(self.gateway.clone());
        let mut summary = ImportSummary::default();

        for (row_number, raw_row) in &parsed.rows {
            summary.total_rows += 1;

            let candidate = deserialize_row(*row_number, raw_row, &schema);
            let result = reconciler.reconcile(&mut resolver, &candidate).await;

            self.flush_lines(&result.lines);
            summary.record(result.outcome);

            if result.outcome == RowOutcome::Failed {
                warn!(row = row_number, "行写入被网关拒绝，批次继续");
            }
            if row_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(row_delay_ms)).await;
            }
        }

        // ===== 阶段 4: 批次落账 =====
        let elapsed_ms = started.elapsed().as_millis() as i64;
        let batch = ImportBatch {
            batch_id: Uuid::new_v4().to_string(),
            file_name: file_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string()),
            file_path: Some(file_path.display().to_string()),
            total_rows: summary.total_rows as i32,
            created_rows: summary.created as i32,
            updated_rows: summary.updated as i32,
            unchanged_rows: summary.unchanged as i32,
            rejected_rows: summary.rejected as i32,
            failed_rows: summary.failed as i32,
            imported_at: Utc::now(),
            elapsed_ms,
            summary_json: serde_json::to_string(&summary).ok(),
        };

        // 落账失败不推翻已完成的行结果，只汇报
        if let Err(err) = self.gateway.record_import_batch(batch.clone()).await {
            warn!(error = %err, "批次审计记录写入失败");
            self.reporter.append_tagged_line(
                Severity::Warning,
                &format!("批次审计记录写入失败: {}", err),
            );
        }

        self.report_summary(&summary, elapsed_ms);
        info!(
            total = summary.total_rows,
            created = summary.created,
            updated = summary.updated,
            unchanged = summary.unchanged,
            rejected = summary.rejected,
            failed = summary.failed,
            elapsed_ms,
            "导入批次结束"
        );

        Ok(ImportReport { batch, summary })
    }
}
