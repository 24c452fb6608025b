// ==========================================
// 图书目录批量导入系统 - 导入过程类型
// ==========================================
// 职责: 行级结果、批次汇总、审计行严重级别
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Severity - 审计行严重级别
// ==========================================
// 用途: Reporter 输出的分级标记（INFO/WARNING/ERROR）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// 日志前缀（与界面/CLI 展示对齐）
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

// ==========================================
// RowOutcome - 单行对账结果
// ==========================================
// 状态机: Parsed → Validated|Rejected → Resolved → {Created|Updated|Unchanged}
// 约束: 每个语法有效行恰好到达其中一个终态并只汇报一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowOutcome {
    /// 目录中不存在该自然键，已新建
    Created,
    /// 存在且差异非空，已更新
    Updated,
    /// 存在且差异为空，未写库
    Unchanged,
    /// 行级字段错误，未触达持久化
    Rejected,
    /// 持久化网关拒绝（唯一约束等），该行放弃但批次继续
    Failed,
}

// ==========================================
// ImportSummary - 批次汇总统计
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl ImportSummary {
    /// 按行结果累加计数
    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Created => self.created += 1,
            RowOutcome::Updated => self.updated += 1,
            RowOutcome::Unchanged => self.unchanged += 1,
            RowOutcome::Rejected => self.rejected += 1,
            RowOutcome::Failed => self.failed += 1,
        }
    }
}

// ==========================================
// ImportBatch - 导入批次记录
// ==========================================
// 用途: 每次导入落一条 import_batch，供审计回溯
// 对齐: db::init_schema 的 import_batch 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub total_rows: i32,
    pub created_rows: i32,
    pub updated_rows: i32,
    pub unchanged_rows: i32,
    pub rejected_rows: i32,
    pub failed_rows: i32,
    pub imported_at: DateTime<Utc>,
    pub elapsed_ms: i64,
    /// 汇总统计的 JSON 快照（便于审计查询时不重算计数）
    pub summary_json: Option<String>,
}

// ==========================================
// ImportReport - 导入结果（返回给调用方）
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub batch: ImportBatch,
    pub summary: ImportSummary,
}
