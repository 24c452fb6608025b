// ==========================================
// 图书目录批量导入系统 - 行反序列化器
// ==========================================
// 职责: 原始行记录 → 候选记录，字段级错误累积不中断
// 红线: 行级问题永不抛错；单个坏字段不放弃整行
// ==========================================

use crate::domain::catalog::CandidateBook;
use crate::importer::converters::{convert, FieldValue};
use crate::importer::field_schema::FieldSchema;
use std::collections::HashMap;

/// 字段级错误消息格式（行号 + 表头名，保证一行的所有问题可集中查看）
fn field_error(row_number: usize, header: &str, message: &str) -> String {
    format!("[行 {} - 表头 {}] {}", row_number, header, message)
}

/// 将一条原始行记录反序列化为候选记录
///
/// 按模式声明顺序逐字段处理：
/// - 列存在且非空 → 执行转换器；失败则落一条字段级错误并继续下一个字段
/// - 列缺失或为空且字段必填 → 落一条"必填"错误
///
/// 输出总是一个 CandidateBook，可能携带错误。
pub fn deserialize_row(
    row_number: usize,
    row: &HashMap<String, String>,
    schema: &FieldSchema,
) -> CandidateBook {
    let mut candidate = CandidateBook::new(row_number);

    for field in schema.fields() {
        let raw = row.get(field.name).map(|v| v.trim()).unwrap_or("");

        if raw.is_empty() {
            if field.required {
                candidate.add_error(field_error(
                    row_number,
                    field.name,
                    "字段为必填项，不能为空",
                ));
            }
            continue;
        }

        match convert(field.converter, raw) {
            Ok(value) => apply_field(&mut candidate, field.name, value),
            Err(message) => {
                candidate.add_error(field_error(row_number, field.name, &message));
            }
        }
    }

    candidate
}

/// 将转换结果写入候选记录的对应字段
fn apply_field(candidate: &mut CandidateBook, name: &str, value: FieldValue) {
    match (name, value) {
        ("title", FieldValue::Text(v)) => candidate.title = Some(v),
        ("isbn", FieldValue::Text(v)) => candidate.isbn = Some(v),
        ("publicationDate", FieldValue::Date(d)) => candidate.publication_date = Some(d),
        ("authors", FieldValue::NameList(names)) => candidate.authors = names,
        ("publishers", FieldValue::NameList(names)) => candidate.publishers = names,
        // 模式与赋值表在同一文件内维护，不一致属于编程错误
        (name, value) => {
            candidate.add_error(format!(
                "[行 {} - 表头 {}] 内部错误: 未预期的转换结果 {:?}",
                candidate.row_number, name, value
            ));
        }
    }
}
