// ==========================================
// 图书目录批量导入系统 - 表头校验器
// ==========================================
// 职责: 逐行处理之前的快速失败闸门
// 契约: 任一表头不在允许集合、或任一必填字段无表头 → 整批拒绝
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_schema::FieldSchema;

/// 校验文件表头与字段模式
///
/// # 规则
/// 1. 表头不得为空
/// 2. 每个表头必须大小写敏感地等于模式中的某个字段名
/// 3. 每个必填字段必须有对应表头
///
/// 违规时返回结构性错误并列出全部违规表头，任何数据行都不会被处理。
pub fn validate_headers(headers: &[String], schema: &FieldSchema) -> ImportResult<()> {
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::EmptyHeader);
    }

    let unrecognized: Vec<String> = headers
        .iter()
        .filter(|h| !schema.is_permitted(h))
        .cloned()
        .collect();

    if !unrecognized.is_empty() {
        return Err(ImportError::UnrecognizedHeaders {
            headers: unrecognized,
            permitted: schema
                .permitted_headers()
                .iter()
                .map(|h| h.to_string())
                .collect(),
        });
    }

    let missing: Vec<String> = schema
        .required_headers()
        .iter()
        .filter(|name| !headers.iter().any(|h| h == *name))
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ImportError::MissingRequiredHeaders { headers: missing });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_valid_headers() {
        let schema = FieldSchema::book();
        let h = headers(&["title", "authors", "isbn", "publishers", "publicationDate"]);
        assert!(validate_headers(&h, &schema).is_ok());
    }

    #[test]
    fn test_subset_of_headers_with_required_present() {
        let schema = FieldSchema::book();
        let h = headers(&["title", "authors", "isbn"]);
        assert!(validate_headers(&h, &schema).is_ok());
    }

    #[test]
    fn test_unrecognized_header_lists_offenders() {
        let schema = FieldSchema::book();
        let h = headers(&["title", "authors", "isbn", "isbn13", "genre"]);

        match validate_headers(&h, &schema) {
            Err(ImportError::UnrecognizedHeaders { headers, .. }) => {
                assert_eq!(headers, vec!["isbn13".to_string(), "genre".to_string()]);
            }
            other => panic!("expected UnrecognizedHeaders, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_missing_required_header() {
        let schema = FieldSchema::book();
        let h = headers(&["title", "authors"]);

        match validate_headers(&h, &schema) {
            Err(ImportError::MissingRequiredHeaders { headers }) => {
                assert_eq!(headers, vec!["isbn".to_string()]);
            }
            other => panic!("expected MissingRequiredHeaders, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_case_sensitive_header_rejected() {
        let schema = FieldSchema::book();
        let h = headers(&["Title", "authors", "isbn"]);
        assert!(matches!(
            validate_headers(&h, &schema),
            Err(ImportError::UnrecognizedHeaders { .. })
        ));
    }

    #[test]
    fn test_empty_header() {
        let schema = FieldSchema::book();
        assert!(matches!(
            validate_headers(&[], &schema),
            Err(ImportError::EmptyHeader)
        ));
    }
}
