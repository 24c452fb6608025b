// ==========================================
// 图书目录批量导入系统 - 文件解析器实现
// ==========================================
// 职责: CSV → 表头 + 原始行记录（HashMap<列名, 值>）
// 约束: 首行为表头；完全空白的数据行跳过但保留行号
// ==========================================

use crate::importer::book_importer_trait::FileParser;
use crate::importer::error::ImportError;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

// ==========================================
// ParsedFile - 解析结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// 表头（TRIM 后，保序）
    pub headers: Vec<String>,
    /// 数据行: (行号, 列名 → 值)，行号从 1 起按文件顺序
    pub rows: Vec<(usize, HashMap<String, String>)>,
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> Result<ParsedFile, ImportError> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        // 打开 CSV 文件
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::EmptyHeader);
        }

        // 读取所有行
        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行（行号仍按文件顺序占位）
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push((row_idx + 1, row_map));
        }

        Ok(ParsedFile { headers, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let temp_file = write_csv("title,isbn\nThe Hobbit,978-0-261-10221-7\nDune,978-0-441-17271-9\n");

        let parser = CsvParser;
        let parsed = parser.parse_to_raw_rows(temp_file.path()).unwrap();

        assert_eq!(parsed.headers, vec!["title", "isbn"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].0, 1);
        assert_eq!(
            parsed.rows[0].1.get("title"),
            Some(&"The Hobbit".to_string())
        );
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let parser = CsvParser;
        let result = parser.parse_to_raw_rows(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_rejects_non_csv_extension() {
        let temp_file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        let parser = CsvParser;
        let result = parser.parse_to_raw_rows(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows_keeps_numbers() {
        let temp_file = write_csv("title,isbn\nThe Hobbit,1\n,\nDune,2\n");

        let parser = CsvParser;
        let parsed = parser.parse_to_raw_rows(temp_file.path()).unwrap();

        // 空行跳过，但 Dune 仍是第 3 行
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[1].0, 3);
        assert_eq!(parsed.rows[1].1.get("title"), Some(&"Dune".to_string()));
    }
}
