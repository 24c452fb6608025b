// ==========================================
// 图书目录批量导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 结构性错误整批中止；行级错误只累积在候选记录上
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误（结构性，整批中止）=====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表头错误（结构性，任何行处理之前拒绝）=====
    #[error("CSV 不包含有效表头")]
    EmptyHeader,

    #[error("无法识别的表头: {headers:?}，允许的表头: {permitted:?}")]
    UnrecognizedHeaders {
        headers: Vec<String>,
        permitted: Vec<String>,
    },

    #[error("必填表头缺失: {headers:?}")]
    MissingRequiredHeaders { headers: Vec<String> },

    // ===== 持久化错误（行级，捕获后批次继续）=====
    #[error("持久化失败 (行 {row}): {message}")]
    Persistence { row: usize, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否为结构性错误（在任何行处理之前使整批失败）
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ImportError::FileNotFound(_)
                | ImportError::UnsupportedFormat(_)
                | ImportError::FileReadError(_)
                | ImportError::CsvParseError(_)
                | ImportError::EmptyHeader
                | ImportError::UnrecognizedHeaders { .. }
                | ImportError::MissingRequiredHeaders { .. }
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_classification() {
        assert!(ImportError::EmptyHeader.is_structural());
        assert!(ImportError::UnrecognizedHeaders {
            headers: vec!["isbn13".to_string()],
            permitted: vec![],
        }
        .is_structural());
        assert!(!ImportError::Persistence {
            row: 3,
            message: "UNIQUE".to_string(),
        }
        .is_structural());
    }
}
