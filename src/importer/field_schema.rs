// ==========================================
// 图书目录批量导入系统 - 字段模式表
// ==========================================
// 职责: 目标记录类型的静态字段表 {字段名 → 必填标志 + 转换器}
// 红线: 启动时构建一次，逐行处理期间零反射、零动态实例化
// ==========================================

use crate::importer::converters::ConverterId;

// ==========================================
// FieldSpec - 单个字段的模式条目
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// 字段名（与 CSV 表头大小写敏感相等）
    pub name: &'static str,
    /// 是否必填
    pub required: bool,
    /// 值转换器
    pub converter: ConverterId,
}

// ==========================================
// FieldSchema - 记录类型的字段模式
// ==========================================
#[derive(Debug, Clone)]
pub struct FieldSchema {
    entries: Vec<FieldSpec>,
}

impl FieldSchema {
    /// 图书导入模式（对应 CSV 表头: title/authors/publishers/isbn/publicationDate）
    pub fn book() -> Self {
        Self {
            entries: vec![
                FieldSpec {
                    name: "title",
                    required: true,
                    converter: ConverterId::Text,
                },
                FieldSpec {
                    name: "authors",
                    required: true,
                    converter: ConverterId::NameList,
                },
                FieldSpec {
                    name: "publishers",
                    required: false,
                    converter: ConverterId::NameList,
                },
                FieldSpec {
                    name: "isbn",
                    required: true,
                    converter: ConverterId::Text,
                },
                FieldSpec {
                    name: "publicationDate",
                    required: false,
                    converter: ConverterId::PublicationDate,
                },
            ],
        }
    }

    /// 按声明顺序遍历字段
    pub fn fields(&self) -> &[FieldSpec] {
        &self.entries
    }

    /// 允许出现的表头集合
    pub fn permitted_headers(&self) -> Vec<&'static str> {
        self.entries.iter().map(|f| f.name).collect()
    }

    /// 必填表头集合
    pub fn required_headers(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect()
    }

    pub fn is_permitted(&self, header: &str) -> bool {
        // 表头必须与字段名大小写敏感相等
        self.entries.iter().any(|f| f.name == header)
    }
}
