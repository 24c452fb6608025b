// ==========================================
// 图书目录批量导入系统 - 值转换器注册表
// ==========================================
// 职责: 字符串 → 类型化值的纯函数转换
// 红线: 转换器不访问持久化；引用解析交给 NaturalKeyResolver
// ==========================================

use crate::domain::catalog::normalize_name;
use chrono::{NaiveDate, NaiveDateTime};

// ==========================================
// ConverterId - 转换器标识
// ==========================================
// 模式构建时选定，逐行处理期间按枚举分派（不做动态实例化）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterId {
    /// 原样返回（TRIM 后）
    Text,
    /// 出版日期多格式解析
    PublicationDate,
    /// 分号分隔的引用名列表
    NameList,
}

// ==========================================
// FieldValue - 转换结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    /// 显示名列表（按归一化键去重，保留首个拼写与出现顺序）
    NameList(Vec<String>),
}

/// 执行字段转换
///
/// # 返回
/// - Ok(FieldValue): 转换成功
/// - Err(String): 字段级错误消息（由调用方落到候选记录上）
pub fn convert(id: ConverterId, raw: &str) -> Result<FieldValue, String> {
    match id {
        ConverterId::Text => Ok(FieldValue::Text(raw.trim().to_string())),
        ConverterId::PublicationDate => parse_publication_date(raw)
            .map(FieldValue::Date)
            .ok_or_else(|| format!("无法解析日期: {}", raw)),
        ConverterId::NameList => Ok(FieldValue::NameList(split_name_list(raw))),
    }
}

/// 出版日期解析，按固定顺序尝试:
/// 1. `Month D, YYYY`（如 "April 15, 1997"）
/// 2. `Month YYYY` → 当月 1 日（如 "March 2009" → 2009-03-01）
/// 3. 纯 4 位年份 → 1 月 1 日
/// 4. ISO `YYYY-MM-DD`
/// 5. `DD/MM/YYYY`，可带 `HH:mm[:ss]`（时间部分丢弃）
pub fn parse_publication_date(raw: &str) -> Option<NaiveDate> {
    let input = raw.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%B %d, %Y") {
        return Some(date);
    }

    // "March 2009" 缺日，补 1 日再解析
    if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {}", input), "%d %B %Y") {
        return Some(date);
    }

    if input.len() == 4 && input.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(year) = input.parse::<i32>() {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%d/%m/%Y %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%d/%m/%Y %H:%M") {
        return Some(dt.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%d/%m/%Y") {
        return Some(date);
    }

    None
}

/// 拆分引用名列表: 按 `;` 切分，逐项 TRIM，丢弃空项，按归一化键去重
pub fn split_name_list(raw: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut names = Vec::new();

    for token in raw.split(';') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(normalize_name(trimmed)) {
            names.push(trimmed.to_string());
        }
    }

    names
}
