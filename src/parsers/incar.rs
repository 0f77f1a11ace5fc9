//! # VASP INCAR 格式读写
//!
//! INCAR 是 `TAG = value` 形式的文本，支持 `#` / `!` 注释和
//! 用 `;` 分隔的同一行多个赋值。
//!
//! ## 依赖关系
//! - 被 `wmm/client.rs` 和 `commands/fetch.rs` 使用
//! - 使用 `models/incar.rs`
//! - 使用 `regex` 校验标签名

use crate::error::{Result, WmmError};
use crate::models::{Incar, IncarValue};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

const FORMAT: &str = "incar";

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid tag regex"))
}

/// 解析 INCAR 文件
pub fn parse_incar_file(path: &Path) -> Result<Incar> {
    if !path.exists() {
        return Err(WmmError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| WmmError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_incar_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 INCAR
pub fn parse_incar_content(content: &str, source_name: &str) -> Result<Incar> {
    let mut incar = Incar::new();

    for (lineno, raw) in content.lines().enumerate() {
        let line = raw.split(['#', '!']).next().unwrap_or("");

        for assignment in line.split(';') {
            if assignment.trim().is_empty() {
                continue;
            }
            let (tag, value) = assignment.split_once('=').ok_or_else(|| {
                WmmError::parse(
                    FORMAT,
                    source_name,
                    format!("Missing '=' at line {}", lineno + 1),
                )
            })?;

            let tag = tag.trim();
            if !tag_pattern().is_match(tag) {
                return Err(WmmError::parse(
                    FORMAT,
                    source_name,
                    format!("Invalid tag '{}' at line {}", tag, lineno + 1),
                ));
            }
            incar.set(tag, parse_value(value.trim()));
        }
    }

    Ok(incar)
}

/// 推断参数值类型
fn parse_value(raw: &str) -> IncarValue {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() > 1 {
        // 带文字的多词值（如 SYSTEM = bulk Si）整体保留为文本
        let parsed: Vec<IncarValue> = tokens.iter().map(|t| parse_scalar(t)).collect();
        if parsed.iter().all(|v| !matches!(v, IncarValue::Text(_))) {
            return IncarValue::List(parsed);
        }
        return IncarValue::Text(tokens.join(" "));
    }
    parse_scalar(raw)
}

fn parse_scalar(token: &str) -> IncarValue {
    let upper = token.to_uppercase();
    match upper.trim_matches('.') {
        "TRUE" | "T" => return IncarValue::Bool(true),
        "FALSE" | "F" => return IncarValue::Bool(false),
        _ => {}
    }
    if let Ok(v) = token.parse::<i64>() {
        return IncarValue::Int(v);
    }
    // Fortran 风格的 1.0D-5
    // inf / nan 不是合法的 INCAR 数值，按文本保留
    if let Ok(v) = upper.replace('D', "E").parse::<f64>() {
        if v.is_finite() {
            return IncarValue::Float(v);
        }
    }
    IncarValue::Text(token.to_string())
}

/// 将 Incar 转换为 INCAR 文本，每行一个参数
pub fn to_incar_string(incar: &Incar) -> Result<String> {
    let mut result = String::new();
    for (tag, value) in incar.iter() {
        if !tag_pattern().is_match(tag) {
            return Err(WmmError::serialization(FORMAT, format!("invalid tag '{}'", tag)));
        }
        if !is_finite(value) {
            return Err(WmmError::serialization(
                FORMAT,
                format!("non-finite value for {}", tag),
            ));
        }
        let text = value.to_string();
        if text.contains('\n') || text.contains(';') {
            return Err(WmmError::serialization(
                FORMAT,
                format!("value for {} spans multiple assignments", tag),
            ));
        }
        result.push_str(&format!("{} = {}\n", tag, text));
    }
    Ok(result)
}

fn is_finite(value: &IncarValue) -> bool {
    match value {
        IncarValue::Float(v) => v.is_finite(),
        IncarValue::List(items) => items.iter().all(is_finite),
        _ => true,
    }
}

/// 将 Incar 写入文件
pub fn write_incar_file(incar: &Incar, path: &Path) -> Result<()> {
    let content = to_incar_string(incar)?;
    fs::write(path, content).map_err(|e| WmmError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
