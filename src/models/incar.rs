//! # INCAR 参数数据模型
//!
//! VASP 计算控制参数的有序集合。服务器只把它当作附加文件，
//! 本模块不校验参数的物理含义。
//!
//! ## 依赖关系
//! - 被 `parsers/incar.rs` 和 `wmm/client.rs` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};
use std::fmt;

/// 单个 INCAR 参数值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IncarValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// 空格分隔的多值，例如 MAGMOM
    List(Vec<IncarValue>),
}

impl fmt::Display for IncarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncarValue::Int(v) => write!(f, "{}", v),
            IncarValue::Float(v) => write!(f, "{}", v),
            IncarValue::Bool(true) => write!(f, ".TRUE."),
            IncarValue::Bool(false) => write!(f, ".FALSE."),
            IncarValue::Text(s) => write!(f, "{}", s),
            IncarValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(" "))
            }
        }
    }
}

impl From<i64> for IncarValue {
    fn from(v: i64) -> Self {
        IncarValue::Int(v)
    }
}

impl From<f64> for IncarValue {
    fn from(v: f64) -> Self {
        IncarValue::Float(v)
    }
}

impl From<bool> for IncarValue {
    fn from(v: bool) -> Self {
        IncarValue::Bool(v)
    }
}

impl From<&str> for IncarValue {
    fn from(v: &str) -> Self {
        IncarValue::Text(v.to_string())
    }
}

/// INCAR 参数集合，保持插入顺序，标签大小写不敏感
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Incar {
    params: Vec<(String, IncarValue)>,
}

impl Incar {
    pub fn new() -> Self {
        Incar::default()
    }

    /// 设置参数；已存在的标签原位覆盖
    pub fn set(&mut self, tag: &str, value: impl Into<IncarValue>) {
        let tag = tag.trim().to_uppercase();
        let value = value.into();
        match self.params.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, v)) => *v = value,
            None => self.params.push((tag, value)),
        }
    }

    #[cfg(test)]
    pub fn with(mut self, tag: &str, value: impl Into<IncarValue>) -> Self {
        self.set(tag, value);
        self
    }

    pub fn get(&self, tag: &str) -> Option<&IncarValue> {
        let tag = tag.trim().to_uppercase();
        self.params.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IncarValue)> {
        self.params.iter().map(|(t, v)| (t.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_case_insensitive() {
        let mut incar = Incar::new().with("encut", 520_i64).with("ISMEAR", 0_i64);
        incar.set("EnCuT", 600_i64);

        assert_eq!(incar.len(), 2);
        assert_eq!(incar.get("ENCUT"), Some(&IncarValue::Int(600)));
        let tags: Vec<&str> = incar.iter().map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["ENCUT", "ISMEAR"]);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(IncarValue::Bool(true).to_string(), ".TRUE.");
        assert_eq!(IncarValue::Float(1e-5).to_string(), "0.00001");
        let magmom = IncarValue::List(vec![IncarValue::Float(5.0), IncarValue::Float(-5.0)]);
        assert_eq!(magmom.to_string(), "5 -5");
    }
}
