//! # PRECALC 请求文件生成
//!
//! k 点服务器读取的 `KEY=VALUE` 配置。生成规则必须与线上服务一直
//! 收到的文本逐字节一致：
//!
//! 1. 每个选项写成 `snake_name=value\n`
//! 2. 整段文本转大写
//! 3. 删除整段文本中的所有 `_`（包括值里的下划线）
//! 4. 仅恢复 `REMOVE_SYMMETRY` 和 `TIME_REVERSAL` 两处下划线
//!
//! ## 依赖关系
//! - 被 `wmm/client.rs`、`cli/` 和 `commands/` 使用
//! - 使用 `clap::ValueEnum` 供命令行直接选择枚举值

use clap::ValueEnum;
use std::fmt;

/// 对称性移除模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RemoveSymmetry {
    /// Keep all symmetry
    None,
    /// Ignore structural symmetry
    Structural,
    /// Ignore time-reversal symmetry
    #[value(name = "time_reversal", alias = "time-reversal")]
    TimeReversal,
    /// Ignore both
    All,
}

impl fmt::Display for RemoveSymmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoveSymmetry::None => write!(f, "none"),
            RemoveSymmetry::Structural => write!(f, "structural"),
            RemoveSymmetry::TimeReversal => write!(f, "time_reversal"),
            RemoveSymmetry::All => write!(f, "all"),
        }
    }
}

/// 是否包含 Gamma 点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum IncludeGamma {
    /// Let the server decide
    #[default]
    Auto,
    /// Always include Gamma
    True,
    /// Never include Gamma
    False,
}

impl fmt::Display for IncludeGamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeGamma::Auto => write!(f, "auto"),
            IncludeGamma::True => write!(f, "True"),
            IncludeGamma::False => write!(f, "False"),
        }
    }
}

impl From<bool> for IncludeGamma {
    fn from(v: bool) -> Self {
        if v {
            IncludeGamma::True
        } else {
            IncludeGamma::False
        }
    }
}

/// 返回文件头的详细程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HeaderVerbosity {
    /// One-line comment
    #[default]
    Simple,
    /// Comment with grid details
    Verbose,
}

impl fmt::Display for HeaderVerbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderVerbosity::Simple => write!(f, "simple"),
            HeaderVerbosity::Verbose => write!(f, "verbose"),
        }
    }
}

/// k 点服务器请求参数
#[derive(Debug, Clone, PartialEq)]
pub struct PrecalcConfig {
    /// 实空间超晶格格点间的最小距离 (Å)
    pub min_distance: f64,
    /// 布里渊区内 k 点总数下限
    pub min_total_kpoints: u32,
    /// 每倒易原子 k 点数下限
    pub kppra: Option<f64>,
    /// 非周期方向（slab、纳米线等）的自动识别阈值 (Å)
    pub gap_distance: f64,
    pub remove_symmetry: Option<RemoveSymmetry>,
    pub include_gamma: IncludeGamma,
    pub header: HeaderVerbosity,
}

impl Default for PrecalcConfig {
    fn default() -> Self {
        PrecalcConfig {
            min_distance: 0.0,
            min_total_kpoints: 1,
            kppra: None,
            gap_distance: 7.0,
            remove_symmetry: None,
            include_gamma: IncludeGamma::Auto,
            header: HeaderVerbosity::Simple,
        }
    }
}

impl PrecalcConfig {
    pub fn new() -> Self {
        PrecalcConfig::default()
    }

    pub fn with_min_distance(mut self, v: f64) -> Self {
        self.min_distance = v;
        self
    }

    pub fn with_min_total_kpoints(mut self, v: u32) -> Self {
        self.min_total_kpoints = v;
        self
    }

    pub fn with_kppra(mut self, v: f64) -> Self {
        self.kppra = Some(v);
        self
    }

    pub fn with_gap_distance(mut self, v: f64) -> Self {
        self.gap_distance = v;
        self
    }

    pub fn with_remove_symmetry(mut self, v: RemoveSymmetry) -> Self {
        self.remove_symmetry = Some(v);
        self
    }

    pub fn with_include_gamma(mut self, v: impl Into<IncludeGamma>) -> Self {
        self.include_gamma = v.into();
        self
    }

    pub fn with_header(mut self, v: HeaderVerbosity) -> Self {
        self.header = v;
        self
    }

    /// 规范化之前的 (选项名, 值) 列表，顺序固定；未设置的值写作 `None`
    pub fn raw_options(&self) -> Vec<(&'static str, String)> {
        fn or_none<T: ToString>(v: &Option<T>) -> String {
            v.as_ref()
                .map(|x| x.to_string())
                .unwrap_or_else(|| "None".to_string())
        }

        vec![
            ("min_distance", self.min_distance.to_string()),
            ("min_total_kpoints", self.min_total_kpoints.to_string()),
            ("kppra", or_none(&self.kppra)),
            ("gap_distance", self.gap_distance.to_string()),
            ("remove_symmetry", or_none(&self.remove_symmetry)),
            ("include_gamma", self.include_gamma.to_string()),
            ("header", self.header.to_string()),
        ]
    }

    /// 生成上传用的 PRECALC 文本
    pub fn to_precalc_string(&self) -> String {
        let raw: String = self
            .raw_options()
            .into_iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect();
        normalize_precalc(&raw)
    }
}

/// 对整段文本应用服务器约定的大写和下划线规则
pub fn normalize_precalc(raw: &str) -> String {
    raw.replace('_', "")
        .to_uppercase()
        .replace("REMOVESYMMETRY", "REMOVE_SYMMETRY")
        .replace("TIMEREVERSAL", "TIME_REVERSAL")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_precalc_text() {
        let text = PrecalcConfig::default().to_precalc_string();
        assert_eq!(
            text,
            "MINDISTANCE=0\n\
             MINTOTALKPOINTS=1\n\
             KPPRA=NONE\n\
             GAPDISTANCE=7\n\
             REMOVE_SYMMETRY=NONE\n\
             INCLUDEGAMMA=AUTO\n\
             HEADER=SIMPLE\n"
        );
    }

    #[test]
    fn test_every_key_once_and_uppercase() {
        let config = PrecalcConfig::new()
            .with_min_distance(28.5)
            .with_kppra(1000.0)
            .with_remove_symmetry(RemoveSymmetry::Structural)
            .with_include_gamma(true)
            .with_header(HeaderVerbosity::Verbose);
        let text = config.to_precalc_string();

        let keys: Vec<&str> = text
            .lines()
            .map(|l| l.split_once('=').unwrap().0)
            .collect();
        assert_eq!(
            keys,
            vec![
                "MINDISTANCE",
                "MINTOTALKPOINTS",
                "KPPRA",
                "GAPDISTANCE",
                "REMOVE_SYMMETRY",
                "INCLUDEGAMMA",
                "HEADER"
            ]
        );
        assert_eq!(text, text.to_uppercase());
        assert!(text.contains("MINDISTANCE=28.5\n"));
        assert!(text.contains("KPPRA=1000\n"));
        assert!(text.contains("REMOVE_SYMMETRY=STRUCTURAL\n"));
        assert!(text.contains("INCLUDEGAMMA=TRUE\n"));
        assert!(text.contains("HEADER=VERBOSE\n"));
    }

    #[test]
    fn test_time_reversal_value_keeps_underscore() {
        let text = PrecalcConfig::new()
            .with_remove_symmetry(RemoveSymmetry::TimeReversal)
            .to_precalc_string();
        assert!(text.contains("REMOVE_SYMMETRY=TIME_REVERSAL\n"));

        // 只有两处复合名保留下划线
        let underscored: Vec<&str> = text.lines().filter(|l| l.contains('_')).collect();
        assert_eq!(underscored, vec!["REMOVE_SYMMETRY=TIME_REVERSAL"]);
    }

    #[test]
    fn test_blanket_underscore_stripping_hits_values() {
        assert_eq!(
            normalize_precalc("some_key=a_b_c\nremove_symmetry=all\n"),
            "SOMEKEY=ABC\nREMOVE_SYMMETRY=ALL\n"
        );
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let config = PrecalcConfig::new()
            .with_gap_distance(12.25)
            .with_include_gamma(IncludeGamma::False);
        assert_eq!(config.to_precalc_string(), config.to_precalc_string());
    }
}
