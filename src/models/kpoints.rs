//! # KPOINTS 数据模型
//!
//! VASP KPOINTS 文件的结构化表示。k 点服务器返回的是显式 k 点列表
//! （广义 Monkhorst-Pack 网格约化后的不可约点及权重），但这里覆盖
//! KPOINTS 格式的全部四种模式，方便写回或检查其他来源的文件。
//!
//! ## 依赖关系
//! - 被 `parsers/kpoints.rs`、`wmm/client.rs` 和 `commands/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};
use std::fmt;

/// 网格中心类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridCentering {
    Gamma,
    Monkhorst,
}

/// 显式坐标所处的坐标系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// 倒格子分数坐标
    Reciprocal,
    /// 笛卡尔坐标（单位 2π/a）
    Cartesian,
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateSystem::Reciprocal => write!(f, "Reciprocal"),
            CoordinateSystem::Cartesian => write!(f, "Cartesian"),
        }
    }
}

/// 单个显式 k 点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpoint {
    pub coords: [f64; 3],
    pub weight: f64,
    pub label: Option<String>,
}

impl Kpoint {
    pub fn new(coords: [f64; 3], weight: f64) -> Self {
        Kpoint {
            coords,
            weight,
            label: None,
        }
    }

    pub fn is_gamma(&self) -> bool {
        self.coords.iter().all(|c| c.abs() < 1e-8)
    }
}

/// 四面体积分信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tetrahedra {
    /// 四面体体积权重
    pub volume_weight: f64,
    /// (简并度, [四个角点索引，从 1 开始])
    pub connections: Vec<(u32, [u32; 4])>,
}

/// KPOINTS 文件模式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KpointsMode {
    /// 全自动：只给出长度参数 R_k
    FullyAutomatic { length: f64 },

    /// Gamma / Monkhorst-Pack 网格
    Grid {
        centering: GridCentering,
        subdivisions: [u32; 3],
        shift: [f64; 3],
    },

    /// 自动网格，由三个生成矢量和平移给出
    Basis {
        coordinates: CoordinateSystem,
        vectors: [[f64; 3]; 3],
        shift: [f64; 3],
    },

    /// 能带路径：成对的高对称点，每段插入 `divisions` 个点
    LineMode {
        divisions: u32,
        coordinates: CoordinateSystem,
        points: Vec<[f64; 3]>,
        labels: Vec<Option<String>>,
    },

    /// 显式 k 点列表
    Explicit {
        coordinates: CoordinateSystem,
        points: Vec<Kpoint>,
        tetrahedra: Option<Tetrahedra>,
    },
}

/// KPOINTS 文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpoints {
    /// 第一行注释
    pub comment: String,
    pub mode: KpointsMode,
}

impl Kpoints {
    pub fn new(comment: impl Into<String>, mode: KpointsMode) -> Self {
        Kpoints {
            comment: comment.into(),
            mode,
        }
    }

    /// 文件第二行写入的数值：自动模式为 0，能带模式为每段点数
    pub fn header_count(&self) -> usize {
        match &self.mode {
            KpointsMode::FullyAutomatic { .. }
            | KpointsMode::Grid { .. }
            | KpointsMode::Basis { .. } => 0,
            KpointsMode::LineMode { divisions, .. } => *divisions as usize,
            KpointsMode::Explicit { points, .. } => points.len(),
        }
    }

    /// 显式 k 点数量；网格模式为网格总点数（溢出时饱和）
    pub fn num_kpts(&self) -> usize {
        match &self.mode {
            KpointsMode::FullyAutomatic { .. } | KpointsMode::Basis { .. } => 0,
            KpointsMode::Grid { subdivisions, .. } => subdivisions
                .iter()
                .fold(1usize, |acc, &n| acc.saturating_mul(n as usize)),
            KpointsMode::LineMode { points, .. } => points.len(),
            KpointsMode::Explicit { points, .. } => points.len(),
        }
    }

    /// 显式权重之和（服务器返回的权重之和等于完整网格点数）
    pub fn total_weight(&self) -> Option<f64> {
        match &self.mode {
            KpointsMode::Explicit { points, .. } => Some(points.iter().map(|k| k.weight).sum()),
            _ => None,
        }
    }

    pub fn contains_gamma(&self) -> bool {
        match &self.mode {
            KpointsMode::Explicit { points, .. } => points.iter().any(Kpoint::is_gamma),
            KpointsMode::Grid {
                centering, shift, ..
            } => *centering == GridCentering::Gamma && shift.iter().all(|s| s.abs() < 1e-8),
            KpointsMode::LineMode { points, .. } => {
                points.iter().any(|p| p.iter().all(|c| c.abs() < 1e-8))
            }
            KpointsMode::Basis { shift, .. } => shift.iter().all(|s| s.abs() < 1e-8),
            KpointsMode::FullyAutomatic { .. } => true,
        }
    }

    /// 显式 k 点（其他模式返回空切片）
    pub fn explicit_points(&self) -> &[Kpoint] {
        match &self.mode {
            KpointsMode::Explicit { points, .. } => points,
            _ => &[],
        }
    }

    pub fn style_name(&self) -> &'static str {
        match &self.mode {
            KpointsMode::FullyAutomatic { .. } => "Fully automatic",
            KpointsMode::Grid {
                centering: GridCentering::Gamma,
                ..
            } => "Gamma-centered grid",
            KpointsMode::Grid {
                centering: GridCentering::Monkhorst,
                ..
            } => "Monkhorst-Pack grid",
            KpointsMode::Basis { .. } => "Generating basis",
            KpointsMode::LineMode { .. } => "Line mode",
            KpointsMode::Explicit { .. } => "Explicit",
        }
    }
}
