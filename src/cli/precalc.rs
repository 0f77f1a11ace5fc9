//! # PRECALC 选项 CLI 定义
//!
//! `fetch` 与 `precalc` 子命令共用的服务器请求参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs`、`cli/fetch.rs` 使用
//! - 转换为 `wmm::PrecalcConfig`

use crate::wmm::{HeaderVerbosity, IncludeGamma, PrecalcConfig, RemoveSymmetry};
use clap::Args;

/// k 点生成参数
#[derive(Args, Debug, Clone)]
pub struct PrecalcArgs {
    /// Minimum distance (Å) between lattice points on the real-space superlattice
    #[arg(long, default_value_t = 0.0)]
    pub min_distance: f64,

    /// Minimum number of total k-points in the Brillouin zone
    #[arg(long, default_value_t = 1)]
    pub min_total_kpoints: u32,

    /// Minimum k-points per reciprocal atom
    #[arg(long)]
    pub kppra: Option<f64>,

    /// Auto-detection threshold (Å) for non-periodic directions (slabs, wires)
    #[arg(long, default_value_t = 7.0)]
    pub gap_distance: f64,

    /// Symmetry to ignore when reducing the grid
    #[arg(long, value_enum)]
    pub remove_symmetry: Option<RemoveSymmetry>,

    /// Whether the grid must contain the Gamma point
    #[arg(long, value_enum, default_value_t = IncludeGamma::Auto)]
    pub include_gamma: IncludeGamma,

    /// Verbosity of the KPOINTS comment line
    #[arg(long, value_enum, default_value_t = HeaderVerbosity::Simple)]
    pub header: HeaderVerbosity,
}

impl PrecalcArgs {
    pub fn to_config(&self) -> PrecalcConfig {
        let mut config = PrecalcConfig::new()
            .with_min_distance(self.min_distance)
            .with_min_total_kpoints(self.min_total_kpoints)
            .with_gap_distance(self.gap_distance)
            .with_include_gamma(self.include_gamma)
            .with_header(self.header);
        if let Some(kppra) = self.kppra {
            config = config.with_kppra(kppra);
        }
        if let Some(mode) = self.remove_symmetry {
            config = config.with_remove_symmetry(mode);
        }
        config
    }
}
