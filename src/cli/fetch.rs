//! # fetch 子命令 CLI 定义
//!
//! 上传结构到 k 点服务器并取回 KPOINTS
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/fetch.rs`

use super::precalc::PrecalcArgs;
use clap::Args;
use std::path::PathBuf;

/// fetch 子命令参数
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Structure file in POSCAR/CONTCAR format
    #[arg(short, long, default_value = "POSCAR")]
    pub structure: PathBuf,

    /// Optional INCAR to upload alongside the structure
    #[arg(short, long)]
    pub incar: Option<PathBuf>,

    /// Write the returned k-points to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// Server as host:port or base URL
    #[arg(long)]
    pub server: Option<String>,

    /// Print the parsed k-points as JSON instead of a table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Maximum number of k-points listed in the table (0 = all)
    #[arg(long, default_value_t = 20)]
    pub show: usize,

    #[command(flatten)]
    pub precalc: PrecalcArgs,
}
