//! # inspect 子命令 CLI 定义
//!
//! 读取本地 KPOINTS 文件并打印摘要
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/inspect.rs`

use clap::Args;
use std::path::PathBuf;

/// inspect 子命令参数
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// KPOINTS file to read
    #[arg(default_value = "KPOINTS")]
    pub file: PathBuf,

    /// Print the parsed k-points as JSON instead of a table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Maximum number of k-points listed in the table (0 = all)
    #[arg(long, default_value_t = 20)]
    pub show: usize,
}
