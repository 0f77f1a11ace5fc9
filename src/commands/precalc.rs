//! # precalc 命令实现
//!
//! 打印将要上传的 PRECALC 文本，不访问网络。
//!
//! ## 依赖关系
//! - 使用 `cli/precalc.rs` 定义的参数
//! - 使用 `wmm/precalc.rs`

use crate::cli::precalc::PrecalcArgs;
use crate::error::Result;

/// 执行 precalc 命令
pub fn execute(args: PrecalcArgs) -> Result<()> {
    print!("{}", args.to_config().to_precalc_string());
    Ok(())
}
