//! # inspect 命令实现
//!
//! 解析本地 KPOINTS 文件并打印摘要。
//!
//! ## 依赖关系
//! - 使用 `cli/inspect.rs` 定义的参数
//! - 使用 `parsers/kpoints.rs`, `commands/report.rs`

use crate::cli::inspect::InspectArgs;
use crate::commands::report;
use crate::error::{Result, WmmError};
use crate::parsers::kpoints;
use crate::utils::output;

/// 执行 inspect 命令
pub fn execute(args: InspectArgs) -> Result<()> {
    if !args.file.exists() {
        return Err(WmmError::FileNotFound {
            path: args.file.display().to_string(),
        });
    }

    let kpts = kpoints::parse_kpoints_file(&args.file)?;

    if args.json {
        return report::print_json(&kpts);
    }

    output::print_header(&format!("K-points in {}", args.file.display()));
    report::print_summary(&kpts);
    report::print_table(&kpts, args.show);
    Ok(())
}
