//! # wmmk - 广义 k 点网格服务器客户端
//!
//! 把晶体结构上传到 Wisesa–McGill–Mueller k 点服务器，
//! 取回按最小实空间距离生成的广义 Monkhorst-Pack 网格。
//!
//! ## 子命令
//! - `fetch`   - 上传 POSCAR (+INCAR) 并取回 KPOINTS
//! - `precalc` - 打印将要上传的 PRECALC 请求
//! - `inspect` - 解析本地 KPOINTS 文件
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── wmm/       (请求生成与上传)
//!   │     ├── parsers/   (POSCAR / INCAR / KPOINTS 读写)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (输出工具)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod utils;
mod wmm;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        if e.is_transfer() {
            utils::output::print_info("Check the network connection or pass --server host:port");
        } else if e.is_parse() {
            utils::output::print_info("The input is not in the expected VASP text format");
        } else if e.is_serialization() {
            utils::output::print_info("The structure or INCAR could not be written for upload");
        }
        std::process::exit(1);
    }
}
