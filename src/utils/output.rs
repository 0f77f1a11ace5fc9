//! # 终端输出
//!
//! 命令层唯一的日志出口：每条消息带一个着色的状态标签。
//! 错误写到 stderr，其余写到 stdout，这样 `--json` 的输出可以直接重定向。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `main.rs` 使用
//! - 使用 `colored` crate

use colored::{ColoredString, Colorize};

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Info,
    Warn,
    Err,
    Skip,
    Done,
}

impl Status {
    fn tag(self) -> ColoredString {
        match self {
            Status::Ok => "[OK]".green().bold(),
            Status::Info => "[*]".blue().bold(),
            Status::Warn => "[WARN]".yellow().bold(),
            Status::Err => "[ERR]".red().bold(),
            Status::Skip => "[...]".dimmed(),
            Status::Done => "[DONE]".green().bold(),
        }
    }
}

fn emit(status: Status, msg: &str) {
    if status == Status::Err {
        eprintln!("{} {}", status.tag(), msg);
    } else {
        println!("{} {}", status.tag(), msg);
    }
}

pub fn print_success(msg: &str) {
    emit(Status::Ok, msg);
}

pub fn print_error(msg: &str) {
    emit(Status::Err, msg);
}

pub fn print_warning(msg: &str) {
    emit(Status::Warn, msg);
}

pub fn print_info(msg: &str) {
    emit(Status::Info, msg);
}

/// 表格被截断时的提示
pub fn print_skip(msg: &str) {
    emit(Status::Skip, msg);
}

pub fn print_done(msg: &str) {
    emit(Status::Done, msg);
}

/// `KPOINTS -> path` 形式的写出记录
pub fn print_saved(what: &str, path: &str) {
    emit(Status::Ok, &format!("{} {} {}", what.dimmed(), "->".cyan(), path));
}

/// 命令开头的标题栏
pub fn print_header(title: &str) {
    let rule = "─".repeat(RULE_WIDTH).dimmed();
    println!("\n{}\n  {}\n{}\n", rule, title.bold(), rule);
}
