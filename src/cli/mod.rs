//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `fetch`: 上传结构并取回服务器生成的 KPOINTS
//! - `precalc`: 只打印将要上传的 PRECALC 文本（不联网）
//! - `inspect`: 解析本地 KPOINTS 文件
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: fetch, precalc, inspect

pub mod fetch;
pub mod inspect;
pub mod precalc;

use clap::{Parser, Subcommand};

/// wmmk - 广义 k 点网格服务器客户端
#[derive(Parser)]
#[command(name = "wmmk")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Client for the Wisesa-McGill-Mueller k-point grid server", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Upload a structure and fetch a generalized k-point grid
    Fetch(fetch::FetchArgs),

    /// Print the PRECALC request that would be uploaded
    Precalc(precalc::PrecalcArgs),

    /// Summarize a local KPOINTS file
    Inspect(inspect::InspectArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wmm::{IncludeGamma, RemoveSymmetry};

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fetch_args_map_to_config() {
        let cli = Cli::try_parse_from([
            "wmmk",
            "fetch",
            "-s",
            "POSCAR_Si",
            "--kppra",
            "1000",
            "--remove-symmetry",
            "time_reversal",
            "--include-gamma",
            "true",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.structure.to_str(), Some("POSCAR_Si"));
                let config = args.precalc.to_config();
                assert_eq!(config.kppra, Some(1000.0));
                assert_eq!(config.remove_symmetry, Some(RemoveSymmetry::TimeReversal));
                assert_eq!(config.include_gamma, IncludeGamma::True);
                assert_eq!(config.min_total_kpoints, 1);
                assert_eq!(config.gap_distance, 7.0);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_precalc_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["wmmk", "precalc"]).unwrap();
        match cli.command {
            Commands::Precalc(args) => {
                assert_eq!(args.to_config(), crate::wmm::PrecalcConfig::default());
            }
            _ => panic!("expected precalc"),
        }
    }
}
