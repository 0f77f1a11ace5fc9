//! # k 点服务器接口模块
//!
//! 对接 Wisesa–McGill–Mueller 广义 k 点网格服务
//! (P. Wisesa, K. A. McGill, T. Mueller, Phys. Rev. B 93, 155109 (2016))。
//!
//! 流程是线性的：生成 PRECALC → 暂存文件 → 上传 → 解析响应。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`、`parsers/`
//! - 子模块: precalc, client

pub mod client;
pub mod precalc;

pub use client::WmmClient;
pub use precalc::{HeaderVerbosity, IncludeGamma, PrecalcConfig, RemoveSymmetry};

