//! # 数据模型模块
//!
//! 定义上传所需的晶体结构、INCAR 参数，以及服务器返回的 KPOINTS。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`wmm/` 和 `commands/` 使用
//! - 子模块: structure, incar, kpoints

pub mod incar;
pub mod kpoints;
pub mod structure;

pub use incar::{Incar, IncarValue};
pub use kpoints::{CoordinateSystem, GridCentering, Kpoint, Kpoints, KpointsMode, Tetrahedra};
pub use structure::{Atom, Crystal, Lattice};
