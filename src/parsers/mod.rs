//! # 解析器模块
//!
//! VASP 文本格式的读写：上传用的 POSCAR、INCAR，以及服务器返回的 KPOINTS。
//!
//! ## 依赖关系
//! - 被 `wmm/` 和 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: poscar, incar, kpoints

pub mod incar;
pub mod kpoints;
pub mod poscar;
