//! # 统一错误处理模块
//!
//! 定义 wmm-kpoints 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - 传输错误：网络失败 (`TransferError`) 或服务器非 2xx 响应 (`ServerRejected`)
//! - 解析错误：KPOINTS / POSCAR / INCAR 文本不符合格式
//! - 序列化错误：结构或 INCAR 无法写成所需文本格式
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// wmm-kpoints 统一错误类型
#[derive(Error, Debug)]
pub enum WmmError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 传输错误
    // ─────────────────────────────────────────────────────────────
    #[error("Request to {url} failed: {source}")]
    TransferError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server at {url} rejected the request: HTTP {status}\n{body}")]
    ServerRejected {
        url: String,
        status: u16,
        body: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 格式错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Cannot write {format}: {reason}")]
    SerializationError { format: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl WmmError {
    /// 网络或 HTTP 状态导致的失败
    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            WmmError::TransferError { .. } | WmmError::ServerRejected { .. }
        )
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, WmmError::ParseError { .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, WmmError::SerializationError { .. })
    }

    pub(crate) fn parse(format: &str, path: &str, reason: impl Into<String>) -> Self {
        WmmError::ParseError {
            format: format.to_string(),
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn serialization(format: &str, reason: impl Into<String>) -> Self {
        WmmError::SerializationError {
            format: format.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, WmmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let rejected = WmmError::ServerRejected {
            url: "http://localhost".to_string(),
            status: 500,
            body: "oops".to_string(),
        };
        assert!(rejected.is_transfer());
        assert!(!rejected.is_parse());

        let parse = WmmError::parse("kpoints", "<response>", "bad header");
        assert!(parse.is_parse());
        assert!(format!("{}", parse).contains("bad header"));

        let ser = WmmError::serialization("poscar", "no atoms");
        assert!(ser.is_serialization());
        assert!(!ser.is_transfer());
    }
}
