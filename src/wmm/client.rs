//! # k 点服务器客户端
//!
//! 在临时目录中写出 PRECALC / POSCAR / (INCAR)，以 multipart 表单
//! 一次性 POST 到服务器，并把返回的 KPOINTS 文本解析为 `Kpoints`。
//!
//! 每次调用使用独立的临时目录，`UploadBundle` 被 drop 时目录即被删除，
//! 无论请求成功、失败还是中途 panic。请求不设超时、不重试。
//!
//! ## 依赖关系
//! - 被 `commands/fetch.rs` 使用
//! - 使用 `wmm/precalc.rs`、`parsers/`、`models/`
//! - 使用 `reqwest` (blocking + multipart) 和 `tempfile`

use crate::error::{Result, WmmError};
use crate::models::{Crystal, Incar, Kpoints};
use crate::parsers::{incar, kpoints, poscar};
use crate::wmm::precalc::PrecalcConfig;

use reqwest::blocking::{multipart, Client};
use std::fs;
#[cfg(test)]
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// 公共服务器地址 (host:port)
pub const DEFAULT_SERVER: &str = "muellergroup.jhu.edu:8080";

/// Servlet 路径
pub const SERVLET_PATH: &str = "/PreCalcServer/PreCalcServlet";

/// 所有文件共用的表单字段名
pub const UPLOAD_FIELD: &str = "fileupload";

pub const PRECALC_FILE: &str = "PRECALC";
pub const POSCAR_FILE: &str = "POSCAR";
pub const INCAR_FILE: &str = "INCAR";

/// 单次请求的上传文件集合
///
/// 持有临时目录的所有权；drop 即清理。
pub struct UploadBundle {
    dir: TempDir,
    files: Vec<&'static str>,
}

impl UploadBundle {
    /// 在新的临时目录中写出待上传的文件
    pub fn stage(precalc: &str, crystal: &Crystal, incar: Option<&Incar>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("wmm-precalc-")
            .tempdir()
            .map_err(|e| WmmError::FileWriteError {
                path: std::env::temp_dir().display().to_string(),
                source: e,
            })?;

        let mut files = Vec::with_capacity(3);

        let precalc_path = dir.path().join(PRECALC_FILE);
        fs::write(&precalc_path, precalc).map_err(|e| WmmError::FileWriteError {
            path: precalc_path.display().to_string(),
            source: e,
        })?;
        files.push(PRECALC_FILE);

        let poscar_path = dir.path().join(POSCAR_FILE);
        poscar::write_poscar_file(crystal, &poscar_path)?;
        files.push(POSCAR_FILE);

        if let Some(params) = incar {
            let incar_path = dir.path().join(INCAR_FILE);
            incar::write_incar_file(params, &incar_path)?;
            files.push(INCAR_FILE);
        }

        Ok(UploadBundle { dir, files })
    }

    /// 组装 multipart 表单：每个文件一个 `fileupload` 部分
    pub fn to_form(&self) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for &name in &self.files {
            let path = self.dir.path().join(name);
            let content = fs::read(&path).map_err(|e| WmmError::FileReadError {
                path: path.display().to_string(),
                source: e,
            })?;
            form = form.part(UPLOAD_FIELD, multipart::Part::bytes(content).file_name(name));
        }
        Ok(form)
    }
}

/// k 点服务器客户端
#[derive(Clone)]
pub struct WmmClient {
    client: Client,
    url: String,
}

impl WmmClient {
    /// 指向公共服务器的客户端
    pub fn new() -> Result<Self> {
        Self::with_server(DEFAULT_SERVER)
    }

    /// 接受 `host:port` 或带协议的基地址（servlet 路径可省略）
    pub fn with_server(server: &str) -> Result<Self> {
        let server = server.trim().trim_end_matches('/');
        if server.is_empty() {
            return Err(WmmError::InvalidArgument("empty server address".to_string()));
        }

        let url = if server.starts_with("http://") || server.starts_with("https://") {
            if server.ends_with(SERVLET_PATH) {
                server.to_string()
            } else {
                format!("{}{}", server, SERVLET_PATH)
            }
        } else {
            format!("http://{}{}", server, SERVLET_PATH)
        };

        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| WmmError::TransferError {
                url: url.clone(),
                source: e,
            })?;

        Ok(WmmClient { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 发送一次请求并返回原始响应文本
    pub fn upload(&self, bundle: &UploadBundle) -> Result<String> {
        let form = bundle.to_form()?;

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .map_err(|e| WmmError::TransferError {
                url: self.url.clone(),
                source: e,
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| WmmError::TransferError {
            url: self.url.clone(),
            source: e,
        })?;

        if !status.is_success() {
            return Err(WmmError::ServerRejected {
                url: self.url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// 完整流程：生成 PRECALC → 暂存文件 → 上传 → 解析 KPOINTS
    pub fn fetch_kpoints(
        &self,
        crystal: &Crystal,
        config: &PrecalcConfig,
        incar: Option<&Incar>,
    ) -> Result<Kpoints> {
        let precalc = config.to_precalc_string();

        let text = {
            let bundle = UploadBundle::stage(&precalc, crystal, incar)?;
            self.upload(&bundle)?
        };

        kpoints::parse_kpoints_content(&text, &self.url)
    }
}

#[cfg(test)]
impl UploadBundle {
    fn dir(&self) -> &Path {
        self.dir.path()
    }

    fn len(&self) -> usize {
        self.files.len()
    }

    /// 上传时使用的文件名，按表单顺序
    fn file_names(&self) -> &[&'static str] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};
    use crate::wmm::precalc::RemoveSymmetry;
    use httpmock::prelude::*;

    const RESPONSE: &str = "Kpoints generated by the K-Point Grid Server.\n\
                            2\n\
                            Fractional\n\
                            0.0 0.0 0.0 1\n\
                            0.5 0.5 0.5 7\n";

    fn silicon() -> Crystal {
        let lattice = Lattice::from_vectors([[0.0, 2.715, 2.715], [2.715, 0.0, 2.715], [2.715, 2.715, 0.0]]);
        Crystal::new(
            "Si",
            lattice,
            vec![
                Atom::new("Si", [0.0, 0.0, 0.0]),
                Atom::new("Si", [0.25, 0.25, 0.25]),
            ],
        )
    }

    #[test]
    fn test_stage_without_incar_has_two_files() {
        let precalc = PrecalcConfig::default().to_precalc_string();
        let bundle = UploadBundle::stage(&precalc, &silicon(), None).unwrap();

        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.file_names(), vec![PRECALC_FILE, POSCAR_FILE]);
        assert_eq!(
            fs::read_to_string(bundle.dir().join(PRECALC_FILE)).unwrap(),
            precalc
        );
        assert!(!bundle.dir().join(INCAR_FILE).exists());
    }

    #[test]
    fn test_stage_with_incar_has_three_files() {
        let incar = Incar::new().with("ENCUT", 520_i64);
        let bundle = UploadBundle::stage("HEADER=SIMPLE\n", &silicon(), Some(&incar)).unwrap();

        assert_eq!(bundle.len(), 3);
        assert_eq!(
            bundle.file_names(),
            vec![PRECALC_FILE, POSCAR_FILE, INCAR_FILE]
        );
        assert_eq!(
            fs::read_to_string(bundle.dir().join(INCAR_FILE)).unwrap(),
            "ENCUT = 520\n"
        );
    }

    #[test]
    fn test_staging_dir_removed_on_drop() {
        let bundle = UploadBundle::stage("X=1\n", &silicon(), None).unwrap();
        let dir = bundle.dir().to_path_buf();
        assert!(dir.exists());
        drop(bundle);
        assert!(!dir.exists());
    }

    #[test]
    fn test_separate_calls_use_separate_dirs() {
        let a = UploadBundle::stage("X=1\n", &silicon(), None).unwrap();
        let b = UploadBundle::stage("X=1\n", &silicon(), None).unwrap();
        assert_ne!(a.dir(), b.dir());
    }

    #[test]
    fn test_stage_reports_structure_serialization_error() {
        let empty = Crystal::new("empty", silicon().lattice, vec![]);
        let err = UploadBundle::stage("X=1\n", &empty, None)
            .err()
            .unwrap();
        assert!(err.is_serialization());
    }

    #[test]
    fn test_server_url_forms() {
        assert_eq!(
            WmmClient::new().unwrap().url(),
            "http://muellergroup.jhu.edu:8080/PreCalcServer/PreCalcServlet"
        );
        assert_eq!(
            WmmClient::with_server("localhost:9000").unwrap().url(),
            "http://localhost:9000/PreCalcServer/PreCalcServlet"
        );
        assert_eq!(
            WmmClient::with_server("https://example.org/PreCalcServer/PreCalcServlet/")
                .unwrap()
                .url(),
            "https://example.org/PreCalcServer/PreCalcServlet"
        );
        assert!(WmmClient::with_server("  ").is_err());
    }

    #[test]
    fn test_fetch_kpoints_end_to_end() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(SERVLET_PATH)
                .body_contains("name=\"fileupload\"")
                .body_contains("filename=\"PRECALC\"")
                .body_contains("filename=\"POSCAR\"")
                .body_contains("MINDISTANCE=0\n")
                .body_contains("REMOVE_SYMMETRY=TIME_REVERSAL\n");
            then.status(200).body(RESPONSE);
        });

        let client = WmmClient::with_server(&server.address().to_string()).unwrap();
        let config = PrecalcConfig::new().with_remove_symmetry(RemoveSymmetry::TimeReversal);
        let kpts = client.fetch_kpoints(&silicon(), &config, None).unwrap();

        mock.assert();
        assert_eq!(kpts.num_kpts(), 2);
        assert_eq!(kpts.total_weight(), Some(8.0));
    }

    #[test]
    fn test_fetch_kpoints_uploads_incar() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(SERVLET_PATH)
                .body_contains("filename=\"INCAR\"")
                .body_contains("ISPIN = 2");
            then.status(200).body(RESPONSE);
        });

        let client = WmmClient::with_server(&server.address().to_string()).unwrap();
        let incar = Incar::new().with("ISPIN", 2_i64);
        client
            .fetch_kpoints(&silicon(), &PrecalcConfig::default(), Some(&incar))
            .unwrap();

        mock.assert();
    }

    #[test]
    fn test_server_error_status_is_transfer_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(SERVLET_PATH);
            then.status(500).body("java.lang.NullPointerException");
        });

        let client = WmmClient::with_server(&server.address().to_string()).unwrap();
        let err = client
            .fetch_kpoints(&silicon(), &PrecalcConfig::default(), None)
            .unwrap_err();

        assert!(err.is_transfer());
        match err {
            WmmError::ServerRejected { status, body, .. } => {
                assert_eq!(status, 500);
                assert!(body.contains("NullPointerException"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_html_reply_is_parse_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(SERVLET_PATH);
            then.status(200)
                .body("<html><body><h1>Service unavailable</h1></body></html>\n");
        });

        let client = WmmClient::with_server(&server.address().to_string()).unwrap();
        let err = client
            .fetch_kpoints(&silicon(), &PrecalcConfig::default(), None)
            .unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_unreachable_server_is_transfer_error() {
        let client = WmmClient::with_server("127.0.0.1:1").unwrap();
        let err = client
            .fetch_kpoints(&silicon(), &PrecalcConfig::default(), None)
            .unwrap_err();
        assert!(matches!(err, WmmError::TransferError { .. }));
    }
}
