//! # fetch 命令实现
//!
//! 读取 POSCAR（及可选 INCAR），向 k 点服务器请求广义网格，
//! 打印结果并可选写出 KPOINTS 文件。
//!
//! ## 依赖关系
//! - 使用 `cli/fetch.rs` 定义的参数
//! - 使用 `parsers/`, `wmm/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::cli::fetch::FetchArgs;
use crate::commands::report;
use crate::error::{Result, WmmError};
use crate::parsers::{incar, kpoints, poscar};
use crate::utils::{output, progress};
use crate::wmm::WmmClient;

/// 执行 fetch 命令
pub fn execute(args: FetchArgs) -> Result<()> {
    output::print_header("Fetching generalized k-point grid");

    // 输出文件存在且未要求覆盖时提前退出，避免白白请求一次服务器
    if let Some(ref out) = args.output {
        if out.exists() && !args.overwrite {
            return Err(WmmError::InvalidArgument(format!(
                "{} already exists (use --overwrite)",
                out.display()
            )));
        }
    }

    let crystal = poscar::parse_poscar_file(&args.structure)?;
    output::print_info(&format!(
        "Structure: {} ({} atoms) from {}",
        crystal.formula(),
        crystal.num_atoms(),
        args.structure.display()
    ));
    let (a, b, c, alpha, beta, gamma) = crystal.lattice.parameters();
    output::print_info(&format!(
        "Lattice: a={:.4} b={:.4} c={:.4} α={:.2} β={:.2} γ={:.2}",
        a, b, c, alpha, beta, gamma
    ));

    let params = match args.incar {
        Some(ref path) => {
            let parsed = incar::parse_incar_file(path)?;
            output::print_info(&format!(
                "INCAR: {} parameters from {}",
                parsed.len(),
                path.display()
            ));
            if parsed.is_empty() {
                output::print_warning("INCAR contains no parameters");
            }
            // VASP 在设置 KSPACING 时会忽略 KPOINTS 文件
            if parsed.get("KSPACING").is_some() {
                output::print_warning("INCAR sets KSPACING; VASP will ignore the KPOINTS file");
            }
            Some(parsed)
        }
        None => None,
    };

    let client = match args.server {
        Some(ref server) => WmmClient::with_server(server)?,
        None => WmmClient::new()?,
    };

    let config = args.precalc.to_config();

    let spinner = progress::create_spinner(&format!("Waiting for {}", client.url()));
    let result = client.fetch_kpoints(&crystal, &config, params.as_ref());
    spinner.finish_and_clear();
    let kpts = result?;

    output::print_success(&format!("Received {} k-points", kpts.num_kpts()));

    if args.json {
        report::print_json(&kpts)?;
    } else {
        report::print_summary(&kpts);
        if let Some(total) = kpts.total_weight() {
            output::print_info(&format!(
                "KPPRA: {}",
                crystal.kppra(total.round() as usize)
            ));
        }
        report::print_table(&kpts, args.show);
    }

    if let Some(ref out) = args.output {
        kpoints::write_kpoints_file(&kpts, out)?;
        output::print_saved("KPOINTS", &out.display().to_string());
    }

    output::print_done("K-point grid ready");
    Ok(())
}
