//! # k 点结果展示
//!
//! `fetch` 与 `inspect` 共用的摘要与表格输出。
//!
//! ## 依赖关系
//! - 被 `commands/fetch.rs`、`commands/inspect.rs` 使用
//! - 使用 `tabled` 绘制表格，`serde_json` 输出 JSON

use crate::error::{Result, WmmError};
use crate::models::{Kpoints, KpointsMode};
use crate::utils::output;

use tabled::{Table, Tabled};

/// k 点表格行
#[derive(Debug, Clone, Tabled)]
struct KpointRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "k1")]
    k1: String,
    #[tabled(rename = "k2")]
    k2: String,
    #[tabled(rename = "k3")]
    k3: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Label")]
    label: String,
}

/// 打印摘要信息
pub fn print_summary(kpoints: &Kpoints) {
    output::print_info(&format!("Comment: {}", kpoints.comment));
    output::print_info(&format!("Style:   {}", kpoints.style_name()));

    match &kpoints.mode {
        KpointsMode::Grid {
            subdivisions,
            shift,
            ..
        } => {
            output::print_info(&format!(
                "Grid:    {} x {} x {} = {} points (shift {} {} {})",
                subdivisions[0],
                subdivisions[1],
                subdivisions[2],
                kpoints.num_kpts(),
                shift[0],
                shift[1],
                shift[2]
            ));
        }
        KpointsMode::Basis {
            coordinates,
            vectors,
            shift,
        } => {
            output::print_info(&format!("Basis:   {} vectors", coordinates));
            for v in vectors {
                output::print_info(&format!("         {} {} {}", v[0], v[1], v[2]));
            }
            output::print_info(&format!("Shift:   {} {} {}", shift[0], shift[1], shift[2]));
        }
        KpointsMode::FullyAutomatic { length } => {
            output::print_info(&format!("Length:  {}", length));
        }
        KpointsMode::LineMode {
            divisions, points, ..
        } => {
            output::print_info(&format!(
                "Path:    {} segments, {} points per segment",
                points.len() / 2,
                divisions
            ));
        }
        KpointsMode::Explicit { .. } => {
            output::print_info(&format!("K-points: {} irreducible", kpoints.num_kpts()));
            if let Some(total) = kpoints.total_weight() {
                output::print_info(&format!("Total weight: {}", total));
            }
        }
    }

    if !kpoints.contains_gamma() {
        output::print_warning("Grid does not contain the Gamma point");
    }
}

/// 以表格列出显式 k 点，`limit` 为 0 时全部列出
pub fn print_table(kpoints: &Kpoints, limit: usize) {
    let points = kpoints.explicit_points();
    if points.is_empty() {
        return;
    }

    let shown = if limit == 0 {
        points.len()
    } else {
        limit.min(points.len())
    };

    let rows: Vec<KpointRow> = points
        .iter()
        .take(shown)
        .enumerate()
        .map(|(i, k)| KpointRow {
            index: i + 1,
            k1: format!("{:.6}", k.coords[0]),
            k2: format!("{:.6}", k.coords[1]),
            k3: format!("{:.6}", k.coords[2]),
            weight: format!("{}", k.weight),
            label: k.label.clone().unwrap_or_default(),
        })
        .collect();

    println!("{}", Table::new(&rows));

    if shown < points.len() {
        output::print_skip(&format!(
            "{} more k-points not shown (use --show 0 to list all)",
            points.len() - shown
        ));
    }
}

/// 以 JSON 打印
pub fn print_json(kpoints: &Kpoints) -> Result<()> {
    let text = serde_json::to_string_pretty(kpoints)
        .map_err(|e| WmmError::serialization("json", e.to_string()))?;
    println!("{}", text);
    Ok(())
}
