//! # VASP KPOINTS 格式读写
//!
//! 解析 k 点服务器的纯文本响应。服务器出错时往往返回 HTML 页面，
//! 这种情况必须报 `ParseError` 而不是得到一个空结果。
//!
//! ## KPOINTS 格式说明
//! ```text
//! Comment                     # 第 1 行
//! N                           # 0 = 自动网格, >0 = 显式点数或能带每段点数
//! Gamma/Monkhorst/Auto/Line/Reciprocal/Cartesian
//! ...                         # 依模式而定
//! ```
//!
//! ## 依赖关系
//! - 被 `wmm/client.rs` 和 `commands/fetch.rs` 使用
//! - 使用 `models/kpoints.rs`

use crate::error::{Result, WmmError};
use crate::models::{CoordinateSystem, GridCentering, Kpoint, Kpoints, KpointsMode, Tetrahedra};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const FORMAT: &str = "kpoints";

/// 行游标，跳过空行并记录行号
struct Lines<'a> {
    lines: Vec<(usize, &'a str)>,
    pos: usize,
    source: &'a str,
}

impl<'a> Lines<'a> {
    fn new(content: &'a str, source: &'a str) -> Self {
        let lines = content
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l))
            .collect();
        Lines {
            lines,
            pos: 0,
            source,
        }
    }

    /// 下一行（第一行注释可以为空，因此不跳过空行）
    fn next_raw(&mut self, what: &str) -> Result<(usize, &'a str)> {
        let item = self
            .lines
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.error(format!("Unexpected end of file, expected {}", what)))?;
        self.pos += 1;
        Ok(item)
    }

    fn next_nonempty(&mut self, what: &str) -> Result<(usize, &'a str)> {
        loop {
            let (no, line) = self.next_raw(what)?;
            if !line.trim().is_empty() {
                return Ok((no, line));
            }
        }
    }

    /// 剩余的非空行数，用于限制按文件声明的数量预分配
    fn remaining(&self) -> usize {
        self.lines[self.pos.min(self.lines.len())..]
            .iter()
            .filter(|(_, l)| !l.trim().is_empty())
            .count()
    }

    fn peek_nonempty(&self) -> Option<&'a str> {
        self.lines[self.pos.min(self.lines.len())..]
            .iter()
            .map(|(_, l)| *l)
            .find(|l| !l.trim().is_empty())
    }

    fn error(&self, reason: impl Into<String>) -> WmmError {
        WmmError::parse(FORMAT, self.source, reason)
    }
}

/// 解析 KPOINTS 文件
pub fn parse_kpoints_file(path: &Path) -> Result<Kpoints> {
    let content = fs::read_to_string(path).map_err(|e| WmmError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_kpoints_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 KPOINTS
pub fn parse_kpoints_content(content: &str, source: &str) -> Result<Kpoints> {
    let mut lines = Lines::new(content, source);

    let (_, comment) = lines.next_raw("comment line")?;
    let comment = comment.trim().to_string();

    let (no, count_line) = lines.next_nonempty("number of k-points")?;
    let num_kpts: usize = count_line
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            lines.error(format!(
                "Line {}: expected number of k-points, found '{}'",
                no,
                count_line.trim()
            ))
        })?;

    let (no, style_line) = lines.next_nonempty("style line")?;
    let style = style_line
        .trim()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .ok_or_else(|| lines.error(format!("Line {}: empty style line", no)))?;

    // A / G / M 由样式行决定，与第二行的数值无关
    let mode = match style {
        'A' => {
            let (no, line) = lines.next_nonempty("length parameter")?;
            let length = parse_numbers(line, 1)
                .map(|v| v[0])
                .ok_or_else(|| lines.error(format!("Line {}: invalid length parameter", no)))?;
            KpointsMode::FullyAutomatic { length }
        }
        'G' | 'M' => parse_grid(&mut lines, style)?,
        _ if num_kpts == 0 => parse_basis(&mut lines, coordinate_system(style_line))?,
        'L' => {
            let divisions = u32::try_from(num_kpts).map_err(|_| {
                lines.error(format!(
                    "Line {}: too many points per segment ({})",
                    no, num_kpts
                ))
            })?;
            parse_line_mode(&mut lines, divisions)?
        }
        _ => parse_explicit(&mut lines, num_kpts, coordinate_system(style_line))?,
    };

    Ok(Kpoints::new(comment, mode))
}

fn coordinate_system(line: &str) -> CoordinateSystem {
    match line.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('C') | Some('K') => CoordinateSystem::Cartesian,
        _ => CoordinateSystem::Reciprocal,
    }
}

fn parse_grid(lines: &mut Lines<'_>, style: char) -> Result<KpointsMode> {
    let centering = if style == 'G' {
        GridCentering::Gamma
    } else {
        GridCentering::Monkhorst
    };

    let (no, line) = lines.next_nonempty("grid subdivisions")?;
    let subdivisions: Vec<u32> = line
        .split_whitespace()
        .take(3)
        .map(|s| s.parse().ok())
        .collect::<Option<Vec<u32>>>()
        .filter(|v| v.len() == 3)
        .ok_or_else(|| lines.error(format!("Line {}: invalid grid subdivisions", no)))?;

    // 可选的平移行；不是三个数时忽略
    let shift = match lines.peek_nonempty().and_then(|l| parse_numbers(l, 3)) {
        Some(v) => {
            lines.next_nonempty("grid shift")?;
            [v[0], v[1], v[2]]
        }
        None => [0.0; 3],
    };

    Ok(KpointsMode::Grid {
        centering,
        subdivisions: [subdivisions[0], subdivisions[1], subdivisions[2]],
        shift,
    })
}

fn parse_basis(lines: &mut Lines<'_>, coordinates: CoordinateSystem) -> Result<KpointsMode> {
    let mut vectors = [[0.0; 3]; 3];
    for (i, vector) in vectors.iter_mut().enumerate() {
        let (no, line) = lines.next_nonempty(&format!("basis vector {}", i + 1))?;
        let v = parse_numbers(line, 3)
            .ok_or_else(|| lines.error(format!("Line {}: invalid basis vector", no)))?;
        *vector = [v[0], v[1], v[2]];
    }

    let shift = match lines.peek_nonempty() {
        Some(_) => {
            let (no, line) = lines.next_nonempty("basis shift")?;
            let v = parse_numbers(line, 3)
                .ok_or_else(|| lines.error(format!("Line {}: invalid basis shift", no)))?;
            [v[0], v[1], v[2]]
        }
        None => [0.0; 3],
    };

    Ok(KpointsMode::Basis {
        coordinates,
        vectors,
        shift,
    })
}

fn parse_line_mode(lines: &mut Lines<'_>, divisions: u32) -> Result<KpointsMode> {
    let (_, coord_line) = lines.next_nonempty("coordinate type")?;
    let coordinates = coordinate_system(coord_line);

    let mut points = Vec::new();
    let mut labels = Vec::new();
    while lines.peek_nonempty().is_some() {
        let (no, line) = lines.next_nonempty("path point")?;
        let (numbers, label) = split_label(line, 3);
        let v = parse_numbers(numbers, 3)
            .ok_or_else(|| lines.error(format!("Line {}: invalid path point", no)))?;
        points.push([v[0], v[1], v[2]]);
        labels.push(label);
    }

    if points.is_empty() || points.len() % 2 != 0 {
        return Err(lines.error(format!(
            "Line mode needs pairs of end points, found {}",
            points.len()
        )));
    }

    Ok(KpointsMode::LineMode {
        divisions,
        coordinates,
        points,
        labels,
    })
}

fn parse_explicit(
    lines: &mut Lines<'_>,
    num_kpts: usize,
    coordinates: CoordinateSystem,
) -> Result<KpointsMode> {
    let mut points = Vec::with_capacity(num_kpts.min(lines.remaining()));
    for i in 0..num_kpts {
        let (no, line) = lines.next_nonempty(&format!("k-point {} of {}", i + 1, num_kpts))?;
        let (numbers, label) = split_label(line, 4);
        let v = parse_numbers(numbers, 4)
            .ok_or_else(|| lines.error(format!("Line {}: expected 'kx ky kz weight'", no)))?;
        let mut kpoint = Kpoint::new([v[0], v[1], v[2]], v[3]);
        kpoint.label = label;
        points.push(kpoint);
    }

    let tetrahedra = match lines.peek_nonempty() {
        Some(l) if l.trim().to_uppercase().starts_with('T') => {
            lines.next_nonempty("tetrahedra header")?;
            Some(parse_tetrahedra(lines)?)
        }
        _ => None,
    };

    Ok(KpointsMode::Explicit {
        coordinates,
        points,
        tetrahedra,
    })
}

fn parse_tetrahedra(lines: &mut Lines<'_>) -> Result<Tetrahedra> {
    let (no, line) = lines.next_nonempty("tetrahedra count")?;
    let mut parts = line.split_whitespace();
    let count: usize = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| lines.error(format!("Line {}: invalid tetrahedra count", no)))?;
    let volume_weight: f64 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| lines.error(format!("Line {}: invalid tetrahedra weight", no)))?;

    let mut connections = Vec::with_capacity(count.min(lines.remaining()));
    for _ in 0..count {
        let (no, line) = lines.next_nonempty("tetrahedron")?;
        let v: Vec<u32> = line
            .split_whitespace()
            .take(5)
            .map(|s| s.parse().ok())
            .collect::<Option<Vec<u32>>>()
            .filter(|v| v.len() == 5)
            .ok_or_else(|| lines.error(format!("Line {}: invalid tetrahedron", no)))?;
        connections.push((v[0], [v[1], v[2], v[3], v[4]]));
    }

    Ok(Tetrahedra {
        volume_weight,
        connections,
    })
}

/// 分离标签：`!` 之后的内容，或没有 `!` 时第 `n + 1` 个字段
fn split_label(line: &str, n: usize) -> (&str, Option<String>) {
    match line.split_once('!') {
        Some((numbers, label)) => {
            let label = label.trim();
            (numbers, (!label.is_empty()).then(|| label.to_string()))
        }
        None => (line, line.split_whitespace().nth(n).map(str::to_string)),
    }
}

/// 读取一行开头的 n 个浮点数，多余字段忽略
fn parse_numbers(line: &str, n: usize) -> Option<Vec<f64>> {
    let v: Vec<f64> = line
        .split_whitespace()
        .take(n)
        .map(|s| s.parse().ok())
        .collect::<Option<_>>()?;
    (v.len() == n).then_some(v)
}

/// 将 Kpoints 转换为 KPOINTS 文本
pub fn to_kpoints_string(kpoints: &Kpoints) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", kpoints.comment);
    let _ = writeln!(out, "{}", kpoints.header_count());

    match &kpoints.mode {
        KpointsMode::FullyAutomatic { length } => {
            out.push_str("Auto\n");
            let _ = writeln!(out, "{}", length);
        }
        KpointsMode::Grid {
            centering,
            subdivisions,
            shift,
        } => {
            out.push_str(match centering {
                GridCentering::Gamma => "Gamma\n",
                GridCentering::Monkhorst => "Monkhorst\n",
            });
            let _ = writeln!(
                out,
                "{} {} {}",
                subdivisions[0], subdivisions[1], subdivisions[2]
            );
            if shift.iter().any(|s| *s != 0.0) {
                let _ = writeln!(out, "{} {} {}", shift[0], shift[1], shift[2]);
            }
        }
        KpointsMode::Basis {
            coordinates,
            vectors,
            shift,
        } => {
            let _ = writeln!(out, "{}", coordinates);
            for v in vectors {
                let _ = writeln!(out, "{} {} {}", v[0], v[1], v[2]);
            }
            let _ = writeln!(out, "{} {} {}", shift[0], shift[1], shift[2]);
        }
        KpointsMode::LineMode {
            coordinates,
            points,
            labels,
            ..
        } => {
            out.push_str("Line_mode\n");
            let _ = writeln!(out, "{}", coordinates);
            for (i, (p, label)) in points.iter().zip(labels.iter()).enumerate() {
                let _ = write!(out, "{:.8} {:.8} {:.8}", p[0], p[1], p[2]);
                match label {
                    Some(l) => {
                        let _ = writeln!(out, " ! {}", l);
                    }
                    None => out.push('\n'),
                }
                if i % 2 == 1 && i + 1 < points.len() {
                    out.push('\n');
                }
            }
        }
        KpointsMode::Explicit {
            coordinates,
            points,
            tetrahedra,
        } => {
            let _ = writeln!(out, "{}", coordinates);
            for k in points {
                let _ = write!(
                    out,
                    "{:.8} {:.8} {:.8} {}",
                    k.coords[0], k.coords[1], k.coords[2], k.weight
                );
                match &k.label {
                    Some(l) => {
                        let _ = writeln!(out, " ! {}", l);
                    }
                    None => out.push('\n'),
                }
            }
            if let Some(tet) = tetrahedra {
                out.push_str("Tetrahedra\n");
                let _ = writeln!(out, "{} {}", tet.connections.len(), tet.volume_weight);
                for (deg, c) in &tet.connections {
                    let _ = writeln!(out, "{} {} {} {} {}", deg, c[0], c[1], c[2], c[3]);
                }
            }
        }
    }

    out
}

/// 写入 KPOINTS 文件
pub fn write_kpoints_file(kpoints: &Kpoints, path: &Path) -> Result<()> {
    fs::write(path, to_kpoints_string(kpoints)).map_err(|e| WmmError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
