//! # VASP POSCAR 格式读写
//!
//! 服务器要求的结构文件格式。写出时统一使用 VASP 5 布局和分数坐标，
//! 读入时兼容 VASP 4（无元素行）、缩放因子和 Selective dynamics。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `wmm/client.rs` 和 `commands/fetch.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, WmmError};
use crate::models::{Atom, Crystal, Lattice};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const FORMAT: &str = "poscar";

/// 解析 POSCAR/CONTCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<Crystal> {
    if !path.exists() {
        return Err(WmmError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| WmmError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_poscar_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
}

/// 从字符串内容解析 POSCAR 格式
pub fn parse_poscar_content(content: &str, default_name: &str) -> Result<Crystal> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 7 {
        return Err(WmmError::parse(FORMAT, default_name, "File too short"));
    }

    let name = match lines[0].trim() {
        "" => default_name.to_string(),
        s => s.to_string(),
    };

    // 负缩放因子表示目标体积
    let scale_factor: f64 = lines[1]
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| WmmError::parse(FORMAT, &name, "Invalid scaling factor at line 2"))?;

    let mut matrix = [[0.0; 3]; 3];
    for (i, row) in matrix.iter_mut().enumerate() {
        let parts = parse_floats(lines[2 + i], 3).ok_or_else(|| {
            WmmError::parse(FORMAT, &name, format!("Invalid lattice vector at line {}", 3 + i))
        })?;
        row.copy_from_slice(&parts);
    }

    let scale = if scale_factor < 0.0 {
        let raw_volume = Lattice::from_vectors(matrix).volume().abs();
        if raw_volume < 1e-10 {
            return Err(WmmError::parse(FORMAT, &name, "Degenerate lattice"));
        }
        (scale_factor.abs() / raw_volume).cbrt()
    } else {
        scale_factor
    };
    for row in matrix.iter_mut() {
        for x in row.iter_mut() {
            *x *= scale;
        }
    }
    let lattice = Lattice::from_vectors(matrix);

    // Line 5: 元素符号 (VASP 5+) 或原子数 (VASP 4)
    let line5: Vec<&str> = lines[5].split_whitespace().collect();
    if line5.is_empty() {
        return Err(WmmError::parse(FORMAT, &name, "Missing species line"));
    }
    let (elements, count_line, mut cursor) = if line5[0].parse::<usize>().is_ok() {
        let elements: Vec<String> = (0..line5.len()).map(|i| format!("X{}", i + 1)).collect();
        (elements, lines[5], 6)
    } else {
        let elements: Vec<String> = line5.iter().map(|s| s.to_string()).collect();
        (elements, lines[6], 7)
    };

    let counts: Vec<usize> = count_line
        .split_whitespace()
        .map(|s| s.parse())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| WmmError::parse(FORMAT, &name, "Invalid atom counts"))?;
    if counts.len() != elements.len() {
        return Err(WmmError::parse(
            FORMAT,
            &name,
            format!(
                "{} species but {} atom counts",
                elements.len(),
                counts.len()
            ),
        ));
    }

    if lines
        .get(cursor)
        .is_some_and(|l| l.trim().to_lowercase().starts_with('s'))
    {
        cursor += 1;
    }

    let coord_type = lines
        .get(cursor)
        .map(|l| l.trim().to_lowercase())
        .ok_or_else(|| WmmError::parse(FORMAT, &name, "Missing coordinate type line"))?;
    let is_cartesian = coord_type.starts_with('c') || coord_type.starts_with('k');
    cursor += 1;

    let remaining = lines.len().saturating_sub(cursor);
    let total = counts
        .iter()
        .try_fold(0usize, |acc, &n| acc.checked_add(n))
        .filter(|&n| n <= remaining)
        .ok_or_else(|| {
            WmmError::parse(
                FORMAT,
                &name,
                format!("Atom counts exceed the {} remaining lines", remaining),
            )
        })?;
    let mut atoms: Vec<Atom> = Vec::with_capacity(total);
    for (elem, &count) in elements.iter().zip(counts.iter()) {
        for _ in 0..count {
            let line = lines.get(cursor).ok_or_else(|| {
                WmmError::parse(
                    FORMAT,
                    &name,
                    format!("Expected {} positions, found {}", total, atoms.len()),
                )
            })?;
            let parts = parse_floats(line, 3).ok_or_else(|| {
                WmmError::parse(FORMAT, &name, format!("Invalid position at line {}", cursor + 1))
            })?;
            let xyz = [parts[0], parts[1], parts[2]];
            let position = if is_cartesian {
                cart_to_frac([xyz[0] * scale, xyz[1] * scale, xyz[2] * scale], &lattice)
            } else {
                xyz
            };
            atoms.push(Atom::new(elem.clone(), position));
            cursor += 1;
        }
    }

    Ok(Crystal::new(name, lattice, atoms))
}

/// 取一行中前 n 个浮点数
fn parse_floats(line: &str, n: usize) -> Option<Vec<f64>> {
    let parts: Vec<f64> = line
        .split_whitespace()
        .take(n)
        .map(|s| s.parse().ok())
        .collect::<Option<_>>()?;
    (parts.len() == n).then_some(parts)
}

/// 笛卡尔坐标转分数坐标
fn cart_to_frac(cart: [f64; 3], lattice: &Lattice) -> [f64; 3] {
    // 行向量晶格：cart = frac · M，故 frac = cart · M⁻¹ = (rec · cart)
    match lattice.reciprocal() {
        Some(rec) => [
            rec[0][0] * cart[0] + rec[0][1] * cart[1] + rec[0][2] * cart[2],
            rec[1][0] * cart[0] + rec[1][1] * cart[1] + rec[1][2] * cart[2],
            rec[2][0] * cart[0] + rec[2][1] * cart[1] + rec[2][2] * cart[2],
        ],
        None => cart,
    }
}

/// 将 Crystal 转换为 POSCAR 格式字符串
///
/// 同种元素的原子按首次出现顺序合并到一起。空结构、非法元素符号或
/// 非有限数值会返回 `SerializationError`。
pub fn to_poscar_string(crystal: &Crystal) -> Result<String> {
    if crystal.atoms.is_empty() {
        return Err(WmmError::serialization(FORMAT, "structure has no atoms"));
    }
    if !crystal.lattice.is_finite() {
        return Err(WmmError::serialization(FORMAT, "lattice contains non-finite values"));
    }
    if crystal.lattice.volume().abs() < 1e-10 {
        return Err(WmmError::serialization(FORMAT, "lattice is degenerate"));
    }

    let species = crystal.species_counts();
    for (element, _) in &species {
        if element.is_empty() || element.chars().any(|c| c.is_whitespace()) {
            return Err(WmmError::serialization(
                FORMAT,
                format!("invalid element symbol '{}'", element),
            ));
        }
    }

    // 注释行不能为空，也不能跨行
    let comment = match crystal.name.lines().next().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => crystal.formula(),
    };

    let mut result = String::new();
    let _ = writeln!(result, "{}", comment);
    result.push_str("1.0\n");

    for row in &crystal.lattice.matrix {
        let _ = writeln!(result, "  {:16.10}  {:16.10}  {:16.10}", row[0], row[1], row[2]);
    }

    let symbols: Vec<&str> = species.iter().map(|(e, _)| e.as_str()).collect();
    let counts: Vec<String> = species.iter().map(|(_, n)| n.to_string()).collect();
    let _ = writeln!(result, "   {}", symbols.join("   "));
    let _ = writeln!(result, "   {}", counts.join("   "));
    result.push_str("Direct\n");

    for (element, _) in &species {
        for atom in crystal.atoms.iter().filter(|a| &a.element == element) {
            let pos = atom.position;
            if pos.iter().any(|x| !x.is_finite()) {
                return Err(WmmError::serialization(
                    FORMAT,
                    format!("non-finite position for {}", element),
                ));
            }
            let _ = writeln!(
                result,
                "  {:16.10}  {:16.10}  {:16.10} {}",
                pos[0], pos[1], pos[2], element
            );
        }
    }

    Ok(result)
}

/// 将 Crystal 写入 POSCAR 文件
pub fn write_poscar_file(crystal: &Crystal, path: &Path) -> Result<()> {
    let content = to_poscar_string(crystal)?;
    fs::write(path, content).map_err(|e| WmmError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poscar_vasp5() {
        let content = r#"NaCl
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
Na Cl
4 4
Direct
0.0 0.0 0.0
0.5 0.5 0.0
0.5 0.0 0.5
0.0 0.5 0.5
0.5 0.0 0.0
0.0 0.5 0.0
0.0 0.0 0.5
0.5 0.5 0.5
"#;
        let crystal = parse_poscar_content(content, "NaCl").unwrap();
        assert_eq!(crystal.name, "NaCl");
        assert_eq!(crystal.atoms.len(), 8);

        let na_count = crystal.atoms.iter().filter(|a| a.element == "Na").count();
        let cl_count = crystal.atoms.iter().filter(|a| a.element == "Cl").count();
        assert_eq!(na_count, 4);
        assert_eq!(cl_count, 4);
    }

    #[test]
    fn test_parse_poscar_with_scale() {
        let content = r#"Si
2.0
2.0 0.0 0.0
0.0 2.0 0.0
0.0 0.0 2.0
Si
2
Direct
0.0 0.0 0.0
0.5 0.5 0.5
"#;
        let crystal = parse_poscar_content(content, "Si").unwrap();
        let (a, _, _, _, _, _) = crystal.lattice.parameters();

        // 2.0 * 2.0 = 4.0
        assert!((a - 4.0).abs() < 0.01);
    }

    #[test]
    fn test_parse_poscar_negative_scale_is_volume() {
        let content = "cube\n-64.0\n1 0 0\n0 1 0\n0 0 1\nFe\n1\nDirect\n0 0 0\n";
        let crystal = parse_poscar_content(content, "cube").unwrap();
        assert!((crystal.lattice.volume() - 64.0).abs() < 1e-8);
    }

    #[test]
    fn test_parse_poscar_cartesian() {
        let content = "Fe\n1.0\n2.0 0 0\n0 2.0 0\n0 0 2.0\nFe\n2\nCartesian\n0 0 0\n1.0 1.0 1.0\n";
        let crystal = parse_poscar_content(content, "Fe").unwrap();
        let pos = crystal.atoms[1].position;
        assert!(pos.iter().all(|x| (x - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_parse_poscar_selective_dynamics() {
        let content = r#"Fe with selective
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe
2
Selective dynamics
Direct
0.0 0.0 0.0 T T T
0.5 0.5 0.5 F F F
"#;
        let crystal = parse_poscar_content(content, "Fe").unwrap();
        assert_eq!(crystal.atoms.len(), 2);
    }

    #[test]
    fn test_parse_poscar_truncated_positions() {
        let content = "Fe\n1.0\n2 0 0\n0 2 0\n0 0 2\nFe\n3\nDirect\n0 0 0\n0.5 0.5 0.5\n";
        let err = parse_poscar_content(content, "Fe").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_parse_poscar_oversized_counts() {
        let content = format!(
            "Si\n1.0\n5.43 0 0\n0 5.43 0\n0 0 5.43\nSi Ge\n{} {}\nDirect\n0 0 0\n",
            usize::MAX,
            usize::MAX
        );
        let err = parse_poscar_content(&content, "POSCAR").unwrap_err();
        assert!(err.is_parse());

        let content =
            "Si\n1.0\n5.43 0 0\n0 5.43 0\n0 0 5.43\nSi\n1000000000000\nDirect\n0 0 0\n";
        assert!(parse_poscar_content(content, "POSCAR").unwrap_err().is_parse());
    }

    #[test]
    fn test_poscar_round_trip() {
        let lattice = Lattice::from_vectors([[4.59, 0.0, 0.0], [0.0, 4.59, 0.0], [0.0, 0.0, 2.96]]);
        let atoms = vec![
            Atom::new("Ti", [0.0, 0.0, 0.0]),
            Atom::new("O", [0.3053, 0.3053, 0.0]),
            Atom::new("Ti", [0.5, 0.5, 0.5]),
            Atom::new("O", [0.6947, 0.6947, 0.0]),
        ];
        let crystal = Crystal::new("TiO2 rutile", lattice.clone(), atoms);

        let poscar_str = to_poscar_string(&crystal).unwrap();
        let parsed = parse_poscar_content(&poscar_str, "round_trip").unwrap();

        assert_eq!(parsed.name, "TiO2 rutile");
        for (row, expected) in parsed.lattice.matrix.iter().zip(lattice.matrix.iter()) {
            for (x, y) in row.iter().zip(expected.iter()) {
                assert!((x - y).abs() < 1e-8);
            }
        }

        // 写出时按物种分组：Ti Ti O O
        let elements: Vec<&str> = parsed.atoms.iter().map(|a| a.element.as_str()).collect();
        assert_eq!(elements, vec!["Ti", "Ti", "O", "O"]);
        for atom in &crystal.atoms {
            assert!(parsed.atoms.iter().any(|p| p.element == atom.element
                && p.position
                    .iter()
                    .zip(atom.position.iter())
                    .all(|(a, b)| (a - b).abs() < 1e-8)));
        }
    }

    #[test]
    fn test_to_poscar_rejects_empty_structure() {
        let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
        let crystal = Crystal::new("empty", lattice, vec![]);
        assert!(to_poscar_string(&crystal).unwrap_err().is_serialization());
    }

    #[test]
    fn test_to_poscar_rejects_bad_symbol() {
        let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
        let crystal = Crystal::new("bad", lattice, vec![Atom::new("N a", [0.0; 3])]);
        assert!(to_poscar_string(&crystal).unwrap_err().is_serialization());
    }
}
