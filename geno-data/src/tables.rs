//! Keyed sample tables
//!
//! Whitespace-delimited tables with a header line: keep lists (column
//! `s`), ancestry assignments (`s` + `ancestry`), and KING-style
//! kinship tables (`ID1` + `ID2` + `Kinship`, extra columns ignored).

use anyhow::{ensure, Context, Result};
use std::collections::HashMap;

use crate::common_io::read_lines;

/// One pairwise relatedness record.
#[derive(Debug, Clone, PartialEq)]
pub struct KinshipPair {
    pub id1: String,
    pub id2: String,
    pub kinship: f64,
}

/// Read a sample list: header must contain a column named `s`.
pub fn read_sample_list(path: &str) -> Result<Vec<String>> {
    let (header, rows) = read_table(path)?;
    let s = column_index(&header, "s", path)?;
    Ok(rows.into_iter().map(|mut row| row.swap_remove(s)).collect())
}

/// Read an ancestry table mapping sample ID (`s`) to ancestry label
/// (`ancestry`).
pub fn read_ancestry_table(path: &str) -> Result<HashMap<String, String>> {
    let (header, rows) = read_table(path)?;
    let s = column_index(&header, "s", path)?;
    let a = column_index(&header, "ancestry", path)?;

    Ok(rows
        .into_iter()
        .map(|row| (row[s].clone(), row[a].clone()))
        .collect())
}

/// Read a KING-style kinship table (`ID1 ID2 ... Kinship`).
pub fn read_kinship_table(path: &str) -> Result<Vec<KinshipPair>> {
    let (header, rows) = read_table(path)?;
    let id1 = column_index(&header, "ID1", path)?;
    let id2 = column_index(&header, "ID2", path)?;
    let kin = column_index(&header, "Kinship", path)?;

    rows.into_iter()
        .enumerate()
        .map(|(line_no, row)| {
            let kinship = row[kin].parse::<f64>().with_context(|| {
                format!("{}:{}: invalid Kinship '{}'", path, line_no + 2, row[kin])
            })?;
            Ok(KinshipPair {
                id1: row[id1].clone(),
                id2: row[id2].clone(),
                kinship,
            })
        })
        .collect()
}

/// Read a whitespace-delimited table with a header line, checking that
/// every row has as many fields as the header.
fn read_table(path: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let lines = read_lines(path)?;
    ensure!(!lines.is_empty(), "{}: empty table", path);

    let header: Vec<String> = lines[0].split_whitespace().map(String::from).collect();

    let mut rows = Vec::with_capacity(lines.len() - 1);
    for (line_no, line) in lines[1..].iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let row: Vec<String> = line.split_whitespace().map(String::from).collect();
        ensure!(
            row.len() == header.len(),
            "{}:{}: expected {} fields, got {}",
            path,
            line_no + 2,
            header.len(),
            row.len()
        );
        rows.push(row);
    }
    Ok((header, rows))
}

fn column_index(header: &[String], name: &str, path: &str) -> Result<usize> {
    header
        .iter()
        .position(|h| h == name)
        .with_context(|| format!("{}: no '{}' column in header", path, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common_io::write_lines;

    #[test]
    fn sample_list_finds_s_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.tsv");
        let path = path.to_str().unwrap();

        write_lines(&["pop s", "eur id_a", "afr id_b"], path).unwrap();

        let ids = read_sample_list(path).unwrap();
        assert_eq!(ids, vec!["id_a", "id_b"]);
    }

    #[test]
    fn sample_list_without_s_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.tsv");
        let path = path.to_str().unwrap();

        write_lines(&["sample", "id_a"], path).unwrap();
        assert!(read_sample_list(path).is_err());
    }

    #[test]
    fn ancestry_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anc.tsv");
        let path = path.to_str().unwrap();

        write_lines(&["s ancestry", "id_a eur", "id_b afr"], path).unwrap();

        let table = read_ancestry_table(path).unwrap();
        assert_eq!(table["id_a"], "eur");
        assert_eq!(table["id_b"], "afr");
    }

    #[test]
    fn kinship_table_ignores_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kin.dat");
        let path = path.to_str().unwrap();

        write_lines(
            &[
                "ID1 ID2 HetHet IBS0 Kinship",
                "id_a id_b 0.1 0.002 0.25",
                "id_a id_c 0.05 0.01 0.01",
            ],
            path,
        )
        .unwrap();

        let pairs = read_kinship_table(path).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].id1, "id_a");
        assert_eq!(pairs[0].id2, "id_b");
        assert!((pairs[0].kinship - 0.25).abs() < 1e-12);
    }

    #[test]
    fn ragged_row_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tsv");
        let path = path.to_str().unwrap();

        write_lines(&["s ancestry", "id_a"], path).unwrap();
        assert!(read_ancestry_table(path).is_err());
    }
}
