use crate::format::format_solve;
use crate::solve::{Penalty, PuzzleType, SessionId, Solve, SolveId};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: SolveId,
    session_id: SessionId,
    puzzle_type: PuzzleType,
    time_ms: u64,
    penalty: Option<Penalty>,
    effective_ms: Option<f64>,
    formatted: String,
    scramble: &'a str,
    timestamp: String,
}

impl<'a> From<&'a Solve> for ExportRow<'a> {
    fn from(solve: &'a Solve) -> Self {
        Self {
            id: solve.id,
            session_id: solve.session_id,
            puzzle_type: solve.puzzle_type,
            time_ms: solve.time_ms,
            penalty: solve.penalty,
            effective_ms: solve.effective_time(),
            formatted: format_solve(solve),
            scramble: &solve.scramble,
            timestamp: solve.timestamp.to_rfc3339(),
        }
    }
}

/// Writes `solves` as CSV with a header row. Returns the number of rows written.
pub fn export_csv<W: Write>(writer: W, solves: &[Solve]) -> Result<usize, csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for solve in solves {
        wtr.serialize(ExportRow::from(solve))?;
    }
    wtr.flush()?;
    Ok(solves.len())
}

pub fn export_csv_file<P: AsRef<Path>>(path: P, solves: &[Solve]) -> Result<usize, csv::Error> {
    let file = std::fs::File::create(path)?;
    export_csv(file, solves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::solve_fixture;
    use tempfile::tempdir;

    #[test]
    fn test_header_and_rows() {
        let solves = vec![
            solve_fixture(1, 10_000, None),
            solve_fixture(2, 10_000, Some(Penalty::PlusTwo)),
            solve_fixture(3, 10_000, Some(Penalty::Dnf)),
        ];
        let mut buf = Vec::new();
        assert_eq!(export_csv(&mut buf, &solves).unwrap(), 3);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "id,session_id,puzzle_type,time_ms,penalty,effective_ms,formatted,scramble,timestamp"
        );
        assert!(lines[1].starts_with("1,1,3x3,10000,,10000.0,10.00,R U R' U',"));
        assert!(lines[2].starts_with("2,1,3x3,10000,+2,12000.0,12.00+,"));
        assert!(lines[3].starts_with("3,1,3x3,10000,DNF,,DNF,"));
    }

    #[test]
    fn test_effective_time_matches_stats() {
        let solves = vec![solve_fixture(1, 12_345, Some(Penalty::PlusTwo))];
        let mut buf = Vec::new();
        export_csv(&mut buf, &solves).unwrap();

        let mut rdr = csv::Reader::from_reader(buf.as_slice());
        let record = rdr.records().next().unwrap().unwrap();
        let exported: f64 = record[5].parse().unwrap();
        assert_eq!(Some(exported), crate::stats::valid_times(&solves).first().copied());
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solves.csv");
        export_csv_file(&path, &[solve_fixture(9, 7_000, None)]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
