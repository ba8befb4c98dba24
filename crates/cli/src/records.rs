//! Line-oriented record files: one cell per line, empty line = absent cell.

use std::ffi::OsString;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::CliError;

pub fn parse_records(reader: impl BufRead) -> io::Result<Vec<Option<String>>> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        records.push(if line.is_empty() { None } else { Some(line.to_string()) });
    }
    Ok(records)
}

/// Read records from `path`, or stdin when `path` is `-`.
pub fn read_records(path: &Path) -> Result<Vec<Option<String>>, CliError> {
    if path == Path::new("-") {
        return parse_records(io::stdin().lock())
            .map_err(|e| CliError::io(format!("cannot read stdin: {e}")));
    }
    let file = fs::File::open(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
    parse_records(io::BufReader::new(file))
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))
}

pub fn format_records(records: &[Option<String>]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(record.as_deref().unwrap_or(""));
        out.push('\n');
    }
    out
}

/// Write records to `path` (atomic: write `<name>.tmp` then rename), or stdout.
pub fn write_records(path: Option<&Path>, records: &[Option<String>]) -> Result<(), CliError> {
    let text = format_records(records);
    let Some(path) = path else {
        return io::stdout()
            .lock()
            .write_all(text.as_bytes())
            .map_err(|e| CliError::io(format!("cannot write stdout: {e}")));
    };

    let tmp_path = tmp_sibling(path);
    let written = fs::write(&tmp_path, text).map_err(|e| {
        CliError::io(format!("failed to write {}: {e}", tmp_path.display()))
    });
    let result = written.and_then(|()| {
        fs::rename(&tmp_path, path)
            .map_err(|e| CliError::io(format!("failed to rename tmp to output: {e}")))
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// `path` with `.tmp` appended to the whole file name.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_absent_cells() {
        let input = "原味牛角包\n\n  \r\nlast";
        let records = parse_records(input.as_bytes()).unwrap();
        assert_eq!(
            records,
            vec![
                Some("原味牛角包".to_string()),
                None,
                Some("  ".to_string()),
                Some("last".to_string()),
            ]
        );
    }

    #[test]
    fn format_keeps_row_positions() {
        let records = vec![Some("A".to_string()), None, Some("B".to_string())];
        assert_eq!(format_records(&records), "A\n\nB\n");
    }

    #[test]
    fn write_replaces_target_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        fs::write(&out, "old\n").unwrap();
        write_records(Some(&out), &[Some("new".to_string())]).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "new\n");
        assert!(!dir.path().join("out.txt.tmp").exists());
    }

    #[test]
    fn write_leaves_same_stem_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.csv");
        let neighbour = dir.path().join("report.tmp");
        fs::write(&neighbour, "keep me\n").unwrap();

        write_records(Some(&out), &[Some("A".to_string())]).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "A\n");
        assert_eq!(fs::read_to_string(&neighbour).unwrap(), "keep me\n");
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let out = dir.path().join("out.txt");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("inner"), "x").unwrap();

        let err = write_records(Some(&out), &[Some("A".to_string())]).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_IO);
        assert!(!dir.path().join("out.txt.tmp").exists());
        assert!(out.join("inner").exists());
    }
}
