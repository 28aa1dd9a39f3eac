#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tabular_profiler::data::{Row, Table};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub const PEOPLE_CSV: &str = "\
name,age,city,joined
Ada,36,London,2021-03-04
Bob,,Paris,2022-07-19
Cy,29,,2020-01-15
Ada,36,London,2021-03-04
Dee,41,Paris,2019-11-30
";

/// Builds a table of text cells from `(column, value)` pairs per row.
pub fn text_table(rows: &[&[(&str, &str)]]) -> Table {
    Table::new(
        rows.iter()
            .map(|fields| fields.iter().copied().collect::<Row>())
            .collect(),
    )
}
