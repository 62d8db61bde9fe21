//! Source workbook discovery and grouping by file-name prefix.

use crate::sheet::naming::XLSX_EXTENSION;
use crate::{HiveSheetError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Group for files whose name has no `_`.
pub const NO_PREFIX_GROUP: &str = "无前缀";

/// Prefix of the lock files Office leaves next to open workbooks.
const LOCK_FILE_PREFIX: &str = "~$";

#[allow(clippy::expect_used)] // literal pattern
fn group_prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^_]+_").expect("Invalid group prefix pattern"))
}

/// Lists the `.xlsx` file names directly inside `dir`, sorted by name.
///
/// Office lock files (`~$...`) and subdirectories are skipped.
///
/// # Errors
/// Returns an I/O error if the directory cannot be read.
pub fn list_workbooks(dir: &Path) -> Result<Vec<String>> {
    let context = || format!("listing {}", dir.display());
    let suffix = format!(".{XLSX_EXTENSION}");

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| HiveSheetError::io(context(), e))? {
        let entry = entry.map_err(|e| HiveSheetError::io(context(), e))?;
        if !entry.path().is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.ends_with(&suffix) && !name.starts_with(LOCK_FILE_PREFIX) {
            files.push(name);
        }
    }

    files.sort();
    Ok(files)
}

/// Group key of one file name: everything up to and including the first `_`.
///
/// ```rust
/// use hivesheet_core::merge::grouping::{NO_PREFIX_GROUP, group_key};
///
/// assert_eq!(group_key("sales_jan.xlsx"), "sales_");
/// assert_eq!(group_key("summary.xlsx"), NO_PREFIX_GROUP);
/// ```
pub fn group_key(file_name: &str) -> &str {
    group_prefix_pattern()
        .find(file_name)
        .map_or(NO_PREFIX_GROUP, |m| m.as_str())
}

/// Groups file names by [`group_key`], keeping listing order within a group.
pub fn group_files_by_prefix(files: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for file in files {
        groups
            .entry(group_key(file).to_string())
            .or_default()
            .push(file.clone());
    }
    groups
}

/// Selects the files starting with `prefix` as a single group.
///
/// Returns an empty map when nothing matches.
pub fn select_files_with_prefix(files: &[String], prefix: &str) -> BTreeMap<String, Vec<String>> {
    let selected: Vec<String> = files
        .iter()
        .filter(|f| f.starts_with(prefix))
        .cloned()
        .collect();

    let mut groups = BTreeMap::new();
    if !selected.is_empty() {
        groups.insert(prefix.to_string(), selected);
    }
    groups
}
