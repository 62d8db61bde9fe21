//! Filesystem-safe names and collision registries.
//!
//! Registries are plain values owned by a single run (filenames) or a single
//! output workbook (sheet names); nothing here is process-global.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

/// Longest file name kept after sanitizing.
pub const MAX_FILENAME_CHARS: usize = 255;

/// Excel's limit on sheet-name length.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

/// Spreadsheet file extension written and read by hivesheet.
pub const XLSX_EXTENSION: &str = "xlsx";

#[allow(clippy::expect_used)] // literal pattern
fn illegal_filename_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("Invalid filename pattern"))
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Removes `<>:"/\|?*` and truncates to 255 characters.
///
/// # Example
/// ```rust
/// use hivesheet_core::sheet::naming::sanitize_filename;
///
/// assert_eq!(sanitize_filename(r#"a<b>:c"/d\e|f?g*"#), "abcdefg");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = illegal_filename_chars().replace_all(name, "");
    truncate_chars(&cleaned, MAX_FILENAME_CHARS)
}

/// Removes characters Excel forbids in sheet names and truncates to 31 characters.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect();
    let truncated = truncate_chars(cleaned.trim_start_matches('\''), MAX_SHEET_NAME_CHARS);
    truncated.trim_end_matches('\'').to_string()
}

/// Issues unique `.xlsx` file names within one exporter run.
///
/// The first use of a base name yields `base.xlsx`; the n-th yields
/// `base_n.xlsx` starting at 2. A name is never issued twice, even when a
/// later base collides with an earlier suffixed name.
#[derive(Debug, Default)]
pub struct FilenameRegistry {
    counts: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl FilenameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused file name for `base`.
    pub fn unique(&mut self, base: &str) -> String {
        let count = self.counts.entry(base.to_string()).or_insert(0);
        let candidate = loop {
            *count = count.saturating_add(1);
            let candidate = if *count == 1 {
                format!("{base}.{XLSX_EXTENSION}")
            } else {
                format!("{base}_{count}.{XLSX_EXTENSION}")
            };
            if !self.issued.contains(&candidate) {
                break candidate;
            }
        };
        if *count > 1 {
            warn!("File name '{}' already used in this run, writing '{}'", base, candidate);
        }
        self.issued.insert(candidate.clone());
        candidate
    }

    /// Number of names issued so far.
    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}

/// Tracks sheet names already used in one output workbook.
///
/// Comparison is case-insensitive, as it is in Excel.
#[derive(Debug, Default)]
pub struct SheetNameRegistry {
    used: HashSet<String>,
    order: Vec<String>,
}

impl SheetNameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.to_lowercase()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(&Self::key(name))
    }

    /// Returns a name that is not yet registered, without registering it.
    ///
    /// The base itself if free, otherwise the first free `base_1`, `base_2`, ...
    /// The base is cut short when needed so the suffixed name fits Excel's
    /// 31-character limit.
    pub fn unique(&self, base: &str) -> String {
        let base = sanitize_sheet_name(base);
        if !base.is_empty() && !self.contains(&base) {
            return base;
        }

        let mut counter: usize = 1;
        loop {
            let suffix = format!("_{counter}");
            let room = MAX_SHEET_NAME_CHARS.saturating_sub(suffix.chars().count());
            let stem = truncate_chars(&base, room);
            let candidate = format!("{}{suffix}", stem.trim_end_matches('\''));
            if !self.contains(&candidate) {
                return candidate;
            }
            counter = counter.saturating_add(1);
        }
    }

    /// Records `name` as used.
    pub fn register(&mut self, name: &str) {
        if self.used.insert(Self::key(name)) {
            self.order.push(name.to_string());
        }
    }

    /// Registered names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Picks a merger output path from a group prefix that does not exist yet.
///
/// Tries `<prefix>.xlsx`, then `<prefix>_1.xlsx`, `<prefix>_2.xlsx`, ...
/// An empty sanitized prefix falls back to `fallback`.
pub fn unique_output_path(dir: &Path, prefix: &str, fallback: &str) -> PathBuf {
    let sanitized = sanitize_filename(prefix);
    let stem = if sanitized.is_empty() {
        fallback.to_string()
    } else {
        sanitized
    };

    let first = dir.join(format!("{stem}.{XLSX_EXTENSION}"));
    if !first.exists() {
        return first;
    }

    let mut counter: usize = 1;
    loop {
        let candidate = dir.join(format!("{stem}_{counter}.{XLSX_EXTENSION}"));
        if !candidate.exists() {
            warn!(
                "Output file '{}' already exists, writing '{}'",
                first.display(),
                candidate.display()
            );
            return candidate;
        }
        counter = counter.saturating_add(1);
    }
}
