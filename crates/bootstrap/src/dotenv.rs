//! `.env` loading.
//!
//! Each `KEY=VALUE` line of the file is exported into the process
//! environment before profiles are declared, overriding values already set.
//! Values are taken verbatim: no quote stripping, no `$VAR` expansion.
//! Lines that do not hold exactly one `=` or that fail to parse are skipped
//! silently; only their count is reported. Blank lines and `#` comments are
//! ignored without being counted.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use common::AppResult;

/// Outcome of reading or loading a dotenv file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotenvReport {
    pub path: PathBuf,
    /// Accepted entries, in file order
    pub entries: Vec<(String, String)>,
    /// Number of malformed lines that were ignored
    pub skipped: usize,
}

impl DotenvReport {
    /// Keys of the accepted entries.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// Classification of one raw line.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Ignored,
    Entry(String, String),
    Malformed,
}

/// Parse a dotenv file without touching the environment.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn read(path: impl AsRef<Path>) -> AppResult<Option<DotenvReport>> {
    let path = path.as_ref();

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    let mut skipped = 0;

    for (index, raw) in content.lines().enumerate() {
        match parse_line(raw) {
            Line::Entry(key, value) => entries.push((key, value)),
            Line::Malformed => {
                tracing::trace!(line = index + 1, "Skipping malformed dotenv line");
                skipped += 1;
            }
            Line::Ignored => {}
        }
    }

    Ok(Some(DotenvReport {
        path: path.to_path_buf(),
        entries,
        skipped,
    }))
}

/// dotenvy only validates the line and normalizes the key (`export KEY`);
/// the value is the raw text after the `=`.
fn parse_line(raw: &str) -> Line {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return Line::Ignored;
    }

    let mut parts = line.split('=');
    let value = match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(value), None) => value,
        _ => return Line::Malformed,
    };

    match dotenvy::from_read_iter(line.as_bytes()).next() {
        Some(Ok((key, _))) => Line::Entry(key, value.to_string()),
        _ => Line::Malformed,
    }
}

/// Load a dotenv file into the process environment.
///
/// Existing variables are overwritten, so loading the same file twice leaves
/// the environment unchanged after the first load.
pub fn load(path: impl AsRef<Path>) -> AppResult<Option<DotenvReport>> {
    let report = read(path)?;

    if let Some(report) = &report {
        for (key, value) in &report.entries {
            std::env::set_var(key, value);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::BTreeMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_env(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read(dir.path().join(".env")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let file = write_env(
            "MAIL_USERNAME=alice\n\
             NOT_A_PAIR\n\
             A=b=c\n\
             SOCONN_ADMIN=admin@example.com\n",
        );

        let report = read(file.path()).unwrap().unwrap();
        assert_eq!(
            report.entries,
            vec![
                ("MAIL_USERNAME".to_string(), "alice".to_string()),
                ("SOCONN_ADMIN".to_string(), "admin@example.com".to_string()),
            ]
        );
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_values_are_taken_verbatim() {
        let file = write_env(
            "# MAIL_SERVER=smtp.example.com\n\
             \n\
             MAIL_PASSWORD=pa$word\n\
             SECRET_KEY=abc${HOME}x\n\
             MAIL_USERNAME=\"soconn bot\"\n\
             export DEV_DB_URL=sqlite://data-dev.sqlite\n\
             NOT_A_PAIR\n\
             SOCONN_ADMIN=a@b.c\n",
        );

        let report = read(file.path()).unwrap().unwrap();
        assert_eq!(
            report.entries,
            vec![
                ("MAIL_PASSWORD".to_string(), "pa$word".to_string()),
                ("SECRET_KEY".to_string(), "abc${HOME}x".to_string()),
                ("MAIL_USERNAME".to_string(), "\"soconn bot\"".to_string()),
                ("DEV_DB_URL".to_string(), "sqlite://data-dev.sqlite".to_string()),
                ("SOCONN_ADMIN".to_string(), "a@b.c".to_string()),
            ]
        );
        // comments and blank lines are not malformed
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_invalid_key_is_skipped() {
        assert_eq!(parse_line("BAD KEY=x"), Line::Malformed);
        assert_eq!(parse_line("=x"), Line::Malformed);
        assert_eq!(parse_line("   # A=b"), Line::Ignored);
        assert_eq!(
            parse_line("  KEY=value  "),
            Line::Entry("KEY".to_string(), "value".to_string())
        );
    }

    #[test]
    #[serial]
    fn test_load_exports_and_overrides() {
        std::env::set_var("SOCONN_DOTENV_TEST_A", "old");
        let file = write_env("SOCONN_DOTENV_TEST_A=new\nSOCONN_DOTENV_TEST_B=2\n");

        load(file.path()).unwrap();

        assert_eq!(std::env::var("SOCONN_DOTENV_TEST_A").unwrap(), "new");
        assert_eq!(std::env::var("SOCONN_DOTENV_TEST_B").unwrap(), "2");

        std::env::remove_var("SOCONN_DOTENV_TEST_A");
        std::env::remove_var("SOCONN_DOTENV_TEST_B");
    }

    #[test]
    #[serial]
    fn test_load_is_idempotent() {
        let file = write_env("SOCONN_DOTENV_TEST_C=x\nbroken line\nSOCONN_DOTENV_TEST_D=y\n");

        let first = load(file.path()).unwrap().unwrap();
        let after_first: BTreeMap<_, _> = std::env::vars()
            .filter(|(k, _)| k.starts_with("SOCONN_DOTENV_TEST_"))
            .collect();

        let second = load(file.path()).unwrap().unwrap();
        let after_second: BTreeMap<_, _> = std::env::vars()
            .filter(|(k, _)| k.starts_with("SOCONN_DOTENV_TEST_"))
            .collect();

        assert_eq!(first, second);
        assert_eq!(after_first, after_second);

        std::env::remove_var("SOCONN_DOTENV_TEST_C");
        std::env::remove_var("SOCONN_DOTENV_TEST_D");
    }
}
