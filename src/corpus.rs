//! Readers for the reference name corpora.
//!
//! Corpora are read once at startup and turned into the immutable lookup
//! tables used by the matcher and the name noisers. Supported formats:
//!
//! - given-name synonyms: tab-separated, `name<TAB>ignored<TAB>alt1,alt2,...`
//! - nicknames: comma-separated, `canonical,nick1,nick2,...`
//! - surnames: CSV with a header row containing a `name` column
//! - first names: one name per line
//!
//! Blank lines and lines starting with `#` are skipped everywhere.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::CorpusError;
use crate::names::{NameVariantMap, NicknameTable};

fn content_lines<R: BufRead>(reader: R) -> impl Iterator<Item = Result<(usize, String), CorpusError>> {
    reader
        .lines()
        .enumerate()
        .map(|(idx, line)| line.map(|l| (idx + 1, l)).map_err(CorpusError::from))
        .filter(|res| match res {
            Ok((_, line)) => {
                let trimmed = line.trim();
                !trimmed.is_empty() && !trimmed.starts_with('#')
            }
            Err(_) => true,
        })
}

fn open(path: &Path) -> Result<BufReader<File>, CorpusError> {
    Ok(BufReader::new(File::open(path)?))
}

/// Reads a given-name synonym table into a symmetric [`NameVariantMap`].
///
/// # Errors
///
/// Returns `CorpusError::Malformed` when a line has fewer than three
/// tab-separated columns, or `CorpusError::Io` on read failure.
pub fn read_given_name_synonyms<R: BufRead>(reader: R) -> Result<NameVariantMap, CorpusError> {
    let mut map = NameVariantMap::new();
    for entry in content_lines(reader) {
        let (line_no, line) = entry?;
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < 3 {
            return Err(CorpusError::Malformed {
                line: line_no,
                reason: format!("expected 3 tab-separated columns, found {}", columns.len()),
            });
        }
        map.add_row(columns[0], columns[2].split(','));
    }
    log::debug!("loaded {} given names with variants", map.len());
    Ok(map)
}

/// Reads a nickname table.
///
/// # Errors
///
/// Returns `CorpusError::Io` on read failure.
pub fn read_nicknames<R: BufRead>(reader: R) -> Result<NicknameTable, CorpusError> {
    let mut table = NicknameTable::new();
    for entry in content_lines(reader) {
        let (_, line) = entry?;
        let mut fields = line.split(',');
        if let Some(canonical) = fields.next() {
            table.add(canonical, fields);
        }
    }
    log::debug!("loaded nicknames for {} canonical names", table.len());
    Ok(table)
}

/// Reads the `name` column of a surname CSV.
///
/// # Errors
///
/// Returns `CorpusError::MissingColumn` if the header has no `name` column,
/// `CorpusError::Malformed` for short rows, or `CorpusError::Io`.
pub fn read_surnames<R: BufRead>(reader: R) -> Result<Vec<String>, CorpusError> {
    let mut lines = content_lines(reader);
    let Some(header) = lines.next() else {
        return Ok(Vec::new());
    };
    let (_, header) = header?;
    let column = header
        .split(',')
        .position(|h| h.trim().eq_ignore_ascii_case("name"))
        .ok_or_else(|| CorpusError::MissingColumn {
            column: "name".to_string(),
        })?;

    let mut names = Vec::new();
    for entry in lines {
        let (line_no, line) = entry?;
        let value = line.split(',').nth(column).ok_or_else(|| CorpusError::Malformed {
            line: line_no,
            reason: format!("row has no column {column}"),
        })?;
        let value = value.trim();
        if !value.is_empty() {
            names.push(value.to_lowercase());
        }
    }
    log::debug!("loaded {} surnames", names.len());
    Ok(names)
}

/// Reads a plain list of names, one per line.
///
/// # Errors
///
/// Returns `CorpusError::Io` on read failure.
pub fn read_name_list<R: BufRead>(reader: R) -> Result<Vec<String>, CorpusError> {
    content_lines(reader)
        .map(|entry| entry.map(|(_, line)| line.trim().to_lowercase()))
        .collect()
}

/// [`read_given_name_synonyms`] from a file.
///
/// # Errors
///
/// See [`read_given_name_synonyms`].
pub fn load_given_name_synonyms(path: impl AsRef<Path>) -> Result<NameVariantMap, CorpusError> {
    read_given_name_synonyms(open(path.as_ref())?)
}

/// [`read_nicknames`] from a file.
///
/// # Errors
///
/// See [`read_nicknames`].
pub fn load_nicknames(path: impl AsRef<Path>) -> Result<NicknameTable, CorpusError> {
    read_nicknames(open(path.as_ref())?)
}

/// [`read_surnames`] from a file.
///
/// # Errors
///
/// See [`read_surnames`].
pub fn load_surnames(path: impl AsRef<Path>) -> Result<Vec<String>, CorpusError> {
    read_surnames(open(path.as_ref())?)
}

/// [`read_name_list`] from a file.
///
/// # Errors
///
/// See [`read_name_list`].
pub fn load_name_list(path: impl AsRef<Path>) -> Result<Vec<String>, CorpusError> {
    read_name_list(open(path.as_ref())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    #[test]
    fn test_read_given_name_synonyms() {
        let data = "# name\tfreq\talternates\ncatherine\tF\tkatherine, kathryn\nanna\tF\t\n";
        let map = read_given_name_synonyms(Cursor::new(data)).unwrap();
        assert!(map.get("kathryn").unwrap().contains("catherine"));
        assert!(map.get("anna").is_none());
    }

    #[test]
    fn test_read_given_name_synonyms_malformed() {
        let err = read_given_name_synonyms(Cursor::new("catherine\tkatherine\n")).unwrap_err();
        let CorpusError::Malformed { line, .. } = err else {
            panic!("expected malformed error, got {err:?}");
        };
        assert_eq!(line, 1);
    }

    #[test]
    fn test_read_nicknames() {
        let table = read_nicknames(Cursor::new("robert,bob,rob\n\nwilliam,bill\n")).unwrap();
        assert!(table.nicknames_of("robert").unwrap().contains("bob"));
        assert!(table.canonicals_of("bill").unwrap().contains("william"));
    }

    #[test]
    fn test_read_surnames() {
        let data = "rank,name,count\n1,SMITH,2442977\n2,Johnson,1932812\n";
        let names = read_surnames(Cursor::new(data)).unwrap();
        assert_eq!(names, vec!["smith", "johnson"]);
    }

    #[test]
    fn test_read_surnames_missing_column() {
        let err = read_surnames(Cursor::new("rank,surname\n1,smith\n")).unwrap_err();
        assert!(matches!(err, CorpusError::MissingColumn { .. }));
    }

    #[test]
    fn test_read_surnames_short_row() {
        let err = read_surnames(Cursor::new("rank,name\n1\n")).unwrap_err();
        assert!(matches!(err, CorpusError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_load_files() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("first.txt");
        std::fs::write(&list, "Mary\nJohn\n").unwrap();
        assert_eq!(load_name_list(&list).unwrap(), vec!["mary", "john"]);

        let missing = dir.path().join("absent.csv");
        assert!(matches!(load_surnames(&missing), Err(CorpusError::Io(_))));
    }
}
