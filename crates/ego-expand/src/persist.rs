//! Run file encoding and materialization.
//!
//! A run file is CSV with a `user,following` header and one row per
//! adjacency record. `following` holds the id sequence as a list literal,
//! e.g. `[12,7,3]`; whitespace inside the list is tolerated on read.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ego_core::{AccountId, AdjacencyRecord};

use crate::store::{RunStore, StoreError};

pub const USER_COLUMN: &str = "user";
pub const FOLLOWING_COLUMN: &str = "following";

/// `<prefix>_<YYYY_MM_DD_HH_MM_SS>.csv`, sortable by run time.
pub fn run_file_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}_{}.csv", at.format("%Y_%m_%d_%H_%M_%S"))
}

/// Glob matching every run file written under `prefix`.
pub fn ledger_pattern(prefix: &str) -> String {
    format!("{prefix}*.csv")
}

/// Write the records as a new run file. Never overwrites.
///
/// All or nothing: if encoding or I/O fails partway the run file never
/// appears, so no record of a failed run enters the ledger.
pub fn materialize(
    store: &dyn RunStore,
    records: &[AdjacencyRecord],
    file_name: &str,
) -> Result<PathBuf, StoreError> {
    let mut writer = store.create(file_name)?;
    write_records(&mut writer, records)?;
    let path = writer.commit()?;

    tracing::info!(
        path = %path.display(),
        records = records.len(),
        "Run file written"
    );
    Ok(path)
}

/// Encode records as CSV into `writer`.
pub fn write_records<W: Write>(writer: W, records: &[AdjacencyRecord]) -> Result<(), StoreError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([USER_COLUMN, FOLLOWING_COLUMN])?;
    for record in records {
        let following = serde_json::to_string(&record.following)?;
        csv.write_record([record.user.to_string(), following])?;
    }
    csv.flush()?;
    Ok(())
}

/// Read only the `user` column of a run file.
pub fn read_sources<R: Read>(reader: R, path: &Path) -> Result<Vec<AccountId>, StoreError> {
    let mut csv = csv::Reader::from_reader(reader);
    let user_idx = column_index(csv.headers()?, USER_COLUMN, path)?;

    let mut sources = Vec::new();
    for row in csv.records() {
        let row = row?;
        sources.push(parse_user(&row, user_idx, path)?);
    }
    Ok(sources)
}

/// Decode full adjacency records from a run file.
pub fn read_records<R: Read>(reader: R, path: &Path) -> Result<Vec<AdjacencyRecord>, StoreError> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    let user_idx = column_index(&headers, USER_COLUMN, path)?;
    let following_idx = column_index(&headers, FOLLOWING_COLUMN, path)?;

    let mut records = Vec::new();
    for row in csv.records() {
        let row = row?;
        let user = parse_user(&row, user_idx, path)?;
        let raw = row.get(following_idx).unwrap_or("[]");
        let following: Vec<AccountId> =
            serde_json::from_str(raw).map_err(|e| malformed(&row, path, e.to_string()))?;
        records.push(AdjacencyRecord::new(user, following));
    }
    Ok(records)
}

fn column_index(
    headers: &csv::StringRecord,
    column: &str,
    path: &Path,
) -> Result<usize, StoreError> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| StoreError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}

fn parse_user(row: &csv::StringRecord, idx: usize, path: &Path) -> Result<AccountId, StoreError> {
    let raw = row.get(idx).unwrap_or("");
    raw.parse()
        .map_err(|_| malformed(row, path, format!("invalid user id {raw:?}")))
}

fn malformed(row: &csv::StringRecord, path: &Path, reason: String) -> StoreError {
    StoreError::Malformed {
        path: path.to_path_buf(),
        line: row.position().map_or(0, |p| p.line()),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::load_known_sources;
    use crate::store::{FsRunStore, RunWriter};
    use std::io;

    fn path() -> PathBuf {
        PathBuf::from("users_following_test.csv")
    }

    #[test]
    fn test_run_file_name_format() {
        let at = DateTime::parse_from_rfc3339("2024-03-05T07:08:09Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            run_file_name("users_following", at),
            "users_following_2024_03_05_07_08_09.csv"
        );
    }

    #[test]
    fn test_write_layout() {
        let records = vec![
            AdjacencyRecord::new(AccountId(1), vec![AccountId(5), AccountId(3)]),
            AdjacencyRecord::new(AccountId(2), vec![]),
        ];
        let mut buf = Vec::new();
        write_records(&mut buf, &records).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "user,following\n1,\"[5,3]\"\n2,[]\n");
    }

    #[test]
    fn test_reads_python_style_lists() {
        let csv = "user,following\n10,\"[1, 2, 3]\"\n11,[]\n";
        let records = read_records(csv.as_bytes(), &path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].user, AccountId(10));
        assert_eq!(
            records[0].following,
            vec![AccountId(1), AccountId(2), AccountId(3)]
        );
        assert!(records[1].is_empty());
    }

    #[test]
    fn test_read_sources_ignores_following_column() {
        let csv = "following,user\n\"[1, 2]\",44\nnot-a-list,45\n";
        let sources = read_sources(csv.as_bytes(), &path()).unwrap();
        assert_eq!(sources, vec![AccountId(44), AccountId(45)]);
    }

    #[test]
    fn test_missing_user_column() {
        let csv = "account,following\n1,[]\n";
        let err = read_sources(csv.as_bytes(), &path()).unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn { ref column, .. } if column == "user"));
    }

    #[test]
    fn test_bad_user_id_reports_line() {
        let csv = "user,following\n1,[]\nbob,[]\n";
        let err = read_sources(csv.as_bytes(), &path()).unwrap_err();
        match err {
            StoreError::Malformed { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_materialize_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRunStore::new(dir.path());
        let records = vec![AdjacencyRecord::new(AccountId(1), vec![AccountId(2)])];

        let path = materialize(&store, &records, "users_following_x.csv").unwrap();
        let first = std::fs::read_to_string(&path).unwrap();

        let err = materialize(&store, &[], "users_following_x.csv").unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);

        let back = read_records(store.open(&path).unwrap(), &path).unwrap();
        assert_eq!(back, records);
    }

    /// Store whose writers fail once `budget` bytes have gone through.
    struct ShortStore {
        inner: FsRunStore,
        budget: usize,
    }

    struct ShortWriter {
        inner: Box<dyn RunWriter>,
        remaining: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            self.inner.write(&buf[..n])
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    impl RunWriter for ShortWriter {
        fn commit(self: Box<Self>) -> Result<PathBuf, StoreError> {
            self.inner.commit()
        }
    }

    impl RunStore for ShortStore {
        fn list(&self, pattern: &str) -> Result<Vec<PathBuf>, StoreError> {
            self.inner.list(pattern)
        }

        fn open(&self, path: &Path) -> Result<Box<dyn Read>, StoreError> {
            self.inner.open(path)
        }

        fn create(&self, file_name: &str) -> Result<Box<dyn RunWriter>, StoreError> {
            Ok(Box::new(ShortWriter {
                inner: self.inner.create(file_name)?,
                remaining: self.budget,
            }))
        }
    }

    #[test]
    fn test_failed_write_leaves_no_run_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShortStore {
            inner: FsRunStore::new(dir.path()),
            budget: 40,
        };
        let records: Vec<_> = (10..30)
            .map(|u| AdjacencyRecord::new(AccountId(u), vec![AccountId(1), AccountId(2)]))
            .collect();

        assert!(materialize(&store, &records, "users_following_x.csv").is_err());

        assert!(store.list("users_following*.csv").unwrap().is_empty());
        let known = load_known_sources(&store, "users_following*.csv").unwrap();
        assert!(known.is_empty());

        // The next run can still write under the same name.
        let path = materialize(&store.inner, &records, "users_following_x.csv").unwrap();
        assert_eq!(read_records(std::fs::File::open(&path).unwrap(), &path).unwrap(), records);
    }
}
