//! Concurrent reader for delimited bulk exports.
//!
//! A single producer (the calling thread) reads lines from the file and
//! pushes them onto a bounded queue; a pool of worker threads, one per
//! available CPU, drains the queue, splits each line against the shared
//! header and hands the record to a caller-supplied `combine` function.
//!
//! # Caller obligations
//!
//! Every record is delivered to exactly one worker, but records arrive in no
//! particular order and `combine` may run on several threads at once. Any
//! shared accumulation it performs (e.g. inserting into a map keyed by
//! account number) must be made safe by the caller, typically with a
//! `Mutex` around the map.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::SourceError;
use crate::progress::ProgressCallback;

/// Number of lines buffered between the producer and the workers.
pub const QUEUE_CAPACITY: usize = 4096;

/// Column names from a file's header row with a name-to-position index.
#[derive(Debug, Clone)]
pub struct Header {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Header {
    /// Parses a header line, trimming each column name.
    #[must_use]
    pub fn parse(line: &str, delimiter: char) -> Self {
        let names: Vec<String> = line
            .split(delimiter)
            .map(|name| name.trim().to_string())
            .collect();
        let positions = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, positions }
    }

    /// Column names in file order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Splits a data line into a record keyed by this header.
    #[must_use]
    pub fn record<'a>(&'a self, line: &'a str, delimiter: char) -> DelimitedRecord<'a> {
        DelimitedRecord {
            header: self,
            values: line.split(delimiter).map(str::trim).collect(),
        }
    }
}

/// One data row, with values addressable by column name.
#[derive(Debug)]
pub struct DelimitedRecord<'a> {
    header: &'a Header,
    values: Vec<&'a str>,
}

impl<'a> DelimitedRecord<'a> {
    /// Returns the trimmed value for `column`, or `""` if the column is not
    /// in the header or the row is shorter than the header.
    #[must_use]
    pub fn get(&self, column: &str) -> &'a str {
        self.header
            .positions
            .get(column)
            .and_then(|&i| self.values.get(i).copied())
            .unwrap_or_default()
    }

    /// Owned copy of [`Self::get`].
    #[must_use]
    pub fn get_owned(&self, column: &str) -> String {
        self.get(column).to_string()
    }
}

/// Number of worker threads used by [`read_delimited`].
#[must_use]
pub fn worker_count() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Reads a delimited file with a header row and calls `combine` once per
/// data row, concurrently. Returns the number of rows processed.
///
/// See the module docs for the concurrency contract `combine` must honor.
///
/// # Errors
///
/// * [`SourceError::Io`] if the file cannot be opened or read
/// * [`SourceError::EmptyFile`] if there is no header row
/// * [`SourceError::Worker`] if a worker thread panicked
pub fn read_delimited<F>(
    path: &Path,
    delimiter: char,
    progress: &dyn ProgressCallback,
    combine: F,
) -> Result<u64, SourceError>
where
    F: Fn(DelimitedRecord<'_>) + Sync,
{
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = Vec::new();

    let Some(header_line) = read_line(&mut reader, &mut buf)? else {
        return Err(SourceError::EmptyFile {
            path: path.display().to_string(),
        });
    };
    let header = Header::parse(&header_line, delimiter);
    let workers = worker_count();
    let processed = AtomicU64::new(0);

    log::debug!(
        "Reading {} ({} columns) with {workers} workers",
        path.display(),
        header.names().len()
    );

    let (tx, rx) = crossbeam::channel::bounded::<String>(QUEUE_CAPACITY);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let rx = rx.clone();
                let header = &header;
                let combine = &combine;
                let processed = &processed;
                scope.spawn(move || {
                    for line in rx {
                        combine(header.record(&line, delimiter));
                        processed.fetch_add(1, Ordering::Relaxed);
                        progress.inc(1);
                    }
                })
            })
            .collect();
        drop(rx);

        let mut read_result = Ok(());
        loop {
            match read_line(&mut reader, &mut buf) {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    read_result = Err(SourceError::Io(e));
                    break;
                }
            }
        }
        drop(tx);

        let panicked = handles
            .into_iter()
            .map(std::thread::ScopedJoinHandle::join)
            .filter(Result::is_err)
            .count();
        if panicked > 0 {
            return Err(SourceError::Worker {
                message: format!("{panicked} worker thread(s) panicked"),
            });
        }

        read_result
    })?;

    let total = processed.load(Ordering::Relaxed);
    log::info!("Read {total} records from {}", path.display());
    Ok(total)
}

/// Reads one line without its `\n` or `\r\n` terminator. Bytes that are
/// not valid UTF-8 (exports carry Windows-1252 owner names) become U+FFFD.
fn read_line(reader: &mut impl BufRead, buf: &mut Vec<u8>) -> std::io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::sync::Mutex;

    use super::*;
    use crate::progress::NullProgress;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn header_lookup_trims_and_tolerates_short_rows() {
        let header = Header::parse("Account_Num | Situs_Address|City", '|');
        let record = header.record(" 0001 |  12 MAIN ST ", '|');
        assert_eq!(record.get("Account_Num"), "0001");
        assert_eq!(record.get("Situs_Address"), "12 MAIN ST");
        assert_eq!(record.get("City"), "");
        assert_eq!(record.get("Unknown"), "");
    }

    #[test]
    fn delivers_every_record_exactly_once() {
        let mut contents = String::from("id|value\n");
        for i in 0..5_000 {
            contents.push_str(&format!("{i}|{}\n", i * 2));
        }
        let file = write_file(&contents);

        let seen = Mutex::new(Vec::new());
        let count = read_delimited(file.path(), '|', &NullProgress, |record| {
            let id: u32 = record.get("id").parse().unwrap();
            let value: u32 = record.get("value").parse().unwrap();
            assert_eq!(value, id * 2);
            seen.lock().unwrap().push(id);
        })
        .unwrap();

        assert_eq!(count, 5_000);
        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, (0..5_000).collect::<Vec<_>>());
    }

    #[test]
    fn non_utf8_bytes_do_not_stop_the_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"id|owner\r\n1|SMITH\r\n2|PE\xd1A\r\n3|DOE\r\n")
            .unwrap();

        let owners = Mutex::new(Vec::new());
        let count = read_delimited(file.path(), '|', &NullProgress, |record| {
            owners
                .lock()
                .unwrap()
                .push((record.get("id").to_string(), record.get("owner").to_string()));
        })
        .unwrap();

        assert_eq!(count, 3);
        let mut owners = owners.into_inner().unwrap();
        owners.sort();
        assert_eq!(
            owners,
            vec![
                ("1".to_string(), "SMITH".to_string()),
                ("2".to_string(), "PE\u{FFFD}A".to_string()),
                ("3".to_string(), "DOE".to_string()),
            ]
        );
    }

    #[test]
    fn header_only_file_yields_no_records() {
        let file = write_file("id|value\n");
        let count = read_delimited(file.path(), '|', &NullProgress, |_| {
            panic!("no records expected");
        })
        .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn empty_file_is_an_error() {
        let file = write_file("");
        let err = read_delimited(file.path(), '|', &NullProgress, |_| {}).unwrap_err();
        assert!(matches!(err, SourceError::EmptyFile { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_delimited(
            Path::new("/nonexistent/parcels.txt"),
            '|',
            &NullProgress,
            |_| {},
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
