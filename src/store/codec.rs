//! Line format of the record store.
//!
//! ```text
//! 2024-05-10                          <- optional last-write header
//! guid-1|-|First article|-|2024-05-09
//! guid-2|-|Second article|-|2024-05-10
//! ```
//!
//! Links are not persisted, so a loaded store equals the saved one with every
//! link cleared.
//!
//! A line with the wrong number of fields is skipped. A record whose date
//! cannot be parsed means the file is corrupt and aborts the load.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::datetime::{format_date, parse_date};
use crate::error::{RelayError, Result};
use crate::store::record::FeedRecord;
use crate::store::records::RecordStore;

/// Field delimiter.
pub const DELIMITER: &str = "|-|";

/// Number of fields per record line.
pub const FIELD_COUNT: usize = 3;

/// Result of decoding a store file.
#[derive(Debug, Clone, Default)]
pub struct LoadedStore {
    /// Records read from the file.
    pub store: RecordStore,
    /// Date recorded in the header line, if any.
    pub last_written: Option<NaiveDate>,
    /// Number of malformed lines that were skipped.
    pub skipped: usize,
}

/// Decode the contents of a store file.
pub fn decode(content: &str) -> Result<LoadedStore> {
    let mut loaded = LoadedStore::default();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;

        if line.trim().is_empty() {
            continue;
        }

        if index == 0 && !line.contains(DELIMITER) {
            if let Some(date) = parse_date(line) {
                loaded.last_written = Some(date);
                continue;
            }
        }

        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            warn!(
                "Skipping malformed store line {}: expected {} fields, found {}",
                line_no,
                FIELD_COUNT,
                fields.len()
            );
            loaded.skipped += 1;
            continue;
        }

        let (id, title, date) = (fields[0], fields[1], fields[2]);
        if date.trim().is_empty() {
            warn!("Skipping store line {}: missing date", line_no);
            loaded.skipped += 1;
            continue;
        }

        let published_at = parse_date(date).ok_or_else(|| RelayError::CorruptStore {
            line: line_no,
            value: date.to_string(),
        })?;

        debug!("Retrieved from store: {} - {}", title, date);
        loaded
            .store
            .insert(FeedRecord::new(id, title, published_at));
    }

    Ok(loaded)
}

/// Encode a store, preceded by a header holding `written_on`.
///
/// Records are written in id order so snapshots are stable.
pub fn encode(store: &RecordStore, written_on: NaiveDate) -> String {
    let mut out = format_date(&written_on);
    out.push('\n');
    for record in store.sorted() {
        out.push_str(&encode_record(record));
        out.push('\n');
    }
    out
}

/// Encode a single record line (without the trailing newline).
pub fn encode_record(record: &FeedRecord) -> String {
    format!(
        "{}{}{}{}{}",
        record.id,
        DELIMITER,
        record.title,
        DELIMITER,
        format_date(&record.published_at)
    )
}
