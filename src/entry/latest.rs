use chrono::NaiveDate;
use std::path::Path;

use crate::{Result, entry::parser::parse_entry_filename};

/// Date of the newest entry in `entries_dir`, or `None` when the directory
/// is missing or holds no well formed entry names.
pub fn get_latest_changelog_entry_date(
    entries_dir: &Path,
) -> Result<Option<NaiveDate>> {
    if !entries_dir.is_dir() {
        return Ok(None);
    }

    let mut latest: Option<NaiveDate> = None;

    for dir_entry in std::fs::read_dir(entries_dir)? {
        let file_name = dir_entry?.file_name().to_string_lossy().to_string();

        match parse_entry_filename(&file_name) {
            Ok((date, _)) => {
                if latest.is_none_or(|current| date > current) {
                    latest = Some(date);
                }
            }
            Err(_) => log::debug!("ignoring non entry file: {file_name}"),
        }
    }

    Ok(latest)
}
