//! Input file checks.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error_handling::InputError;

/// Rejects a missing or empty input file before any work starts.
///
/// # Errors
///
/// Returns `InputError::Missing`, `InputError::Blank`, or
/// `InputError::Unreadable` for other metadata failures.
pub fn check_input_file(path: &Path) -> Result<(), InputError> {
    let metadata = fs::metadata(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            InputError::Missing(path.to_path_buf())
        } else {
            InputError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    if metadata.len() == 0 {
        return Err(InputError::Blank(path.to_path_buf()));
    }
    Ok(())
}
