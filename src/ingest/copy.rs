// Byte-for-byte file copy used for orphans and formats the tagger cannot write

use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use crate::error::{ReconcileError, Result};

/// Copy `source` to `dest`, verify the size and carry over the modification time.
/// Returns the number of bytes written.
/// A partly written `dest` is removed on any failure.
pub fn copy_with_verify(source: &Path, dest: &Path) -> Result<u64> {
    let mut reader = BufReader::new(fs::File::open(source)?);

    let written = match stream_to(&mut reader, dest) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(dest);
            return Err(e.into());
        }
    };

    let source_size = fs::metadata(source)?.len();
    let dest_size = fs::metadata(dest)?.len();

    if source_size != dest_size {
        let _ = fs::remove_file(dest);
        return Err(ReconcileError::Copy(format!(
            "Verification failed for {}: size mismatch ({} vs {})",
            dest.display(),
            source_size,
            dest_size
        )));
    }

    if let Ok(modified) = fs::metadata(source).and_then(|m| m.modified()) {
        let _ = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(modified));
    }

    Ok(written)
}

fn stream_to(reader: &mut impl Read, dest: &Path) -> std::io::Result<u64> {
    let mut writer = BufWriter::new(fs::File::create(dest)?);
    let written = std::io::copy(reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(written)
}
