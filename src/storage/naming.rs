//! Destination collision handling
//!
//! Copy and move never replace an existing file. When the wanted destination
//! is taken, the new file gets a name of the form `<stem>_<token><ext>`.

use log::debug;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs::{File, OpenOptions};

/// Upper bound on exclusive-create attempts before giving up.
pub const MAX_RESERVE_ATTEMPTS: usize = 16;

static LAST_TOKEN: AtomicU64 = AtomicU64::new(0);

/// Next disambiguation token, as lowercase hex.
///
/// Seeded from wall-clock nanoseconds but strictly increasing within the
/// process, so two calls in the same clock tick still differ.
pub fn next_token() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let previous = LAST_TOKEN
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or_else(|last| last);

    format!("{:x}", now.max(previous + 1))
}

/// Insert `_<token>` between the file stem and its last extension.
pub fn disambiguate(path: &Path, token: &str) -> PathBuf {
    let mut name = path.file_stem().unwrap_or_default().to_os_string();
    name.push("_");
    name.push(token);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// Return `path` if nothing exists there, otherwise a disambiguated variant.
///
/// Only probes the filesystem; the returned name is not claimed. Use
/// [`reserve`] when the caller is about to create the file.
pub async fn dedupe(path: &Path) -> io::Result<PathBuf> {
    if tokio::fs::try_exists(path).await? {
        Ok(disambiguate(path, &next_token()))
    } else {
        Ok(path.to_path_buf())
    }
}

/// Claim a free destination name with exclusive-create.
///
/// Starts from the [`dedupe`] candidate and retries with fresh tokens when a
/// concurrent writer takes the name first. Returns the claimed path and the
/// newly created, empty file.
pub async fn reserve(path: &Path) -> io::Result<(PathBuf, File)> {
    let mut candidate = dedupe(path).await?;

    for _ in 0..MAX_RESERVE_ATTEMPTS {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("Destination {} taken, retrying", candidate.display());
                candidate = disambiguate(path, &next_token());
            }
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!(
            "no free name for {} after {MAX_RESERVE_ATTEMPTS} attempts",
            path.display()
        ),
    ))
}
