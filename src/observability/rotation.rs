//! Size-rotated log file.
//!
//! The active file keeps its configured name. When a write would push it past
//! the size limit, it is renamed to `<stem>-<UTC timestamp>.<ext>` and a fresh
//! file is opened. Compression and retention run on a background thread so the
//! writer (and the lock the fmt layer holds around it) is never stalled by
//! gzip or directory scans.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::config::LoggingConfig;

const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESSED_SUFFIX: &str = ".gz";

/// When to rotate and what to keep.
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    pub max_size: u64,
    pub max_backups: usize,
    pub max_age: Option<Duration>,
    pub compress: bool,
}

impl From<&LoggingConfig> for RotationPolicy {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            max_size: config.max_size_mb.saturating_mul(1024 * 1024),
            max_backups: config.max_backups,
            max_age: (config.max_age_days > 0)
                .then(|| Duration::from_secs(config.max_age_days.saturating_mul(24 * 60 * 60))),
            compress: config.compress,
        }
    }
}

/// A log file that rotates itself by size.
///
/// Dropping it waits for pending compression and pruning to finish.
#[derive(Debug)]
pub struct RollingFile {
    path: PathBuf,
    file: File,
    size: u64,
    policy: RotationPolicy,
    mill: Option<Mill>,
}

impl RollingFile {
    /// Open (or create) the log file in append mode, creating parent directories.
    pub fn open(path: impl Into<PathBuf>, policy: RotationPolicy) -> io::Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = open_append(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            file,
            size,
            policy,
            mill: None,
        })
    }

    /// Path of the active log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotated files next to the active one, newest first.
    pub fn backups(&self) -> io::Result<Vec<(DateTime<Utc>, PathBuf)>> {
        list_backups(&self.path)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let backup = next_backup_path(&self.path, Utc::now())?;
        fs::rename(&self.path, &backup)?;
        self.file = open_append(&self.path)?;
        self.size = 0;

        self.hand_off(backup);
        Ok(())
    }

    /// Queue `backup` for the mill thread, starting it on first use.
    ///
    /// Runs under the subscriber's writer lock, so it must not emit tracing
    /// events. If the thread cannot be started the work is done inline.
    fn hand_off(&mut self, backup: PathBuf) {
        if self.mill.is_none() {
            match Mill::spawn(self.path.clone(), self.policy.clone()) {
                Ok(mill) => self.mill = Some(mill),
                Err(e) => eprintln!("log rotation: cannot start mill thread: {e}"),
            }
        }

        let backup = match &self.mill {
            Some(mill) => match mill.tx.send(backup) {
                Ok(()) => return,
                Err(mpsc::SendError(backup)) => backup,
            },
            None => backup,
        };
        if let Err(e) = mill_backup(&self.path, &self.policy, &backup) {
            eprintln!("log rotation: {}: {e}", backup.display());
        }
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size > 0 && self.size + buf.len() as u64 > self.policy.max_size {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Drop for RollingFile {
    fn drop(&mut self) {
        if let Some(Mill { tx, handle }) = self.mill.take() {
            drop(tx);
            let _ = handle.join();
        }
    }
}

/// Background worker compressing and pruning rotated files in rotation order.
#[derive(Debug)]
struct Mill {
    tx: mpsc::Sender<PathBuf>,
    handle: thread::JoinHandle<()>,
}

impl Mill {
    fn spawn(path: PathBuf, policy: RotationPolicy) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<PathBuf>();
        let handle = thread::Builder::new()
            .name("log-mill".into())
            .spawn(move || {
                for backup in rx {
                    if let Err(e) = mill_backup(&path, &policy, &backup) {
                        tracing::warn!(
                            backup = %backup.display(),
                            error = %e,
                            "Log rotation cleanup failed"
                        );
                    }
                }
            })?;
        Ok(Self { tx, handle })
    }
}

/// Compress one fresh backup (if enabled), then apply retention.
///
/// Retention still runs when compression fails; the first error is returned.
fn mill_backup(path: &Path, policy: &RotationPolicy, backup: &Path) -> io::Result<()> {
    let compressed = if policy.compress {
        compress(backup)
    } else {
        Ok(())
    };
    let pruned = prune(path, policy, Utc::now());
    compressed.and(pruned)
}

/// Backup name for `now`, kept strictly newer than any existing backup
/// so ordering by name timestamp matches rotation order.
fn next_backup_path(path: &Path, now: DateTime<Utc>) -> io::Result<PathBuf> {
    let mut at = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
    if let Some((newest, _)) = list_backups(path)?.first() {
        if at <= *newest {
            at = *newest + TimeDelta::milliseconds(1);
        }
    }
    let (stem, ext) = name_parts(path);
    let name = format!("{}-{}{}", stem, at.format(BACKUP_TIME_FORMAT), ext);
    Ok(path.with_file_name(name))
}

/// File stem and extension (with its dot, or empty) of the active file.
fn name_parts(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (stem, ext)
}

fn list_backups(path: &Path) -> io::Result<Vec<(DateTime<Utc>, PathBuf)>> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let (stem, ext) = name_parts(path);
    let prefix = format!("{}-", stem);

    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(rest) = name.strip_prefix(&prefix) else {
            continue;
        };
        let rest = rest.strip_suffix(COMPRESSED_SUFFIX).unwrap_or(rest);
        let Some(stamp) = rest.strip_suffix(ext.as_str()) else {
            continue;
        };
        if let Ok(at) = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT) {
            found.push((at.and_utc(), entry.path()));
        }
    }
    found.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(found)
}

fn prune(path: &Path, policy: &RotationPolicy, now: DateTime<Utc>) -> io::Result<()> {
    let backups = list_backups(path)?;
    let cutoff = policy
        .max_age
        .and_then(|age| TimeDelta::from_std(age).ok())
        .and_then(|age| now.checked_sub_signed(age));

    for (index, (at, backup)) in backups.iter().enumerate() {
        let over_count = policy.max_backups > 0 && index >= policy.max_backups;
        let too_old = cutoff.is_some_and(|cutoff| *at < cutoff);
        if over_count || too_old {
            fs::remove_file(backup)?;
        }
    }
    Ok(())
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Gzip `path` into `path.gz` and remove the original.
fn compress(path: &Path) -> io::Result<()> {
    let target = with_suffix(path, COMPRESSED_SUFFIX);
    let mut reader = BufReader::new(File::open(path)?);
    let mut encoder = GzEncoder::new(File::create(&target)?, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.sync_all()?;
    fs::remove_file(path)
}
