//! Rotating file writer for the application log
//!
//! Rotates `cloudmount.log` once it passes [`MAX_FILE_SIZE`], keeping
//! [`MAX_BACKUP_FILES`] numbered backups.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Maximum file size before rotation (5 MB)
const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum number of backup files to keep
const MAX_BACKUP_FILES: usize = 5;

pub const APP_LOG_FILE: &str = "cloudmount-app.log";

pub struct RotatingFileWriter {
    base_path: PathBuf,
    current_file: Option<File>,
    current_size: u64,
    max_size: u64,
}

impl RotatingFileWriter {
    pub fn new(log_dir: &Path) -> io::Result<Self> {
        Self::with_max_size(log_dir, MAX_FILE_SIZE)
    }

    fn with_max_size(log_dir: &Path, max_size: u64) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;

        let base_path = log_dir.join(APP_LOG_FILE);
        let current_size = match fs::metadata(&base_path) {
            Ok(meta) => meta.len(),
            Err(_) => 0,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&base_path)?;

        Ok(Self {
            base_path,
            current_file: Some(file),
            current_size,
            max_size,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("{}.{index}", self.base_path.display()))
    }

    /// .4 -> .5, .3 -> .4, ..., current -> .1
    fn rotate(&mut self) -> io::Result<()> {
        self.current_file = None;

        let oldest = self.backup_path(MAX_BACKUP_FILES);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (1..MAX_BACKUP_FILES).rev() {
            let from = self.backup_path(i);
            if from.exists() {
                fs::rename(&from, self.backup_path(i + 1))?;
            }
        }

        if self.base_path.exists() {
            fs::rename(&self.base_path, self.backup_path(1))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.base_path)?;

        self.current_file = Some(file);
        self.current_size = 0;

        Ok(())
    }

    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let bytes = line.as_bytes();
        let len = bytes.len() as u64 + 1;

        if self.current_size > 0 && self.current_size + len > self.max_size {
            self.rotate()?;
        }

        if let Some(ref mut file) = self.current_file {
            file.write_all(bytes)?;
            file.write_all(b"\n")?;
            file.flush()?;
            self.current_size += len;
        }

        Ok(())
    }
}

static FILE_WRITER: once_cell::sync::OnceCell<Mutex<RotatingFileWriter>> =
    once_cell::sync::OnceCell::new();

pub fn init_file_writer(log_dir: &Path) -> io::Result<()> {
    let writer = RotatingFileWriter::new(log_dir)?;
    FILE_WRITER.set(Mutex::new(writer)).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "File writer already initialized",
        )
    })
}

pub fn write_to_file(line: &str) {
    if let Some(writer) = FILE_WRITER.get() {
        if let Ok(mut guard) = writer.lock() {
            if let Err(e) = guard.write_line(line) {
                eprintln!("Failed to write to log file: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appends_lines() {
        let dir = TempDir::new().unwrap();
        let mut writer = RotatingFileWriter::new(dir.path()).unwrap();
        writer.write_line("first").unwrap();
        writer.write_line("second").unwrap();

        let content = fs::read_to_string(dir.path().join(APP_LOG_FILE)).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_rotates_when_full() {
        let dir = TempDir::new().unwrap();
        let mut writer = RotatingFileWriter::with_max_size(dir.path(), 16).unwrap();
        writer.write_line("0123456789").unwrap();
        writer.write_line("abcdefghij").unwrap();

        let current = fs::read_to_string(dir.path().join(APP_LOG_FILE)).unwrap();
        assert_eq!(current, "abcdefghij\n");
        let backup = dir.path().join(format!("{APP_LOG_FILE}.1"));
        assert_eq!(fs::read_to_string(backup).unwrap(), "0123456789\n");
    }

    #[test]
    fn test_keeps_bounded_backups() {
        let dir = TempDir::new().unwrap();
        let mut writer = RotatingFileWriter::with_max_size(dir.path(), 4).unwrap();
        for i in 0..(MAX_BACKUP_FILES + 3) {
            writer.write_line(&format!("line{i}")).unwrap();
        }

        assert!(dir.path().join(format!("{APP_LOG_FILE}.{MAX_BACKUP_FILES}")).exists());
        assert!(
            !dir.path()
                .join(format!("{APP_LOG_FILE}.{}", MAX_BACKUP_FILES + 1))
                .exists()
        );
    }
}
