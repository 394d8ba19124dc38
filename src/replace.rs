//! Staged backup → rewrite → finalize replacement of a single file.
//!
//! The original is only truncated once an intact `.original` sidecar copy
//! exists, so an interrupted run leaves at worst a sidecar to restore from.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::encoding;
use crate::eol::{self, RewriteStats, Terminator};
use crate::error::FixEolError;

/// A concrete file to rewrite, with its sidecar and persistent backup paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub path: PathBuf,
    pub sidecar: PathBuf,
    pub backup: PathBuf,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

impl FileTask {
    pub fn new(path: PathBuf) -> Self {
        FileTask {
            sidecar: with_suffix(&path, ".original"),
            backup: with_suffix(&path, ".bak"),
            path,
        }
    }
}

/// How far the replacement protocol got for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReplacementState {
    Original,
    BackupCreated,
    Rewritten,
    Finalized,
}

#[cfg(windows)]
fn make_removable(path: &Path) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(not(windows))]
fn make_removable(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Removes `path` if it exists.
fn remove_stale(path: &Path) -> io::Result<()> {
    if path.exists() {
        make_removable(path)?;
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Drives one [`FileTask`] through the replacement protocol.
///
/// Stages must run in order; each failure is fatal and leaves
/// [`FileReplacer::state`] at the last stage that completed.
pub struct FileReplacer<'a> {
    task: &'a FileTask,
    state: ReplacementState,
}

impl<'a> FileReplacer<'a> {
    pub fn new(task: &'a FileTask) -> Self {
        FileReplacer { task, state: ReplacementState::Original }
    }

    pub fn state(&self) -> ReplacementState {
        self.state
    }

    /// Copies the file to its sidecar, replacing any stale sidecar.
    ///
    /// # Returns
    ///
    /// `Ok(())` with the state advanced to [`ReplacementState::BackupCreated`].
    ///
    /// # Errors
    ///
    /// [`FixEolError::Backup`] if the stale sidecar cannot be removed or the
    /// copy fails. The original file is untouched in either case.
    pub fn create_backup(&mut self) -> Result<(), FixEolError> {
        debug_assert_eq!(self.state, ReplacementState::Original);
        let task = self.task;

        remove_stale(&task.sidecar)
            .and_then(|_| fs::copy(&task.path, &task.sidecar))
            .map_err(|source| FixEolError::Backup { path: task.path.clone(), source })?;

        debug!("{}: sidecar {}", task.path.display(), task.sidecar.display());
        self.state = ReplacementState::BackupCreated;
        Ok(())
    }

    /// Rewrites the original path from the sidecar with `terminator`.
    ///
    /// The sidecar's byte-order mark decides the code-unit width and is
    /// written back unchanged.
    ///
    /// # Parameters
    ///
    /// * `terminator` - written after every line that had a terminator.
    ///
    /// # Returns
    ///
    /// Line and byte counts for the rewritten file.
    ///
    /// # Errors
    ///
    /// [`FixEolError::Rewrite`] if the sidecar cannot be read or the original
    /// path cannot be written. The sidecar is left in place for recovery.
    pub fn rewrite(&mut self, terminator: &Terminator) -> Result<RewriteStats, FixEolError> {
        debug_assert_eq!(self.state, ReplacementState::BackupCreated);
        let task = self.task;

        let stats = rewrite_from_sidecar(task, terminator)
            .map_err(|source| FixEolError::Rewrite { path: task.path.clone(), source })?;

        debug!("{}: rewrote {} lines", task.path.display(), stats.lines);
        self.state = ReplacementState::Rewritten;
        Ok(stats)
    }

    /// Moves the sidecar to `.bak` when `keep_backup`, otherwise deletes it.
    ///
    /// # Parameters
    ///
    /// * `keep_backup` - keep the pre-rewrite bytes as `<file>.bak`, replacing
    ///   any older `.bak`.
    ///
    /// # Errors
    ///
    /// [`FixEolError::Cleanup`] if the rename or delete fails. The file itself
    /// is already rewritten at that point.
    pub fn finalize(&mut self, keep_backup: bool) -> Result<(), FixEolError> {
        debug_assert_eq!(self.state, ReplacementState::Rewritten);
        let task = self.task;

        let result = if keep_backup {
            remove_stale(&task.backup).and_then(|_| fs::rename(&task.sidecar, &task.backup))
        } else {
            fs::remove_file(&task.sidecar)
        };
        result.map_err(|source| FixEolError::Cleanup { path: task.path.clone(), source })?;

        self.state = ReplacementState::Finalized;
        Ok(())
    }

    /// Runs all three stages.
    pub fn run(
        &mut self,
        terminator: &Terminator,
        keep_backup: bool,
    ) -> Result<RewriteStats, FixEolError> {
        self.create_backup()?;
        let stats = self.rewrite(terminator)?;
        self.finalize(keep_backup)?;
        Ok(stats)
    }
}

fn rewrite_from_sidecar(task: &FileTask, terminator: &Terminator) -> io::Result<RewriteStats> {
    let mut source = File::open(&task.sidecar)?;
    let detection = encoding::detect(&mut source).map_err(io::Error::other)?;
    debug!("{}: encoding {}", task.path.display(), detection.encoding.label());

    let mut writer = BufWriter::new(File::create(&task.path)?);
    writer.write_all(detection.encoding.bom())?;
    let mut stats = eol::rewrite(
        BufReader::new(source),
        &mut writer,
        detection.encoding,
        terminator,
    )?;
    stats.bytes_written += detection.bom_length as u64;

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn lf() -> Terminator {
        Terminator::parse("lf").expect("valid spec")
    }

    #[test]
    fn task_paths_use_suffixes() {
        let task = FileTask::new(PathBuf::from("/tmp/a.txt"));
        assert_eq!(task.sidecar, PathBuf::from("/tmp/a.txt.original"));
        assert_eq!(task.backup, PathBuf::from("/tmp/a.txt.bak"));
    }

    #[test]
    fn full_run_without_backup_removes_sidecar() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("a.txt");
        fs::write(&path, b"one\r\ntwo\nthree\r\n").expect("write");

        let task = FileTask::new(path.clone());
        let mut replacer = FileReplacer::new(&task);
        let stats = replacer.run(&lf(), false).expect("run");

        assert_eq!(replacer.state(), ReplacementState::Finalized);
        assert_eq!(stats.lines, 3);
        assert_eq!(fs::read(&path).expect("read"), b"one\ntwo\nthree\n");
        assert!(!task.sidecar.exists());
        assert!(!task.backup.exists());
    }

    #[test]
    fn backup_keeps_original_bytes_and_replaces_old_bak() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("a.txt");
        let original = b"x\r\ny\r\n".to_vec();
        fs::write(&path, &original).expect("write");

        let task = FileTask::new(path.clone());
        fs::write(&task.backup, b"stale backup").expect("write stale bak");
        fs::write(&task.sidecar, b"stale sidecar").expect("write stale sidecar");

        FileReplacer::new(&task).run(&lf(), true).expect("run");

        assert_eq!(fs::read(&task.backup).expect("read bak"), original);
        assert_eq!(fs::read(&path).expect("read"), b"x\ny\n");
        assert!(!task.sidecar.exists());
    }

    #[test]
    fn bom_is_preserved() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("u8.txt");
        fs::write(&path, b"\xEF\xBB\xBFa\nb\n").expect("write");

        let task = FileTask::new(path.clone());
        FileReplacer::new(&task)
            .run(&Terminator::parse("crlf").expect("valid spec"), false)
            .expect("run");

        assert_eq!(fs::read(&path).expect("read"), b"\xEF\xBB\xBFa\r\nb\r\n");
    }

    #[test]
    fn utf16le_file_is_rewritten_in_its_own_units() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("u16.txt");
        fs::write(&path, [0xFF, 0xFE, b'a', 0, b'\r', 0, b'\n', 0]).expect("write");

        let task = FileTask::new(path.clone());
        let stats = FileReplacer::new(&task).run(&lf(), false).expect("run");

        assert_eq!(fs::read(&path).expect("read"), vec![0xFF, 0xFE, b'a', 0, b'\n', 0]);
        assert_eq!(stats.bytes_written, 6);
    }

    #[test]
    fn missing_source_fails_in_backup_stage() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let task = FileTask::new(dir.path().join("gone.txt"));
        let mut replacer = FileReplacer::new(&task);

        let err = replacer.run(&lf(), false).expect_err("should fail");
        assert_eq!(err.exit_code(), 100);
        assert_eq!(replacer.state(), ReplacementState::Original);
        assert!(!task.sidecar.exists());
    }

    #[test]
    fn rewrite_failure_leaves_sidecar_for_recovery() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("a.txt");
        let original = b"keep\r\nme\r\n".to_vec();
        fs::write(&path, &original).expect("write");

        let task = FileTask::new(path.clone());
        let mut replacer = FileReplacer::new(&task);
        replacer.create_backup().expect("backup");

        // A directory where the file was cannot be opened for writing.
        fs::remove_file(&path).expect("remove original");
        fs::create_dir(&path).expect("mkdir in its place");

        let err = replacer.rewrite(&lf()).expect_err("should fail");
        assert!(matches!(err, FixEolError::Rewrite { .. }));
        assert_eq!(err.exit_code(), 101);
        assert_eq!(replacer.state(), ReplacementState::BackupCreated);
        assert_eq!(fs::read(&task.sidecar).expect("read sidecar"), original);
    }

    #[test]
    fn missing_sidecar_fails_in_cleanup_stage() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("a.txt");
        fs::write(&path, b"a\n").expect("write");

        let task = FileTask::new(path);
        let mut replacer = FileReplacer::new(&task);
        replacer.create_backup().expect("backup");
        replacer.rewrite(&lf()).expect("rewrite");
        fs::remove_file(&task.sidecar).expect("remove sidecar");

        let err = replacer.finalize(false).expect_err("should fail");
        assert_eq!(err.exit_code(), 102);
        assert_eq!(replacer.state(), ReplacementState::Rewritten);
    }

    #[test]
    fn states_are_ordered() {
        assert!(ReplacementState::Original < ReplacementState::BackupCreated);
        assert!(ReplacementState::Rewritten < ReplacementState::Finalized);
    }
}
