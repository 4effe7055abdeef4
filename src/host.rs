//! The syscall bridge's host boundary (spec.md §4.7).
//!
//! `spec.md` §1 keeps "the syscall-to-host bridge" out of scope: the
//! interpreter only needs to know the *shape* of the capability, not how it
//! is actually backed. That shape is this trait — grounded on the teacher's
//! `InterpreterStorage` (`examples/FuelLabs-fuel-vm/src/data.rs`), which the
//! interpreter is generic over in exactly the same way. [`NativeHost`] is
//! the one production implementation, backed by `std::fs`/`std::io`; a test
//! can swap in an in-memory one without touching the interpreter.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};

use crate::consts::FD_TABLE_MIN_SIZE;

/// One file-descriptor slot (spec.md §3 "File-descriptor table").
enum FdSlot {
    Stdin,
    Stdout,
    Stderr,
    File(File),
}

/// Host-provided I/O capabilities the syscall bridge dispatches to.
///
/// Every method already folds host-level failure into the bytecode-visible
/// `-1`/error convention spec.md §4.7 describes ("open/close/read/write
/// should surface -1 on the stack rather than fault") — there is
/// deliberately no `Result` here, since a `HostIoFault` is reserved for
/// failures the caller truly has no path to observe (spec.md §7), which
/// none of these do.
pub trait Host {
    /// Open `path` (a NUL-terminated or whole byte slice) under `mode`
    /// (`'r'`, `'w'`, `'a'`, `'b'`), returning a new fd or `-1`.
    fn open(&mut self, path: &[u8], mode: u8) -> i32;
    /// Read up to `buf.len()` bytes from `fd`, returning the count read or
    /// `-1`.
    fn read(&mut self, fd: i32, buf: &mut [u8]) -> i32;
    /// Write `buf` to `fd`, returning the count written or `-1`.
    fn write(&mut self, fd: i32, buf: &[u8]) -> i32;
    /// Close `fd`, freeing its slot. Returns `0` or `-1`.
    fn close(&mut self, fd: i32) -> i32;
    /// Whether `fd` refers to an interactive terminal.
    fn is_tty(&self, fd: i32) -> bool;
    /// The host's Unix timestamp, in seconds.
    fn unix_time(&self) -> i64;
    /// The host process id.
    fn pid(&self) -> i32;
    /// The current working directory's path bytes, or `None` on failure.
    fn getcwd(&self) -> Option<Vec<u8>>;
    /// Change the current working directory. Returns `0` or `-1`.
    fn chdir(&mut self, path: &[u8]) -> i32;
    /// Rename `from` to `to`. Returns `0` or `-1`.
    fn rename(&mut self, from: &[u8], to: &[u8]) -> i32;
    /// Remove the file at `path`. Returns `0` or `-1`.
    fn unlink(&mut self, path: &[u8]) -> i32;
    /// Create the directory at `path`. Returns `0` or `-1`.
    fn mkdir(&mut self, path: &[u8]) -> i32;
    /// Reposition `fd`'s offset. `whence` is the POSIX convention (0 =
    /// start, 1 = current, 2 = end). Returns the new offset or `-1`.
    fn lseek(&mut self, fd: i32, offset: i32, whence: i32) -> i32;
    /// Stat the file at `path`, returning `(size, is_dir)` or `None`.
    fn stat(&self, path: &[u8]) -> Option<(u32, bool)>;
    /// Stat the open file at `fd`, returning `(size, is_dir)` or `None`.
    fn fstat(&self, fd: i32) -> Option<(u32, bool)>;
}

/// `Host` backed by the real process: `std::fs` for file I/O, a bounded
/// fd table with slots 0/1/2 pre-bound to stdin/stdout/stderr (spec.md §3).
pub struct NativeHost {
    fds: Vec<Option<FdSlot>>,
}

impl Default for NativeHost {
    fn default() -> Self {
        let mut fds = Vec::with_capacity(FD_TABLE_MIN_SIZE);
        fds.push(Some(FdSlot::Stdin));
        fds.push(Some(FdSlot::Stdout));
        fds.push(Some(FdSlot::Stderr));
        fds.resize_with(FD_TABLE_MIN_SIZE, || None);
        Self { fds }
    }
}

impl NativeHost {
    /// A host with a fresh, all-standard-streams-only fd table.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_fd(&mut self, slot: FdSlot) -> i32 {
        match self.fds.iter().position(|s| s.is_none()) {
            Some(idx) => {
                self.fds[idx] = Some(slot);
                idx as i32
            }
            None => -1,
        }
    }
}

/// Interpret a CHAR array's bytes as a filesystem path: stop at the first
/// NUL, or use the whole slice if there isn't one (spec.md S6 encodes
/// `"test.txt\0"`, but nothing requires the terminator).
fn path_from_bytes(bytes: &[u8]) -> std::path::PathBuf {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned().into()
}

fn stat_metadata(meta: std::io::Result<std::fs::Metadata>) -> Option<(u32, bool)> {
    let meta = meta.ok()?;
    Some((meta.len() as u32, meta.is_dir()))
}

impl Host for NativeHost {
    fn open(&mut self, path: &[u8], mode: u8) -> i32 {
        let path = path_from_bytes(path);
        let opened = match mode {
            b'r' | b'b' => OpenOptions::new().read(true).open(&path),
            b'w' => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path),
            b'a' => OpenOptions::new().append(true).create(true).open(&path),
            _ => return -1,
        };
        match opened {
            Ok(file) => self.alloc_fd(FdSlot::File(file)),
            Err(_) => -1,
        }
    }

    fn read(&mut self, fd: i32, buf: &mut [u8]) -> i32 {
        let Some(Some(slot)) = self.fds.get_mut(fd as usize).filter(|_| fd >= 0) else {
            return -1;
        };
        let result = match slot {
            FdSlot::Stdin => std::io::stdin().read(buf),
            FdSlot::Stdout | FdSlot::Stderr => return -1,
            FdSlot::File(file) => file.read(buf),
        };
        result.map(|n| n as i32).unwrap_or(-1)
    }

    fn write(&mut self, fd: i32, buf: &[u8]) -> i32 {
        let Some(Some(slot)) = self.fds.get_mut(fd as usize).filter(|_| fd >= 0) else {
            return -1;
        };
        let result = match slot {
            FdSlot::Stdin => return -1,
            FdSlot::Stdout => std::io::stdout().write(buf),
            FdSlot::Stderr => std::io::stderr().write(buf),
            FdSlot::File(file) => file.write(buf),
        };
        result.map(|n| n as i32).unwrap_or(-1)
    }

    fn close(&mut self, fd: i32) -> i32 {
        if fd < 3 {
            return -1; // standard streams are never released
        }
        match self.fds.get_mut(fd as usize) {
            Some(slot @ Some(_)) => {
                *slot = None;
                0
            }
            _ => -1,
        }
    }

    fn is_tty(&self, fd: i32) -> bool {
        use std::io::IsTerminal;
        match self.fds.get(fd as usize) {
            Some(Some(FdSlot::Stdin)) => std::io::stdin().is_terminal(),
            Some(Some(FdSlot::Stdout)) => std::io::stdout().is_terminal(),
            Some(Some(FdSlot::Stderr)) => std::io::stderr().is_terminal(),
            _ => false,
        }
    }

    fn unix_time(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    fn pid(&self) -> i32 {
        std::process::id() as i32
    }

    fn getcwd(&self) -> Option<Vec<u8>> {
        std::env::current_dir()
            .ok()
            .map(|p| p.to_string_lossy().into_owned().into_bytes())
    }

    fn chdir(&mut self, path: &[u8]) -> i32 {
        match std::env::set_current_dir(path_from_bytes(path)) {
            Ok(()) => 0,
            Err(_) => -1,
        }
    }

    fn rename(&mut self, from: &[u8], to: &[u8]) -> i32 {
        match std::fs::rename(path_from_bytes(from), path_from_bytes(to)) {
            Ok(()) => 0,
            Err(_) => -1,
        }
    }

    fn unlink(&mut self, path: &[u8]) -> i32 {
        match std::fs::remove_file(path_from_bytes(path)) {
            Ok(()) => 0,
            Err(_) => -1,
        }
    }

    fn mkdir(&mut self, path: &[u8]) -> i32 {
        match std::fs::create_dir(path_from_bytes(path)) {
            Ok(()) => 0,
            Err(_) => -1,
        }
    }

    fn lseek(&mut self, fd: i32, offset: i32, whence: i32) -> i32 {
        use std::io::{Seek, SeekFrom};
        let Some(Some(FdSlot::File(file))) = self.fds.get_mut(fd as usize).filter(|_| fd >= 0)
        else {
            return -1;
        };
        let from = match whence {
            0 => SeekFrom::Start(offset.max(0) as u64),
            1 => SeekFrom::Current(offset as i64),
            2 => SeekFrom::End(offset as i64),
            _ => return -1,
        };
        file.seek(from).map(|pos| pos as i32).unwrap_or(-1)
    }

    fn stat(&self, path: &[u8]) -> Option<(u32, bool)> {
        stat_metadata(std::fs::metadata(path_from_bytes(path)))
    }

    fn fstat(&self, fd: i32) -> Option<(u32, bool)> {
        match self.fds.get(fd as usize) {
            Some(Some(FdSlot::File(file))) => stat_metadata(file.metadata()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_streams_cannot_be_closed() {
        let mut host = NativeHost::new();
        assert_eq!(host.close(0), -1);
        assert_eq!(host.close(1), -1);
        assert_eq!(host.close(2), -1);
    }

    #[test]
    fn closing_unopened_fd_fails() {
        let mut host = NativeHost::new();
        assert_eq!(host.close(3), -1);
    }

    #[test]
    fn file_round_trips_through_write_and_read() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("stackvm-host-test-{}.txt", std::process::id()));
        let path_bytes = path.to_string_lossy().into_owned().into_bytes();

        let mut host = NativeHost::new();
        let fd = host.open(&path_bytes, b'w');
        assert!(fd >= 3);
        assert_eq!(host.write(fd, b"hello"), 5);
        assert_eq!(host.close(fd), 0);

        let fd = host.open(&path_bytes, b'r');
        assert!(fd >= 3);
        let mut buf = [0u8; 16];
        let n = host.read(fd, &mut buf);
        assert_eq!(&buf[..n as usize], b"hello");
        assert_eq!(host.close(fd), 0);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn path_from_bytes_stops_at_nul() {
        assert_eq!(path_from_bytes(b"a.txt\0garbage"), std::path::PathBuf::from("a.txt"));
    }
}
