//! Native Win32 backend
//!
//! Resolves standard descriptors with `GetStdHandle` and answers file-type,
//! pipe-name and console-mode queries through the Win32 API.

use std::ffi::c_void;
use std::io;
use std::mem::size_of;

use windows::Win32::Foundation::{HANDLE, MAX_PATH};
use windows::Win32::Storage::FileSystem::{
    FileNameInfo, GetFileInformationByHandleEx, GetFileType, FILE_NAME_INFO, FILE_TYPE_CHAR,
    FILE_TYPE_DISK, FILE_TYPE_PIPE,
};
use windows::Win32::System::Console::{
    GetConsoleMode, GetStdHandle, SetConsoleMode, CONSOLE_MODE, STD_ERROR_HANDLE,
    STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};

use super::{Backend, Fd, FileKind, OutputMode};

/// Win32 console backend
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsBackend;

impl WindowsBackend {
    pub fn new() -> Self {
        Self
    }

    /// Map a descriptor to its OS handle.
    ///
    /// Only the three standard descriptors resolve. Looking up arbitrary
    /// descriptors in the C runtime table triggers its invalid-parameter
    /// handler on closed slots, which terminates the process.
    fn resolve(fd: Fd) -> Option<HANDLE> {
        let which = match fd {
            0 => STD_INPUT_HANDLE,
            1 => STD_OUTPUT_HANDLE,
            2 => STD_ERROR_HANDLE,
            _ => return None,
        };

        let handle = unsafe { GetStdHandle(which) }.ok()?;
        if handle.is_invalid() || handle == HANDLE::default() {
            return None;
        }
        Some(handle)
    }

    /// Type of the object behind an already resolved handle
    fn kind_of(handle: HANDLE) -> FileKind {
        let kind = unsafe { GetFileType(handle) };
        if kind == FILE_TYPE_PIPE {
            FileKind::Pipe
        } else if kind == FILE_TYPE_CHAR {
            FileKind::Char
        } else if kind == FILE_TYPE_DISK {
            FileKind::Disk
        } else {
            FileKind::Unknown
        }
    }

    /// Name of the object behind an already resolved handle
    fn name_of(handle: HANDLE) -> Option<String> {
        let units = Self::object_name(handle)?;
        Some(String::from_utf16_lossy(&units))
    }

    /// Read the name of the object behind `handle` as UTF-16 units
    fn object_name(handle: HANDLE) -> Option<Vec<u16>> {
        // FILE_NAME_INFO already holds one WCHAR; room for MAX_PATH units
        // plus a terminator.
        let size = size_of::<FILE_NAME_INFO>() + size_of::<u16>() * (MAX_PATH as usize);
        // u32 storage keeps the FileNameLength field aligned
        let mut buffer = vec![0u32; (size + size_of::<u32>() - 1) / size_of::<u32>()];
        let byte_len = buffer.len() * size_of::<u32>();

        unsafe {
            GetFileInformationByHandleEx(
                handle,
                FileNameInfo,
                buffer.as_mut_ptr() as *mut c_void,
                byte_len as u32,
            )
            .ok()?;

            let info = buffer.as_ptr() as *const FILE_NAME_INFO;
            let capacity = (byte_len - size_of::<u32>()) / size_of::<u16>();
            let units = ((*info).FileNameLength as usize / size_of::<u16>()).min(capacity);
            let name = std::ptr::addr_of!((*info).FileName) as *const u16;
            Some(std::slice::from_raw_parts(name, units).to_vec())
        }
    }
}

/// Unwrap a Win32 error code from its HRESULT form
fn os_error(err: windows::core::Error) -> io::Error {
    let code = err.code().0 as u32;
    if code & 0xFFFF_0000 == 0x8007_0000 {
        io::Error::from_raw_os_error((code & 0xFFFF) as i32)
    } else {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

impl Backend for WindowsBackend {
    fn has_console_api(&self) -> bool {
        true
    }

    fn file_kind(&self, fd: Fd) -> FileKind {
        match Self::resolve(fd) {
            Some(handle) => Self::kind_of(handle),
            None => FileKind::Invalid,
        }
    }

    fn pipe_name(&self, fd: Fd) -> Option<String> {
        Self::name_of(Self::resolve(fd)?)
    }

    fn is_terminal(&self, fd: Fd) -> bool {
        // GetConsoleMode fails on anything that is not a console buffer
        self.output_mode(fd).is_ok()
    }

    fn output_mode(&self, fd: Fd) -> io::Result<OutputMode> {
        let handle = Self::resolve(fd).ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;

        let mut mode = CONSOLE_MODE(0);
        unsafe {
            GetConsoleMode(handle, &mut mode).map_err(os_error)?;
        }
        Ok(OutputMode::from_bits_retain(mode.0))
    }

    fn set_output_mode(&self, fd: Fd, mode: OutputMode) -> io::Result<()> {
        let handle = Self::resolve(fd).ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;

        unsafe {
            SetConsoleMode(handle, CONSOLE_MODE(mode.bits())).map_err(os_error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::pipe_name;
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::Storage::FileSystem::PIPE_ACCESS_INBOUND;
    use windows::Win32::System::Pipes::{CreateNamedPipeW, PIPE_TYPE_BYTE};

    /// Create the server end of `\\.\pipe<name>`
    fn create_pipe(name: &str) -> HANDLE {
        let path: Vec<u16> = format!("\\\\.\\pipe{}", name)
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();
        unsafe {
            CreateNamedPipeW(
                PCWSTR(path.as_ptr()),
                PIPE_ACCESS_INBOUND,
                PIPE_TYPE_BYTE,
                1,
                0,
                0,
                0,
                None,
            )
        }
    }

    #[test]
    fn test_named_pipe_names() {
        let pid = std::process::id();
        let cases = [
            (format!("\\cygwin-{:016x}-pty3-from-master", pid), true),
            (format!("\\msys-{:016x}-pty0-to-master", pid), true),
            (format!("\\pastel-term-test-{}", pid), false),
        ];

        for (name, is_pty) in cases {
            let server = create_pipe(&name);
            assert!(!server.is_invalid(), "failed to create {}", name);

            assert_eq!(WindowsBackend::kind_of(server), FileKind::Pipe);
            let reported = WindowsBackend::name_of(server).unwrap();
            assert!(reported.eq_ignore_ascii_case(&name), "{} != {}", reported, name);
            assert_eq!(pipe_name::parse(&reported).is_some(), is_pty, "{}", reported);

            unsafe {
                let _ = CloseHandle(server);
            }
        }
    }

    #[test]
    fn test_long_pipe_name_is_clamped() {
        // Longer than MAX_PATH; the query either fails or is cut to the buffer
        let name = format!("\\pastel-{}-{}", std::process::id(), "x".repeat(300));
        let server = create_pipe(&name);
        if !server.is_invalid() {
            if let Some(reported) = WindowsBackend::name_of(server) {
                assert!(reported.encode_utf16().count() <= MAX_PATH as usize);
                assert!(pipe_name::parse(&reported).is_none());
            }
            unsafe {
                let _ = CloseHandle(server);
            }
        }
    }

    #[test]
    fn test_out_of_range_descriptor_is_invalid() {
        let backend = WindowsBackend::new();
        assert_eq!(backend.file_kind(-1), FileKind::Invalid);
        assert_eq!(backend.file_kind(7), FileKind::Invalid);
        assert!(backend.pipe_name(7).is_none());
        assert!(backend.output_mode(7).is_err());
    }

    #[test]
    fn test_os_error_unwraps_win32_code() {
        // ERROR_INVALID_HANDLE
        let err = windows::core::Error::from(windows::core::HRESULT(0x8007_0006u32 as i32));
        assert_eq!(os_error(err).raw_os_error(), Some(6));
    }

    #[test]
    fn test_standard_streams_do_not_panic() {
        let backend = WindowsBackend::new();
        for fd in crate::sys::STANDARD_STREAMS {
            let kind = backend.file_kind(fd);
            // Only pipes carry a name worth parsing
            if kind != FileKind::Pipe {
                assert!(!crate::probe::Probe::with_backend(backend).is_emulated_pty(fd));
            }
            // A console buffer always answers the mode query
            if kind == FileKind::Invalid {
                assert!(!backend.is_terminal(fd));
            }
        }
    }
}
