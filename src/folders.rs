//! Well-known folder lookup
//!
//! Resolves shell folder ids (CSIDL values) to paths on Windows. Other
//! targets have no such registry and always get `None`, so callers can use
//! the same code everywhere and fall back to their own defaults.

use std::path::PathBuf;

/// Shell folder id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SpecialFolder {
    Desktop = 0x0000,
    Documents = 0x0005,
    AppData = 0x001a,
    LocalAppData = 0x001c,
    CommonAppData = 0x0023,
    Windows = 0x0024,
    System = 0x0025,
    ProgramFiles = 0x0026,
    Profile = 0x0028,
}

impl SpecialFolder {
    pub fn csidl(&self) -> i32 {
        *self as i32
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "desktop" => Some(Self::Desktop),
            "documents" | "personal" => Some(Self::Documents),
            "appdata" | "roaming" => Some(Self::AppData),
            "localappdata" | "local" => Some(Self::LocalAppData),
            "commonappdata" | "programdata" => Some(Self::CommonAppData),
            "windows" => Some(Self::Windows),
            "system" => Some(Self::System),
            "programfiles" => Some(Self::ProgramFiles),
            "profile" | "home" => Some(Self::Profile),
            _ => None,
        }
    }
}

/// Whether to report the folder's current or default location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum FolderFlag {
    #[default]
    Current = 0,
    Default = 1,
}

/// Path of a well-known folder, `None` if the OS cannot resolve it
#[cfg(windows)]
pub fn special_folder_path(folder: SpecialFolder, flag: FolderFlag) -> Option<PathBuf> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;

    use windows::Win32::Foundation::{HANDLE, HWND, MAX_PATH};
    use windows::Win32::UI::Shell::SHGetFolderPathW;

    let mut buffer = [0u16; MAX_PATH as usize];
    unsafe {
        SHGetFolderPathW(
            HWND::default(),
            folder.csidl(),
            HANDLE::default(),
            flag as u32,
            &mut buffer,
        )
        .ok()?;
    }

    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    if len == 0 {
        return None;
    }
    Some(PathBuf::from(OsString::from_wide(&buffer[..len])))
}

/// Path of a well-known folder, `None` if the OS cannot resolve it
#[cfg(not(windows))]
pub fn special_folder_path(_folder: SpecialFolder, _flag: FolderFlag) -> Option<PathBuf> {
    None
}

/// Whether this build targets macOS
pub fn is_macos() -> bool {
    cfg!(target_os = "macos")
}
