//! Finds the engine module shipped alongside the plug-in binary.
//!
//! Plug-ins are loaded from arbitrary bundle directories, so the engine is
//! resolved relative to the module that contains this code rather than through
//! the system library search path.

use std::path::{Path, PathBuf};

use crate::error::LocatorError;

/// File name of the engine module expected next to the plug-in binary.
#[cfg(target_os = "macos")]
pub const ENGINE_MODULE_FILENAME: &str = "sunvox.dylib";
#[cfg(windows)]
pub const ENGINE_MODULE_FILENAME: &str = "sunvox.dll";
#[cfg(not(any(target_os = "macos", windows)))]
pub const ENGINE_MODULE_FILENAME: &str = "sunvox.so";

/// Resolve the engine module path from the location of the running binary.
pub fn engine_library_path() -> Result<PathBuf, LocatorError> {
    let own = own_module_path()?;
    let path = sibling_library_path(&own);
    log::debug!(
        "resolved engine module {} from {}",
        path.display(),
        own.display()
    );
    Ok(path)
}

/// Replace the file name of `own` with [`ENGINE_MODULE_FILENAME`].
///
/// A bare file name without any directory component resolves to
/// `./<module-filename>`.
pub fn sibling_library_path(own: &Path) -> PathBuf {
    match own.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(ENGINE_MODULE_FILENAME),
        _ => Path::new(".").join(ENGINE_MODULE_FILENAME),
    }
}

#[cfg(unix)]
fn own_module_path() -> Result<PathBuf, LocatorError> {
    use std::ffi::{CStr, OsStr};
    use std::os::unix::ffi::OsStrExt;

    let address = own_module_path as fn() -> Result<PathBuf, LocatorError> as *const libc::c_void;
    // SAFETY: `dladdr` only inspects the loader's tables for `address`, which is
    // a function inside the image currently executing.
    let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };
    if unsafe { libc::dladdr(address, &mut info) } == 0 || info.dli_fname.is_null() {
        return Err(LocatorError::CannotResolveOwnPath);
    }

    // SAFETY: non-null `dli_fname` points at a NUL-terminated string owned by the loader.
    let name = unsafe { CStr::from_ptr(info.dli_fname) }.to_bytes();
    if name.is_empty() {
        return Err(LocatorError::CannotResolveOwnPath);
    }
    Ok(PathBuf::from(OsStr::from_bytes(name)))
}

#[cfg(not(unix))]
fn own_module_path() -> Result<PathBuf, LocatorError> {
    Err(LocatorError::CannotResolveOwnPath)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_path_keeps_directory() {
        let own = Path::new("/usr/lib/clap/sunbox.clap");
        let resolved = sibling_library_path(own);
        assert_eq!(resolved.parent(), own.parent());
        assert_eq!(
            resolved.file_name().and_then(|name| name.to_str()),
            Some(ENGINE_MODULE_FILENAME)
        );
    }

    #[test]
    fn relative_directories_are_preserved() {
        let resolved = sibling_library_path(Path::new("plugins/sunbox.so"));
        assert_eq!(resolved, Path::new("plugins").join(ENGINE_MODULE_FILENAME));
    }

    #[test]
    fn bare_file_name_falls_back_to_current_directory() {
        let resolved = sibling_library_path(Path::new("sunbox.so"));
        assert_eq!(resolved, Path::new(".").join(ENGINE_MODULE_FILENAME));
        assert_eq!(
            resolved.to_string_lossy(),
            format!("./{ENGINE_MODULE_FILENAME}")
        );
    }

    #[test]
    fn root_level_binary_resolves_to_root() {
        let resolved = sibling_library_path(Path::new("/sunbox.so"));
        assert_eq!(resolved, Path::new("/").join(ENGINE_MODULE_FILENAME));
    }

    #[test]
    fn resolved_path_names_the_engine_module() {
        // The main executable may report an empty image name on some loaders.
        if let Ok(resolved) = engine_library_path() {
            assert_eq!(
                resolved.file_name().and_then(|name| name.to_str()),
                Some(ENGINE_MODULE_FILENAME)
            );
        }
    }
}
