//! Path helpers for compiled binaries and the indirection layer

use std::path::{Path, PathBuf};

/// Translate a host path into the form seen inside the indirection layer
///
/// `C:\work\leak.c` becomes `/mnt/c/work/leak.c`. Paths without a drive
/// letter only have their separators normalised.
pub fn to_indirection_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let bytes = normalized.as_bytes();

    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let drive = (bytes[0] as char).to_ascii_lowercase();
        let rest = &normalized[2..];
        if rest.starts_with('/') || rest.is_empty() {
            return format!("/mnt/{}{}", drive, rest);
        }
        return format!("/mnt/{}/{}", drive, rest);
    }

    normalized
}

/// Whether the path names a C source file
pub fn is_c_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "c")
}

/// Where the compiled binary for `source` goes when no path was chosen
///
/// The `.c` extension is dropped; `windows_direct` appends `.exe` for a
/// compiler running natively on a Windows host.
pub fn default_binary_path(source: &Path, windows_direct: bool) -> PathBuf {
    let stem = if is_c_source(source) {
        source.with_extension("")
    } else {
        source.to_path_buf()
    };

    if windows_direct {
        stem.with_extension("exe")
    } else {
        stem
    }
}

/// A path the child can execute: bare file names get a `./` prefix
pub fn executable_arg(path: &Path) -> PathBuf {
    if path.is_absolute() || path.parent().is_some_and(|p| !p.as_os_str().is_empty()) {
        path.to_path_buf()
    } else {
        Path::new(".").join(path)
    }
}
