//! # Driver Glue
//!
//! The thin layer between the translation cores and the filesystem:
//! collecting input files, deriving output names, and writing outputs
//! atomically. All three binaries share it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

/// Collect the input files for a tool: the path itself if it is a file, or
/// every `extension` file directly inside it (non-recursive) if it is a
/// directory. Directory entries are sorted so output is deterministic.
pub fn collect_inputs(path: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)?
            .collect::<io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|p| {
                p.is_file() && p.extension().and_then(|e| e.to_str()) == Some(extension)
            })
            .collect();
        files.sort();
        Ok(files)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

/// Replace the input's extension: `Prog.asm` -> `Prog.hack`.
pub fn output_path(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

/// Output path for a directory translation: `D/` -> `D/D.asm`.
pub fn directory_output_path(dir: &Path, extension: &str) -> PathBuf {
    let stem = dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "out".into());
    let mut name = PathBuf::from(stem);
    name.set_extension(extension);
    dir.join(name)
}

/// The file stem used to scope VM `static` symbols and generated labels.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("out")
        .to_string()
}

/// Write `contents` to `path` via a temporary file in the same directory,
/// renaming into place on success. A failed translation never leaves a
/// truncated output behind.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    info!("wrote {}", path.display());
    Ok(())
}
