//! Filesystem writes used by the executor and the manifest.

use crate::error::{Error, Result};
use std::{
    fs, io,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::trace;

/// Writes a file atomically.
///
/// # Process
///
/// 1. Writes content to a uniquely named temporary file next to the target
/// 2. Syncs the temporary file to disk
/// 3. Renames the temporary file onto the target path
///
/// An interrupted write never leaves a half-written target behind, and
/// concurrent writers to the same target each get their own temporary file:
/// the last rename wins.
pub(crate) fn write_file_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let mut temp_file = temp_file_for(path)?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_file.path(), e))?;

    persist(temp_file, path)?;

    trace!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Copies `src` onto `dest` through a temporary file, like [`write_file_atomic`].
fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64> {
    let mut reader = fs::File::open(src).map_err(|e| Error::io(src, e))?;
    let mut temp_file = temp_file_for(dest)?;

    let bytes = io::copy(&mut reader, &mut temp_file).map_err(|e| Error::io(src, e))?;

    persist(temp_file, dest)?;
    Ok(bytes)
}

fn temp_file_for(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    tempfile::Builder::new()
        .prefix(".mdport-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| Error::io(path, e))
}

fn persist(temp_file: NamedTempFile, path: &Path) -> Result<()> {
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| Error::io(temp_file.path(), e))?;

    temp_file
        .persist(path)
        .map_err(|e| Error::io(path, e.error))?;

    Ok(())
}

/// Lists the sibling assets of `exclude` in `src_dir`.
///
/// Only regular files count; the excluded file and anything ending in `.md`
/// are left out. Paths come back in directory order.
pub(crate) fn sibling_assets(src_dir: &Path, exclude: &str) -> Result<Vec<PathBuf>> {
    let mut assets = Vec::new();

    for entry in fs::read_dir(src_dir).map_err(|e| Error::io(src_dir, e))? {
        let entry = entry.map_err(|e| Error::io(src_dir, e))?;
        let is_file = entry
            .file_type()
            .map_err(|e| Error::io(entry.path(), e))?
            .is_file();
        let name = entry.file_name().to_string_lossy().into_owned();

        if is_file && name != exclude && !name.ends_with(".md") {
            assets.push(entry.path());
        }
    }

    Ok(assets)
}

/// Copies every sibling asset of `exclude` byte for byte into `out_dir`.
///
/// Returns the destination paths.
pub(crate) fn copy_sibling_assets(
    src_dir: &Path,
    out_dir: &Path,
    exclude: &str,
) -> Result<Vec<PathBuf>> {
    sibling_assets(src_dir, exclude)?
        .into_iter()
        .map(|src_path| {
            let name = src_path
                .file_name()
                .ok_or_else(|| Error::config("Invalid asset path"))?;
            let dest_path = out_dir.join(name);
            let bytes = copy_file_atomic(&src_path, &dest_path)?;
            trace!(
                "Copied {} -> {} ({} bytes)",
                src_path.display(),
                dest_path.display(),
                bytes
            );
            Ok(dest_path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_write_file_atomic() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("index.md");

        write_file_atomic(target.path(), b"first").unwrap();
        write_file_atomic(target.path(), b"second").unwrap();

        assert_eq!(fs::read_to_string(target.path()).unwrap(), "second");
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_concurrent_writes_to_same_target() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("index.md");
        let first = vec![b'a'; 1 << 20];
        let second = vec![b'b'; 1 << 20];

        for _ in 0..10 {
            std::thread::scope(|scope| {
                let a = scope.spawn(|| write_file_atomic(target.path(), &first));
                let b = scope.spawn(|| write_file_atomic(target.path(), &second));
                a.join().unwrap().unwrap();
                b.join().unwrap().unwrap();
            });

            let written = fs::read(target.path()).unwrap();
            assert!(written == first || written == second);
        }

        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_file_atomic_missing_dir() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("missing/index.md");

        let err = write_file_atomic(target.path(), b"x").unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_copy_sibling_assets() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("src");
        src.child("index.md").write_str("# post").unwrap();
        src.child("notes.md").write_str("# other").unwrap();
        src.child("photo.png").write_binary(&[0x89, 0x50, 0x4e, 0x47, 0, 1]).unwrap();
        src.child("data.json").write_str("{}").unwrap();
        src.child("nested/deep.png").write_binary(&[1, 2, 3]).unwrap();
        let out = temp.child("out");
        out.create_dir_all().unwrap();

        let mut copied = copy_sibling_assets(src.path(), out.path(), "index.md").unwrap();
        copied.sort();

        assert_eq!(
            copied,
            vec![out.path().join("data.json"), out.path().join("photo.png")]
        );
        assert_eq!(
            fs::read(out.child("photo.png").path()).unwrap(),
            [0x89_u8, 0x50, 0x4e, 0x47, 0, 1]
        );
        assert!(!out.child("index.md").exists());
        assert!(!out.child("notes.md").exists());
        assert!(!out.child("nested").exists());
    }

    #[test]
    fn test_sibling_assets_matches_copy() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("index.md").write_str("# post").unwrap();
        temp.child("cover.jpg").write_binary(&[1]).unwrap();

        let assets = sibling_assets(temp.path(), "index.md").unwrap();
        assert_eq!(assets, vec![temp.path().join("cover.jpg")]);
    }
}
