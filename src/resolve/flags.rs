//! Include search path construction.
//!
//! Arduino libraries are frequently laid out with nested source
//! directories (`Wire/utility/`, `SD/src/utility/`, ...) that the
//! compiler has to see without any per-library configuration. For each
//! library this module emits the library's own directory plus every
//! subdirectory that directly contains header or source files.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const HEADER_EXTS: &[&str] = &["h", "hpp", "hh", "hxx"];
const SOURCE_EXTS: &[&str] = &["c", "cpp", "cc", "cxx", "ino", "pde", "S"];

/// True for `.h`/`.hpp`-style files.
pub fn is_header(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| HEADER_EXTS.contains(&e.to_string_lossy().as_ref()))
}

/// True for compilable translation units, including raw sketches.
pub fn is_source(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| SOURCE_EXTS.contains(&e.to_string_lossy().as_ref()))
}

fn dir_has_code(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                let p = e.path();
                p.is_file() && (is_header(&p) || is_source(&p))
            })
        })
        .unwrap_or(false)
}

/// All directories under `lib` that the compiler must search: the
/// library root first, then nested code directories in lexicographic
/// order. An unreadable subtree simply contributes nothing.
pub fn header_dirs(lib: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![lib.to_path_buf()];

    for entry in WalkDir::new(lib)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_dir() && dir_has_code(entry.path()) {
            dirs.push(entry.path().to_path_buf());
        }
    }

    dirs
}

/// Render `-I` flags for a sequence of library directories, keeping the
/// input order and each library's own subdirectories contiguous.
pub fn include_flags<P: AsRef<Path>>(libs: &[P]) -> Vec<String> {
    libs.iter()
        .flat_map(|lib| header_dirs(lib.as_ref()))
        .map(|dir| format!("-I{}", dir.display()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_header_dirs_includes_nested_utility() {
        let temp = tempfile::tempdir().unwrap();
        let wire = temp.path().join("Wire");
        fs::create_dir_all(wire.join("utility")).unwrap();
        fs::write(wire.join("Wire.h"), "").unwrap();
        fs::write(wire.join("utility").join("twi.h"), "").unwrap();

        let dirs = header_dirs(&wire);
        assert_eq!(dirs, vec![wire.clone(), wire.join("utility")]);
    }

    #[test]
    fn test_header_dirs_skips_dirs_without_code() {
        let temp = tempfile::tempdir().unwrap();
        let lib = temp.path().join("Servo");
        fs::create_dir_all(lib.join("docs")).unwrap();
        fs::write(lib.join("Servo.h"), "").unwrap();
        fs::write(lib.join("docs").join("notes.txt"), "").unwrap();

        let dirs = header_dirs(&lib);
        assert_eq!(dirs, vec![lib.clone()]);
    }

    #[test]
    fn test_header_dirs_root_listed_even_when_empty() {
        let temp = tempfile::tempdir().unwrap();
        let lib = temp.path().join("Empty");
        fs::create_dir_all(&lib).unwrap();

        assert_eq!(header_dirs(&lib), vec![lib]);
    }

    #[test]
    fn test_include_flags_preserve_library_order() {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("A");
        let b = temp.path().join("B");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("A.h"), "").unwrap();
        fs::write(b.join("B.h"), "").unwrap();

        let flags = include_flags(&[&b, &a]);
        assert_eq!(
            flags,
            vec![format!("-I{}", b.display()), format!("-I{}", a.display())]
        );
    }

    #[test]
    fn test_nested_dirs_are_lexicographic() {
        let temp = tempfile::tempdir().unwrap();
        let lib = temp.path().join("Multi");
        for sub in ["zeta", "alpha", "midway"] {
            fs::create_dir_all(lib.join(sub)).unwrap();
            fs::write(lib.join(sub).join("x.h"), "").unwrap();
        }

        let dirs = header_dirs(&lib);
        assert_eq!(
            dirs,
            vec![
                lib.clone(),
                lib.join("alpha"),
                lib.join("midway"),
                lib.join("zeta")
            ]
        );
    }
}
