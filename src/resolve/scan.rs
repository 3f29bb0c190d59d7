//! Header reference scanning.
//!
//! Pure textual include extraction over a directory of sources. The
//! scanner follows resolved includes into the headers they name, so a
//! sketch that includes a header which itself includes another
//! library's header pulls both libraries in (multi-hop resolution).
//! Include names resolve the way a compiler `-I` search would: first
//! relative to the including file, then through every candidate
//! library's include directories in order.

use regex::Regex;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::ResolveError;
use super::flags::{header_dirs, is_header, is_source};

/// One library directory from the search roots, with its include
/// directories precomputed once per resolution run.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub dir: PathBuf,
    pub include_dirs: Vec<PathBuf>,
}

impl Candidate {
    pub(crate) fn new(dir: PathBuf) -> Self {
        let include_dirs = header_dirs(&dir);
        Self { dir, include_dirs }
    }
}

/// Result of scanning one target directory. `libs` is a set in spirit:
/// deduplicated, discovery-ordered, with no ordering guarantee exposed.
#[derive(Debug, Default)]
pub(crate) struct ScanOutcome {
    pub libs: Vec<PathBuf>,
    pub unreadable: Vec<PathBuf>,
}

/// Scan `target` and report which candidate libraries its sources
/// reference, directly or through resolved include chains. Fails only
/// if `target` itself cannot be listed; unreadable files inside it are
/// collected and skipped.
pub(crate) fn scan_references(
    target: &Path,
    candidates: &[Candidate],
) -> Result<ScanOutcome, ResolveError> {
    // Readability of the target is the only fatal condition here.
    fs::read_dir(target).map_err(|e| ResolveError::FileAccess(target.to_path_buf(), e))?;

    let include_re = Regex::new(r#"(?m)^\s*#\s*include\s*[<"]([^">]+)[">]"#).unwrap();

    let mut outcome = ScanOutcome::default();
    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();

    fn enqueue(file: PathBuf, queue: &mut VecDeque<PathBuf>, visited: &mut HashSet<PathBuf>) {
        // Symlinked headers are deduplicated by their canonical path.
        let key = file.canonicalize().unwrap_or_else(|_| file.clone());
        if visited.insert(key) {
            queue.push_back(file);
        }
    }

    for entry in WalkDir::new(target).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if entry.file_type().is_file() && (is_source(path) || is_header(path)) {
            enqueue(path.to_path_buf(), &mut queue, &mut visited);
        }
    }

    while let Some(file) = queue.pop_front() {
        let bytes = match fs::read(&file) {
            Ok(b) => b,
            Err(_) => {
                outcome.unreadable.push(file);
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes);

        for cap in include_re.captures_iter(&text) {
            let name = &cap[1];

            // Quoted-style resolution relative to the including file
            // wins over the candidate pool, like the compiler's own
            // search order.
            if let Some(parent) = file.parent() {
                let local = parent.join(name);
                if local.is_file() {
                    enqueue(local, &mut queue, &mut visited);
                    continue;
                }
            }

            'pool: for cand in candidates {
                // A library referencing its own headers is not a
                // dependency on itself.
                if cand.dir == target {
                    continue;
                }
                for inc_dir in &cand.include_dirs {
                    let hit = inc_dir.join(name);
                    if hit.is_file() {
                        if !outcome.libs.contains(&cand.dir) {
                            outcome.libs.push(cand.dir.clone());
                        }
                        enqueue(hit, &mut queue, &mut visited);
                        break 'pool;
                    }
                }
            }
        }
    }

    Ok(outcome)
}
