//! Library dependency discovery and link ordering.
//!
//! Given a sketch source directory and a pool of library search roots,
//! this module determines which libraries the sketch actually uses
//! (directly or transitively) and orders them so that a library which
//! depends on another precedes it, the relative order the linker
//! needs. The search roots themselves are an explicit value built once
//! by the caller; nothing here reads ambient state.
//!
//! ## Algorithm
//!
//! A fixed-point iteration over a growing list:
//!
//! 1. Scan the sketch sources once to seed the list of used libraries,
//!    in no meaningful order.
//! 2. For every library not yet examined, scan its own sources for the
//!    libraries it references. Referenced libraries already in the list
//!    are relocated to the tail (keeping their relative order), so that
//!    dependents stay ahead of their dependencies; the rest are newly
//!    discovered and appended.
//! 3. Repeat until every library in the list has been examined.
//!
//! The list only grows, examined libraries are never revisited, and the
//! pool of reachable libraries is finite, so the loop halts in at most
//! one round per reachable library even when dependencies form a cycle.
//! For mutually dependent libraries no order can satisfy both
//! constraints; whichever was examined last wins, and the result is
//! still a terminating permutation of the used set.

mod flags;
mod scan;

pub use flags::{header_dirs, include_flags, is_header, is_source};

use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Directories under which libraries are looked for. Built once per
/// run from project configuration and SDK discovery; read-only here.
#[derive(Debug, Clone, Default)]
pub struct SearchRoots {
    /// Platform core (provides `Arduino.h` and friends).
    pub core_dir: Option<PathBuf>,
    /// The sketch's own source directory, usable as a library by its
    /// sibling libraries.
    pub sketch_src_dir: Option<PathBuf>,
    /// Project-local `lib/`; every immediate subdirectory is one
    /// candidate library.
    pub user_lib_root: Option<PathBuf>,
    /// SDK-bundled `libraries/`; immediate subdirectories likewise.
    pub bundled_lib_root: Option<PathBuf>,
    /// Extra caller-specified library directories, used as-is.
    pub extra_libs: Vec<PathBuf>,
}

impl SearchRoots {
    /// Flatten the roots into the candidate library pool.
    pub fn candidate_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(core) = &self.core_dir {
            dirs.push(core.clone());
        }
        if let Some(src) = &self.sketch_src_dir {
            dirs.push(src.clone());
        }
        for root in [&self.user_lib_root, &self.bundled_lib_root]
            .into_iter()
            .flatten()
        {
            dirs.extend(list_subdirs(root));
        }
        dirs.extend(self.extra_libs.iter().cloned());
        dirs
    }
}

/// Immediate subdirectories of `dir`, sorted by name. An unreadable or
/// missing directory yields nothing.
pub fn list_subdirs(dir: &Path) -> Vec<PathBuf> {
    let mut subdirs: Vec<PathBuf> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect()
        })
        .unwrap_or_default();
    subdirs.sort();
    subdirs
}

/// The outcome of one resolution run.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Every library transitively required by the sketch, dependents
    /// before their dependencies.
    pub used_libs: Vec<PathBuf>,
    /// `-I` flags derived from `used_libs`, in the same order.
    pub include_flags: Vec<String>,
    /// Paths that could not be read during scanning. Non-fatal; the
    /// caller may log them.
    pub unreadable: Vec<PathBuf>,
}

/// Typed resolution failure.
#[derive(Debug)]
pub enum ResolveError {
    /// The sketch source directory does not exist. Fatal, nothing was
    /// scanned.
    MissingSourceDir(PathBuf),
    /// A directory that had to be listed could not be read.
    FileAccess(PathBuf, std::io::Error),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::MissingSourceDir(path) => {
                write!(f, "Sources directory '{}' does not exist", path.display())
            }
            ResolveError::FileAccess(path, e) => {
                write!(f, "Cannot read '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Resolve the libraries used by the sketch in `source_dir` against
/// `roots` and produce the final link-ordered list with its derived
/// include flags.
pub fn resolve(source_dir: &Path, roots: &SearchRoots) -> Result<Resolution, ResolveError> {
    if !source_dir.is_dir() {
        return Err(ResolveError::MissingSourceDir(source_dir.to_path_buf()));
    }
    let source_dir = source_dir
        .canonicalize()
        .map_err(|e| ResolveError::FileAccess(source_dir.to_path_buf(), e))?;

    // Candidate pool with include directories precomputed once.
    // Library identity is the canonical path; roots that do not exist
    // drop out here.
    let mut candidates = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    for dir in roots.candidate_dirs() {
        let Ok(dir) = dir.canonicalize() else { continue };
        if seen.insert(dir.clone()) {
            candidates.push(scan::Candidate::new(dir));
        }
    }

    let mut unreadable: Vec<PathBuf> = Vec::new();

    // 1. Direct references of the sketch sources. The seed order is
    // implementation-defined and carries no meaning yet.
    let seed = scan::scan_references(&source_dir, &candidates)?;
    let mut used: Vec<PathBuf> = seed.libs;
    unreadable.extend(seed.unreadable);

    // 2. Fixed point: examine each known library for its own
    // references until nothing new turns up. `scanned` only grows and
    // never leaves the set of elements of `used`, so the comparison
    // below is a plain length check.
    let mut scanned: HashSet<PathBuf> = HashSet::new();
    while scanned.len() < used.len() {
        let pending: Vec<PathBuf> = used
            .iter()
            .filter(|lib| !scanned.contains(*lib))
            .cloned()
            .collect();

        // Scans are independent filesystem reads; run the round in
        // parallel and merge sequentially in pending order so the
        // last-write-wins tie-break stays well defined.
        let outcomes: Vec<(PathBuf, Result<scan::ScanOutcome, ResolveError>)> = pending
            .into_par_iter()
            .map(|lib| {
                let outcome = scan::scan_references(&lib, &candidates);
                (lib, outcome)
            })
            .collect();

        for (lib, outcome) in outcomes {
            let deps: Vec<PathBuf> = match outcome {
                Ok(out) => {
                    unreadable.extend(out.unreadable);
                    out.libs
                }
                // A library that cannot be read contributes no
                // references; the run keeps going.
                Err(ResolveError::FileAccess(path, _))
                | Err(ResolveError::MissingSourceDir(path)) => {
                    unreadable.push(path);
                    Vec::new()
                }
            };

            // Two phases, both pure data: first relocate the already
            // known dependencies to the tail keeping relative order
            // (a dependent must precede its dependency at link time),
            // then append the newly discovered ones in scan order.
            let dep_set: HashSet<&PathBuf> = deps.iter().filter(|d| **d != lib).collect();
            let (kept, moved): (Vec<PathBuf>, Vec<PathBuf>) =
                used.into_iter().partition(|u| !dep_set.contains(u));
            used = kept;
            used.extend(moved);

            for dep in deps {
                if dep != lib && !used.contains(&dep) {
                    used.push(dep);
                }
            }

            scanned.insert(lib);
        }
    }

    let include_flags = flags::include_flags(&used);
    unreadable.sort();
    unreadable.dedup();

    Ok(Resolution {
        used_libs: used,
        include_flags,
        unreadable,
    })
}
