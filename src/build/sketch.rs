//! Sketch preprocessing.
//!
//! `.ino`/`.pde` files are almost C++: the IDE lets users call
//! functions before defining them and omit the core include. Turning a
//! sketch into a real translation unit means prepending
//! `#include <Arduino.h>`, generating forward prototypes for every
//! function defined in the sketch, and keeping a `#line` marker so
//! compiler diagnostics still point at the original file.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Transform raw sketch text into compilable C++.
pub fn preprocess_sketch(source: &str, origin: &Path) -> String {
    let prototypes = collect_prototypes(source);

    let mut out = String::from("#include <Arduino.h>\n");
    if !prototypes.is_empty() {
        out.push('\n');
        for proto in &prototypes {
            out.push_str(proto);
            out.push_str(";\n");
        }
    }
    out.push('\n');
    out.push_str(&format!("#line 1 \"{}\"\n", origin.display()));
    out.push_str(source);
    out
}

/// Preprocess one sketch file into `out_dir`, returning the generated
/// `.cpp` path.
pub fn preprocess_sketch_file(path: &Path, out_dir: &Path) -> Result<PathBuf> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read sketch {}", path.display()))?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "sketch".to_string());
    let out_path = out_dir.join(format!("{}.cpp", stem));
    fs::write(&out_path, preprocess_sketch(&source, path))
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    Ok(out_path)
}

/// Function signatures defined in the sketch, in definition order.
fn collect_prototypes(source: &str) -> Vec<String> {
    let masked = mask_non_code(source);

    // A definition is "words, a name, an argument list, an opening
    // brace". Control statements that happen to look like this are
    // filtered by their leading keyword.
    let def_re = Regex::new(r"(?m)^\s*((?:\w+\s+)+\w+\s*\([^)]*\))\s*\{").unwrap();
    const KEYWORDS: &[&str] = &["if", "else", "while", "for", "switch", "return", "do", "case"];

    let mut prototypes = Vec::new();
    for cap in def_re.captures_iter(&masked) {
        let range = cap.get(1).unwrap().range();
        // Take the text from the original so string/comment content
        // masked out of the scan copy cannot leak blanks into it.
        let signature = normalize_ws(&source[range]);
        let first_word = signature.split_whitespace().next().unwrap_or("");
        if KEYWORDS.contains(&first_word) {
            continue;
        }
        prototypes.push(signature);
    }
    prototypes
}

/// Blank out comments, string literals and char literals, preserving
/// length and line structure so match offsets stay valid.
fn mask_non_code(source: &str) -> String {
    let re = Regex::new(
        r#"(?s)/\*.*?\*/|//[^\n]*|"(?:\\.|[^"\\])*"|'(?:\\.|[^'\\])*'"#,
    )
    .unwrap();
    // Blank byte-by-byte so every match offset stays valid regardless
    // of multi-byte characters inside comments or strings.
    let mut bytes = source.as_bytes().to_vec();
    for m in re.find_iter(source) {
        for b in &mut bytes[m.range()] {
            if *b != b'\n' {
                *b = b' ';
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
