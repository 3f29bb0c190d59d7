//! End-to-end tests for library dependency resolution.
//!
//! Each test builds a small sketch-plus-libraries tree in a temporary
//! directory and checks the resolved library list and its ordering.
//! Seed order (before the fixed-point loop runs) is deliberately not
//! asserted anywhere; only the final order carries meaning, and only
//! between libraries with a dependency relation.

use ardent::resolve::{ResolveError, SearchRoots, resolve};
use std::fs;
use std::path::{Path, PathBuf};

/// Create a library under `root` from (relative path, content) pairs.
fn mk_lib(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (rel, content) in files {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn canon(path: &Path) -> PathBuf {
    path.canonicalize().unwrap()
}

fn roots_with_user_libs(lib_root: &Path) -> SearchRoots {
    SearchRoots {
        user_lib_root: Some(lib_root.to_path_buf()),
        ..Default::default()
    }
}

fn position(libs: &[PathBuf], dir: &Path) -> usize {
    let canon_dir = canon(dir);
    libs.iter()
        .position(|l| *l == canon_dir)
        .unwrap_or_else(|| panic!("{} not in result", dir.display()))
}

#[test]
fn scenario_a_single_direct_library() {
    let temp = tempfile::tempdir().unwrap();
    let libs = temp.path().join("lib");
    let servo = mk_lib(&libs, "Servo", &[("Servo.h", ""), ("Servo.cpp", "#include <Servo.h>\n")]);
    let sketch = mk_lib(
        temp.path(),
        "src",
        &[("app.ino", "#include <Servo.h>\nvoid setup() {}\nvoid loop() {}\n")],
    );

    let res = resolve(&sketch, &roots_with_user_libs(&libs)).unwrap();
    assert_eq!(res.used_libs, vec![canon(&servo)]);
}

#[test]
fn scenario_b_nested_utility_directory_gets_flags() {
    let temp = tempfile::tempdir().unwrap();
    let libs = temp.path().join("lib");
    let wire = mk_lib(
        &libs,
        "Wire",
        &[
            ("Wire.h", "#include \"utility/twi.h\"\n"),
            ("utility/twi.h", ""),
        ],
    );
    let sketch = mk_lib(temp.path(), "src", &[("app.ino", "#include <Wire.h>\n")]);

    let res = resolve(&sketch, &roots_with_user_libs(&libs)).unwrap();
    assert_eq!(res.used_libs, vec![canon(&wire)]);

    let wire_flag = format!("-I{}", canon(&wire).display());
    let twi_flag = format!("-I{}", canon(&wire).join("utility").display());
    assert!(res.include_flags.contains(&wire_flag));
    assert!(res.include_flags.contains(&twi_flag));
}

#[test]
fn scenario_c_dependent_precedes_dependency() {
    let temp = tempfile::tempdir().unwrap();
    let libs = temp.path().join("lib");
    let a = mk_lib(&libs, "A", &[("A.h", "#include <B.h>\n")]);
    let b = mk_lib(&libs, "B", &[("B.h", "")]);
    let sketch = mk_lib(temp.path(), "src", &[("app.ino", "#include <A.h>\n")]);

    let res = resolve(&sketch, &roots_with_user_libs(&libs)).unwrap();
    assert_eq!(res.used_libs, vec![canon(&a), canon(&b)]);
}

#[test]
fn scenario_d_cycle_terminates_with_both_libraries() {
    let temp = tempfile::tempdir().unwrap();
    let libs = temp.path().join("lib");
    let a = mk_lib(&libs, "A", &[("A.h", "#include <B.h>\n")]);
    let b = mk_lib(&libs, "B", &[("B.h", "#include <A.h>\n")]);
    let sketch = mk_lib(temp.path(), "src", &[("app.ino", "#include <A.h>\n")]);

    let res = resolve(&sketch, &roots_with_user_libs(&libs)).unwrap();

    // No order satisfies both constraints; assert set equality only.
    let mut got = res.used_libs.clone();
    got.sort();
    let mut want = vec![canon(&a), canon(&b)];
    want.sort();
    assert_eq!(got, want);
}

#[test]
fn empty_source_directory_yields_empty_result() {
    let temp = tempfile::tempdir().unwrap();
    let libs = temp.path().join("lib");
    mk_lib(&libs, "Servo", &[("Servo.h", "")]);
    let sketch = temp.path().join("src");
    fs::create_dir_all(&sketch).unwrap();

    let res = resolve(&sketch, &roots_with_user_libs(&libs)).unwrap();
    assert!(res.used_libs.is_empty());
    assert!(res.include_flags.is_empty());
}

#[test]
fn missing_source_directory_is_fatal() {
    let temp = tempfile::tempdir().unwrap();
    let gone = temp.path().join("src");

    let err = resolve(&gone, &SearchRoots::default()).unwrap_err();
    assert!(matches!(err, ResolveError::MissingSourceDir(path) if path == gone));
}

#[test]
fn closure_covers_transitive_chain() {
    let temp = tempfile::tempdir().unwrap();
    let libs = temp.path().join("lib");
    let a = mk_lib(&libs, "A", &[("A.h", ""), ("A.cpp", "#include <A.h>\n#include <B.h>\n")]);
    let b = mk_lib(&libs, "B", &[("B.h", ""), ("B.cpp", "#include <B.h>\n#include <C.h>\n")]);
    let c = mk_lib(&libs, "C", &[("C.h", "")]);
    let sketch = mk_lib(temp.path(), "src", &[("app.ino", "#include <A.h>\n")]);

    let res = resolve(&sketch, &roots_with_user_libs(&libs)).unwrap();

    // B is referenced only from A's .cpp, C only from B's .cpp: the
    // seed scan cannot see either, the fixed-point loop must find both.
    for lib in [&a, &b, &c] {
        assert!(
            res.used_libs.contains(&canon(lib)),
            "{} missing from closure",
            lib.display()
        );
    }
}

#[test]
fn precedence_holds_along_a_chain() {
    let temp = tempfile::tempdir().unwrap();
    let libs = temp.path().join("lib");
    let a = mk_lib(&libs, "A", &[("A.h", ""), ("A.cpp", "#include <B.h>\n")]);
    let b = mk_lib(&libs, "B", &[("B.h", ""), ("B.cpp", "#include <C.h>\n")]);
    let c = mk_lib(&libs, "C", &[("C.h", "")]);
    let sketch = mk_lib(
        temp.path(),
        "src",
        &[("app.ino", "#include <A.h>\n#include <B.h>\n#include <C.h>\n")],
    );

    let res = resolve(&sketch, &roots_with_user_libs(&libs)).unwrap();
    assert!(position(&res.used_libs, &a) < position(&res.used_libs, &b));
    assert!(position(&res.used_libs, &b) < position(&res.used_libs, &c));
}

#[test]
fn shared_dependency_sorts_after_both_dependents() {
    let temp = tempfile::tempdir().unwrap();
    let libs = temp.path().join("lib");
    let a = mk_lib(&libs, "A", &[("A.h", ""), ("A.cpp", "#include <C.h>\n")]);
    let b = mk_lib(&libs, "B", &[("B.h", ""), ("B.cpp", "#include <C.h>\n")]);
    let c = mk_lib(&libs, "C", &[("C.h", "")]);
    let sketch = mk_lib(
        temp.path(),
        "src",
        &[("app.ino", "#include <A.h>\n#include <B.h>\n")],
    );

    let res = resolve(&sketch, &roots_with_user_libs(&libs)).unwrap();
    assert!(position(&res.used_libs, &a) < position(&res.used_libs, &c));
    assert!(position(&res.used_libs, &b) < position(&res.used_libs, &c));
}

#[test]
fn rescan_of_unchanged_tree_is_stable() {
    let temp = tempfile::tempdir().unwrap();
    let libs = temp.path().join("lib");
    mk_lib(&libs, "A", &[("A.h", ""), ("A.cpp", "#include <B.h>\n")]);
    mk_lib(&libs, "B", &[("B.h", "")]);
    let sketch = mk_lib(
        temp.path(),
        "src",
        &[("app.ino", "#include <A.h>\n#include <B.h>\n")],
    );

    let roots = roots_with_user_libs(&libs);
    let first = resolve(&sketch, &roots).unwrap();
    let second = resolve(&sketch, &roots).unwrap();

    let mut first_set = first.used_libs.clone();
    let mut second_set = second.used_libs.clone();
    first_set.sort();
    second_set.sort();
    assert_eq!(first_set, second_set);
}

#[test]
fn fully_cyclic_pool_terminates() {
    let temp = tempfile::tempdir().unwrap();
    let libs = temp.path().join("lib");

    // Ring of five, every library includes the next one.
    let n = 5;
    let mut dirs = Vec::new();
    for i in 0..n {
        let next = (i + 1) % n;
        dirs.push(mk_lib(
            &libs,
            &format!("Ring{}", i),
            &[(
                format!("Ring{}.h", i).as_str(),
                format!("#include <Ring{}.h>\n", next).as_str(),
            )],
        ));
    }
    let sketch = mk_lib(temp.path(), "src", &[("app.ino", "#include <Ring0.h>\n")]);

    let res = resolve(&sketch, &roots_with_user_libs(&libs)).unwrap();

    let mut got = res.used_libs.clone();
    got.sort();
    let mut want: Vec<PathBuf> = dirs.iter().map(|d| canon(d)).collect();
    want.sort();
    assert_eq!(got, want);
}

#[test]
fn extra_library_roots_participate() {
    let temp = tempfile::tempdir().unwrap();
    let vendor = mk_lib(temp.path().join("vendor").as_path(), "Radio", &[("Radio.h", "")]);
    let sketch = mk_lib(temp.path(), "src", &[("app.ino", "#include <Radio.h>\n")]);

    let roots = SearchRoots {
        extra_libs: vec![vendor.clone()],
        ..Default::default()
    };
    let res = resolve(&sketch, &roots).unwrap();
    assert_eq!(res.used_libs, vec![canon(&vendor)]);
}

#[test]
fn sketch_source_dir_is_never_its_own_dependency() {
    let temp = tempfile::tempdir().unwrap();
    let sketch = mk_lib(
        temp.path(),
        "src",
        &[("app.ino", "#include \"pins.h\"\n"), ("pins.h", "")],
    );

    let roots = SearchRoots {
        sketch_src_dir: Some(sketch.clone()),
        ..Default::default()
    };
    let res = resolve(&sketch, &roots).unwrap();
    assert!(res.used_libs.is_empty());
}
