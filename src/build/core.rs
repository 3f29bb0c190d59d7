use super::sketch::preprocess_sketch_file;
use super::utils::{build_dir, load_config, needs_recompile, object_name};
use crate::boards::{self, BoardModel};
use crate::config::ArdConfig;
use crate::resolve::{self, SearchRoots, is_source};
use crate::toolchain;
use anyhow::{Context, Result, bail};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Show the full compiler invocations and the resolved library order.
    pub verbose: bool,
    /// Board model override, beats [board] in ard.toml.
    pub board: Option<String>,
}

/// What a successful build leaves behind, with everything `upload`
/// needs to flash it.
#[derive(Debug, Clone)]
pub struct BuildArtifacts {
    pub elf: PathBuf,
    pub hex: PathBuf,
    pub board_id: String,
    pub mcu: String,
    pub upload_protocol: Option<String>,
    pub upload_speed: Option<String>,
}

// --- Helper: Board Selection ---
fn pick_board<'a>(
    config: &ArdConfig,
    options: &BuildOptions,
    catalogue: &'a [BoardModel],
) -> Result<&'a BoardModel> {
    let model = match options.board.as_deref().or(config.board_model()) {
        Some(m) => m.to_string(),
        None => {
            println!(
                "{} No board specified in ard.toml, using default: uno",
                "!".yellow()
            );
            println!("   Add a [board] section to ard.toml:");
            println!("   {}", "[board]".dimmed());
            println!("   {}", "model = \"uno\"".dimmed());
            println!();
            "uno".to_string()
        }
    };

    boards::find_board(catalogue, &model).with_context(|| {
        format!("Unknown board model '{model}'. Run 'ard boards' for the full list.")
    })
}

// --- Helper: One Compile Job ---
struct CompileJob {
    src: PathBuf,
    obj: PathBuf,
    is_cpp: bool,
}

fn job(src: PathBuf, obj_dir: &Path) -> CompileJob {
    let is_cpp = !src.extension().is_some_and(|e| e == "c" || e == "S");
    let obj = obj_dir.join(object_name(&src));
    CompileJob { src, obj, is_cpp }
}

fn sources_under(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| {
            is_source(p)
                && !p
                    .extension()
                    .is_some_and(|e| e == "ino" || e == "pde")
        })
        .collect()
}

fn sketch_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.extension().is_some_and(|e| e == "ino" || e == "pde"))
        .collect()
}

// --- CORE: Build Sketch Firmware ---
pub fn build_project(config: &ArdConfig, options: &BuildOptions) -> Result<BuildArtifacts> {
    let start_time = Instant::now();

    // 1. Toolchain & Board
    let sdk_home = config.sdk.as_ref().and_then(|s| s.home.clone());
    let sdk = toolchain::detect_sdk(sdk_home.as_deref())?;
    let tools = toolchain::find_avr_tools()?;
    let catalogue = boards::load_boards(&sdk.boards_txt)?;
    let board = pick_board(config, options, &catalogue)?;

    let board_cfg = config.board.as_ref();
    let mcu = board_cfg
        .and_then(|b| b.mcu.clone())
        .or_else(|| board.mcu.clone())
        .with_context(|| format!("Board '{}' defines no MCU; set [board] mcu", board.id))?;
    let f_cpu = board_cfg
        .and_then(|b| b.f_cpu.clone())
        .or_else(|| board.f_cpu.clone())
        .unwrap_or_else(|| "16000000L".to_string());

    println!(
        "{} Building {} for {} ({})",
        "🔧".cyan(),
        config.sketch.name.bold(),
        board.name.cyan(),
        mcu
    );

    // 2. Resolve Libraries
    let src_dir = PathBuf::from(config.src_dir());
    let roots = SearchRoots {
        core_dir: Some(sdk.core_dir.clone()),
        sketch_src_dir: Some(src_dir.clone()),
        user_lib_root: Some(PathBuf::from("lib")),
        bundled_lib_root: Some(sdk.libraries_dir.clone()),
        extra_libs: config.extra_libraries(),
    };
    let resolution = resolve::resolve(&src_dir, &roots)?;

    for path in &resolution.unreadable {
        println!("{} Skipped unreadable: {}", "!".yellow(), path.display());
    }
    if options.verbose {
        println!("{} Library link order:", "→".dimmed());
        for lib in &resolution.used_libs {
            println!("     {}", lib.display());
        }
    }

    // 3. Common Flags
    let core_canon = sdk.core_dir.canonicalize().unwrap_or(sdk.core_dir.clone());
    let src_canon = src_dir.canonicalize().unwrap_or(src_dir.clone());

    let mut common_flags = vec![
        format!("-mmcu={}", mcu),
        format!("-DF_CPU={}", f_cpu),
        "-DARDUINO=100".to_string(),
        "-Os".to_string(),
        "-ffunction-sections".to_string(),
        "-fdata-sections".to_string(),
        format!("-I{}", sdk.core_dir.display()),
        // Preprocessed sketches compile out of the build dir, so their
        // quoted includes must still find headers next to the .ino.
        format!("-I{}", src_canon.display()),
    ];
    if let Some(variant) = board.variant.as_deref() {
        if let Some(dir) = sdk.variant_dir(variant) {
            common_flags.push(format!("-I{}", dir.display()));
        }
    }
    common_flags.extend(resolution.include_flags.iter().cloned());
    if let Some(build_cfg) = &config.build
        && let Some(flags) = &build_cfg.flags
    {
        common_flags.extend(flags.iter().cloned());
    }

    // 4. Collect Compile Jobs
    let out_dir = build_dir();
    let obj_dir = out_dir.join("obj");
    let core_obj_dir = out_dir.join("core");
    fs::create_dir_all(&obj_dir)?;
    fs::create_dir_all(&core_obj_dir)?;

    let mut sketch_jobs: Vec<CompileJob> = Vec::new();
    for ino in sketch_files(&src_dir) {
        let cpp = preprocess_sketch_file(&ino, &out_dir.join("preproc"))?;
        sketch_jobs.push(job(cpp, &obj_dir));
    }
    for src in sources_under(&src_dir) {
        sketch_jobs.push(job(src, &obj_dir));
    }
    if sketch_jobs.is_empty() {
        bail!(
            "No sketch sources found under {}/. Expected .ino, .pde or .c/.cpp files.",
            src_dir.display()
        );
    }

    // Library objects stay grouped per library, in resolved order, so
    // the linker sees dependents before their dependencies.
    let mut lib_jobs: Vec<CompileJob> = Vec::new();
    for lib in &resolution.used_libs {
        if *lib == core_canon || *lib == src_canon {
            continue; // compiled as core.a / sketch objects
        }
        for src in sources_under(lib) {
            lib_jobs.push(job(src, &obj_dir));
        }
    }

    let core_jobs: Vec<CompileJob> = sources_under(&sdk.core_dir)
        .into_iter()
        .map(|src| job(src, &core_obj_dir))
        .collect();

    // 5. Parallel Compilation
    let total = sketch_jobs.len() + lib_jobs.len() + core_jobs.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message("Compiling...");

    let current_dir_str = std::env::current_dir()?.to_string_lossy().to_string();
    let all_jobs: Vec<&CompileJob> = sketch_jobs
        .iter()
        .chain(lib_jobs.iter())
        .chain(core_jobs.iter())
        .collect();

    let json_entries: Vec<serde_json::Value> = all_jobs
        .par_iter()
        .map(|j| -> Result<serde_json::Value> {
            let compiler = if j.is_cpp { &tools.cxx } else { &tools.cc };
            let mut args: Vec<String> = vec![compiler.clone()];
            args.push("-c".to_string());
            args.push(j.src.to_string_lossy().to_string());
            args.push("-o".to_string());
            args.push(j.obj.to_string_lossy().to_string());
            if j.is_cpp {
                args.push("-fno-exceptions".to_string());
            }
            // Dependency file for incremental rebuilds
            args.push("-MMD".to_string());
            args.push("-MF".to_string());
            args.push(j.obj.with_extension("d").to_string_lossy().to_string());
            args.extend(common_flags.iter().cloned());

            let entry = json!({
                "directory": current_dir_str,
                "command": args.join(" "),
                "file": j.src.to_string_lossy()
            });

            let needs_compile = !j.obj.exists() || needs_recompile(&j.obj).unwrap_or(true);

            if needs_compile {
                let stem = j.src.file_stem().unwrap_or_default().to_string_lossy();
                pb.set_message(format!("Compiling {}", stem));
                if options.verbose {
                    pb.println(format!("   {}", args.join(" ").dimmed()));
                }

                let output = Command::new(&args[0])
                    .args(&args[1..])
                    .output()
                    .context("Failed to execute avr compiler")?;

                if !output.status.success() {
                    pb.println(format!(
                        "{} Error compiling {}:\n{}",
                        "x".red(),
                        j.src.display(),
                        String::from_utf8_lossy(&output.stderr)
                    ));
                    return Err(anyhow::anyhow!("Compilation failed"));
                }
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stderr.is_empty() {
                    pb.println(format!(
                        "{} Warning in {}:\n{}",
                        "!".yellow(),
                        j.src.display(),
                        stderr
                    ));
                }
            }

            pb.inc(1);
            Ok(entry)
        })
        .collect::<Result<Vec<_>>>()?;

    pb.finish_with_message("Compilation complete");

    // 6. compile_commands.json for IDE integration
    fs::write(
        out_dir.join("compile_commands.json"),
        serde_json::to_string_pretty(&json_entries)?,
    )?;

    // 7. Archive the Platform Core
    let core_a = out_dir.join("core.a");
    let core_objs: Vec<&PathBuf> = core_jobs.iter().map(|j| &j.obj).collect();
    let mut needs_archive = !core_a.exists();
    if !needs_archive {
        let ar_time = fs::metadata(&core_a)?.modified()?;
        for obj in &core_objs {
            if fs::metadata(obj)?.modified()? > ar_time {
                needs_archive = true;
                break;
            }
        }
    }
    if needs_archive {
        fs::remove_file(&core_a).ok();
        let output = Command::new(&tools.ar)
            .arg("rcs")
            .arg(&core_a)
            .args(&core_objs)
            .output()
            .context("Failed to execute avr-ar")?;
        if !output.status.success() {
            println!("{}", String::from_utf8_lossy(&output.stderr));
            bail!("Archiving platform core failed");
        }
    }

    // 8. Link
    let elf = out_dir.join(format!("{}.elf", config.sketch.name));
    let hex = out_dir.join(format!("{}.hex", config.sketch.name));

    let link_inputs: Vec<&PathBuf> = sketch_jobs
        .iter()
        .chain(lib_jobs.iter())
        .map(|j| &j.obj)
        .collect();

    let mut needs_link = !elf.exists();
    if !needs_link {
        let elf_time = fs::metadata(&elf)?.modified()?;
        for obj in link_inputs.iter().copied().chain([&core_a]) {
            if fs::metadata(obj)?.modified()? > elf_time {
                needs_link = true;
                break;
            }
        }
    }

    if needs_link {
        println!("   {} Linking...", "🔗".cyan());
        let mut cmd = Command::new(&tools.cc);
        cmd.arg(format!("-mmcu={}", mcu))
            .arg("-Os")
            .arg("-Wl,--gc-sections")
            .args(&link_inputs)
            .arg(&core_a)
            .arg("-lm")
            .arg("-o")
            .arg(&elf);

        let output = cmd.output().context("Failed to execute avr linker")?;
        if !output.status.success() {
            println!("{}", String::from_utf8_lossy(&output.stderr));
            println!("{} Linking failed", "x".red());
            bail!("Linking failed");
        }

        let output = Command::new(&tools.objcopy)
            .args(["-O", "ihex", "-R", ".eeprom"])
            .arg(&elf)
            .arg(&hex)
            .output()
            .context("Failed to execute avr-objcopy")?;
        if !output.status.success() {
            println!("{}", String::from_utf8_lossy(&output.stderr));
            bail!("Firmware image conversion failed");
        }

        if let Some(size_tool) = &tools.size {
            if let Ok(out) = Command::new(size_tool).arg(&elf).output() {
                print!("{}", String::from_utf8_lossy(&out.stdout));
            }
        }

        println!(
            "{} Build finished in {:.2?} → {}",
            "✓".green(),
            start_time.elapsed(),
            hex.display()
        );
    } else {
        println!("{} Up to date", "⚡".green());
    }

    Ok(BuildArtifacts {
        elf,
        hex,
        board_id: board.id.clone(),
        mcu,
        upload_protocol: board.upload_protocol.clone(),
        upload_speed: board.upload_speed.clone(),
    })
}

// --- COMMAND: Build From Manifest ---
pub fn build_sketch(options: &BuildOptions) -> Result<BuildArtifacts> {
    let config = load_config()?;
    build_project(&config, options)
}
