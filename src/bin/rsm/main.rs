//! RSM CLI - Tool for inspecting and verifying RSM model files.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use rayon::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rsm::config::Settings;
use rsm::scene::{texture_path, DirectorySource, TextureSource};
use rsm::Document;

/// Verbosity level
const LOG_QUIET: u8 = 0;
const LOG_INFO: u8 = 1;
const LOG_DEBUG: u8 = 2;
const LOG_TRACE: u8 = 3;

fn init_tracing(level: u8) {
    let default = match level {
        LOG_QUIET => "error",
        LOG_INFO => "info",
        LOG_DEBUG => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = LOG_INFO;
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = LOG_DEBUG,
            "-vv" | "--trace" => level = LOG_TRACE,
            "-q" | "--quiet" => level = LOG_QUIET,
            _ => filtered_args.push(arg),
        }
    }
    init_tracing(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        "info" | "i" => with_file(&filtered_args, "info <file.rsm>", cmd_info),
        "tree" | "t" => with_file(&filtered_args, "tree <file.rsm>", cmd_tree),
        "frame" | "f" => {
            if filtered_args.len() < 3 {
                usage("frame <file.rsm> <frame>")
            } else {
                filtered_args[2]
                    .parse::<i32>()
                    .with_context(|| format!("invalid frame number {:?}", filtered_args[2]))
                    .and_then(|frame| cmd_frame(filtered_args[1], frame))
            }
        }
        "check" | "c" => {
            if filtered_args.len() < 2 {
                usage("check <file.rsm>...")
            } else {
                cmd_check(&filtered_args[1..])
            }
        }
        "textures" | "tx" => {
            if filtered_args.len() < 2 {
                usage("textures <file.rsm> [extracted-data-dir]")
            } else {
                cmd_textures(filtered_args[1], filtered_args.get(2).map(PathBuf::from))
            }
        }
        "version" => {
            print_version();
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        // Default: if file exists, show info; otherwise error
        other => {
            if Path::new(other).exists() {
                cmd_info(other)
            } else {
                eprintln!("Unknown command: {}", other);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn with_file(args: &[&str], usage_line: &str, cmd: fn(&str) -> anyhow::Result<()>) -> anyhow::Result<()> {
    match args.get(1) {
        Some(path) => cmd(path),
        None => usage(usage_line),
    }
}

fn usage(line: &str) -> anyhow::Result<()> {
    bail!("missing arguments\nUsage: rsm-cli {}", line)
}

fn print_version() {
    println!(
        "rsm-cli {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("RSM_BUILD_DATE"),
        env!("RSM_BUILD_TIME")
    );
}

fn print_help() {
    println!("rsm-cli - RSM model toolkit");
    println!();
    println!("USAGE:");
    println!("    rsm-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info     <file>              Show header fields and mesh counts");
    println!("    t, tree     <file>              Show the mesh hierarchy");
    println!("    f, frame    <file> <n>          Dump composed matrices at frame n");
    println!("    c, check    <file>...           Decode and re-encode, compare bytes (parallel)");
    println!("    tx, textures <file> [dir]       List texture paths, check them under dir");
    println!("    version                         Show version and build date");
    println!("    h, help                         Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!();
    println!("NOTES:");
    println!("    - Passing a file directly is equivalent to 'info'");
    println!("    - RUST_LOG overrides the verbosity flags");
}

fn open(path: &str) -> anyhow::Result<Document> {
    let start = Instant::now();
    let doc = Document::open(path).with_context(|| format!("failed to open {}", path))?;
    debug!("decoded in {:.2?}", start.elapsed());
    for warning in doc.warnings() {
        info!("warning: {}", warning);
    }
    Ok(doc)
}

fn cmd_info(path: &str) -> anyhow::Result<()> {
    let doc = open(path)?;
    let h = &doc.header;

    let vertices: usize = doc.meshes.iter().map(|m| m.vertices.len()).sum();
    let faces: usize = doc.meshes.iter().map(|m| m.faces.len()).sum();

    println!("Model: {}", path);
    println!("Version: {}", h.version);
    println!("Shade type: {:?}", h.shade_type);
    println!("Alpha: {}", h.alpha);
    println!("Frame rate: {}", h.frame_rate);
    println!("Animation length: {} (stored {})", doc.animation_length(), h.anim_len);
    println!();
    println!("Textures: {}", doc.textures.len());
    println!("Root names: {}", doc.root_names.join(", "));
    println!("Meshes: {} ({} vertices, {} faces)", doc.meshes.len(), vertices, faces);
    println!("Volume boxes: {}", doc.volume_boxes.len());
    if !doc.position_key_frames.is_empty() {
        println!("Model position keys: {}", doc.position_key_frames.len());
    }
    if !doc.warnings().is_empty() {
        println!("Warnings: {}", doc.warnings().len());
    }
    Ok(())
}

fn cmd_tree(path: &str) -> anyhow::Result<()> {
    let doc = open(path)?;
    println!("Model: {}", path);
    println!();
    for root in doc.roots() {
        print_tree(&doc, root, 0)?;
    }
    Ok(())
}

fn print_tree(doc: &Document, index: usize, depth: usize) -> anyhow::Result<()> {
    let mesh = &doc.meshes[index];
    let indent = "  ".repeat(depth);
    let mut tracks = Vec::new();
    if !mesh.scale_key_frames.is_empty() {
        tracks.push(format!("scale:{}", mesh.scale_key_frames.len()));
    }
    if !mesh.rotation_key_frames.is_empty() {
        tracks.push(format!("rot:{}", mesh.rotation_key_frames.len()));
    }
    if !mesh.position_key_frames.is_empty() {
        tracks.push(format!("pos:{}", mesh.position_key_frames.len()));
    }
    if !mesh.texture_key_frames.is_empty() {
        tracks.push(format!("tex:{}", mesh.texture_key_frames.len()));
    }
    println!(
        "{}{} [{} verts, {} faces]{}",
        indent,
        if mesh.name.is_empty() { "<unnamed>" } else { &mesh.name },
        mesh.vertices.len(),
        mesh.faces.len(),
        if tracks.is_empty() { String::new() } else { format!(" {}", tracks.join(" ")) }
    );
    for &child in doc.children(index)? {
        print_tree(doc, child, depth + 1)?;
    }
    Ok(())
}

fn cmd_frame(path: &str, frame: i32) -> anyhow::Result<()> {
    let mut doc = open(path)?;
    doc.calc(frame).with_context(|| format!("frame {} failed", frame))?;

    println!("Model: {} @ frame {}", path, frame);
    for mesh in &doc.meshes {
        println!();
        println!("{}", mesh);
        let m = mesh.self_matrix().to_cols_array_2d();
        let l = mesh.local_matrix().to_cols_array_2d();
        println!("  self:  {:?}", m);
        println!("  local: {:?}", l);
    }
    Ok(())
}

enum CheckOutcome {
    Identical,
    Mismatch { offset: usize, original: usize, encoded: usize },
    Failed(String),
}

fn cmd_check(paths: &[&str]) -> anyhow::Result<()> {
    let start = Instant::now();
    let outcomes: Vec<(&str, CheckOutcome)> = paths
        .par_iter()
        .map(|&path| (path, check_file(path)))
        .collect();

    let mut failures = 0;
    for (path, outcome) in &outcomes {
        match outcome {
            CheckOutcome::Identical => println!("OK        {}", path),
            CheckOutcome::Mismatch { offset, original, encoded } => {
                failures += 1;
                println!(
                    "MISMATCH  {} (first difference at {}, {} -> {} bytes)",
                    path, offset, original, encoded
                );
            }
            CheckOutcome::Failed(e) => {
                failures += 1;
                println!("ERROR     {}: {}", path, e);
            }
        }
    }
    info!("checked {} files in {:.2?}", outcomes.len(), start.elapsed());

    if failures > 0 {
        bail!("{} of {} files failed", failures, outcomes.len());
    }
    Ok(())
}

fn check_file(path: &str) -> CheckOutcome {
    let original = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return CheckOutcome::Failed(e.to_string()),
    };
    let encoded = match Document::decode(&original).and_then(|doc| doc.encode()) {
        Ok(bytes) => bytes,
        Err(e) => return CheckOutcome::Failed(e.to_string()),
    };
    if original == encoded {
        return CheckOutcome::Identical;
    }
    let offset = original
        .iter()
        .zip(&encoded)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| original.len().min(encoded.len()));
    CheckOutcome::Mismatch { offset, original: original.len(), encoded: encoded.len() }
}

fn cmd_textures(path: &str, data_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let doc = open(path)?;
    let settings = Settings::load();
    let source = data_dir.map(DirectorySource::new);

    let mut names: Vec<&str> = doc.textures.iter().map(String::as_str).collect();
    for mesh in &doc.meshes {
        for name in &mesh.textures {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
    }

    let mut missing = 0;
    for name in names {
        let archive_path = texture_path(&settings.texture_root, name);
        match &source {
            Some(source) => {
                let found = source.fetch(&archive_path).is_some();
                if !found {
                    missing += 1;
                }
                println!("{}  {}", if found { "found  " } else { "missing" }, archive_path);
            }
            None => println!("{}", archive_path),
        }
    }

    if missing > 0 {
        bail!("{} textures missing", missing);
    }
    Ok(())
}
