//! The `rugo` command-line surface (§6, §10): thin dispatch from
//! `clap`-parsed subcommands into `compile.rs`, `resolver.rs`, `mod_cmd.rs`,
//! `rats.rs`, and `tool.rs`, the same `Cli`/`Commands`/`run_cli` shape the
//! teacher's `cli.rs` uses for `largo`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::compile;
use crate::config::ToolchainConfig;
use crate::mod_cmd;
use crate::modules::{ModuleRegistry, StdlibBridge};
use crate::rats::{self, RatsOptions};
use crate::resolver::LockFile;
use crate::tool;

#[derive(Parser)]
#[command(name = "rugo")]
#[command(about = "A Ruby-flavored scripting language that compiles to Go", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Forbid resolving any module not already present in rugo.lock.
    #[arg(long, global = true)]
    pub frozen: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile and execute a Rugo file
    Run {
        file: PathBuf,
        /// Arguments forwarded to the compiled program
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
    /// Compile a Rugo file to a native binary
    Build {
        file: PathBuf,
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },
    /// Print the generated Go source for a Rugo file
    Emit { file: PathBuf },
    /// Run inline test blocks
    Rats {
        /// File or directory to search for test blocks (defaults to ".")
        path: Option<PathBuf>,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        jobs: Option<usize>,
        #[arg(long)]
        no_color: bool,
        #[arg(long)]
        timing: bool,
        #[arg(long)]
        recap: bool,
    },
    /// Manage the module lock file
    Mod {
        #[command(subcommand)]
        action: ModAction,
    },
    /// Manage user-provided subcommand binaries
    Tool {
        #[command(subcommand)]
        action: ToolAction,
    },
    /// Inspect registered module documentation
    Doc {
        /// Module or package name to show; lists everything if omitted
        name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ModAction {
    /// Resolve every required module and refresh rugo.lock
    Tidy {
        #[arg(default_value = "main.rugo")]
        entry: PathBuf,
    },
    /// Re-resolve mutable module versions, optionally scoped to one module
    Update {
        #[arg(default_value = "main.rugo")]
        entry: PathBuf,
        module: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ToolAction {
    Install {
        binary: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    List,
    Remove { name: String },
}

/// Entry point for the CLI. Mirrors the teacher's thin `run_cli` dispatcher.
pub fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ToolchainConfig::from_env(cli.frozen);

    match cli.command {
        Commands::Run { file, args } => cmd_run(&file, &args, &config),
        Commands::Build { file, out } => cmd_build(&file, out.as_deref(), &config),
        Commands::Emit { file } => cmd_emit(&file, &config),
        Commands::Rats { path, filter, jobs, no_color, timing, recap } => {
            cmd_rats(path.as_deref(), filter, jobs, no_color, timing, recap, &config)
        }
        Commands::Mod { action } => cmd_mod(action, &config),
        Commands::Tool { action } => cmd_tool(action, &config),
        Commands::Doc { name } => cmd_doc(name.as_deref()),
    }
}

fn lock_path_for(entry: &Path) -> PathBuf {
    entry.parent().unwrap_or_else(|| Path::new(".")).join("rugo.lock")
}

fn cmd_run(file: &Path, args: &[String], config: &ToolchainConfig) -> Result<(), Box<dyn std::error::Error>> {
    let lock_path = lock_path_for(file);
    let mut lock = LockFile::load(&lock_path)?;
    let exit_code = compile::run(file, args, config, &mut lock)?;
    lock.save(&lock_path)?;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn cmd_build(file: &Path, out: Option<&Path>, config: &ToolchainConfig) -> Result<(), Box<dyn std::error::Error>> {
    let lock_path = lock_path_for(file);
    let mut lock = LockFile::load(&lock_path)?;
    let default_out = file.with_extension("");
    let out_path = out.unwrap_or(&default_out);
    compile::build(file, out_path, config, &mut lock)?;
    lock.save(&lock_path)?;
    println!("Built {}", out_path.display());
    Ok(())
}

fn cmd_emit(file: &Path, config: &ToolchainConfig) -> Result<(), Box<dyn std::error::Error>> {
    let lock_path = lock_path_for(file);
    let mut lock = LockFile::load(&lock_path)?;
    let go_source = compile::emit(file, config, &mut lock)?;
    lock.save(&lock_path)?;
    print!("{}", go_source);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_rats(
    path: Option<&Path>,
    filter: Option<String>,
    jobs: Option<usize>,
    no_color: bool,
    timing: bool,
    recap: bool,
    config: &ToolchainConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let files = rats::discover_files(&root)?;
    if files.is_empty() {
        println!("no .rugo files found under {}", root.display());
        return Ok(());
    }

    let mut options = RatsOptions::default();
    options.filter = filter;
    options.timing = timing;
    if let Some(jobs) = jobs {
        options.jobs = jobs;
    }

    let lock_path = lock_path_for(&root);
    let use_color = crate::style::color_enabled() && !no_color;

    let results = rats::run(&files, config, Some(&lock_path), &options, |outcome| {
        let label = outcome.path.display();
        if outcome.skipped_no_tests {
            println!("  (no tests) {}", label);
            return;
        }
        let status = if outcome.success { "ok" } else { "FAILED" };
        let status = if use_color && !outcome.success {
            crate::style::bold_red(status)
        } else {
            status.to_string()
        };
        if timing {
            println!("  {} {} ({:.2?})", status, label, outcome.duration);
        } else {
            println!("  {} {}", status, label);
        }
    })?;

    if recap {
        println!("\n{}", rats::format_summary(&results));
    }

    if results.iter().any(|r| !r.success) {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_mod(action: ModAction, config: &ToolchainConfig) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ModAction::Tidy { entry } => {
            let lock_path = lock_path_for(&entry);
            mod_cmd::tidy(&entry, &lock_path, config)?;
            println!("rugo.lock is up to date");
            Ok(())
        }
        ModAction::Update { entry, module } => {
            let lock_path = lock_path_for(&entry);
            mod_cmd::update(&entry, &lock_path, config, module.as_deref())?;
            println!("rugo.lock updated");
            Ok(())
        }
    }
}

fn cmd_tool(action: ToolAction, config: &ToolchainConfig) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ToolAction::Install { binary, name } => {
            let dest = tool::install(&config.tools_dir, &binary, name.as_deref())?;
            println!("Installed {}", dest.display());
            Ok(())
        }
        ToolAction::List => {
            for name in tool::list(&config.tools_dir)? {
                println!("{}", name);
            }
            Ok(())
        }
        ToolAction::Remove { name } => {
            tool::remove(&config.tools_dir, &name)?;
            println!("Removed {}", name);
            Ok(())
        }
    }
}

fn cmd_doc(name: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let modules = ModuleRegistry::standard();
    let bridge = StdlibBridge::standard();

    match name {
        Some(target) => {
            if let Some(def) = modules.get(target) {
                print_module_doc(def.name, def.functions.iter().map(|f| (f.name, f.doc, f.arity, f.variadic)));
            } else if bridge.is_bridged_package(target) {
                if let Some((pkg, funcs)) = bridge.all().into_iter().find(|(pkg, _)| *pkg == target) {
                    print_module_doc(pkg, funcs.iter().map(|f| (f.name, f.doc, f.arity, f.variadic)));
                }
            } else {
                println!("no such module or package: {}", target);
            }
        }
        None => {
            for def in modules.all() {
                print_module_doc(def.name, def.functions.iter().map(|f| (f.name, f.doc, f.arity, f.variadic)));
            }
            for (pkg, funcs) in bridge.all() {
                print_module_doc(pkg, funcs.iter().map(|f| (f.name, f.doc, f.arity, f.variadic)));
            }
        }
    }
    Ok(())
}

fn print_module_doc<'a>(name: &str, functions: impl Iterator<Item = (&'a str, &'a str, usize, bool)>) {
    println!("{}", name);
    for (fn_name, doc, arity, variadic) in functions {
        let arity_note = if variadic { format!("{}+", arity) } else { arity.to_string() };
        println!("  {}({}) — {}", fn_name, arity_note, doc);
    }
}
