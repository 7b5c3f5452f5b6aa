// Hide console window on Windows for release builds (GUI app).
// In debug builds, keep the console so panics/backtraces are visible.
// CLI mode will re-attach to parent console if available.
#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use bevy::prelude::*;
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use ardicee::ar_dice::{
    parse_script, run_script, AppSettings, ArDicePlugin, AssetFactory, PlacementController,
    ScriptedPlatform, StepReport, StepResult, TapOutcome, DEFAULT_SETTINGS_FILE,
};

/// AR Dicee - tap to place dice on detected planes and roll them
#[derive(Parser)]
#[command(name = "ardicee")]
#[command(
    author,
    version,
    about = "AR Dicee - place dice on detected surfaces and roll them, in a simulated AR session or from a script"
)]
struct Cli {
    /// Run a command script headlessly instead of opening the 3D view
    #[arg(long)]
    cli: bool,

    /// Script to run in CLI mode (reads stdin when omitted)
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Path to the settings JSON file
    #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Seed the roll RNG for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Behave like a device without world tracking (no plane detection)
    #[arg(long)]
    orientation_only: bool,

    /// Write the default settings to --config and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.write_default_config {
        #[cfg(windows)]
        attach_parent_console();

        if let Err(e) = AppSettings::default().save_to_file(&cli.config) {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
        println!(
            "{} {}",
            "Wrote default settings to".green(),
            cli.config.display()
        );
        return;
    }

    let settings = AppSettings::load_from_file(&cli.config);

    if cli.cli {
        // Attach to parent console for CLI output (Windows only)
        #[cfg(windows)]
        attach_parent_console();

        run_cli_mode(&cli, settings);
    } else {
        // GUI mode - no console needed (windows_subsystem = "windows" handles this)
        run_3d_mode(&cli, settings);
    }
}

/// Attach to the parent process's console on Windows.
/// This is needed because we use windows_subsystem = "windows" to hide the console,
/// but CLI mode needs to output to the terminal.
#[cfg(windows)]
fn attach_parent_console() {
    use std::io::Write;

    #[link(name = "kernel32")]
    extern "system" {
        fn AttachConsole(dwProcessId: u32) -> i32;
        fn AllocConsole() -> i32;
    }

    const ATTACH_PARENT_PROCESS: u32 = 0xFFFFFFFF;

    unsafe {
        if AttachConsole(ATTACH_PARENT_PROCESS) == 0 {
            AllocConsole();
        }
    }

    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
}

// ============================================================================
// 3D Mode
// ============================================================================

fn run_3d_mode(cli: &Cli, settings: AppSettings) {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "AR Dicee".to_string(),
                        resolution: (1280u32, 720u32).into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(bevy::log::LogPlugin {
                    level: bevy::log::Level::INFO,
                    filter: "info,wgpu=error,naga=warn".to_string(),
                    ..default()
                }),
        )
        .add_plugins(ArDicePlugin {
            settings,
            seed: cli.seed,
            orientation_only: cli.orientation_only,
        })
        .run();
}

// ============================================================================
// CLI Mode
// ============================================================================

fn read_script_source(path: Option<&PathBuf>) -> Result<String, String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read script '{}': {}", path.display(), e)),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| format!("Failed to read script from stdin: {}", e))?;
            Ok(source)
        }
    }
}

fn run_cli_mode(cli: &Cli, settings: AppSettings) {
    let source = match read_script_source(cli.script.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let commands = match parse_script(&source) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let world_tracking = settings.simulation.world_tracking_supported && !cli.orientation_only;
    let platform = ScriptedPlatform::new(world_tracking, settings.script_view.clone());
    let factory = AssetFactory::from_settings(&settings);
    let roll = settings.roll.clone();
    let mut controller = match cli.seed {
        Some(seed) => PlacementController::with_seed(platform, factory, roll, seed),
        None => PlacementController::new(platform, factory, roll),
    };

    for report in run_script(&mut controller, &commands) {
        print_report(&report);
    }
}

fn print_report(report: &StepReport) {
    let prefix = format!("[{:>3}]", report.line).dimmed();
    let line = match &report.result {
        StepResult::Started(mode) => format!("{} {}", "Session started:".bold(), mode.name()),
        StepResult::Stopped => "Session paused".bold().to_string(),
        StepResult::PlaneDeclared(anchor) => format!("Declared plane {}", anchor),
        StepResult::AnchorDeclared(anchor) => format!("Declared anchor {}", anchor),
        StepResult::Tapped(TapOutcome::Placed { node, position }) => format!(
            "{} {} at ({:.2}, {:.2}, {:.2})",
            "Placed".green().bold(),
            node,
            position.x,
            position.y,
            position.z
        ),
        StepResult::Tapped(TapOutcome::NoPlaneDetected) => {
            "Tap missed: no plane detected".yellow().to_string()
        }
        StepResult::Tapped(TapOutcome::SessionInactive) => {
            "Tap ignored: session inactive".yellow().to_string()
        }
        StepResult::Tapped(TapOutcome::Interrupted) => {
            "Tap ignored: session interrupted".yellow().to_string()
        }
        StepResult::Tapped(TapOutcome::AssetUnavailable(e)) => {
            format!("{} {}", "Die asset unavailable:".red(), e)
        }
        StepResult::Rolled(count) => format!(
            "{} {} {}",
            "Rolled".bright_cyan().bold(),
            count,
            if *count == 1 { "die" } else { "dice" }
        ),
        StepResult::Cleared(count) => format!("{} {}", "Cleared".bold(), count),
        StepResult::EventQueued => format!("{:?} queued", report.command),
        StepResult::Status(status) => {
            let mut text = format!(
                "{} {:?}, mode {}, {} plane(s), {} die/dice ({} attached){}",
                "Status:".bold().white(),
                status.state,
                status.mode.map(|m| m.name()).unwrap_or("none"),
                status.planes,
                status.dice.len(),
                status.attached_dice,
                if status.interrupted { ", interrupted" } else { "" }
            );
            for (node, position) in &status.dice {
                text.push_str(&format!(
                    "\n      {} at ({:.2}, {:.2}, {:.2})",
                    node, position.x, position.y, position.z
                ));
            }
            text
        }
    };
    println!("{} {}", prefix, line);
    for diagnostic in &report.diagnostics {
        println!("      {}", diagnostic.to_string().dimmed());
    }
}
