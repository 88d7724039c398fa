use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use placer::actor::mouse::MouseChannel;
use placer::actor::session::Session;
use placer::common::config::{Settings, default_plan_file, settings_file};
use placer::common::log;
use placer::model::WindowsCollection;
use placer::sys::platform;
use placer::sys::pointer::RdevPointer;
use tracing::{error, info};

#[derive(Parser)]
#[command(version, about = "Walk through every open window and place it with the mouse")]
struct Cli {
    /// Settings file to use instead of the one in the data directory.
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Check the settings file and report problems without placing anything.
    #[arg(long)]
    validate: bool,

    /// Reset out of range values in the settings file to their defaults and
    /// write it back, keeping only keys that differ from the defaults.
    #[arg(long, conflicts_with = "validate")]
    fix_settings: bool,

    /// Print a saved plan and exit. Without FILE, shows the plan written by
    /// the last completed run.
    #[arg(long, value_name = "FILE")]
    show_plan: Option<Option<PathBuf>>,
}

fn main() -> ExitCode {
    let opt: Cli = Parser::parse();
    log::init_logging();

    let settings_path = opt.settings.unwrap_or_else(settings_file);
    if opt.validate {
        return validate(&settings_path);
    }
    if opt.fix_settings {
        return report(fix_settings(&settings_path));
    }
    if let Some(plan) = opt.show_plan {
        return report(show_plan(&plan.unwrap_or_else(default_plan_file)));
    }

    let host = match platform::host() {
        Ok(host) => host,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    report(run(host, Settings::load(&settings_path)))
}

fn report(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &Path) -> ExitCode {
    let buf = match std::fs::read_to_string(path) {
        Ok(buf) => buf,
        Err(_) => {
            println!("{}: not found, defaults apply", path.display());
            return ExitCode::SUCCESS;
        }
    };
    let settings = match Settings::parse(&buf) {
        Ok(settings) => settings,
        Err(e) => {
            println!("{}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };
    let issues = settings.validate();
    if issues.is_empty() {
        println!("{}: ok", path.display());
        return ExitCode::SUCCESS;
    }
    for issue in &issues {
        println!("{}: {issue}", path.display());
    }
    ExitCode::FAILURE
}

fn fix_settings(path: &Path) -> anyhow::Result<()> {
    let buf = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut settings = Settings::parse(&buf).with_context(|| format!("parsing {}", path.display()))?;
    let fixes = settings.auto_fix_values();
    settings.save(path).with_context(|| format!("writing {}", path.display()))?;
    info!(fixes, path = %path.display(), "settings rewritten");
    println!("{}: {fixes} value(s) reset, {} key(s) kept", path.display(), settings.changed_values().len());
    Ok(())
}

fn show_plan(path: &Path) -> anyhow::Result<()> {
    let buf = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let plan = WindowsCollection::from_json(&buf).with_context(|| format!("parsing {}", path.display()))?;
    for (i, model) in plan.iter().enumerate() {
        let from = model.rect();
        let to = model.current_rect();
        println!(
            "{:>2}. {:<40} ws {} -> {}  ({}, {}, {}x{}) -> ({}, {}, {}x{})",
            i + 1,
            model.title,
            model.workspace,
            model.current_workspace(),
            from.x,
            from.y,
            from.w,
            from.h,
            to.x,
            to.y,
            to.w,
            to.h,
        );
    }
    Ok(())
}

fn run(host: platform::Host, settings: Settings) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("starting runtime")?;
    let mut session = Session::open(
        host.provider,
        host.presenter,
        MouseChannel::new(RdevPointer),
        host.capture,
        settings,
        default_plan_file(),
    )?;
    runtime.block_on(session.run());
    info!(state = ?session.state(), "done");
    Ok(())
}
