use anyhow::{Context, Result, anyhow};
use log::info;
use pico_args::Arguments;
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    env,
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use crate::actions::{Button, PointerSink, UinputSink};
use crate::clock::MonotonicClock;
use crate::config::ConfigState;
use crate::pipeline;
use crate::recognizer::Recognizer;
use crate::source::JsonLinesSource;

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("run") => {
            let profile: Option<String> = pargs.opt_value_from_str("--profile")?;
            let input: Option<PathBuf> = pargs.opt_value_from_str("--input")?;
            let dry_run = pargs.contains("--dry-run");
            cmd_run(profile.as_deref(), input, dry_run)
        }

        Some("replay") => {
            let profile: Option<String> = pargs.opt_value_from_str("--profile")?;
            let path: PathBuf = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: handctl replay <trace.jsonl> [--profile NAME]"))?;
            cmd_replay(profile.as_deref(), path)
        }

        Some("emit") => {
            // usage:
            //   handctl emit click right 2
            //   handctl emit move 400 300
            let what: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: handctl emit <click|move> ..."))?;
            let cfg = ConfigState::load_or_install_default()?;
            let ptr = &cfg.profile.pointer;
            let mut sink = UinputSink::new(ptr.frame_width, ptr.frame_height)?;
            match what.as_str() {
                "click" => {
                    let btn: Button = pargs.free_from_str().map_err(|_| {
                        anyhow!("usage: handctl emit click <left|right|middle> [times]")
                    })?;
                    let times: u8 = pargs.opt_free_from_str()?.unwrap_or(1);
                    sink.click(btn, times)?;
                    println!("ok: clicked {} x{times}", btn.as_str());
                }
                "move" => {
                    let x: i32 = pargs
                        .free_from_str()
                        .map_err(|_| anyhow!("usage: handctl emit move <x> <y>"))?;
                    let y: i32 = pargs
                        .free_from_str()
                        .map_err(|_| anyhow!("usage: handctl emit move <x> <y>"))?;
                    sink.move_to(x, y)?;
                    println!("ok: moved to ({x}, {y})");
                }
                other => return Err(anyhow!("unknown emit kind: {other}")),
            }
            Ok(())
        }

        Some("list") => {
            let cfg = ConfigState::load_or_install_default()?;
            for name in cfg.list_profiles() {
                let mark = if name == cfg.active_name { "*" } else { " " };
                println!("{mark} {name}");
            }
            Ok(())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: handctl use <profile_name>"))?;
            let mut cfg = ConfigState::load_or_install_default()?;
            cfg.set_active(&name)?;
            println!("ok: active profile is now '{}'", cfg.active_name);
            Ok(())
        }

        Some("doctor") => {
            let cfg = ConfigState::load_or_install_default()?;
            print_response(&cfg.doctor_report());
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn load_config(profile: Option<&str>) -> Result<ConfigState> {
    let cfg = ConfigState::load_or_install_default()?;
    match profile {
        Some(name) => cfg.with_profile(name),
        None => Ok(cfg),
    }
}

fn open_input(path: Option<PathBuf>) -> Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(p) => {
            let f = File::open(&p).with_context(|| format!("failed to open {}", p.display()))?;
            Box::new(BufReader::new(f))
        }
        None => Box::new(io::stdin().lock()),
    })
}

fn cmd_run(profile: Option<&str>, input: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let cfg = load_config(profile)?;
    info!(
        "active profile '{}'",
        cfg.profile.meta.name.as_deref().unwrap_or(&cfg.active_name)
    );

    let ptr = &cfg.profile.pointer;
    let mut sink = if dry_run {
        UinputSink::noop()
    } else {
        UinputSink::new(ptr.frame_width, ptr.frame_height)?
    };
    let mut recognizer = Recognizer::new(&cfg.profile.timing)?;
    let mut source = JsonLinesSource::new(open_input(input)?);
    let stop = install_stop_handler()?;

    pipeline::run_pipeline(
        &mut source,
        &mut recognizer,
        &mut sink,
        ptr.button,
        &MonotonicClock::new(),
        &stop,
    )?;
    log::debug!("final history {}", recognizer.history());
    Ok(())
}

fn cmd_replay(profile: Option<&str>, path: PathBuf) -> Result<()> {
    let cfg = load_config(profile)?;
    let mut recognizer = Recognizer::new(&cfg.profile.timing)?;
    let mut source = JsonLinesSource::new(open_input(Some(path))?);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stats = pipeline::replay(&mut source, &mut recognizer, &MonotonicClock::new(), &mut out)?;
    info!(
        "replayed {} frames: {} events, {} timeouts",
        stats.frames, stats.events, stats.timeouts
    );
    Ok(())
}

/// First SIGINT/SIGTERM stops the loop at the next frame boundary; a second
/// one exits immediately (the input may be blocked on a read).
fn install_stop_handler() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let flag = stop.clone();
    thread::spawn(move || {
        for sig in signals.forever() {
            if flag.swap(true, Ordering::Relaxed) {
                std::process::exit(130);
            }
            info!("received signal {sig}; stopping after the current frame");
        }
    });
    Ok(stop)
}

fn print_help() {
    println!(
        r#"handctl — hand-gesture pointer control

USAGE:
  handctl help [command]                  Show general or command-specific help
  handctl run [--profile NAME] [--input PATH] [--dry-run]
                                          Drive the pointer from observations
  handctl replay <trace.jsonl> [--profile NAME]
                                          Print the events a recording produces
  handctl emit click <left|right|middle> [times]
                                          Emit a mouse click
  handctl emit move <x> <y>               Move the pointer
  handctl list                            List profiles
  handctl use <name>                      Switch active profile
  handctl doctor                          Diagnose permissions and timing

INPUT:
  One JSON object per line, e.g.
    {{"regions": 1, "centroid": [120, 340], "t_ms": 100}}
  centroid is only read when regions == 1; t_ms defaults to arrival time.

TIPS:
  - Profiles: ~/.config/handctl/profiles
  - Active profile pointer: ~/.config/handctl/active
  - HANDCTL_LOG=debug shows every history transition
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "run" => println!(
            "usage: handctl run [--profile NAME] [--input PATH] [--dry-run]\nReads observations from stdin (or PATH) and moves/clicks the pointer.\n--dry-run logs actions instead of creating a uinput device."
        ),
        "replay" => println!(
            "usage: handctl replay <trace.jsonl> [--profile NAME]\nPrints each recognized event and timeout as a JSON line."
        ),
        "emit" => println!(
            "usage:\n  handctl emit click <left|right|middle> [times]\n  handctl emit move <x> <y>"
        ),
        "list" => {
            println!("usage: handctl list\nLists available profiles; marks active with '*'.")
        }
        "use" => {
            println!("usage: handctl use <name>\nSwitches active profile to <name>.")
        }
        "doctor" => println!(
            "usage: handctl doctor\nChecks uinput permissions and shows the active timing."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}

fn print_response(v: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(v).unwrap_or_default());
}
