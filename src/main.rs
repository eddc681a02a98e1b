//! neoterm - a cyberpunk mock-terminal dashboard
//!
//! neoterm fills the terminal with a procedurally animated backdrop and
//! overlays a retro "AI terminal" panel that answers a small, fixed command
//! vocabulary with canned (and occasionally randomized) output. Everything
//! behind the commands is synthetic; nothing touches the network.
//!
//! # Features
//!
//! - **Two backdrops**: falling-glyph rain and a pulsing circuit board,
//!   switchable at runtime with the `matrix` command
//! - **Mock terminal**: scrollback, blinking cursor, command history
//! - **Themes**: matrix, cyan, amber
//! - **Config file**: `~/.neoterm/config.toml`
//!
//! # Quick Start
//!
//! ```text
//! neoterm                # rain backdrop, matrix theme
//! neoterm -b circuit     # circuit-board backdrop
//! neoterm -t cyan --fps 60
//! ```
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | printable chars | type into the terminal panel |
//! | Enter | submit the input line |
//! | Backspace | delete the last character |
//! | Esc | hide the terminal panel |
//! | any key (panel hidden) | show the terminal panel |
//! | Ctrl+Q / Ctrl+C | quit |

mod anim;
mod config;
mod core;
mod history;
mod ui;

use std::env;
use std::io::Write;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::anim::{AnimationScheduler, BackdropKind, Viewport};
use crate::config::{Config, Theme};
use crate::core::command::Effect;
use crate::core::session::TerminalSession;
use crate::ui::{Renderer, StatusInfo};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Blink checks must not starve at low frame rates.
const MAX_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Command-line overrides, merged over the config file.
#[derive(Default)]
struct CliArgs {
    backdrop: Option<BackdropKind>,
    theme: Option<String>,
    fps: Option<u32>,
}

fn print_version() {
    eprintln!("neoterm {}", VERSION);
}

fn print_help() {
    eprintln!("neoterm {} - a cyberpunk mock-terminal dashboard", VERSION);
    eprintln!();
    eprintln!("Usage: neoterm [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -b, --backdrop <NAME>  Backdrop variant: rain, circuit");
    eprintln!("  -t, --theme <NAME>     Theme: {}", Theme::list().join(", "));
    eprintln!("      --fps <N>          Target animation frame rate");
    eprintln!("  -v, --version          Show version");
    eprintln!("  -h, --help             Show this help");
    eprintln!();
    eprintln!("Terminal commands: type 'help' inside the panel.");
    eprintln!("Exit: Ctrl+Q (or type 'exit' to hide the panel)");
    eprintln!();
    eprintln!("Configuration: ~/.neoterm/config.toml");
}

fn parse_args() -> Result<CliArgs, String> {
    let args: Vec<String> = env::args().collect();
    let mut cli = CliArgs::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-b" | "--backdrop" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing backdrop argument".to_string());
                }
                cli.backdrop = Some(
                    BackdropKind::parse(&args[i])
                        .ok_or_else(|| format!("Unknown backdrop: {}", args[i]))?,
                );
            }
            "-t" | "--theme" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing theme argument".to_string());
                }
                cli.theme = Some(args[i].clone());
            }
            "--fps" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing fps argument".to_string());
                }
                cli.fps = Some(
                    args[i]
                        .parse()
                        .map_err(|_| format!("Invalid fps: {}", args[i]))?,
                );
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(cli)
}

fn main() -> anyhow::Result<()> {
    let cli = match parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    // Initialize logging to file; stdout belongs to the renderer.
    let log_path = config::app_dir()
        .map(|dir| dir.join("neoterm.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("neoterm.log"));

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    info!("neoterm {} starting...", VERSION);

    // Merge config: command line args override config file.
    let mut config = Config::load();
    if let Some(kind) = cli.backdrop {
        config.backdrop = kind.name().to_string();
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(fps) = cli.fps {
        config.fps = fps;
    }

    run(config)
}

fn run(config: Config) -> anyhow::Result<()> {
    let kind = BackdropKind::parse(&config.backdrop).unwrap_or(BackdropKind::Rain);
    let theme = config.get_theme();
    info!(
        "backdrop: {}, theme: {}, fps: {}",
        kind.name(),
        theme.name,
        config.fps
    );

    let (cols, rows) = Renderer::size()?;
    info!("terminal size: {}x{}", cols, rows);

    let now = Instant::now();
    let mut scheduler = AnimationScheduler::new(
        kind,
        config.fps,
        config.rain.pool,
        Viewport::new(cols, rows),
        now,
    );
    let mut session = TerminalSession::new(now);

    let mut renderer = Renderer::new(theme);
    renderer.init()?;

    // Run main loop
    let result = run_main_loop(&mut scheduler, &mut session, &mut renderer);

    // Cleanup - multiple attempts to ensure it works
    let _ = renderer.cleanup();
    let _ = crossterm::terminal::disable_raw_mode();
    print!("\x1b[?1049l"); // Leave alternate screen
    print!("\x1b[?25h"); // Show cursor
    print!("\x1b[0m"); // Reset attributes
    let _ = std::io::stdout().flush();

    info!("neoterm exiting");
    result
}

/// Main event loop.
///
/// One thread serializes everything: key events, resize events, the blink
/// timer, and animation ticks. A tick's advancement always completes
/// before its redraw is issued.
fn run_main_loop(
    scheduler: &mut AnimationScheduler,
    session: &mut TerminalSession,
    renderer: &mut Renderer,
) -> anyhow::Result<()> {
    let mut panel_visible = true;
    let mut needs_redraw = true;

    loop {
        let now = Instant::now();
        let timeout = scheduler.time_until_frame(now).min(MAX_POLL_TIMEOUT);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key_event) => {
                    if key_event.kind != KeyEventKind::Press {
                        continue;
                    }

                    // Quit keys work regardless of panel state.
                    if key_event.modifiers.contains(KeyModifiers::CONTROL)
                        && matches!(key_event.code, KeyCode::Char('q') | KeyCode::Char('c'))
                    {
                        info!("quit requested");
                        break;
                    }

                    // Any key wakes a hidden panel.
                    if !panel_visible {
                        panel_visible = true;
                        needs_redraw = true;
                        continue;
                    }

                    match key_event.code {
                        KeyCode::Esc => {
                            panel_visible = false;
                            needs_redraw = true;
                        }
                        KeyCode::Enter => {
                            match session.submit() {
                                Effect::CloseTerminal => {
                                    info!("terminal panel closed");
                                    panel_visible = false;
                                }
                                Effect::SwitchBackdrop => {
                                    scheduler.toggle();
                                }
                                Effect::ClearScreen | Effect::None => {}
                            }
                            needs_redraw = true;
                        }
                        KeyCode::Backspace => {
                            session.backspace();
                            needs_redraw = true;
                        }
                        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                            session.push_char(c);
                            needs_redraw = true;
                        }
                        _ => {}
                    }
                }

                Event::Resize(cols, rows) => {
                    info!("resize: {}x{}", cols, rows);
                    scheduler.handle_resize(cols, rows);
                    renderer.handle_resize(cols, rows);
                    needs_redraw = true;
                }

                _ => {}
            }
        }

        let now = Instant::now();
        if panel_visible && session.tick_cursor(now) {
            needs_redraw = true;
        }
        if scheduler.frame_due(now) {
            scheduler.tick(now);
            needs_redraw = true;
        }

        if needs_redraw {
            let frame = scheduler.frame();
            let status = StatusInfo {
                backdrop: scheduler.kind().name(),
                population: scheduler.population(),
                history_len: session.history().len(),
                panel_visible,
            };
            renderer.render(&frame, session, &status)?;
            needs_redraw = false;
        }
    }

    Ok(())
}
