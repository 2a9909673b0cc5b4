use std::error::Error;
use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::board_io;
use crate::io::config_io;
use crate::io::measure_io;
use crate::io::state::{self, BoardState, read_state};
use crate::layout::engine::LayoutEngine;
use crate::layout::estimate;
use crate::layout::host::MemoryHost;
use crate::layout::scheduler::LayoutScope;
use crate::model::config::{EstimateConfig, StickyMode};
use crate::model::stack::StackId;

type CmdResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let mut session = Session::open(&cli)?;

    match cli.command {
        Commands::Stacks => cmd_stacks(&session, json),
        Commands::Layout(args) => cmd_layout(&mut session, args, json),
        Commands::Fold(args) => cmd_fold(&mut session, args, json),
        Commands::FoldAll => cmd_fold_all(&mut session, json),
        Commands::FoldTasks(args) => cmd_fold_tasks(&mut session, args, json),
        Commands::FoldTask(args) => cmd_fold_task(&mut session, args, json),
        Commands::Stack(args) => cmd_stack(&mut session, args, json),
        Commands::Scroll(args) => cmd_scroll(&mut session, args, json),
        Commands::Mode(args) => cmd_mode(&mut session, args, json),
        Commands::State(args) => cmd_state(&session, args, json),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Board, engine and render host for one command
struct Session {
    board_path: PathBuf,
    engine: LayoutEngine,
    estimate: EstimateConfig,
    /// Measurements loaded from `--measurements`; estimated when absent
    measured: Option<MemoryHost>,
}

impl Session {
    fn open(cli: &Cli) -> Result<Session, Box<dyn Error>> {
        let board_path = PathBuf::from(&cli.board);
        let board = board_io::load_board(&board_path)?;
        let config = config_io::load_config(&board_path, cli.config.as_deref().map(Path::new))?;
        let measured = match &cli.measurements {
            Some(path) => Some(measure_io::load_measurements(Path::new(path))?),
            None => None,
        };

        let saved = read_state(&board_path);
        let mut layout_config = config.layout;
        if let Some(mode) = saved.as_ref().and_then(|s| s.sticky_mode) {
            layout_config.sticky_mode = mode;
        }

        let mut engine = LayoutEngine::new(board, layout_config);
        if let Some(saved) = saved {
            let conversions = engine.restore_fold_snapshot(&saved.folds);
            if !conversions.is_empty() {
                tracing::info!(count = conversions.len(), "saved folds converted to horizontal");
            }
        }

        Ok(Session {
            board_path,
            engine,
            estimate: config.estimate,
            measured,
        })
    }

    /// Render host reflecting the current fold state
    fn host(&self) -> MemoryHost {
        match &self.measured {
            Some(host) => host.clone(),
            None => estimate::estimate_host(
                self.engine.board(),
                self.engine.membership(),
                self.engine.store(),
                &self.estimate,
            ),
        }
    }

    fn save_state(&self) -> CmdResult {
        let state = BoardState {
            sticky_mode: Some(self.engine.sticky_mode()),
            saved_at: None,
            folds: self.engine.fold_snapshot(),
        };
        state::write_state(&self.board_path, &state)?;
        Ok(())
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_stacks(session: &Session, json: bool) -> CmdResult {
    let engine = &session.engine;
    let stacks = &engine.membership().stacks;

    if json {
        let out: Vec<StackJson> = stacks
            .iter()
            .map(|s| stack_to_json(s, engine.board(), engine.store()))
            .collect();
        return print_json(&out);
    }
    for stack in stacks {
        for line in format_stack(stack, engine.board(), engine.store()) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_layout(session: &mut Session, args: LayoutArgs, json: bool) -> CmdResult {
    let scope = match args.stack {
        Some(id) => {
            let id = StackId(id);
            if session.engine.membership().get(&id).is_none() {
                return Err(format!("no stack starts at column '{}'", id).into());
            }
            LayoutScope::Stack(id)
        }
        None => LayoutScope::All,
    };

    let mut host = session.host();
    let report = session.engine.layout_now(&mut host, scope);
    if json {
        return print_json(&LayoutJson {
            sticky_mode: session.engine.sticky_mode(),
            report: &report,
        });
    }
    for layout in &report.layouts {
        for line in format_layout(layout) {
            println!("{}", line);
        }
    }
    // Warnings were already logged to stderr
    Ok(())
}

fn cmd_scroll(session: &mut Session, args: ScrollArgs, json: bool) -> CmdResult {
    let mut host = session.host();
    let engine = &mut session.engine;
    engine.layout_now(&mut host, LayoutScope::All);
    engine.on_scroll(args.offset);

    // Let the restore settle, then the anchor update runs
    let mut transitions = Vec::new();
    loop {
        let frame = engine.on_animation_frame(&mut host);
        transitions.extend(frame.transitions);
        if engine.pending_restores() == 0 && !engine.anchors().has_pending_scroll() {
            break;
        }
    }

    let anchors: Vec<AnchorJson> = engine
        .layouts()
        .flat_map(|l| l.positions.iter())
        .filter(|p| p.mode != StickyMode::None)
        .map(|p| AnchorJson {
            column: p.column.clone(),
            boundary: engine.anchors().boundary(&p.column),
            mode: engine.anchors().mode(&p.column),
        })
        .collect();

    if json {
        return print_json(&ScrollJson {
            scroll_top: args.offset,
            anchors,
            transitions,
        });
    }
    println!("scroll {}", args.offset);
    for a in &anchors {
        println!("{}", format_anchor(&a.column, a.boundary, a.mode));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Fold commands
// ---------------------------------------------------------------------------

fn cmd_fold(session: &mut Session, args: FoldArgs, json: bool) -> CmdResult {
    let fold = session.engine.toggle_column_fold(&args.column, args.alt)?;
    session.save_state()?;
    if json {
        return print_json(&fold_to_json(fold));
    }
    println!("{}: {}", args.column, format_fold(fold));
    Ok(())
}

fn cmd_fold_all(session: &mut Session, json: bool) -> CmdResult {
    let state = session.engine.toggle_all_columns();
    session.save_state()?;
    if json {
        return print_json(&serde_json::json!({ "global": state }));
    }
    let label = serde_json::to_value(state)?;
    println!("{}", label.as_str().unwrap_or_default());
    Ok(())
}

fn cmd_fold_tasks(session: &mut Session, args: ColumnArg, json: bool) -> CmdResult {
    let state = session.engine.toggle_tasks_in_column(&args.column)?;
    session.save_state()?;
    if json {
        return print_json(&serde_json::json!({ "column": args.column, "tasks": state }));
    }
    let label = serde_json::to_value(state)?;
    println!("{}: tasks {}", args.column, label.as_str().unwrap_or_default());
    Ok(())
}

fn cmd_fold_task(session: &mut Session, args: FoldTaskArgs, json: bool) -> CmdResult {
    let collapsed = session.engine.toggle_task_fold(&args.column, &args.task)?;
    session.save_state()?;
    if json {
        return print_json(&serde_json::json!({ "task": args.task, "collapsed": collapsed }));
    }
    let label = if collapsed { "folded" } else { "expanded" };
    println!("{}: {}", args.task, label);
    Ok(())
}

fn cmd_mode(session: &mut Session, args: ModeArgs, json: bool) -> CmdResult {
    if let Some(raw) = args.mode {
        let mode = StickyMode::parse(&raw)
            .ok_or_else(|| format!("unknown sticky mode '{}' (expected: none, titleonly, full)", raw))?;
        session.engine.set_sticky_mode(mode);
        session.save_state()?;
    }
    let mode = session.engine.sticky_mode();
    if json {
        return print_json(&serde_json::json!({ "sticky_mode": mode }));
    }
    println!("{}", mode);
    Ok(())
}

// ---------------------------------------------------------------------------
// Stack restructuring
// ---------------------------------------------------------------------------

fn cmd_stack(session: &mut Session, args: StackArgs, json: bool) -> CmdResult {
    let stacked = args.state == Toggle::On;
    let mut host = session.host();
    let (reorganization, report) = session
        .engine
        .retag_column(&mut host, &args.column, stacked)?;

    board_io::save_board(&session.board_path, session.engine.board())?;
    if !report.conversions.is_empty() {
        session.save_state()?;
    }

    if json {
        return print_json(&serde_json::json!({
            "reorganization": reorganization,
            "layouts": report.layouts,
            "conversions": report.conversions,
        }));
    }
    if reorganization.affected.is_empty() {
        println!("{}: stacks unchanged", args.column);
        return Ok(());
    }
    let affected: Vec<&str> = reorganization.affected.iter().map(StackId::as_str).collect();
    println!("{}: relaid out {}", args.column, affected.join(", "));
    for c in &report.conversions {
        println!("  {} now folds horizontal", c.column);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

fn cmd_state(session: &Session, args: StateCmd, json: bool) -> CmdResult {
    match args.action {
        StateAction::Show => {
            let saved = read_state(&session.board_path);
            if json {
                return print_json(&saved);
            }
            match saved {
                Some(s) => println!("{}", serde_json::to_string_pretty(&s)?),
                None => println!("no saved state"),
            }
        }
        StateAction::Reset => {
            let existed = state::clear_state(&session.board_path)?;
            if json {
                return print_json(&serde_json::json!({ "removed": existed }));
            }
            if existed {
                println!("state reset");
            } else {
                println!("no saved state");
            }
        }
    }
    Ok(())
}
