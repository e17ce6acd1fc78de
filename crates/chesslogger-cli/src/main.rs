//! Interactive terminal driver for the move-tree core
//!
//! Stands where a board UI would: turns typed commands into move
//! attempts and navigation calls, prints the command stream a board
//! surface would receive, and talks to the REST store for saved games.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use chesslogger_core::{
    BoardCommand, Color, Cursor, GameError, GameSession, LineId, MoveAttempt, MoveOutcome,
    MoveTree, PromotionChoice, RulesEngine, SessionConfig, Square,
};
use chesslogger_engine::ShakmatyEngine;
use chesslogger_store::GameStore;

#[derive(Parser, Debug)]
#[command(name = "chesslogger", about = "Log and analyze chess games with branching variations")]
struct Args {
    /// Base url of the REST document store
    #[arg(long, default_value = "http://localhost:3000")]
    store_url: String,

    /// Database name at the store
    #[arg(long, default_value = "chesslogger")]
    db: String,

    /// Collection holding saved games
    #[arg(long, default_value = "games")]
    collection: String,

    /// Record only the mainline; refuse to open variations
    #[arg(long)]
    no_variations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let store = GameStore::new(&args.store_url, &args.db, &args.collection)
        .context("store configuration")?;
    let config = SessionConfig {
        allow_multiple_lines: !args.no_variations,
    };
    let mut session = GameSession::new(ShakmatyEngine::new(), config);

    println!("chesslogger - type 'help' for commands");
    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        if matches!(command, "quit" | "exit") {
            break;
        }
        if let Err(err) = dispatch(command, rest, &mut session, &store).await {
            println!("{err}");
        }
    }
    Ok(())
}

async fn dispatch(
    command: &str,
    rest: &str,
    session: &mut GameSession<ShakmatyEngine>,
    store: &GameStore,
) -> anyhow::Result<()> {
    match command {
        "help" => print_help(),
        "move" => play_move(session, rest)?,
        "start" => show(session.go_to_start()),
        "end" => show(session.go_to_end()),
        "next" => show(session.go_forward_one()),
        "back" => show(session.go_back_one()),
        "goto" => {
            let n: i64 = rest.parse().context("goto needs a move number")?;
            let target = session.tree().tempo_by_number(n);
            show(session.set_position(target));
        }
        "branch" => enter_branch(session, rest)?,
        "lines" => list_continuations(session),
        "moves" => print!("{}", render_tree(session.tree())),
        "path" => print_active_path(session.tree()),
        "fen" => println!("{}", session.selected_fen()),
        "pgn" => println!("{}", session.to_document().pgn),
        "undo" => match session.undo() {
            Ok(Some(board)) => print_board(&board),
            Ok(None) => println!("nothing to undo"),
            Err(err) => println!("{err}"),
        },
        "flip" => print_board(&session.flip_board()),
        "tag" => set_tag(session, rest)?,
        "new" => {
            print_board(&session.new_game());
        }
        "save" => save_game(session, store).await?,
        "games" => {
            for game in store.list().await? {
                println!(
                    "{}  {} vs {}  {}  {}",
                    game.id,
                    game.game.game_info.white,
                    game.game.game_info.black,
                    game.game.game_info.date,
                    game.game.pgn
                );
            }
        }
        "load" => {
            if rest.is_empty() {
                println!("load needs a game id; 'games' lists them");
                return Ok(());
            }
            let stored = store.fetch(rest).await?;
            match session.load_document(&stored.game, Some(stored.id)) {
                Ok(board) => {
                    println!("loaded");
                    print_board(&board);
                }
                Err(err) => println!("load failed: {err}"),
            }
        }
        "delete" => {
            if rest.is_empty() {
                println!("delete needs a game id");
                return Ok(());
            }
            store.delete(rest).await?;
            println!("deleted {rest}");
        }
        other => println!("unknown command {other:?}; try 'help'"),
    }
    Ok(())
}

fn print_help() {
    println!(
        "  move <from><to>[=q]   play a move, e.g. 'move e2e4' or 'move a7a8=q'\n\
         \x20 start end next back   walk the current line\n\
         \x20 goto <n>              jump to the n-th move of the current line\n\
         \x20 lines / branch <k>    show / enter a recorded continuation\n\
         \x20 moves path fen pgn    inspect the tree and position\n\
         \x20 undo                  erase the last move of the current line\n\
         \x20 tag <field> <value>   set game info (white black event location result)\n\
         \x20 new save games load <id> delete <id>\n\
         \x20 flip quit"
    );
}

/// Parse "e2e4" / "a7a8=q" and run it through ingestion
fn play_move(session: &mut GameSession<ShakmatyEngine>, input: &str) -> anyhow::Result<()> {
    let (squares, promo) = match input.split_once('=') {
        Some((s, p)) => (s, Some(p)),
        None => (input, None),
    };
    if squares.len() != 4 || !squares.is_ascii() {
        anyhow::bail!("moves look like 'e2e4' or 'a7a8=q'");
    }
    let from: Square = squares[..2].parse()?;
    let to: Square = squares[2..].parse()?;
    let choice = match promo {
        Some(p) => Some(
            p.chars()
                .next()
                .and_then(PromotionChoice::from_char)
                .context("promotion piece must be one of q r b n")?,
        ),
        None => None,
    };

    let fen = session.selected_fen().to_string();
    let Some(piece) = session.engine().piece_at(&fen, from)? else {
        println!("no piece on {from}");
        return Ok(());
    };
    if !session.can_pick_up(piece)? {
        println!("you can't pick that up here");
        return Ok(());
    }

    let outcome = match session.try_move(MoveAttempt { from, to, piece }) {
        Ok(outcome) => outcome,
        Err(GameError::InvalidMove { message }) => {
            println!("snapback: {message}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    match outcome {
        MoveOutcome::PromotionPending => match choice {
            Some(choice) => report(session.resolve_promotion(choice)),
            None => prompt_promotion(session)?,
        },
        other => report(Ok(other)),
    }
    Ok(())
}

/// The one suspension point: keep asking until a piece is chosen or the
/// move is cancelled
fn prompt_promotion(session: &mut GameSession<ShakmatyEngine>) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("promote to [q/r/b/n, or cancel]: ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 || line.trim() == "cancel" {
            session.cancel_promotion();
            println!("move abandoned");
            return Ok(());
        }
        if let Some(choice) = line.trim().chars().next().and_then(PromotionChoice::from_char) {
            report(session.resolve_promotion(choice));
            return Ok(());
        }
        warn!("[CLI] unusable promotion answer {:?}", line.trim());
    }
}

fn report(outcome: Result<MoveOutcome, GameError>) {
    match outcome {
        Ok(MoveOutcome::Recorded { board, .. }) => print_board(&board),
        Ok(MoveOutcome::Reused { board, .. }) => {
            println!("(already recorded - following the existing line)");
            print_board(&board);
        }
        Ok(MoveOutcome::PromotionPending) => println!("promotion still pending"),
        Err(err) => println!("{err}"),
    }
}

fn enter_branch(session: &mut GameSession<ShakmatyEngine>, rest: &str) -> anyhow::Result<()> {
    let k: usize = rest.parse().context("branch needs an index from 'lines'")?;
    let continuations = session.tree().continuations();
    match continuations.get(k.wrapping_sub(1)) {
        Some(&tempo) => show(session.set_position(Cursor::At(tempo))),
        None => println!("no continuation #{k}; 'lines' shows what is recorded"),
    }
    Ok(())
}

fn list_continuations(session: &GameSession<ShakmatyEngine>) {
    let tree = session.tree();
    let continuations = tree.continuations();
    if continuations.is_empty() {
        println!("no recorded continuations from here");
        return;
    }
    for (i, &id) in continuations.iter().enumerate() {
        println!("  {}: {}", i + 1, tree.tempo(id).san);
    }
}

fn set_tag(session: &mut GameSession<ShakmatyEngine>, rest: &str) -> anyhow::Result<()> {
    let (field, value) = rest
        .split_once(' ')
        .context("tag needs a field and a value")?;
    let mut info = session.game_info().clone();
    match field {
        "white" => info.white = value.to_string(),
        "black" => info.black = value.to_string(),
        "event" => info.event = value.to_string(),
        "location" => info.location = value.to_string(),
        "result" => info.result = value.to_string(),
        other => anyhow::bail!("unknown tag field {other:?}"),
    }
    session.set_game_info(info);
    Ok(())
}

async fn save_game(
    session: &mut GameSession<ShakmatyEngine>,
    store: &GameStore,
) -> anyhow::Result<()> {
    let doc = session.to_document();
    match session.game_id() {
        Some(id) => {
            let id = id.to_string();
            store.update(&id, &doc).await?;
            println!("updated {id}");
        }
        None => {
            let id = store.create(&doc).await?;
            println!("saved as {id}");
            session.set_game_id(Some(id));
        }
    }
    Ok(())
}

fn show(result: Result<BoardCommand, GameError>) {
    match result {
        Ok(board) => print_board(&board),
        Err(GameError::NoSelection) => println!("nothing recorded yet"),
        Err(err) => println!("{err}"),
    }
}

/// The stand-in board surface: print what a real one would execute
fn print_board(command: &BoardCommand) {
    match command {
        BoardCommand::SetPosition { fen, animate } => {
            let mode = if *animate { "animate" } else { "snap" };
            println!("[BOARD] {mode} {fen}");
        }
        BoardCommand::Flip => println!("[BOARD] flip"),
    }
}

/// Movelist with nested variations, the cursor marked with '*'
fn render_tree(tree: &MoveTree) -> String {
    let mut out = String::new();
    if tree.is_empty() {
        out.push_str("(no moves)\n");
        return out;
    }
    render_line(tree, tree.root(), 0, &mut out);
    out
}

fn render_line(tree: &MoveTree, line_id: LineId, depth: usize, out: &mut String) {
    let line = tree.line(line_id);
    let mut tokens: Vec<String> = Vec::new();
    for &id in &line.tempos {
        let tempo = tree.tempo(id);
        let move_number = (tempo.number + 1) / 2;
        match tempo.color {
            Color::White => tokens.push(format!("{move_number}.")),
            Color::Black if tree.needs_white_placeholder(id) => {
                tokens.push(format!("{move_number}..."))
            }
            Color::Black => {}
        }
        if tree.cursor() == Cursor::At(id) {
            tokens.push(format!("{}*", tempo.san));
        } else {
            tokens.push(tempo.san.clone());
        }
    }
    out.push_str(&"    ".repeat(depth));
    out.push_str(&tokens.join(" "));
    out.push('\n');

    for &id in &line.tempos {
        for &branch in &tree.tempo(id).branches {
            if !tree.line(branch).tempos.is_empty() {
                render_line(tree, branch, depth + 1, out);
            }
        }
    }
}

/// SANs of the moves leading to the cursor's line, in game order
fn print_active_path(tree: &MoveTree) {
    let mut path: Vec<(u32, String)> = Vec::new();
    collect_path(tree, tree.root(), &mut path);
    path.sort_by_key(|&(number, _)| number);
    let sans: Vec<_> = path.into_iter().map(|(_, san)| san).collect();
    println!("{}", sans.join(" "));
}

fn collect_path(tree: &MoveTree, line_id: LineId, path: &mut Vec<(u32, String)>) {
    let line = tree.line(line_id);
    for &id in &line.tempos {
        if tree.is_on_active_path(id) {
            let tempo = tree.tempo(id);
            path.push((tempo.number, tempo.san.clone()));
        }
        for &branch in &tree.tempo(id).branches {
            collect_path(tree, branch, path);
        }
    }
}
