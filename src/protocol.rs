//! OpusCheckers - Text Protocol Module
//!
//! A line-oriented command protocol in the spirit of UCI, letting a front end
//! set up games, submit human moves and ask the engine for its move.
//!
//! Commands:
//! - `checkers` - identify and list options, answered by `checkersok`
//! - `isready` - answered by `readyok`
//! - `setoption name <name> value <value>`
//! - `newgame`
//! - `position startpos [moves ...]` / `position layout <layout> turn <1|2> [moves ...]`
//! - `move <move>` - apply a move for the side to move
//! - `go [depth <n> | level <easy|medium|hard>]` - search and report `bestmove`
//! - `play [depth <n> | level <...>]` - search, then apply the best move
//! - `moves`, `pieces`, `d`, `tree`, `perft <n>`, `bench`, `debug on|off`, `stop`, `quit`

use std::io::{BufRead, Write};
use std::time::Instant;

use tracing::{info, warn};

use crate::board::Board;
use crate::error::{EngineError, EngineResult};
use crate::evaluation::EvalWeights;
use crate::game::{GameState, Outcome};
use crate::parallel_search::ParallelSearchEngine;
use crate::search::{Algorithm, Level, SearchConfig, SearchResult, SearchTree};
use crate::types::*;

// Engine identification
const ENGINE_NAME: &str = "OpusCheckers";
const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_DEPTH: i32 = 3;
const MAX_DEPTH: i32 = 20;

/// Kind and range of a protocol option
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionKind {
    Spin { min: i32, max: i32 },
    Check,
    Button,
}

/// Protocol option representation
#[derive(Clone, Debug)]
pub struct ProtocolOption {
    pub name: String,
    pub kind: OptionKind,
    pub default: String,
    pub value: String,
}

impl ProtocolOption {
    pub fn spin(name: &str, default: i32, min: i32, max: i32) -> Self {
        ProtocolOption {
            name: name.to_string(),
            kind: OptionKind::Spin { min, max },
            default: default.to_string(),
            value: default.to_string(),
        }
    }

    pub fn check(name: &str, default: bool) -> Self {
        ProtocolOption {
            name: name.to_string(),
            kind: OptionKind::Check,
            default: default.to_string(),
            value: default.to_string(),
        }
    }

    pub fn button(name: &str) -> Self {
        ProtocolOption {
            name: name.to_string(),
            kind: OptionKind::Button,
            default: String::new(),
            value: String::new(),
        }
    }

    pub fn describe(&self) -> String {
        match self.kind {
            OptionKind::Spin { min, max } => format!(
                "option name {} type spin default {} min {} max {}",
                self.name, self.default, min, max
            ),
            OptionKind::Check => format!("option name {} type check default {}", self.name, self.default),
            OptionKind::Button => format!("option name {} type button", self.name),
        }
    }

    /// Store a new value; out-of-range spins and malformed input are refused
    pub fn set_value(&mut self, value_str: &str) -> bool {
        match self.kind {
            OptionKind::Spin { min, max } => match value_str.parse::<i32>() {
                Ok(val) if (min..=max).contains(&val) => {
                    self.value = val.to_string();
                    true
                }
                _ => false,
            },
            OptionKind::Check => match value_str.to_lowercase().as_str() {
                "true" | "false" => {
                    self.value = value_str.to_lowercase();
                    true
                }
                _ => false,
            },
            OptionKind::Button => false,
        }
    }

    pub fn get_int(&self) -> i32 {
        self.value.parse().unwrap_or(0)
    }

    pub fn get_bool(&self) -> bool {
        self.value == "true"
    }
}

/// Parse "b3-a4", "b3xd5" or "b3a4" into origin and target squares
pub fn parse_move(text: &str) -> EngineResult<(Square, Square)> {
    let cleaned: String = text.chars().filter(|c| *c != '-' && *c != 'x').collect();
    if cleaned.len() != 4 || !cleaned.is_ascii() {
        return Err(EngineError::InvalidSquare(text.to_string()));
    }
    let from = Square::parse(&cleaned[0..2])?;
    let to = Square::parse(&cleaned[2..4])?;
    Ok((from, to))
}

fn outcome_text(outcome: Outcome) -> String {
    match outcome {
        Outcome::Win(player) => format!("winner {}", player.number()),
        Outcome::Draw => "draw".to_string(),
    }
}

/// Protocol handler writing responses to `W`
pub struct CheckersProtocol<W: Write> {
    game: GameState,
    search_engine: ParallelSearchEngine,
    running: bool,
    debug_mode: bool,
    options: Vec<ProtocolOption>,
    last_tree: Option<SearchTree>,
    out: W,
}

impl<W: Write> CheckersProtocol<W> {
    pub fn new(out: W) -> Self {
        let mut protocol = CheckersProtocol {
            game: GameState::default(),
            search_engine: ParallelSearchEngine::new(SearchConfig::default(), 0),
            running: true,
            debug_mode: false,
            options: Vec::new(),
            last_tree: None,
            out,
        };

        protocol.init_options();
        protocol.apply_options();
        protocol
    }

    fn init_options(&mut self) {
        let weights = EvalWeights::default();
        self.options = vec![
            ProtocolOption::spin("Threads", num_cpus::get() as i32, 0, 256),
            ProtocolOption::spin("Depth", DEFAULT_DEPTH, 0, MAX_DEPTH),
            ProtocolOption::check("ForceJump", true),
            ProtocolOption::spin("StartingPlayer", 1, 1, 2),
            ProtocolOption::spin("ManValue", weights.man, 0, 100),
            ProtocolOption::spin("KingValue", weights.king, 0, 100),
            ProtocolOption::spin("MobilityWeight", weights.mobility, 0, 100),
            ProtocolOption::spin("CenterWeight", weights.center, 0, 100),
            ProtocolOption::spin("ThreatWeight", weights.threat, 0, 100),
            ProtocolOption::check("UseAlphaBeta", true),
            ProtocolOption::check("RecordTree", false),
            ProtocolOption::button("Clear Tree"),
        ];
    }

    fn option(&self, name: &str) -> Option<&ProtocolOption> {
        self.options.iter().find(|o| o.name == name)
    }

    fn int_option(&self, name: &str) -> i32 {
        self.option(name).map(ProtocolOption::get_int).unwrap_or(0)
    }

    fn bool_option(&self, name: &str) -> bool {
        self.option(name).map(ProtocolOption::get_bool).unwrap_or(false)
    }

    fn apply_options(&mut self) {
        let config = SearchConfig {
            algorithm: if self.bool_option("UseAlphaBeta") {
                Algorithm::AlphaBeta
            } else {
                Algorithm::Minimax
            },
            weights: EvalWeights {
                man: self.int_option("ManValue"),
                king: self.int_option("KingValue"),
                mobility: self.int_option("MobilityWeight"),
                center: self.int_option("CenterWeight"),
                threat: self.int_option("ThreatWeight"),
            },
            record_tree: self.bool_option("RecordTree"),
        };
        self.search_engine.config = config;
        self.search_engine.set_threads(self.int_option("Threads").max(0) as usize);
    }

    /// Set an option by name, as `setoption` does. Returns false if the
    /// option is unknown or the value is refused.
    pub fn set_option(&mut self, name: &str, value: &str) -> bool {
        let accepted = match self.options.iter_mut().find(|o| o.name == name) {
            Some(opt) => opt.set_value(value),
            None => false,
        };
        if accepted {
            self.apply_options();
        }
        accepted
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn run<R: BufRead>(&mut self, input: R) {
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(%err, "failed to read input");
                    break;
                }
            };
            let line = line.trim();
            if !line.is_empty() {
                self.process_command(line);
            }
            if !self.running {
                break;
            }
        }
    }

    pub fn process_command(&mut self, line: &str) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return;
        }

        let command = parts[0];
        let args = &parts[1..];

        match command {
            "checkers" => self.cmd_checkers(),
            "isready" => self.send("readyok"),
            "setoption" => self.cmd_setoption(args),
            "newgame" => self.cmd_newgame(),
            "position" => self.cmd_position(args),
            "move" => self.cmd_move(args),
            "go" => self.cmd_go(args, false),
            "play" => self.cmd_go(args, true),
            "moves" => self.cmd_moves(),
            "pieces" => self.cmd_pieces(),
            "stop" => self.search_engine.stop(),
            "quit" => self.running = false,
            "debug" => match args.first() {
                Some(&"on") => self.debug_mode = true,
                Some(&"off") => self.debug_mode = false,
                _ => self.send_error(&EngineError::InvalidCommand(line.to_string())),
            },
            "d" => self.cmd_display(),
            "tree" => self.cmd_tree(),
            "perft" => self.cmd_perft(args),
            "bench" => self.cmd_bench(),
            _ => {
                warn!(command, "unknown command");
                if self.debug_mode {
                    self.send(&format!("info string Unknown command: {}", command));
                }
            }
        }
    }

    fn send(&mut self, message: &str) {
        if let Err(err) = writeln!(self.out, "{}", message).and_then(|_| self.out.flush()) {
            warn!(%err, "failed to write response");
        }
    }

    fn send_error(&mut self, err: &EngineError) {
        warn!(%err, "command rejected");
        self.send(&format!("error {}", err));
    }

    fn cmd_checkers(&mut self) {
        self.send(&format!("id name {} {}", ENGINE_NAME, ENGINE_VERSION));
        let lines: Vec<String> = self.options.iter().map(ProtocolOption::describe).collect();
        for line in lines {
            self.send(&line);
        }
        self.send("checkersok");
    }

    fn cmd_setoption(&mut self, args: &[&str]) {
        if args.len() < 2 || args[0] != "name" {
            return self.send_error(&EngineError::InvalidCommand(format!("setoption {}", args.join(" "))));
        }

        let value_at = args.iter().position(|a| *a == "value");
        let name = args[1..value_at.unwrap_or(args.len())].join(" ");
        let value = value_at.map(|i| args[i + 1..].join(" ")).unwrap_or_default();

        if name == "Clear Tree" {
            self.last_tree = None;
            return;
        }

        if self.set_option(&name, &value) {
            if self.debug_mode {
                self.send(&format!("info string Option {} set to {}", name, value));
            }
        } else {
            self.send_error(&EngineError::InvalidCommand(format!("option {} value {}", name, value)));
        }
    }

    fn new_game(&self) -> GameState {
        let starting = Player::from_number(self.int_option("StartingPlayer") as u8).unwrap_or(Player::Player1);
        GameState::new_game(starting, self.bool_option("ForceJump"))
    }

    fn cmd_newgame(&mut self) {
        self.game = self.new_game();
        self.last_tree = None;
    }

    fn cmd_position(&mut self, args: &[&str]) {
        let invalid = || EngineError::InvalidCommand(format!("position {}", args.join(" ")));
        if args.is_empty() {
            return self.send_error(&invalid());
        }

        let mut moves_index: Option<usize> = None;

        if args[0] == "startpos" {
            self.game = self.new_game();
            if args.get(1) == Some(&"moves") {
                moves_index = Some(2);
            }
        } else if args[0] == "layout" {
            let board = match args.get(1).map(|l| Board::from_layout(l)) {
                Some(Ok(board)) => board,
                Some(Err(err)) => return self.send_error(&err),
                None => return self.send_error(&EngineError::InvalidLayout("missing layout".into())),
            };
            let mut turn = Player::Player1;
            let mut i = 2;
            if args.get(i) == Some(&"turn") {
                turn = match args
                    .get(i + 1)
                    .and_then(|t| t.parse::<u8>().ok())
                    .and_then(Player::from_number)
                {
                    Some(player) => player,
                    None => return self.send_error(&invalid()),
                };
                i += 2;
            }
            self.game = GameState::from_board(board, turn, self.bool_option("ForceJump"));
            match args.get(i) {
                Some(&"moves") => moves_index = Some(i + 1),
                Some(_) => return self.send_error(&invalid()),
                None => {}
            }
        } else {
            return self.send_error(&invalid());
        }

        if let Some(idx) = moves_index {
            for move_str in &args[idx.min(args.len())..] {
                if let Err(err) = self.apply_text_move(move_str) {
                    self.send_error(&err);
                    break;
                }
            }
        }
    }

    fn apply_text_move(&mut self, text: &str) -> EngineResult<()> {
        let (from, to) = parse_move(text)?;
        let report = self.game.apply_move(from, to)?;
        if let Some(outcome) = report.outcome {
            info!(outcome = ?outcome, "game finished");
        }
        Ok(())
    }

    fn cmd_move(&mut self, args: &[&str]) {
        let text = match args.first() {
            Some(t) => *t,
            None => return self.send_error(&EngineError::InvalidCommand("move".to_string())),
        };

        match parse_move(text).and_then(|(from, to)| self.game.apply_move(from, to)) {
            Ok(report) => {
                self.send(&format!("played {}", report.mv));
                if let Some(outcome) = report.outcome {
                    info!(outcome = ?outcome, "game finished");
                    self.send(&format!("result {}", outcome_text(outcome)));
                }
            }
            Err(err) => self.send_error(&err),
        }
    }

    /// Depth requested by `go`/`play` arguments, the `Depth` option if none
    fn parse_depth(&self, args: &[&str]) -> EngineResult<u32> {
        let invalid = || EngineError::InvalidCommand(format!("search arguments '{}'", args.join(" ")));
        let mut depth = self.int_option("Depth") as u32;

        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1).ok_or_else(invalid)?;
            depth = match args[i] {
                "depth" => match value.parse::<u32>() {
                    Ok(d) if d <= MAX_DEPTH as u32 => d,
                    _ => return Err(invalid()),
                },
                "level" => Level::parse(value).ok_or_else(invalid)?.depth(),
                _ => return Err(invalid()),
            };
            i += 2;
        }

        Ok(depth)
    }

    fn cmd_go(&mut self, args: &[&str], apply: bool) {
        let depth = match self.parse_depth(args) {
            Ok(depth) => depth,
            Err(err) => return self.send_error(&err),
        };
        let start = Instant::now();
        let result: SearchResult = self.search_engine.search(&self.game, depth);
        let time_ms = start.elapsed().as_millis() as u64;

        self.send(&format!(
            "info depth {} score {} nodes {} time {}",
            depth, result.evaluation, result.nodes, time_ms
        ));

        if result.tree.is_some() {
            self.last_tree = result.tree.clone();
        }

        match result.best_move {
            Some(mv) => {
                self.send(&format!("bestmove {}", mv));
                if apply {
                    match self.game.apply_move(mv.from, mv.to) {
                        Ok(report) => {
                            if let Some(outcome) = report.outcome {
                                info!(outcome = ?outcome, "game finished");
                                self.send(&format!("result {}", outcome_text(outcome)));
                            }
                        }
                        Err(err) => self.send_error(&err),
                    }
                }
            }
            None => self.send("bestmove none"),
        }
    }

    fn cmd_moves(&mut self) {
        let moves: Vec<String> = self.game.legal_moves().iter().map(|m| m.to_notation()).collect();
        self.send(&format!("moves {}", moves.join(" ")).trim_end().to_string());
    }

    fn cmd_pieces(&mut self) {
        let pieces: Vec<String> = self
            .game
            .movable_pieces()
            .iter()
            .map(|pm| pm.square.name())
            .collect();
        self.send(&format!("pieces {}", pieces.join(" ")).trim_end().to_string());
    }

    fn cmd_display(&mut self) {
        let board = self.game.board().display();
        self.send(&board);
        self.send(&format!("Layout: {}", self.game.board().to_layout()));
        self.send(&format!("Turn: {}", self.game.turn().number()));
        self.send(&format!("Captured: {}", self.game.captured().len()));
        let status = match self.game.winner() {
            Some(outcome) => outcome_text(outcome),
            None => "in progress".to_string(),
        };
        self.send(&format!("Status: {}", status));
    }

    fn cmd_tree(&mut self) {
        let summary = match &self.last_tree {
            Some(tree) => {
                let mut lines = vec![format!(
                    "tree nodes {} height {} score {}",
                    tree.node_count(),
                    tree.height(),
                    tree.evaluation
                )];
                for child in &tree.children {
                    if let Some(mv) = child.mv {
                        lines.push(format!("child {} score {}", mv, child.evaluation));
                    }
                }
                lines
            }
            None => vec!["tree none".to_string()],
        };
        for line in summary {
            self.send(&line);
        }
    }

    fn cmd_perft(&mut self, args: &[&str]) {
        let depth = match args.first().map(|s| s.parse::<u32>()) {
            None => 1,
            Some(Ok(d)) => d,
            Some(Err(_)) => {
                return self.send_error(&EngineError::InvalidCommand(format!("perft {}", args.join(" "))));
            }
        };

        let mut board = *self.game.board();
        let nodes = self.game.generator().perft(&mut board, self.game.turn(), depth);
        self.send(&format!("nodes {}", nodes));
    }

    fn cmd_bench(&mut self) {
        let seeds = [1u64, 2, 3, 4];
        let mut total_nodes = 0u64;
        let start_time = Instant::now();

        for seed in seeds {
            let game = GameState::random_playout(seed, 8, self.bool_option("ForceJump"));
            total_nodes += self.search_engine.search(&game, 6).nodes;
        }

        let elapsed_secs = start_time.elapsed().as_secs_f64();
        let nps = if elapsed_secs > 0.0 { (total_nodes as f64 / elapsed_secs) as u64 } else { 0 };

        self.send(&format!(
            "info string Benchmark: {} nodes in {:.2}s ({} nps)",
            total_nodes, elapsed_secs, nps
        ));
    }
}
