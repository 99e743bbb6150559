//! OpusCheckers - Search Engine Module
//!
//! This module implements the move search using:
//! - Minimax with alpha-beta pruning (or plain minimax for reference)
//! - Make/unmake on a single board instead of cloning per branch
//! - An observer hook for optional search-tree capture
//! - A shared stop flag for interrupting a running search

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::board::{Board, Move};
use crate::evaluation::{evaluate, EvalWeights};
use crate::game::GameState;
use crate::move_generator::MoveGenerator;
use crate::types::*;

// Bound used for the initial alpha-beta window
pub const INFINITY: i32 = 1_000_000;

/// Tree search flavour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    AlphaBeta,
    /// Exhaustive minimax, no pruning
    Minimax,
}

/// Difficulty presets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

impl Level {
    /// Search depth for this level
    pub fn depth(self) -> u32 {
        match self {
            Level::Easy => 1,
            Level::Medium => 3,
            Level::Hard => 5,
        }
    }

    pub fn parse(name: &str) -> Option<Level> {
        match name.to_lowercase().as_str() {
            "easy" => Some(Level::Easy),
            "medium" => Some(Level::Medium),
            "hard" => Some(Level::Hard),
            _ => None,
        }
    }
}

/// Search settings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SearchConfig {
    pub algorithm: Algorithm,
    pub weights: EvalWeights,
    /// Capture the visited tree in [`SearchResult::tree`]
    pub record_tree: bool,
}

/// One visited node of a recorded search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchTree {
    /// Position at this node
    pub board: Board,
    /// Move that led here from the parent (`None` at the root)
    pub mv: Option<Move>,
    pub evaluation: i32,
    pub best_move: Option<Move>,
    pub children: Vec<SearchTree>,
}

impl SearchTree {
    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SearchTree::node_count).sum::<usize>()
    }

    /// Longest path from this node to a leaf, in plies
    pub fn height(&self) -> usize {
        self.children.iter().map(|c| c.height() + 1).max().unwrap_or(0)
    }
}

/// Callbacks invoked as the search enters and leaves each node
pub trait SearchObserver {
    fn enter_node(&mut self, board: &Board, mv: Option<Move>);
    fn leave_node(&mut self, evaluation: i32, best_move: Option<Move>);
}

/// Observer that does nothing
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    #[inline(always)]
    fn enter_node(&mut self, _board: &Board, _mv: Option<Move>) {}

    #[inline(always)]
    fn leave_node(&mut self, _evaluation: i32, _best_move: Option<Move>) {}
}

/// Observer that rebuilds the visited tree
#[derive(Default)]
pub struct TreeRecorder {
    stack: Vec<SearchTree>,
    root: Option<SearchTree>,
}

impl TreeRecorder {
    pub fn new() -> Self {
        TreeRecorder::default()
    }

    pub fn into_tree(self) -> Option<SearchTree> {
        self.root
    }
}

impl SearchObserver for TreeRecorder {
    fn enter_node(&mut self, board: &Board, mv: Option<Move>) {
        self.stack.push(SearchTree {
            board: *board,
            mv,
            evaluation: 0,
            best_move: None,
            children: Vec::new(),
        });
    }

    fn leave_node(&mut self, evaluation: i32, best_move: Option<Move>) {
        if let Some(mut node) = self.stack.pop() {
            node.evaluation = evaluation;
            node.best_move = best_move;
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => self.root = Some(node),
            }
        }
    }
}

/// Outcome of a search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` when the side to move has no legal move
    pub best_move: Option<Move>,
    /// Score from the point of view of the side to move at the root
    pub evaluation: i32,
    pub nodes: u64,
    /// True if the search was stopped before finishing
    pub interrupted: bool,
    pub tree: Option<SearchTree>,
}

pub struct SearchEngine {
    generator: MoveGenerator,
    pub config: SearchConfig,
    pub nodes_searched: u64,
    stop_search: Arc<AtomicBool>,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        SearchEngine::with_stop_flag(config, Arc::new(AtomicBool::new(false)))
    }

    /// Create an engine that watches an externally owned stop flag
    pub fn with_stop_flag(config: SearchConfig, stop_search: Arc<AtomicBool>) -> Self {
        SearchEngine {
            generator: MoveGenerator::default(),
            config,
            nodes_searched: 0,
            stop_search,
        }
    }

    /// Flag that interrupts a running search when set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_search)
    }

    pub fn stop(&self) {
        self.stop_search.store(true, Ordering::SeqCst);
    }

    #[inline]
    fn stopped(&self) -> bool {
        self.stop_search.load(Ordering::Relaxed)
    }

    /// Search `depth` plies from the current position of `game`.
    ///
    /// The game itself is not modified. A stop request made before the call
    /// is cleared; one made during the call makes the search return the best
    /// root move completed so far.
    pub fn search(&mut self, game: &GameState, depth: u32) -> SearchResult {
        if self.config.record_tree {
            let mut recorder = TreeRecorder::new();
            let mut result = self.search_with_observer(game, depth, &mut recorder);
            result.tree = recorder.into_tree();
            result
        } else {
            self.search_with_observer(game, depth, &mut NoopObserver)
        }
    }

    /// Search while reporting every visited node to `observer`
    pub fn search_with_observer<O: SearchObserver>(
        &mut self,
        game: &GameState,
        depth: u32,
        observer: &mut O,
    ) -> SearchResult {
        self.stop_search.store(false, Ordering::SeqCst);
        self.nodes_searched = 0;
        self.generator = *game.generator();

        let root_player = game.turn();
        let mut board = *game.board();

        let (evaluation, mut best_move) = if game.is_end() {
            self.nodes_searched += 1;
            let eval = self.evaluate(&board, root_player);
            observer.enter_node(&board, None);
            observer.leave_node(eval, None);
            (eval, None)
        } else {
            self.alphabeta(&mut board, root_player, root_player, depth, -INFINITY, INFINITY, None, observer)
        };

        let interrupted = self.stopped();
        let mut evaluation = evaluation;
        if interrupted && best_move.is_none() && !game.is_end() {
            // Stopped before any root move finished
            best_move = game.legal_moves().first().copied();
            evaluation = self.evaluate(game.board(), root_player);
        }

        debug!(
            depth,
            nodes = self.nodes_searched,
            evaluation,
            best_move = ?best_move.map(|m| m.to_notation()),
            interrupted,
            "search finished"
        );

        SearchResult {
            best_move,
            evaluation,
            nodes: self.nodes_searched,
            interrupted,
            tree: None,
        }
    }

    /// Exact minimax value of playing `mv` from `board`, seen by `root`.
    /// Used by the parallel engine to score root moves independently.
    pub fn score_root_move(&mut self, board: &Board, root: Player, mv: &Move, depth: u32) -> i32 {
        let mut board = *board;
        board.make_move(mv);
        let (score, _) = self.alphabeta(
            &mut board,
            root.opponent(),
            root,
            depth.saturating_sub(1),
            -INFINITY,
            INFINITY,
            Some(*mv),
            &mut NoopObserver,
        );
        score
    }

    pub fn set_generator(&mut self, generator: MoveGenerator) {
        self.generator = generator;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped()
    }

    #[inline]
    fn evaluate(&self, board: &Board, perspective: Player) -> i32 {
        evaluate(board, perspective, &self.config.weights, &self.generator)
    }

    #[allow(clippy::too_many_arguments)]
    fn alphabeta<O: SearchObserver>(
        &mut self,
        board: &mut Board,
        to_move: Player,
        root: Player,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        incoming: Option<Move>,
        observer: &mut O,
    ) -> (i32, Option<Move>) {
        self.nodes_searched += 1;
        observer.enter_node(board, incoming);

        if depth == 0 {
            let eval = self.evaluate(board, root);
            observer.leave_node(eval, None);
            return (eval, None);
        }

        let moves = self.generator.legal_moves(board, to_move);

        // Side to move is stuck: the game ended on the previous move
        if moves.is_empty() {
            let eval = self.evaluate(board, root);
            observer.leave_node(eval, None);
            return (eval, None);
        }

        let maximizing = to_move == root;
        let mut best_score = if maximizing { -INFINITY } else { INFINITY };
        let mut best_move: Option<Move> = None;

        for mv in moves {
            let undo = board.make_move(&mv);
            let (score, _) = self.alphabeta(
                board,
                to_move.opponent(),
                root,
                depth - 1,
                alpha,
                beta,
                Some(mv),
                observer,
            );
            board.unmake_move(&mv, &undo);

            if self.stopped() {
                break;
            }

            if incoming.is_none() {
                trace!(mv = %mv, score, "root move");
            }

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                beta = beta.min(score);
            }

            if self.config.algorithm == Algorithm::AlphaBeta && beta <= alpha {
                break;
            }
        }

        observer.leave_node(best_score, best_move);
        (best_score, best_move)
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        SearchEngine::new(SearchConfig::default())
    }
}
