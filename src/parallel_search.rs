//! OpusCheckers - Parallel Search Module
//!
//! Splits the root moves across worker threads. Each worker scores its share
//! of root moves with a full-window alpha-beta search, so every root score is
//! exact and the combined result equals the sequential engine's.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;

use tracing::{debug, warn};

use crate::board::Move;
use crate::game::GameState;
use crate::search::{SearchConfig, SearchEngine, SearchResult, INFINITY};

/// Root scores and node count returned by one worker
type WorkerOutput = (Vec<(usize, i32)>, u64);

/// Combined output of all workers
#[derive(Debug, Default)]
struct MergedScores {
    /// `(root move index, score)`, sorted by index
    scores: Vec<(usize, i32)>,
    nodes: u64,
    worker_failed: bool,
}

impl MergedScores {
    /// Highest score, earliest root move on ties
    fn best(&self) -> Option<(usize, i32)> {
        let mut best: Option<(usize, i32)> = None;
        for &(index, score) in &self.scores {
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((index, score));
            }
        }
        best
    }
}

fn merge_worker_results<I>(results: I) -> MergedScores
where
    I: IntoIterator<Item = thread::Result<WorkerOutput>>,
{
    let mut merged = MergedScores::default();
    for (worker_id, result) in results.into_iter().enumerate() {
        match result {
            Ok((scores, nodes)) => {
                merged.scores.extend(scores);
                merged.nodes += nodes;
            }
            Err(_) => {
                warn!(worker_id, "search worker panicked, its root moves are unscored");
                merged.worker_failed = true;
            }
        }
    }
    merged.scores.sort_by_key(|&(index, _)| index);
    merged
}

/// Parallel search engine using root splitting
pub struct ParallelSearchEngine {
    pub num_threads: usize,
    pub config: SearchConfig,
    stop_search: Arc<AtomicBool>,
    pub nodes_searched: u64,
    pub best_move: Option<Move>,
}

impl ParallelSearchEngine {
    /// `num_threads == 0` uses every available core
    pub fn new(config: SearchConfig, num_threads: usize) -> Self {
        let threads = if num_threads == 0 { num_cpus::get() } else { num_threads };

        ParallelSearchEngine {
            num_threads: threads.max(1),
            config,
            stop_search: Arc::new(AtomicBool::new(false)),
            nodes_searched: 0,
            best_move: None,
        }
    }

    /// Search with multiple threads.
    ///
    /// Falls back to the sequential engine when there is nothing to split
    /// (one thread, one root move, depth 0, finished game) or when tree
    /// recording is requested.
    pub fn search(&mut self, game: &GameState, depth: u32) -> SearchResult {
        self.stop_search.store(false, Ordering::SeqCst);
        self.nodes_searched = 0;
        self.best_move = None;

        let root_moves = game.legal_moves();

        if self.num_threads == 1 || root_moves.len() <= 1 || depth == 0 || self.config.record_tree {
            let mut engine = SearchEngine::with_stop_flag(self.config, Arc::clone(&self.stop_search));
            let result = engine.search(game, depth);
            self.nodes_searched = result.nodes;
            self.best_move = result.best_move;
            return result;
        }

        let num_workers = self.num_threads.min(root_moves.len());
        let root_player = game.turn();
        let board = *game.board();
        let generator = *game.generator();
        let config = self.config;

        // Worker t takes root moves t, t + n, t + 2n, ...
        let handles: Vec<_> = (0..num_workers)
            .map(|worker_id| {
                let stop = Arc::clone(&self.stop_search);
                let moves: Vec<(usize, Move)> = root_moves
                    .iter()
                    .copied()
                    .enumerate()
                    .skip(worker_id)
                    .step_by(num_workers)
                    .collect();

                thread::spawn(move || {
                    let mut worker = SearchEngine::with_stop_flag(config, stop);
                    worker.set_generator(generator);
                    let mut scores = Vec::with_capacity(moves.len());
                    for (index, mv) in moves {
                        let score = worker.score_root_move(&board, root_player, &mv, depth);
                        if worker.is_stopped() {
                            break;
                        }
                        scores.push((index, score));
                    }
                    (scores, worker.nodes_searched)
                })
            })
            .collect();

        let merged = merge_worker_results(handles.into_iter().map(|h| h.join()));
        let total_nodes = merged.nodes + 1;

        // Some root moves went unscored, so the result is partial
        let interrupted = merged.worker_failed || merged.scores.len() < root_moves.len();
        let best = merged.best();

        let (best_move, evaluation) = match best {
            Some((index, score)) => (Some(root_moves[index]), score),
            None => (root_moves.first().copied(), -INFINITY),
        };

        debug!(
            depth,
            threads = num_workers,
            nodes = total_nodes,
            evaluation,
            best_move = ?best_move.map(|m| m.to_notation()),
            interrupted,
            "parallel search finished"
        );

        self.nodes_searched = total_nodes;
        self.best_move = best_move;

        SearchResult {
            best_move,
            evaluation,
            nodes: total_nodes,
            interrupted,
            tree: None,
        }
    }

    pub fn stop(&self) {
        self.stop_search.store(true, Ordering::SeqCst);
    }

    /// Flag that interrupts a running search when set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_search)
    }

    pub fn set_threads(&mut self, threads: usize) {
        self.num_threads = if threads == 0 { num_cpus::get() } else { threads.max(1) };
    }
}

impl Default for ParallelSearchEngine {
    fn default() -> Self {
        ParallelSearchEngine::new(SearchConfig::default(), 0)
    }
}
