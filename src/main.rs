use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use versus_core::EvaluatedMove;
use versus_engine::{IterativeDeepeningEngine, SearchParameters, TranspositionTable};
use versus_games::{Cell, TicTacToe, TicTacToeEvaluator};

/// Solves tic-tac-toe from the board given as first argument ("X../.O./..."),
/// or from the empty board.
fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let position: TicTacToe = match std::env::args().nth(1) {
        Some(board) => board
            .parse()
            .with_context(|| format!("invalid board {board:?}"))?,
        None => TicTacToe::new(),
    };

    let workers = std::thread::available_parallelism().map_or(1, usize::from);
    let mut engine = IterativeDeepeningEngine::new(9);
    engine.set_parallelism(workers);
    engine.set_transposition_table(Arc::new(TranspositionTable::new(16)));
    info!(workers, "versus starting");

    let parameters = SearchParameters::new(3, 0)?;
    let best = engine.search_with(&position, &TicTacToeEvaluator, parameters, |depth, best, statistics| {
        if let Some(top) = best.first() {
            info!(
                depth,
                best = %top.mv(),
                evaluation = %top.evaluation(),
                moves_played = statistics.moves_played(),
                "depth completed"
            );
        }
    })?;

    println!("{position}\n");
    for evaluated in &best {
        println!("{}", describe(evaluated));
    }
    Ok(())
}

fn describe(evaluated: &EvaluatedMove<Cell>) -> String {
    let line: Vec<String> = evaluated
        .principal_variation()
        .iter()
        .map(ToString::to_string)
        .collect();
    format!("{} {} [{}]", evaluated.mv(), evaluated.evaluation(), line.join(" "))
}
