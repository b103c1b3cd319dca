//! Root move evaluation shared by every search strategy.

use versus_core::{Evaluator, Position, Status};

use crate::error::SearchError;
use crate::search::context::SearchContext;
use crate::search::control::SearchControl;
use crate::search::execution::ExecutionContext;
use crate::search::result::{SearchParameters, SearchResult};

/// A strategy able to score one root move.
pub trait MoveSearch<P: Position, E: Evaluator<P>>: Sync {
    /// Score of playing `mv` from the context's position, searched to
    /// `depth` plies including `mv` itself, from the root mover's side.
    ///
    /// Scores at or below `lower_bound` may be upper bounds only. Returns
    /// `None` when the position rejects `mv`.
    fn root_score(
        &self,
        ctx: &mut SearchContext<P, E>,
        depth: u32,
        lower_bound: i32,
        mv: P::Move,
    ) -> Option<i32>;

    /// The stop signal the strategy polls.
    fn control(&self) -> &SearchControl;
}

/// Evaluate each of `moves` to `depth` and collect them best first.
///
/// One task per move is handed to `executor`. Each task asks the result
/// for its current entry score, so later moves are searched with a tighter
/// window. Once the search is interrupted no more results are recorded,
/// which leaves the result holding only fully searched moves.
pub fn best_moves<P, E, S, X>(
    search: &S,
    executor: &mut X,
    moves: &[P::Move],
    depth: u32,
    parameters: SearchParameters,
) -> Result<SearchResult<P::Move>, SearchError>
where
    P: Position,
    E: Evaluator<P>,
    S: MoveSearch<P, E>,
    X: ExecutionContext<P, E>,
{
    if depth == 0 {
        return Err(SearchError::InvalidDepth { depth: 0 });
    }

    let result = SearchResult::new(parameters);
    let tasks: Vec<_> = moves
        .iter()
        .map(|&mv| {
            let result = &result;
            move |ctx: &mut SearchContext<P, E>| {
                if search.control().is_interrupted() {
                    return;
                }
                let lower_bound = result.low();
                let Some(score) = search.root_score(ctx, depth, lower_bound, mv) else {
                    return;
                };
                if !search.control().is_interrupted() {
                    result.add(mv, ctx.evaluator().evaluation(score));
                }
            }
        })
        .collect();

    executor.execute(tasks)?;
    Ok(result)
}

/// Score of a finished game for the side to move, `plies` from the root.
///
/// `None` while the game goes on.
pub(crate) fn end_score<P: Position, E: Evaluator<P>>(
    evaluator: &E,
    status: Status,
    plies: u32,
) -> Option<i32> {
    match status {
        Status::Playing => None,
        Status::Draw => Some(0),
        Status::Win => Some(evaluator.win_score(plies)),
        Status::Loss => Some(-evaluator.win_score(plies)),
    }
}

/// Score of a node where no move could be played.
///
/// # Panics
///
/// Panics if the position claims the game goes on: a position without a
/// playable move must report how the game ended.
pub(crate) fn no_move_score<P: Position, E: Evaluator<P>>(
    ctx: &SearchContext<P, E>,
    plies: u32,
) -> i32 {
    let status = ctx.position().end_game_status();
    match end_score::<P, E>(ctx.evaluator(), status, plies) {
        Some(score) => score,
        None => panic!("position has no playable move but reports the game as ongoing"),
    }
}
