use chess::{Board, BoardStatus};

use crate::game::utils::{from_chess_color, has_insufficient_material, parse_uci};
use crate::models::Color;

/// Chess rules as seen by the server: the position is opaque and only ever
/// handled through these operations.
pub trait RulesEngine: Send + 'static {
    type Position: Clone + Send + 'static;

    fn initial_position(&self) -> Self::Position;

    fn is_legal(&self, position: &Self::Position, mv: &str) -> bool;

    /// Returns `None` if the move cannot be applied.
    fn apply(&self, position: &Self::Position, mv: &str) -> Option<Self::Position>;

    fn is_game_over(&self, position: &Self::Position) -> bool;

    /// Winning color, or `None` for a draw or an unfinished game.
    fn winner(&self, position: &Self::Position) -> Option<Color>;

    /// Position as FEN.
    fn export(&self, position: &Self::Position) -> String;
}

/// Rules backed by the `chess` crate, moves in UCI notation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessRules;

impl RulesEngine for ChessRules {
    type Position = Board;

    fn initial_position(&self) -> Board {
        Board::default()
    }

    fn is_legal(&self, position: &Board, mv: &str) -> bool {
        parse_uci(mv).map_or(false, |m| position.legal(m))
    }

    fn apply(&self, position: &Board, mv: &str) -> Option<Board> {
        let m = parse_uci(mv)?;
        if !position.legal(m) {
            return None;
        }
        Some(position.make_move_new(m))
    }

    fn is_game_over(&self, position: &Board) -> bool {
        position.status() != BoardStatus::Ongoing || has_insufficient_material(position)
    }

    fn winner(&self, position: &Board) -> Option<Color> {
        match position.status() {
            // The side to move has been mated.
            BoardStatus::Checkmate => Some(from_chess_color(position.side_to_move()).opposite()),
            _ => None,
        }
    }

    fn export(&self, position: &Board) -> String {
        position.to_string()
    }
}
