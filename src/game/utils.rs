use chess::{Board, ChessMove, Piece, Square};
use std::str::FromStr;

use crate::models::Color;

pub fn from_chess_color(color: chess::Color) -> Color {
    match color {
        chess::Color::White => Color::White,
        chess::Color::Black => Color::Black,
    }
}

/// Parse a UCI move such as `e2e4` or `e7e8q`.
pub fn parse_uci(move_str: &str) -> Option<ChessMove> {
    let move_str = move_str.trim();
    if move_str.len() < 4 || move_str.len() > 5 || !move_str.is_ascii() {
        return None;
    }

    let from = Square::from_str(&move_str[0..2].to_lowercase()).ok()?;
    let to = Square::from_str(&move_str[2..4].to_lowercase()).ok()?;
    let promotion = match move_str[4..].to_ascii_lowercase().as_str() {
        "" => None,
        "q" => Some(Piece::Queen),
        "r" => Some(Piece::Rook),
        "b" => Some(Piece::Bishop),
        "n" => Some(Piece::Knight),
        _ => return None,
    };

    Some(ChessMove::new(from, to, promotion))
}

/// Neither side can possibly deliver mate: bare kings, a single minor piece,
/// or one bishop each on the same square color.
pub fn has_insufficient_material(board: &Board) -> bool {
    let heavy = *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
    if heavy.popcnt() > 0 {
        return false;
    }

    let knights = *board.pieces(Piece::Knight);
    let bishops = *board.pieces(Piece::Bishop);
    match (knights | bishops).popcnt() {
        0 | 1 => true,
        2 if knights.popcnt() == 0 => {
            let white_bishops = bishops & *board.color_combined(chess::Color::White);
            if white_bishops.popcnt() != 1 {
                return false;
            }
            let mut shades = bishops.map(|sq| (sq.get_rank().to_index() + sq.get_file().to_index()) % 2);
            shades.next() == shades.next()
        }
        _ => false,
    }
}
