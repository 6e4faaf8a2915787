//! DuelChess - Position Evaluation Module
//!
//! Static evaluation is material plus piece-square bonuses, reported from
//! white's point of view (positive = white is better). The search converts
//! it to the mover's perspective with the side's sign. Terminal positions
//! are scored separately: checkmate is a large sentinel biased by how much
//! search depth was left, stalemate is exactly zero.

use crate::move_generator::GameStatus;
use crate::position::Position;
use crate::types::*;

/// Base of the checkmate sentinel. Remaining depth is added on top so a
/// quicker mate outscores a slower one.
pub const MATE_SCORE: i32 = 50000;

/// Larger than any reachable score
pub const INFINITY: i32 = 100000;

pub const DRAW_SCORE: i32 = 0;

/// Total non-king material at or below which a side counts as in the endgame
const ENDGAME_MATERIAL: i32 = 1300;

pub const PIECE_VALUES: [i32; 7] = [
    0,   // EMPTY
    100, // PAWN
    320, // KNIGHT
    330, // BISHOP
    500, // ROOK
    900, // QUEEN
    0,   // KING (decided by checkmate, not material)
];

// Piece-square tables, a1 first, from white's side of the board.
// Black squares are looked up rank-mirrored.

const PAWN_PST: [i32; 64] = [
    0,   0,   0,   0,   0,   0,   0,   0,   // Rank 1
    5,  10,  10, -20, -20,  10,  10,   5,   // Rank 2
    5,  -5, -10,   0,   0, -10,  -5,   5,   // Rank 3
    0,   0,   0,  20,  20,   0,   0,   0,   // Rank 4
    5,   5,  10,  25,  25,  10,   5,   5,   // Rank 5
   10,  10,  20,  30,  30,  20,  10,  10,   // Rank 6
   50,  50,  50,  50,  50,  50,  50,  50,   // Rank 7
    0,   0,   0,   0,   0,   0,   0,   0,   // Rank 8
];

const KNIGHT_PST: [i32; 64] = [
   -50, -40, -30, -30, -30, -30, -40, -50,
   -40, -20,   0,   5,   5,   0, -20, -40,
   -30,   5,  10,  15,  15,  10,   5, -30,
   -30,   0,  15,  20,  20,  15,   0, -30,
   -30,   5,  15,  20,  20,  15,   5, -30,
   -30,   0,  10,  15,  15,  10,   0, -30,
   -40, -20,   0,   0,   0,   0, -20, -40,
   -50, -40, -30, -30, -30, -30, -40, -50,
];

const BISHOP_PST: [i32; 64] = [
   -20, -10, -10, -10, -10, -10, -10, -20,
   -10,   5,   0,   0,   0,   0,   5, -10,
   -10,  10,  10,  10,  10,  10,  10, -10,
   -10,   0,  10,  10,  10,  10,   0, -10,
   -10,   5,   5,  10,  10,   5,   5, -10,
   -10,   0,   5,  10,  10,   5,   0, -10,
   -10,   0,   0,   0,   0,   0,   0, -10,
   -20, -10, -10, -10, -10, -10, -10, -20,
];

const ROOK_PST: [i32; 64] = [
    0,   0,   0,   5,   5,   0,   0,   0,
   -5,   0,   0,   0,   0,   0,   0,  -5,
   -5,   0,   0,   0,   0,   0,   0,  -5,
   -5,   0,   0,   0,   0,   0,   0,  -5,
   -5,   0,   0,   0,   0,   0,   0,  -5,
   -5,   0,   0,   0,   0,   0,   0,  -5,
    5,  10,  10,  10,  10,  10,  10,   5,
    0,   0,   0,   0,   0,   0,   0,   0,
];

const QUEEN_PST: [i32; 64] = [
   -20, -10, -10,  -5,  -5, -10, -10, -20,
   -10,   0,   5,   0,   0,   0,   0, -10,
   -10,   5,   5,   5,   5,   5,   0, -10,
     0,   0,   5,   5,   5,   5,   0,  -5,
    -5,   0,   5,   5,   5,   5,   0,  -5,
   -10,   0,   5,   5,   5,   5,   0, -10,
   -10,   0,   0,   0,   0,   0,   0, -10,
   -20, -10, -10,  -5,  -5, -10, -10, -20,
];

const KING_MIDDLEGAME_PST: [i32; 64] = [
    20,  30,  10,   0,   0,  10,  30,  20,
    20,  20,   0,   0,   0,   0,  20,  20,
   -10, -20, -20, -20, -20, -20, -20, -10,
   -20, -30, -30, -40, -40, -30, -30, -20,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
];

const KING_ENDGAME_PST: [i32; 64] = [
   -50, -30, -30, -30, -30, -30, -30, -50,
   -30, -30,   0,   0,   0,   0, -30, -30,
   -30, -10,  20,  30,  30,  20, -10, -30,
   -30, -10,  30,  40,  40,  30, -10, -30,
   -30, -10,  30,  40,  40,  30, -10, -30,
   -30, -10,  20,  30,  30,  20, -10, -30,
   -30, -20, -10,   0,   0, -10, -20, -30,
   -50, -40, -30, -20, -20, -30, -40, -50,
];

/// Get piece-square table value for a piece
fn get_pst_value(piece_type: u8, sq: usize, color: Color, is_endgame: bool) -> i32 {
    let pst = match piece_type {
        PAWN => &PAWN_PST,
        KNIGHT => &KNIGHT_PST,
        BISHOP => &BISHOP_PST,
        ROOK => &ROOK_PST,
        QUEEN => &QUEEN_PST,
        KING if is_endgame => &KING_ENDGAME_PST,
        KING => &KING_MIDDLEGAME_PST,
        _ => return 0,
    };

    let index = match color {
        Color::White => sq,
        Color::Black => (7 - sq / 8) * 8 + sq % 8,
    };

    pst[index]
}

/// Non-king material for (white, black)
pub fn count_material(position: &Position) -> (i32, i32) {
    let mut white_material = 0;
    let mut black_material = 0;

    for &piece in position.squares().iter() {
        let value = PIECE_VALUES[get_piece_type(piece) as usize];
        match piece_color(piece) {
            Some(Color::White) => white_material += value,
            Some(Color::Black) => black_material += value,
            None => {}
        }
    }

    (white_material, black_material)
}

fn is_endgame(position: &Position) -> bool {
    let (white_material, black_material) = count_material(position);
    white_material <= ENDGAME_MATERIAL && black_material <= ENDGAME_MATERIAL
}

/// Static material + positional evaluation from white's perspective.
/// Does not look at whether the side to move has any legal moves.
pub fn evaluate(position: &Position) -> i32 {
    let endgame = is_endgame(position);
    let mut score = 0;

    for (sq, &piece) in position.squares().iter().enumerate() {
        let Some(color) = piece_color(piece) else {
            continue;
        };
        let piece_type = get_piece_type(piece);
        let value = PIECE_VALUES[piece_type as usize] + get_pst_value(piece_type, sq, color, endgame);
        score += color.sign() * value;
    }

    score
}

/// Checkmate sentinel for a mate found with `depth` plies of search left
#[inline]
pub fn mate_score(depth: u32) -> i32 {
    MATE_SCORE + depth as i32
}

/// True if a score can only have come from a forced mate
#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_SCORE
}

/// Score of a finished game from white's perspective. `depth` is the search
/// depth that was still remaining when the terminal node was reached.
pub fn evaluate_terminal(status: GameStatus, depth: u32) -> Option<i32> {
    match status {
        GameStatus::Ongoing => None,
        GameStatus::Stalemate => Some(DRAW_SCORE),
        GameStatus::Checkmate(loser) => Some(-loser.sign() * mate_score(depth)),
    }
}

/// Terminal score if the game is over, static evaluation otherwise.
/// White's perspective.
pub fn score_position(position: &Position, status: GameStatus, depth: u32) -> i32 {
    evaluate_terminal(status, depth).unwrap_or_else(|| evaluate(position))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(fen: &str) -> i32 {
        evaluate(&Position::from_fen(fen).unwrap())
    }

    #[test]
    fn start_position_is_balanced() {
        assert_eq!(evaluate(&Position::startpos()), 0);
    }

    #[test]
    fn colour_mirror_negates_score() {
        let white = eval("4k3/8/8/8/3N4/8/1P6/4K3 w - - 0 1");
        let black = eval("4k3/1p6/8/3n4/8/8/8/4K3 w - - 0 1");
        assert!(white > 0);
        assert_eq!(white, -black);
    }

    #[test]
    fn material_ordering() {
        let v = PIECE_VALUES;
        assert!(v[PAWN as usize] < v[KNIGHT as usize]);
        assert!(v[KNIGHT as usize] <= v[BISHOP as usize]);
        assert!(v[BISHOP as usize] < v[ROOK as usize]);
        assert!(v[ROOK as usize] < v[QUEEN as usize]);
    }

    #[test]
    fn central_knight_beats_rim_knight() {
        let centre = eval("4k3/8/8/8/3N4/8/8/4K3 w - - 0 1");
        let rim = eval("4k3/8/8/8/N7/8/8/4K3 w - - 0 1");
        assert!(centre > rim);
    }

    #[test]
    fn material_counts_ignore_kings() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert_eq!(count_material(&pos), (500, 0));
    }

    #[test]
    fn terminal_scores() {
        assert_eq!(evaluate_terminal(GameStatus::Ongoing, 3), None);
        assert_eq!(evaluate_terminal(GameStatus::Stalemate, 3), Some(0));
        assert_eq!(
            evaluate_terminal(GameStatus::Checkmate(Color::Black), 2),
            Some(MATE_SCORE + 2)
        );
        assert_eq!(
            evaluate_terminal(GameStatus::Checkmate(Color::White), 0),
            Some(-MATE_SCORE)
        );
        // more depth left means a faster mate
        assert!(mate_score(3) > mate_score(1));
        assert!(is_mate_score(-mate_score(0)));
        assert!(!is_mate_score(900));
        assert!(mate_score(64) < INFINITY);
    }

    #[test]
    fn stalemate_overrides_material() {
        let pos = Position::from_fen("k7/8/1Q6/8/8/8/8/1K6 b - - 0 1").unwrap();
        assert_eq!(score_position(&pos, GameStatus::Stalemate, 1), 0);
        assert!(score_position(&pos, GameStatus::Ongoing, 1) > 0);
    }
}
