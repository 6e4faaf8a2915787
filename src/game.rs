//! DuelChess - Game Controller
//!
//! Owns the real game position and its move history. Moves enter either as
//! `Move` values taken from `legal_moves()` or as coordinate text ("e2e4",
//! "e7e8q"); both go through the checked `Position::apply`.

use crate::bitboard::file_of;
use crate::error::{ChessError, Result};
use crate::move_generator::{GameStatus, MoveGenerator};
use crate::position::{Move, Position, UndoInfo};
use crate::types::*;

/// Position identity for repetition counting: placement, side and rights
type RepetitionKey = ([u8; 64], Color, u8);

fn repetition_key(position: &Position) -> RepetitionKey {
    (*position.squares(), position.side_to_move(), position.castling_rights())
}

#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    history: Vec<(Move, UndoInfo)>,
    /// One key per position reached, the starting one included
    seen: Vec<RepetitionKey>,
    move_generator: MoveGenerator,
}

impl Game {
    pub fn new() -> Self {
        Game::from_position(Position::startpos())
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Game::from_position(Position::from_fen(fen)?))
    }

    pub fn from_position(position: Position) -> Self {
        let seen = vec![repetition_key(&position)];
        Game {
            position,
            history: Vec::new(),
            seen,
            move_generator: MoveGenerator::new(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn history(&self) -> &[(Move, UndoInfo)] {
        &self.history
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.move_generator.legal_moves(&self.position)
    }

    pub fn status(&self) -> GameStatus {
        let moves = self.legal_moves();
        self.move_generator.game_status(&self.position, &moves)
    }

    /// Play a move. Anything outside `legal_moves()` is rejected and leaves
    /// the game unchanged.
    pub fn play(&mut self, mv: Move) -> Result<()> {
        let undo = self.position.apply(&mv)?;
        self.history.push((mv, undo));
        self.seen.push(repetition_key(&self.position));
        Ok(())
    }

    /// Parse coordinate text and play it
    pub fn play_text(&mut self, text: &str) -> Result<Move> {
        let mv = self.parse_move(text)?;
        self.play(mv)?;
        Ok(mv)
    }

    /// Match coordinate notation against the legal moves. A promotion
    /// without a suffix promotes to a queen.
    pub fn parse_move(&self, text: &str) -> Result<Move> {
        let text = text.trim();
        let invalid = || ChessError::InvalidMoveText(text.to_string());

        if !(4..=5).contains(&text.len()) || !text.is_ascii() {
            return Err(invalid());
        }
        let from_sq = parse_square(&text[0..2]).ok_or_else(invalid)?;
        let to_sq = parse_square(&text[2..4]).ok_or_else(invalid)?;
        let promotion = match text[4..].chars().next() {
            Some(c) => Some(promotion_from_char(c).ok_or_else(invalid)?),
            None => None,
        };

        self.legal_moves()
            .into_iter()
            .find(|m| {
                m.from_sq == from_sq
                    && m.to_sq == to_sq
                    && (!m.is_promotion() || m.promotion == promotion.unwrap_or(QUEEN))
                    && (m.is_promotion() || promotion.is_none())
            })
            .ok_or_else(|| ChessError::IllegalMove {
                mv: text.to_string(),
                fen: self.position.to_fen(),
            })
    }

    /// Undo the last move. Returns it, or None at the start of the game.
    pub fn take_back(&mut self) -> Option<Move> {
        let (mv, undo) = self.history.pop()?;
        self.position.undo(&mv, &undo);
        self.seen.pop();
        Some(mv)
    }

    /// Back to the standard starting position
    pub fn reset(&mut self) {
        *self = Game::new();
    }

    /// How many times the current position has occurred
    pub fn repetition_count(&self) -> usize {
        let current = repetition_key(&self.position);
        self.seen.iter().filter(|key| **key == current).count()
    }

    pub fn is_threefold_repetition(&self) -> bool {
        self.repetition_count() >= 3
    }

    /// Short algebraic-style label for a move in the current position,
    /// e.g. "e4", "Nxf3", "exd6 e.p.", "e8=Q", "0-0".
    pub fn notation(&self, mv: &Move) -> String {
        move_notation(&self.position, mv)
    }

    /// Notation of every move played so far
    pub fn move_log(&self) -> Vec<String> {
        let mut replay = self.position.clone();
        for (mv, undo) in self.history.iter().rev() {
            replay.undo(mv, undo);
        }
        let mut log = Vec::with_capacity(self.history.len());
        for (mv, _) in &self.history {
            log.push(move_notation(&replay, mv));
            replay.make_move(mv);
        }
        log
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

/// Label for `mv` played from `position` (before the move is made)
pub fn move_notation(position: &Position, mv: &Move) -> String {
    if mv.is_castling() {
        return if file_of(mv.to_sq) == 6 { "0-0".to_string() } else { "0-0-0".to_string() };
    }

    let to = square_name(mv.to_sq);
    let from_file = square_name(mv.from_sq)[..1].to_string();
    let kind = get_piece_type(position.piece_at(mv.from_sq));

    let mut text = match kind {
        PAWN if mv.is_capture() => format!("{}x{}", from_file, to),
        PAWN => to,
        _ => {
            let letter = piece_to_fen(make_piece(Color::White, kind)).unwrap_or('?');
            if mv.is_capture() {
                format!("{}x{}", letter, to)
            } else {
                format!("{}{}", letter, to)
            }
        }
    };

    if mv.is_en_passant() {
        text.push_str(" e.p.");
    }
    if let Some(c) = promotion_char(mv.promotion) {
        text.push('=');
        text.push(c.to_ascii_uppercase());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_and_take_back() {
        let mut game = Game::new();
        game.play_text("e2e4").unwrap();
        game.play_text("e7e5").unwrap();
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.position().side_to_move(), Color::White);

        assert_eq!(game.take_back().map(|m| m.to_uci()), Some("e7e5".to_string()));
        assert_eq!(game.take_back().map(|m| m.to_uci()), Some("e2e4".to_string()));
        assert_eq!(game.take_back(), None);
        assert_eq!(*game.position(), Position::startpos());
    }

    #[test]
    fn rejects_bad_text() {
        let mut game = Game::new();
        assert!(matches!(game.play_text("e2"), Err(ChessError::InvalidMoveText(_))));
        assert!(matches!(game.play_text("z9e4"), Err(ChessError::InvalidMoveText(_))));
        assert!(matches!(game.play_text("e2e5"), Err(ChessError::IllegalMove { .. })));
        assert!(matches!(game.play_text("e2e4x"), Err(ChessError::InvalidMoveText(_))));
        assert!(game.history().is_empty());
    }

    #[test]
    fn promotion_suffix_selects_piece() {
        let game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(game.parse_move("a7a8n").unwrap().promotion, KNIGHT);
        assert_eq!(game.parse_move("a7a8").unwrap().promotion, QUEEN);
        assert!(game.parse_move("a2a3q").is_err());
    }

    #[test]
    fn status_follows_game() {
        let mut game = Game::new();
        for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.play_text(mv).unwrap();
        }
        assert_eq!(game.status(), GameStatus::Checkmate(Color::White));
        game.take_back();
        assert_eq!(game.status(), GameStatus::Ongoing);
    }

    #[test]
    fn knight_shuffle_repeats_three_times() {
        let mut game = Game::new();
        for _ in 0..2 {
            for mv in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                game.play_text(mv).unwrap();
            }
        }
        assert_eq!(game.repetition_count(), 3);
        assert!(game.is_threefold_repetition());
        game.take_back();
        assert!(!game.is_threefold_repetition());
    }

    #[test]
    fn notation_labels() {
        let mut game = Game::new();
        for mv in ["e2e4", "d7d5", "e4d5", "g8f6", "g1f3", "f6d5"] {
            game.play_text(mv).unwrap();
        }
        assert_eq!(game.move_log(), vec!["e4", "d5", "exd5", "Nf6", "Nf3", "Nxd5"]);

        let castle = Game::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert_eq!(castle.notation(&castle.parse_move("e1g1").unwrap()), "0-0");
        assert_eq!(castle.notation(&castle.parse_move("e1c1").unwrap()), "0-0-0");

        let ep = Game::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        assert_eq!(ep.notation(&ep.parse_move("e5d6").unwrap()), "exd6 e.p.");
    }

    #[test]
    fn reset_returns_to_start() {
        let mut game = Game::new();
        game.play_text("d2d4").unwrap();
        game.reset();
        assert_eq!(*game.position(), Position::startpos());
        assert!(game.history().is_empty());
    }
}
