//! DuelChess - Bitboard attack tables
//!
//! Precomputed leaper attack sets. A bitboard is a 64-bit integer where each
//! bit represents a square on the board (bit 0 = a1).

const FILE_A: u64 = 0x0101010101010101;
const FILE_B: u64 = 0x0202020202020202;
const FILE_G: u64 = 0x4040404040404040;
const FILE_H: u64 = 0x8080808080808080;

const NOT_FILE_A: u64 = !FILE_A;
const NOT_FILE_H: u64 = !FILE_H;
const NOT_FILE_AB: u64 = !(FILE_A | FILE_B);
const NOT_FILE_GH: u64 = !(FILE_G | FILE_H);

/// Knight attack table - attacks from each square
pub static KNIGHT_ATTACKS: [u64; 64] = init_knight_attacks();

/// King attack table - attacks from each square
pub static KING_ATTACKS: [u64; 64] = init_king_attacks();

/// Pawn attack table - [color][square] where 0=white, 1=black
pub static PAWN_ATTACKS: [[u64; 64]; 2] = init_pawn_attacks();

const fn init_knight_attacks() -> [u64; 64] {
    let mut attacks = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let bb = 1u64 << sq;
        let mut attack = 0u64;

        // Upward jumps; bits shifted past h8 fall off the top
        if bb & NOT_FILE_H != 0 {
            attack |= bb << 17;
        }
        if bb & NOT_FILE_A != 0 {
            attack |= bb << 15;
        }
        if bb & NOT_FILE_GH != 0 {
            attack |= bb << 10;
        }
        if bb & NOT_FILE_AB != 0 {
            attack |= bb << 6;
        }
        // Downward jumps
        if bb & NOT_FILE_H != 0 {
            attack |= bb >> 15;
        }
        if bb & NOT_FILE_A != 0 {
            attack |= bb >> 17;
        }
        if bb & NOT_FILE_GH != 0 {
            attack |= bb >> 6;
        }
        if bb & NOT_FILE_AB != 0 {
            attack |= bb >> 10;
        }

        attacks[sq] = attack;
        sq += 1;
    }

    attacks
}

const fn init_king_attacks() -> [u64; 64] {
    let mut attacks = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let bb = 1u64 << sq;
        let mut attack = (bb << 8) | (bb >> 8);

        if bb & NOT_FILE_H != 0 {
            attack |= (bb << 1) | (bb << 9) | (bb >> 7);
        }
        if bb & NOT_FILE_A != 0 {
            attack |= (bb >> 1) | (bb << 7) | (bb >> 9);
        }

        attacks[sq] = attack;
        sq += 1;
    }

    attacks
}

const fn init_pawn_attacks() -> [[u64; 64]; 2] {
    let mut attacks = [[0u64; 64]; 2];
    let mut sq = 0usize;

    while sq < 64 {
        let bb = 1u64 << sq;

        // White pawns capture upward
        let mut white_attack = 0u64;
        if bb & NOT_FILE_A != 0 {
            white_attack |= bb << 7;
        }
        if bb & NOT_FILE_H != 0 {
            white_attack |= bb << 9;
        }
        attacks[0][sq] = white_attack;

        // Black pawns capture downward
        let mut black_attack = 0u64;
        if bb & NOT_FILE_H != 0 {
            black_attack |= bb >> 7;
        }
        if bb & NOT_FILE_A != 0 {
            black_attack |= bb >> 9;
        }
        attacks[1][sq] = black_attack;

        sq += 1;
    }

    attacks
}

/// Extract and clear the least significant bit, returning its index
#[inline]
pub fn pop_lsb(bb: &mut u64) -> usize {
    let idx = bb.trailing_zeros() as usize;
    *bb &= *bb - 1;
    idx
}

/// Iterator over the set squares of a bitboard, lowest first
pub struct Squares(u64);

impl Iterator for Squares {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(pop_lsb(&mut self.0))
        }
    }
}

#[inline]
pub fn squares(bb: u64) -> Squares {
    Squares(bb)
}

/// Get the file (0-7) of a square
#[inline]
pub const fn file_of(sq: usize) -> usize {
    sq & 7
}

/// Get the rank (0-7) of a square
#[inline]
pub const fn rank_of(sq: usize) -> usize {
    sq >> 3
}
