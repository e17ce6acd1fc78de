//! Type definitions and utilities for move logging
//!
//! Provides newtype patterns and trait implementations for chess-specific
//! types so that squares, piece codes and colors cannot be mixed up or
//! smuggled around as bare strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Board coordinate representing a file (column) on the chessboard
///
/// Values range from 0 (file 'a') to 7 (file 'h').
/// This newtype prevents mixing up file and rank coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct File(pub u8);

impl File {
    /// Create a file from a character ('a'..='h')
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Some(File(c as u8 - b'a')),
            _ => None,
        }
    }

    /// Convert file to character ('a'..='h')
    pub fn to_char(self) -> char {
        (b'a' + self.0) as char
    }

    /// Get the file index (0-7)
    pub fn index(self) -> u8 {
        self.0
    }
}

/// Board coordinate representing a rank (row) on the chessboard
///
/// Values range from 0 (rank 1) to 7 (rank 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub u8);

impl Rank {
    /// Create a rank from a number (1-8)
    pub fn from_number(n: u8) -> Option<Self> {
        if (1..=8).contains(&n) {
            Some(Rank(n - 1))
        } else {
            None
        }
    }

    /// Convert rank to number (1-8)
    pub fn to_number(self) -> u8 {
        self.0 + 1
    }

    /// Get the rank index (0-7)
    pub fn index(self) -> u8 {
        self.0
    }
}

/// Error produced when parsing algebraic square notation fails
#[derive(Debug, Clone, thiserror::Error)]
#[error("not a board square: {0:?}")]
pub struct ParseSquareError(pub String);

/// Board square position (file, rank)
///
/// Combines [`File`] and [`Rank`] into a single type-safe coordinate.
/// Serialized as algebraic notation ("e4"), which is the form the board
/// surface reports in move-attempt events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    pub file: File,
    pub rank: Rank,
}

impl Square {
    /// Create a square from file and rank indices (0-7 each)
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Square {
                file: File(file),
                rank: Rank(rank),
            })
        } else {
            None
        }
    }

    /// Create a square from algebraic notation (e.g., "e4")
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file_char = chars.next()?;
        let rank_char = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let rank_num = rank_char.to_digit(10)? as u8;

        Some(Square {
            file: File::from_char(file_char)?,
            rank: Rank::from_number(rank_num)?,
        })
    }

    /// Convert square to algebraic notation (e.g., "e4")
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file.to_char(), self.rank.to_number())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file.to_char(), self.rank.to_number())
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s).ok_or_else(|| ParseSquareError(s.to_string()))
    }
}

impl TryFrom<String> for Square {
    type Error = ParseSquareError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Square> for String {
    fn from(sq: Square) -> Self {
        sq.to_algebraic()
    }
}

/// Color of the side making a move
///
/// Serialized as the single characters "w" / "b" used by the storage
/// document and by 2-byte piece codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl Color {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Kind of piece, without color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// Uppercase piece letter as used in piece codes ('P', 'N', ...)
    pub fn to_letter(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceType::Pawn),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }
}

/// Error produced when parsing a 2-byte piece code fails
#[derive(Debug, Clone, thiserror::Error)]
#[error("not a piece code: {0:?}")]
pub struct ParsePieceError(pub String);

/// The 2-byte piece representation the board surface reports ("wP", "bQ", ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PieceCode {
    pub color: Color,
    pub piece: PieceType,
}

impl PieceCode {
    pub fn new(color: Color, piece: PieceType) -> Self {
        PieceCode { color, piece }
    }

    pub fn to_code(self) -> String {
        format!("{}{}", self.color.to_char(), self.piece.to_letter())
    }
}

impl fmt::Display for PieceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color.to_char(), self.piece.to_letter())
    }
}

impl FromStr for PieceCode {
    type Err = ParsePieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let code = (|| {
            let color = Color::from_char(chars.next()?)?;
            let piece = PieceType::from_letter(chars.next()?)?;
            if chars.next().is_some() {
                return None;
            }
            Some(PieceCode { color, piece })
        })();
        code.ok_or_else(|| ParsePieceError(s.to_string()))
    }
}

impl TryFrom<String> for PieceCode {
    type Error = ParsePieceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PieceCode> for String {
    fn from(code: PieceCode) -> Self {
        code.to_code()
    }
}

/// Piece a pawn may promote to
///
/// The selection dialog offers exactly these four, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionChoice {
    #[serde(rename = "q")]
    Queen,
    #[serde(rename = "r")]
    Rook,
    #[serde(rename = "b")]
    Bishop,
    #[serde(rename = "n")]
    Knight,
}

impl PromotionChoice {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'q' => Some(PromotionChoice::Queen),
            'r' => Some(PromotionChoice::Rook),
            'b' => Some(PromotionChoice::Bishop),
            'n' => Some(PromotionChoice::Knight),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            PromotionChoice::Queen => 'q',
            PromotionChoice::Rook => 'r',
            PromotionChoice::Bishop => 'b',
            PromotionChoice::Knight => 'n',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_to_char() {
        assert_eq!(File(0).to_char(), 'a');
        assert_eq!(File(4).to_char(), 'e');
        assert_eq!(File(7).to_char(), 'h');
    }

    #[test]
    fn test_rank_from_number() {
        assert_eq!(Rank::from_number(1), Some(Rank(0)));
        assert_eq!(Rank::from_number(8), Some(Rank(7)));
        assert_eq!(Rank::from_number(0), None);
        assert_eq!(Rank::from_number(9), None);
    }

    #[test]
    fn test_square_algebraic() {
        let square = Square::from_algebraic("e4").unwrap();
        assert_eq!(square.file.index(), 4);
        assert_eq!(square.rank.index(), 3);
        assert_eq!(square.to_algebraic(), "e4");

        assert!(Square::from_algebraic("j4").is_none());
        assert!(Square::from_algebraic("e9").is_none());
        assert!(Square::from_algebraic("e44").is_none());
    }

    #[test]
    fn test_square_serde_roundtrip() {
        let square = Square::from_algebraic("g1").unwrap();
        let json = serde_json::to_string(&square).unwrap();
        assert_eq!(json, "\"g1\"");
        let back: Square = serde_json::from_str(&json).unwrap();
        assert_eq!(back, square);
    }

    #[test]
    fn test_piece_code_parsing() {
        let code: PieceCode = "wP".parse().unwrap();
        assert_eq!(code.color, Color::White);
        assert_eq!(code.piece, PieceType::Pawn);
        assert_eq!(code.to_code(), "wP");

        let code: PieceCode = "bQ".parse().unwrap();
        assert_eq!(code.color, Color::Black);
        assert_eq!(code.piece, PieceType::Queen);

        assert!("xP".parse::<PieceCode>().is_err());
        assert!("w".parse::<PieceCode>().is_err());
        assert!("wPP".parse::<PieceCode>().is_err());
    }

    #[test]
    fn test_color_serde_uses_chars() {
        assert_eq!(serde_json::to_string(&Color::White).unwrap(), "\"w\"");
        assert_eq!(serde_json::to_string(&Color::Black).unwrap(), "\"b\"");
        let c: Color = serde_json::from_str("\"b\"").unwrap();
        assert_eq!(c, Color::Black);
    }

    #[test]
    fn test_promotion_choice_chars() {
        for (c, choice) in [
            ('q', PromotionChoice::Queen),
            ('r', PromotionChoice::Rook),
            ('b', PromotionChoice::Bishop),
            ('n', PromotionChoice::Knight),
        ] {
            assert_eq!(PromotionChoice::from_char(c), Some(choice));
            assert_eq!(choice.to_char(), c);
        }
        assert_eq!(PromotionChoice::from_char('k'), None);
    }
}
