use crate::error::ProtocolError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stone {
    Empty,
    Black,
    White
}

impl Stone {
    pub fn from_byte(byte: u8) -> Result<Stone, ProtocolError> {
        match byte {
            0 => Ok(Stone::Empty),
            1 => Ok(Stone::Black),
            2 => Ok(Stone::White),
            _ => Err(ProtocolError::InvalidCell(byte))
        }
    }
    pub fn as_byte(self) -> u8 {
        match self {
            Stone::Empty => 0,
            Stone::Black => 1,
            Stone::White => 2
        }
    }
    //Empty has no opponent
    pub fn opposite(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty
        }
    }
}

impl From<Stone> for &'static str {
    fn from(stone: Stone) -> &'static str {
        match stone {
            Stone::Black => "black",
            Stone::White => "white",
            Stone::Empty => "empty"
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub dimensions: usize,
    //[white, black], as sent by the server
    pub colours: [String; 2],
    pub cell_size: u32,
    //Empty when spectating
    pub local_colour: Stone
}

impl BoardConfig {
    pub fn colour_of(&self, stone: Stone) -> Option<&str> {
        match stone {
            Stone::Black => Some(&self.colours[1]),
            Stone::White => Some(&self.colours[0]),
            Stone::Empty => None
        }
    }
    /// Side length of the drawing surface in pixels.
    pub fn canvas_size(&self) -> u32 {
        self.dimensions as u32 * self.cell_size
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub black: u32,
    pub white: u32
}

impl Score {
    pub fn add(&mut self, stone: Stone, captures: u32) {
        match stone {
            Stone::Black => self.black += captures,
            Stone::White => self.white += captures,
            Stone::Empty => ()
        }
    }
    pub fn of(&self, stone: Stone) -> u32 {
        match stone {
            Stone::Black => self.black,
            Stone::White => self.white,
            Stone::Empty => 0
        }
    }
}

/// Flat row-major grid. `x` is the column and `y` the row everywhere,
/// so cell `(x, y)` lives at `x + dimensions * y` for point access and
/// bulk loads alike.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    dimensions: usize,
    cells: Vec<Stone>
}

impl Board {
    pub fn new(dimensions: usize) -> Board {
        Board {
            dimensions,
            cells: vec![Stone::Empty; dimensions * dimensions]
        }
    }
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
    pub fn index(&self, x: usize, y: usize) -> Result<usize, ProtocolError> {
        if x < self.dimensions && y < self.dimensions {
            Ok(x + self.dimensions * y)
        } else {
            Err(ProtocolError::OutOfRange {
                x,
                y,
                dimensions: self.dimensions
            })
        }
    }
    pub fn at(&self, x: usize, y: usize) -> Result<Stone, ProtocolError> {
        let index = self.index(x, y)?;
        Ok(self.cells[index])
    }
    pub fn set(&mut self, x: usize, y: usize, stone: Stone) -> Result<(), ProtocolError> {
        let index = self.index(x, y)?;
        self.cells[index] = stone;
        Ok(())
    }
    /// Replaces every cell. Nothing changes unless the whole payload is valid.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        let expected = self.dimensions * self.dimensions;
        if bytes.len() != expected {
            return Err(ProtocolError::SizeMismatch {
                expected,
                actual: bytes.len()
            });
        }
        let cells = bytes.iter()
            .map(|&byte| Stone::from_byte(byte))
            .collect::<Result<Vec<Stone>, ProtocolError>>()?;
        self.cells = cells;
        Ok(())
    }
    pub fn cells(&self) -> &[Stone] {
        &self.cells
    }
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|stone| stone.as_byte()).collect()
    }
    pub fn rows(&self) -> impl Iterator<Item = &[Stone]> {
        self.cells.chunks(self.dimensions.max(1))
    }
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let n = self.dimensions;
        self.cells.iter()
            .enumerate()
            .filter(|&(_, &stone)| stone == Stone::Empty)
            .map(|(index, _)| (index % n, index / n))
            .collect()
    }
    pub fn count(&self, stone: Stone) -> usize {
        self.cells.iter().filter(|&&x| x == stone).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_set_then_at() {
        let mut board = Board::new(5);
        for y in 0..5 {
            for x in 0..5 {
                let stone = if (x + y) % 2 == 0 { Stone::Black } else { Stone::White };
                board.set(x, y, stone).unwrap();
                assert_eq!(board.at(x, y).unwrap(), stone);
            }
        }
    }
    #[test]
    fn test_index_is_column_plus_row() {
        let board = Board::new(9);
        assert_eq!(board.index(0, 0).unwrap(), 0);
        assert_eq!(board.index(8, 0).unwrap(), 8);
        assert_eq!(board.index(0, 1).unwrap(), 9);
        assert_eq!(board.index(3, 4).unwrap(), 39);
        assert_eq!(board.index(8, 8).unwrap(), 80);
    }
    #[test]
    fn test_out_of_range() {
        let mut board = Board::new(3);
        assert!(matches!(
            board.set(3, 0, Stone::Black),
            Err(ProtocolError::OutOfRange { x: 3, y: 0, dimensions: 3 })
        ));
        assert!(matches!(board.at(0, 3), Err(ProtocolError::OutOfRange { .. })));
        assert_eq!(board, Board::new(3));
    }
    #[test]
    fn test_load_reproduces_bytes() {
        let mut board = Board::new(3);
        let bytes = [0, 1, 2, 2, 1, 0, 0, 0, 1];
        board.load(&bytes).unwrap();
        assert_eq!(board.to_bytes(), bytes);
        //Load uses the same mapping as point access
        assert_eq!(board.at(1, 0).unwrap(), Stone::Black);
        assert_eq!(board.at(0, 1).unwrap(), Stone::White);
        assert_eq!(board.at(2, 2).unwrap(), Stone::Black);
    }
    #[test]
    fn test_load_size_mismatch_keeps_board() {
        let mut board = Board::new(2);
        board.load(&[1, 2, 0, 1]).unwrap();
        let before = board.clone();
        assert!(matches!(
            board.load(&[1, 2, 0]),
            Err(ProtocolError::SizeMismatch { expected: 4, actual: 3 })
        ));
        assert_eq!(board, before);
    }
    #[test]
    fn test_load_invalid_cell_keeps_board() {
        let mut board = Board::new(2);
        assert!(matches!(board.load(&[1, 7, 0, 1]), Err(ProtocolError::InvalidCell(7))));
        assert_eq!(board, Board::new(2));
    }
    #[test]
    fn test_empty_cells() {
        let mut board = Board::new(2);
        board.load(&[1, 0, 2, 0]).unwrap();
        assert_eq!(board.empty_cells(), vec![(1, 0), (1, 1)]);
        assert_eq!(board.count(Stone::Black), 1);
    }
    #[test]
    fn test_score() {
        let mut score = Score::default();
        score.add(Stone::White, 3);
        score.add(Stone::Empty, 9);
        assert_eq!(score, Score { black: 0, white: 3 });
        assert_eq!(score.of(Stone::White), 3);
    }
    #[test]
    fn test_colour_mapping() {
        let config = BoardConfig {
            dimensions: 9,
            colours: ["white".to_string(), "black".to_string()],
            cell_size: 30,
            local_colour: Stone::Black
        };
        assert_eq!(config.colour_of(Stone::Black), Some("black"));
        assert_eq!(config.colour_of(Stone::White), Some("white"));
        assert_eq!(config.canvas_size(), 270);
    }
}
