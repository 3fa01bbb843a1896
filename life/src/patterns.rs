/// A named seed, as `(x, y)` offsets from its top-left corner.
#[derive(Debug, PartialEq, Eq)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(usize, usize)],
}

impl Pattern {
    /// Bounding box as `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        self.cells.iter().fold((0, 0), |(width, height), &(x, y)| {
            (width.max(x + 1), height.max(y + 1))
        })
    }
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "Block",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
    },
    Pattern {
        name: "Blinker",
        cells: &[(0, 0), (1, 0), (2, 0)],
    },
    Pattern {
        name: "Glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Pattern {
        name: "Toad",
        cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
    },
    Pattern {
        name: "Beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
    },
    Pattern {
        name: "R-pentomino",
        cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
    },
];

pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS
        .iter()
        .find(|pattern| pattern.name.eq_ignore_ascii_case(name))
}
