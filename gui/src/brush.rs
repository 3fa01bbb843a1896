use eframe::egui::Pos2;

/// Tracks one pointer stroke over the board so that a tile is toggled once
/// when the pointer lands on it, not on every frame it stays there.
#[derive(Debug, Default)]
pub struct Brush {
    last_tile: Option<(usize, usize)>,
}

impl Brush {
    /// Returns true when `tile` should be toggled.
    pub fn paint(&mut self, tile: (usize, usize)) -> bool {
        if self.last_tile == Some(tile) {
            return false;
        }
        self.last_tile = Some(tile);
        true
    }

    pub fn release(&mut self) {
        self.last_tile = None;
    }
}

/// Maps a pointer position to the tile under it, if any.
pub fn tile_at(origin: Pos2, pointer: Pos2, cell_size: f32, columns: usize, rows: usize) -> Option<(usize, usize)> {
    let offset = pointer - origin;
    if offset.x < 0.0 || offset.y < 0.0 {
        return None;
    }
    let x = (offset.x / cell_size) as usize;
    let y = (offset.y / cell_size) as usize;
    (x < columns && y < rows).then_some((x, y))
}
