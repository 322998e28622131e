use geocache_core::{CellCoord, CellMemento, GridMapper, LatLng, Presenter};

/// What the text presenter "draws" for one visible cache: its tile bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub cell: CellCoord,
    pub south_west: LatLng,
    pub north_east: LatLng,
}

/// Presenter that renders world events as lines of text.
///
/// Lines are buffered so the play loop can print them after each command.
#[derive(Debug)]
pub struct TextPresenter {
    mapper: GridMapper,
    lines: Vec<String>,
}

impl TextPresenter {
    pub fn new(mapper: GridMapper) -> Self {
        Self {
            mapper,
            lines: Vec::new(),
        }
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

pub fn describe(cell: CellCoord, memento: &CellMemento) -> String {
    let state = if memento.taken { " (taken)" } else { "" };
    format!("cache {cell} holds {}{state}", memento.tokens)
}

impl Presenter for TextPresenter {
    type Handle = Marker;

    fn cell_became_visible(&mut self, cell: CellCoord, memento: &CellMemento) -> Marker {
        let (south_west, north_east) = self.mapper.cell_bounds(cell);
        self.lines.push(format!(
            "+ {} [{south_west} .. {north_east}]",
            describe(cell, memento)
        ));
        Marker {
            cell,
            south_west,
            north_east,
        }
    }

    fn cell_became_hidden(&mut self, handle: Marker) {
        self.lines.push(format!("- cache {} out of range", handle.cell));
    }

    fn cache_state_changed(&mut self, cell: CellCoord, memento: &CellMemento) {
        self.lines.push(format!("* {}", describe(cell, memento)));
    }
}
