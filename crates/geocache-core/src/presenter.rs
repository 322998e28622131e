use crate::grid::CellCoord;
use crate::memento::CellMemento;

/// The presentation layer as seen from the world model.
///
/// The core decides what is visible and when a cache changes; the
/// presenter draws it. Handles are owned by the visibility window's side
/// table and handed back when the cell leaves view.
pub trait Presenter {
    type Handle;

    fn cell_became_visible(&mut self, cell: CellCoord, memento: &CellMemento) -> Self::Handle;

    fn cell_became_hidden(&mut self, handle: Self::Handle);

    fn cache_state_changed(&mut self, cell: CellCoord, memento: &CellMemento);
}

/// Presenter that draws nothing. Useful for headless sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    type Handle = CellCoord;

    fn cell_became_visible(&mut self, cell: CellCoord, _memento: &CellMemento) -> CellCoord {
        cell
    }

    fn cell_became_hidden(&mut self, _handle: CellCoord) {}

    fn cache_state_changed(&mut self, _cell: CellCoord, _memento: &CellMemento) {}
}
