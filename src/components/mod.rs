pub mod nav;
pub mod note_grid;
pub mod toast;
pub mod ui;

pub use nav::NavBar;
pub use note_grid::NoteGrid;
pub use toast::{BusyOverlay, ToastStack};
