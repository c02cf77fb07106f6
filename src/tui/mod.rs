mod handler;
mod ui;

pub use handler::{handle_key_event, EditorAction};
pub use ui::draw;
