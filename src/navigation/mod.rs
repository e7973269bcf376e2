pub mod state;
pub mod tree;

pub use state::{MenuAction, NavigationMenu};
pub use tree::{MenuEntry, MenuError, MenuTree};
