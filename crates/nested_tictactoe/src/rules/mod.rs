//! Game rules for nested tic-tac-toe.
//!
//! Pure functions over any 3×3 grid. Sub-boards feed them cell occupants,
//! the meta-board feeds them sub-board winners, so both levels share the
//! exact same line test.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{check_winner, has_line};
