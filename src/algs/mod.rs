//! Building blocks of the relaxation loop.

pub mod assembly;
pub mod bars;
pub mod forces;
pub mod projection;
pub mod seeding;

pub use assembly::{assemble_bar_forces, clear_fixed};
pub use bars::{Bar, extract_bars, interior_simplices};
pub use forces::bar_forces;
pub use projection::project_to_boundary;
pub use seeding::{lattice, seed_points};
