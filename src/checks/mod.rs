pub mod arrows;
pub mod brackets;
pub mod shapes;
pub mod traits;

pub use arrows::InvalidArrowCheck;
pub use brackets::UnmatchedBracketsCheck;
pub use shapes::{BracketBraceCheck, MixedShapeCheck, NestedParenTextCheck};
