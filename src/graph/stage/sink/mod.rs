mod fold;
mod foreach;

pub use self::fold::Fold;
pub use self::foreach::Foreach;
