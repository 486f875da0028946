use rand::distributions::WeightedError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A position or coordinate does not lie on the grid.
    #[error("position {position} is outside of a grid with {cells} cells")]
    OutOfRange { position: String, cells: usize },

    #[error("roulette wheel selection failed: {0}")]
    Selection(#[from] WeightedError),
}
