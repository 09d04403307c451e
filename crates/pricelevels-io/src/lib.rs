//! CSV price-history reading and level artifact writing for pricelevels.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{PriceHistory, Ticker};
pub use error::IoError;
pub use reader::PriceReader;
pub use writer::LevelWriter;
