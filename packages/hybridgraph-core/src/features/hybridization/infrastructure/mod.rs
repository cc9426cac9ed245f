pub mod hybridizer;

pub use hybridizer::Hybridizer;
