mod hybridize_usecase;

pub use hybridize_usecase::{hybridize, hybridize_with_report};
