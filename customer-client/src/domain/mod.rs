pub mod account;
pub mod reading;

pub use account::Account;
pub use reading::{Reading, ReadingCandidate};
