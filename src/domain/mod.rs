pub mod account;
pub mod error;
pub mod outcome;
pub mod traits;

pub use account::{Account, DEFAULT_BALANCE, DEFAULT_CHARGE};
pub use error::{Error, StoreFault};
pub use outcome::{ChargeOutcome, Debit};
pub use traits::BalanceStore;
