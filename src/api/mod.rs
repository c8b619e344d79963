pub mod luno;

pub use luno::{format_amount, AccountBalance, LunoClient};
