pub mod config;
pub mod postgres;
pub mod recorder;
pub mod report;
pub mod target;
pub mod worker;

pub use config::*;
pub use postgres::*;
pub use recorder::*;
pub use report::*;
pub use target::*;
pub use worker::*;
