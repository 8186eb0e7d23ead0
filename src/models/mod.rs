pub mod appointment;
pub mod enums;
pub mod master;
pub mod stats;

pub use appointment::*;
pub use enums::*;
pub use master::*;
pub use stats::*;
