pub mod appointment;
pub mod master;
