pub mod appointments;
pub mod health;
pub mod masters;
pub mod stats;
