pub mod carrier;
pub mod gate;
