pub mod classification;
pub mod records;
pub mod state;
pub mod ticket;
