pub mod ancestors;
pub mod check;
pub mod kinds;
pub mod resolve;
