pub mod resolve;
pub mod scan;
