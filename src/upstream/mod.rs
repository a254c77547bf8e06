pub mod identity;
pub mod signals;
