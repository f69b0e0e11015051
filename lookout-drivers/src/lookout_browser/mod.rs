pub mod driver;
pub mod page;
pub(crate) mod scripts;
pub mod session;
