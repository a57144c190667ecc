pub mod image;
pub mod logging;
