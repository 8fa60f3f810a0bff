pub mod radio;
pub mod spotify;
