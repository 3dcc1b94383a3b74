pub mod bot;
pub mod raw;
