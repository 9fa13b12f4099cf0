pub mod compare;
pub mod extract;
pub mod fetch;
pub mod setup;
pub mod ui;
