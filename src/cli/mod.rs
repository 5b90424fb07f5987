pub mod currency;
pub mod economy;
pub mod market;
pub mod news;
pub mod setup;
pub mod ui;
pub mod watch;
