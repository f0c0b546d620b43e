pub mod config;
pub mod define;
pub mod login;
pub mod logout;
pub mod page;
pub mod watch;
pub mod whoami;
