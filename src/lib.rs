#[macro_use]
extern crate rust_i18n;

i18n!("locales");

pub mod cases;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod fs_utils;
pub mod logging;
pub mod path_utils;
pub mod payload;
pub mod runner;
pub mod snapshot;
pub mod updater;

#[cfg(test)]
pub mod test_utils;

pub fn init_locale() {
    rust_i18n::set_locale("en");
}
