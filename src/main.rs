#[macro_use]
extern crate rust_i18n;

i18n!("locales");

use plan_check::cli;
use plan_check::error::CheckError;
use plan_check::init_locale;

fn main() {
    init_locale();

    if let Err(e) = cli::run() {
        let message = e
            .downcast_ref::<CheckError>()
            .map(CheckError::display_localized)
            .unwrap_or_else(|| format!("{e:#}"));
        eprintln!("{}", t!("messages.error", error = message));
        std::process::exit(1);
    }
}
