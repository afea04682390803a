// SPDX-License-Identifier: MPL-2.0

//! Neon Weather - Entry Point
//!
//! Borderless weather widget for Wayland desktops. Runs in two stages:
//!
//! 1. The **settings prompt** (a libcosmic window) collects a language and
//!    a city, and validates the city against the weather service.
//! 2. The **rotating display** (a layer-shell surface) cycles three
//!    neon-styled panels for the confirmed city: temperature, clock, and
//!    humidity/wind details.
//!
//! The prompt is modal: it runs to completion before the display exists,
//! and closing it unconfirmed ends the process without showing anything.

mod api;
mod display;
mod i18n;
mod locale;
mod settings;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Ignore SIGPIPE so a closed compositor socket becomes a normal EPIPE
    // result, not a signal
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Neon Weather");

    // Initialize internationalization (i18n) support for the prompt chrome.
    // Weather-label localization follows the *selected* language instead
    // and lives in `locale`.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();
    i18n::init(&requested_languages);

    let settings = settings::run_prompt()?;

    if !settings.confirmed {
        log::info!("Prompt closed without confirmation, exiting");
        return Ok(());
    }

    display::run(&settings)
}
