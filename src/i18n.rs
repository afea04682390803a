// SPDX-License-Identifier: MPL-2.0

//! Fluent localization for the prompt chrome (title, placeholder, button).
//!
//! Translations live in `i18n/{locale}/neon_weather.ftl` and are embedded
//! at compile time. Strings are requested with the `fl!()` macro; the best
//! available translation is selected from the desktop's language list, with
//! English as the fallback.
//!
//! This layer localizes by *desktop* language. The labels rendered on the
//! weather panels follow the language picked in the prompt instead and are
//! defined in [`crate::locale`].

use std::sync::LazyLock;

use i18n_embed::{
    fluent::{fluent_language_loader, FluentLanguageLoader},
    unic_langid::LanguageIdentifier,
    DefaultLocalizer, LanguageLoader, Localizer,
};
use rust_embed::RustEmbed;

/// Initialize the localization system with the user's preferred languages.
/// Called once at startup.
pub fn init(requested_languages: &[LanguageIdentifier]) {
    if let Err(why) = localizer().select(requested_languages) {
        eprintln!("error while loading fluent localizations: {why}");
    }
}

/// Creates a boxed Localizer for this application.
#[must_use]
pub fn localizer() -> Box<dyn Localizer> {
    Box::from(DefaultLocalizer::new(&*LANGUAGE_LOADER, &Localizations))
}

/// Embedded localization files from the `i18n/` directory.
#[derive(RustEmbed)]
#[folder = "i18n/"]
struct Localizations;

/// Global Fluent language loader instance, lazily initialized with the
/// fallback language loaded so strings are always available.
pub static LANGUAGE_LOADER: LazyLock<FluentLanguageLoader> = LazyLock::new(|| {
    let loader: FluentLanguageLoader = fluent_language_loader!();

    loader
        .load_fallback_language(&Localizations)
        .expect("Error while loading fallback language");

    loader
});

/// Request a localized string by ID from the translation files.
#[macro_export]
macro_rules! fl {
    // Simple message lookup without arguments
    ($message_id:literal) => {{
        i18n_embed_fl::fl!($crate::i18n::LANGUAGE_LOADER, $message_id)
    }};

    // Message lookup with named arguments
    ($message_id:literal, $($args:expr),*) => {{
        i18n_embed_fl::fl!($crate::i18n::LANGUAGE_LOADER, $message_id, $($args), *)
    }};
}
