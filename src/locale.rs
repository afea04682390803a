// SPDX-License-Identifier: MPL-2.0

//! Weather-label localization.
//!
//! The weather service returns raw numbers; the labels we wrap around them
//! (humidity, wind, speed unit) and the "city not found" message depend on
//! the language picked in the settings prompt. The table below is the whole
//! localization model for rendered weather text — it is defined once, is
//! immutable, and gets handed to both the prompt and the display by value.
//!
//! Static UI chrome (window title, button labels) goes through the fluent
//! layer in `i18n.rs` instead; this table only covers strings that vary
//! with the *selected* language rather than the desktop language.

/// Languages selectable in the settings prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Russian,
    English,
    German,
}

/// Localized labels and the service language code for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalizationEntry {
    /// Label for the humidity line on the details panel
    pub humidity: &'static str,
    /// Label for the wind line on the details panel
    pub wind: &'static str,
    /// Unit suffix for wind speed
    pub speed_unit: &'static str,
    /// Two-letter code sent to the weather service to localize descriptions
    pub service_code: &'static str,
    /// Inline error shown when a city cannot be resolved
    pub not_found: &'static str,
}

const RUSSIAN: LocalizationEntry = LocalizationEntry {
    humidity: "ВЛАЖНОСТЬ",
    wind: "ВЕТЕР",
    speed_unit: "М/С",
    service_code: "ru",
    not_found: "Город не найден!",
};

const ENGLISH: LocalizationEntry = LocalizationEntry {
    humidity: "HUMIDITY",
    wind: "WIND",
    speed_unit: "M/S",
    service_code: "en",
    not_found: "City not found!",
};

const GERMAN: LocalizationEntry = LocalizationEntry {
    humidity: "FEUCHTIGKEIT",
    wind: "WIND",
    speed_unit: "M/S",
    service_code: "de",
    not_found: "Stadt nicht gefunden!",
};

impl Language {
    /// All selectable languages, in the order shown by the dropdown.
    pub const ALL: [Language; 3] = [Language::Russian, Language::English, Language::German];

    /// Native-script name shown in the language dropdown.
    pub fn label(self) -> &'static str {
        match self {
            Language::Russian => "Русский",
            Language::English => "English",
            Language::German => "Deutsch",
        }
    }

    /// The localization entry for this language.
    pub fn localization(self) -> &'static LocalizationEntry {
        match self {
            Language::Russian => &RUSSIAN,
            Language::English => &ENGLISH,
            Language::German => &GERMAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_per_language() {
        assert_eq!(Language::Russian.localization().not_found, "Город не найден!");
        assert_eq!(Language::English.localization().not_found, "City not found!");
        assert_eq!(Language::German.localization().not_found, "Stadt nicht gefunden!");
    }

    #[test]
    fn test_service_codes_are_two_letters() {
        for lang in Language::ALL {
            assert_eq!(lang.localization().service_code.len(), 2);
        }
    }

    #[test]
    fn test_default_language() {
        assert_eq!(Language::default(), Language::Russian);
    }
}
