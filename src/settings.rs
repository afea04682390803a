// SPDX-License-Identifier: MPL-2.0

//! Settings prompt shown before the display launches.
//!
//! Modal window that collects a language and a city. The city is validated
//! against the weather service before the prompt will close confirmed; the
//! validation response itself is thrown away and the display fetches its
//! own data with the full query (metric units, localized description).
//!
//! The result leaves the iced runtime through an `Arc<Mutex<Settings>>`
//! passed in as application flags: the prompt writes it on confirmation,
//! `run_prompt` reads it back after the event loop returns.

use crate::api::{self, FetchError};
use crate::fl;
use crate::locale::Language;
use cosmic::prelude::*;
use cosmic::widget;
use cosmic::{app, Application, Element};
use std::sync::{Arc, Mutex};

const PROMPT_WIDTH: f32 = 400.0;
const PROMPT_HEIGHT: f32 = 280.0;

/// Shown for transport-level failures during validation. Deliberately
/// bilingual and fixed: at this point we cannot know which language the
/// user reads, only which one is currently selected.
const CONNECTION_ERROR: &str = "Connection Error / Ошибка сети";

/// What the user picked in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub language: Language,
    pub city: String,
    /// True only after a successful validation; the display is not shown
    /// when the prompt closes unconfirmed.
    pub confirmed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            city: String::from("Pskov"),
            confirmed: false,
        }
    }
}

/// Run the settings prompt to completion and return what was chosen.
pub fn run_prompt() -> Result<Settings, Box<dyn std::error::Error>> {
    let shared = Arc::new(Mutex::new(Settings::default()));

    let window_settings = app::Settings::default()
        .size(cosmic::iced::Size::new(PROMPT_WIDTH, PROMPT_HEIGHT))
        .size_limits(
            cosmic::iced::Limits::NONE
                .min_width(PROMPT_WIDTH)
                .min_height(PROMPT_HEIGHT),
        );

    cosmic::app::run::<SettingsPrompt>(window_settings, Arc::clone(&shared))?;

    let settings = shared.lock().unwrap().clone();
    Ok(settings)
}

/// The prompt model
pub struct SettingsPrompt {
    /// Application state which is managed by the COSMIC runtime.
    core: cosmic::app::Core,
    /// Handoff cell read by `run_prompt` after the window closes.
    shared: Arc<Mutex<Settings>>,
    /// Dropdown entries, native-script language names.
    language_labels: [&'static str; 3],
    /// Index into [`Language::ALL`] of the selected language.
    language_index: usize,
    /// Current contents of the city field.
    city_input: String,
    /// Inline validation error, cleared on the next submit.
    error: Option<String>,
}

/// Messages emitted by the prompt
#[derive(Debug, Clone)]
pub enum Message {
    LanguageSelected(usize),
    CityEdited(String),
    Submit,
    CloseRequested,
}

/// Message shown when validation rejects a submit.
fn rejection_message(language: Language, err: &FetchError) -> String {
    match err {
        FetchError::Network(_) => CONNECTION_ERROR.to_string(),
        // Unresolved city and malformed body share the localized message
        FetchError::CityNotFound(_) | FetchError::Malformed(_) => {
            language.localization().not_found.to_string()
        }
    }
}

/// Record a successful validation into the shared settings.
fn confirm(shared: &Mutex<Settings>, language: Language, city: &str) {
    let mut settings = shared.lock().unwrap();
    settings.language = language;
    settings.city = city.to_string();
    settings.confirmed = true;
}

impl SettingsPrompt {
    fn selected_language(&self) -> Language {
        Language::ALL[self.language_index]
    }

    /// Validate the current input. Returns true when the prompt should
    /// close; on rejection sets the inline error and keeps the prompt open.
    fn submit(&mut self) -> bool {
        let language = self.selected_language();
        let city = self.city_input.trim().to_string();

        if city.is_empty() {
            self.error = Some(language.localization().not_found.to_string());
            return false;
        }

        // Synchronous existence check; acceptable because the prompt is
        // modal and the timeout is short
        match api::validate_city(&city) {
            Ok(()) => {
                log::info!("City {city:?} validated, launching display");
                confirm(&self.shared, language, &city);
                true
            }
            Err(err) => {
                log::info!("City validation failed: {err}");
                self.error = Some(rejection_message(language, &err));
                false
            }
        }
    }
}

/// Create a COSMIC application from the prompt model
impl Application for SettingsPrompt {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// The prompt writes its result into this shared cell.
    type Flags = Arc<Mutex<Settings>>;

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "com.github.zoliviragh.NeonWeather";

    fn core(&self) -> &cosmic::app::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::app::Core {
        &mut self.core
    }

    fn on_close_requested(&self, _id: cosmic::iced::window::Id) -> Option<Message> {
        Some(Message::CloseRequested)
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(
        core: cosmic::app::Core,
        flags: Self::Flags,
    ) -> (Self, Task<cosmic::Action<Self::Message>>) {
        let defaults = flags.lock().unwrap().clone();

        let language_index = Language::ALL
            .iter()
            .position(|lang| *lang == defaults.language)
            .unwrap_or(0);

        let prompt = SettingsPrompt {
            core,
            shared: flags,
            language_labels: Language::ALL.map(Language::label),
            language_index,
            city_input: defaults.city,
            error: None,
        };

        (prompt, Task::none())
    }

    /// Displays the prompt's interface.
    fn view(&self) -> Element<'_, Self::Message> {
        let content = widget::column()
            .spacing(12)
            .padding(24)
            .push(widget::text::title3(fl!("app-title")))
            .push(widget::divider::horizontal::default())
            .push(widget::dropdown(
                &self.language_labels,
                Some(self.language_index),
                Message::LanguageSelected,
            ))
            .push(
                widget::text_input(fl!("city-placeholder"), &self.city_input)
                    .on_input(Message::CityEdited),
            )
            .push(widget::text::body(
                self.error.clone().unwrap_or_default(),
            ))
            .push(widget::button::suggested(fl!("start-button")).on_press(Message::Submit));

        widget::container(content)
            .width(cosmic::iced::Length::Fill)
            .height(cosmic::iced::Length::Fill)
            .into()
    }

    /// Handles messages emitted by the prompt and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        match message {
            Message::LanguageSelected(index) => {
                self.language_index = index;
            }
            Message::CityEdited(city) => {
                self.city_input = city;
            }
            Message::Submit => {
                if self.submit() {
                    return cosmic::iced::window::get_latest()
                        .and_then(|id| cosmic::iced::window::close(id));
                }
            }
            Message::CloseRequested => {
                // Closing without a confirmed validation leaves
                // `confirmed == false`; main exits without the display
                return cosmic::iced::window::get_latest()
                    .and_then(|id| cosmic::iced::window::close(id));
            }
        }
        Task::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unconfirmed() {
        let settings = Settings::default();
        assert_eq!(settings.language, Language::Russian);
        assert_eq!(settings.city, "Pskov");
        assert!(!settings.confirmed);
    }

    #[test]
    fn test_confirm_records_choice() {
        let shared = Mutex::new(Settings::default());
        confirm(&shared, Language::English, "Pskov");
        let settings = shared.lock().unwrap();
        assert!(settings.confirmed);
        assert_eq!(settings.language, Language::English);
        assert_eq!(settings.city, "Pskov");
    }

    #[test]
    fn test_network_failure_gets_generic_message() {
        let err = FetchError::Network(String::from("timed out"));
        assert_eq!(
            rejection_message(Language::German, &err),
            CONNECTION_ERROR
        );
    }

    #[test]
    fn test_unresolved_city_gets_localized_message() {
        let err = FetchError::CityNotFound(404);
        for language in Language::ALL {
            assert_eq!(
                rejection_message(language, &err),
                language.localization().not_found
            );
        }
    }

    #[test]
    fn test_malformed_body_gets_localized_message() {
        let err = FetchError::Malformed(String::from("missing main section"));
        assert_eq!(
            rejection_message(Language::English, &err),
            "City not found!"
        );
    }
}
