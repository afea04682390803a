// SPDX-License-Identifier: MPL-2.0

//! Rotating panels and the weather snapshot they render.

use crate::api::{FetchError, WeatherReport};
use crate::locale::LocalizationEntry;

/// One of the three views the display cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Temperature,
    Clock,
    Details,
}

impl Panel {
    /// Panels in rotation order, starting with the one visible at launch.
    pub const ROTATION: [Panel; 3] = [Panel::Temperature, Panel::Clock, Panel::Details];

    /// Next panel in the cycle.
    pub fn next(self) -> Panel {
        match self {
            Panel::Temperature => Panel::Clock,
            Panel::Clock => Panel::Details,
            Panel::Details => Panel::Temperature,
        }
    }

    /// Glow color for this panel's text.
    pub fn color(self) -> (f64, f64, f64) {
        match self {
            // #00F2FF
            Panel::Temperature => (0.0, 0.949, 1.0),
            Panel::Clock => (1.0, 1.0, 1.0),
            // #39FF14
            Panel::Details => (0.224, 1.0, 0.078),
        }
    }

    /// Divisor applied to the surface width to pick the base font size.
    /// Denser panels get a larger divisor and therefore smaller text.
    pub fn font_divisor(self) -> f64 {
        match self {
            Panel::Temperature => 10.0,
            Panel::Clock => 7.0,
            Panel::Details => 16.0,
        }
    }
}

/// The most recently fetched weather data, pre-formatted for rendering.
///
/// Replaced wholesale on every successful fetch; a failed fetch leaves the
/// previous snapshot untouched, so stale data stays visible rather than an
/// error state.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Rounded temperature with degree suffix, e.g. "16°"
    pub temperature: String,
    /// Upper-cased description, e.g. "LIGHT RAIN"
    pub description: String,
    /// Relative humidity percentage
    pub humidity: u8,
    /// Wind speed in m/s
    pub wind_speed: f64,
}

impl Default for WeatherSnapshot {
    /// Placeholder shown until the first successful fetch.
    fn default() -> Self {
        Self {
            temperature: String::from("--°"),
            description: String::new(),
            humidity: 0,
            wind_speed: 0.0,
        }
    }
}

impl WeatherSnapshot {
    pub fn from_report(report: &WeatherReport) -> Self {
        Self {
            temperature: format!("{}°", report.temperature.round() as i64),
            description: report.description.to_uppercase(),
            humidity: report.humidity,
            wind_speed: report.wind_speed,
        }
    }

    /// Fold a fetch result into the snapshot: a successful fetch replaces
    /// it wholesale, a failed one leaves it untouched.
    pub fn apply(self, result: Result<WeatherReport, FetchError>) -> WeatherSnapshot {
        match result {
            Ok(report) => WeatherSnapshot::from_report(&report),
            Err(_) => self,
        }
    }

    /// Text for the temperature panel: rounded degrees over the description.
    pub fn temperature_text(&self) -> String {
        if self.description.is_empty() {
            self.temperature.clone()
        } else {
            format!("{}\n{}", self.temperature, self.description)
        }
    }

    /// Text for the details panel, labeled in the selected language.
    pub fn details_text(&self, entry: &LocalizationEntry) -> String {
        // Integral speeds keep one decimal, so "3.0" rather than "3"
        let wind = if self.wind_speed.fract() == 0.0 {
            format!("{:.1}", self.wind_speed)
        } else {
            self.wind_speed.to_string()
        };
        format!(
            "{}: {}%\n{}: {} {}",
            entry.humidity, self.humidity, entry.wind, wind, entry.speed_unit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Language;

    fn report(temp: f64, humidity: u8, wind: f64, description: &str) -> WeatherReport {
        WeatherReport {
            temperature: temp,
            humidity,
            wind_speed: wind,
            description: description.to_string(),
        }
    }

    #[test]
    fn test_rotation_is_cyclic_with_period_three() {
        let start = Panel::Temperature;
        let after_three = start.next().next().next();
        assert_eq!(start, after_three);
    }

    #[test]
    fn test_temperature_rounds_to_nearest_integer() {
        let snapshot = WeatherSnapshot::from_report(&report(15.6, 0, 0.0, ""));
        assert_eq!(snapshot.temperature, "16°");
        let snapshot = WeatherSnapshot::from_report(&report(15.4, 0, 0.0, ""));
        assert_eq!(snapshot.temperature, "15°");
        let snapshot = WeatherSnapshot::from_report(&report(-0.2, 0, 0.0, ""));
        assert_eq!(snapshot.temperature, "0°");
    }

    #[test]
    fn test_temperature_panel_text() {
        let snapshot = WeatherSnapshot::from_report(&report(15.4, 80, 3.2, "light rain"));
        assert_eq!(snapshot.temperature_text(), "15°\nLIGHT RAIN");
    }

    #[test]
    fn test_details_panel_text_english() {
        let snapshot = WeatherSnapshot::from_report(&report(15.4, 80, 3.2, "light rain"));
        let entry = Language::English.localization();
        assert_eq!(snapshot.details_text(entry), "HUMIDITY: 80%\nWIND: 3.2 M/S");
    }

    #[test]
    fn test_details_panel_text_russian() {
        let snapshot = WeatherSnapshot::from_report(&report(1.0, 95, 7.5, "снег"));
        let entry = Language::Russian.localization();
        assert_eq!(
            snapshot.details_text(entry),
            "ВЛАЖНОСТЬ: 95%\nВЕТЕР: 7.5 М/С"
        );
    }

    #[test]
    fn test_placeholder_before_first_fetch() {
        let snapshot = WeatherSnapshot::default();
        assert_eq!(snapshot.temperature_text(), "--°");
    }

    #[test]
    fn test_integral_wind_speed_keeps_decimal() {
        let snapshot = WeatherSnapshot::from_report(&report(10.0, 60, 3.0, "clear sky"));
        let entry = Language::English.localization();
        assert_eq!(snapshot.details_text(entry), "HUMIDITY: 60%\nWIND: 3.0 M/S");
    }

    #[test]
    fn test_failed_fetch_keeps_previous_snapshot() {
        let snapshot = WeatherSnapshot::from_report(&report(15.4, 80, 3.2, "light rain"));
        let after = snapshot
            .clone()
            .apply(Err(FetchError::Network(String::from("timed out"))));
        assert_eq!(after, snapshot);
    }

    #[test]
    fn test_successful_fetch_replaces_snapshot() {
        let after = WeatherSnapshot::default().apply(Ok(report(1.2, 50, 2.0, "mist")));
        assert_eq!(after.temperature, "1°");
        assert_eq!(after.description, "MIST");
    }
}
