// SPDX-License-Identifier: MPL-2.0

//! OpenWeatherMap client.
//!
//! Two callers share this module: the settings prompt issues a bare lookup
//! to check that a city resolves at all, and the display refresh asks for
//! the full current-conditions report in metric units with a localized
//! description. Both calls are synchronous with a short timeout; the caller
//! decides what to do with a failure.
//!
//! ## API
//!
//! `GET http://api.openweathermap.org/data/2.5/weather?q={city}&appid={key}`
//! with optional `units=metric` and `lang={code}`. The response carries a
//! `cod` status field which the service serializes as a number on success
//! and as a string on errors; `200` means the city resolved, anything else
//! is treated as "city not found".

use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

const API_HOST: &str = "http://api.openweathermap.org/data/2.5/weather";
const API_KEY: &str = "8c58a6cb6d44a61fec5fc8cd1ae2daa0";

/// Timeout for the existence check in the settings prompt.
pub const VALIDATE_TIMEOUT: Duration = Duration::from_secs(3);
/// Timeout for the periodic refresh in the display.
pub const REFRESH_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a weather lookup produced no report.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never completed: connect failure, timeout, or a
    /// transport-level HTTP error.
    #[error("weather request failed: {0}")]
    Network(String),
    /// The service answered but reported a non-success status for the city.
    #[error("city not resolved (service status {0})")]
    CityNotFound(i64),
    /// The body was not the JSON shape we expect.
    #[error("malformed weather response: {0}")]
    Malformed(String),
}

/// Raw current-conditions report, success fields only.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Temperature in the requested units
    pub temperature: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Wind speed in the requested units
    pub wind_speed: f64,
    /// Description string, localized by the service
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    #[serde(deserialize_with = "deserialize_cod")]
    cod: i64,
    main: Option<MainSection>,
    wind: Option<WindSection>,
    #[serde(default)]
    weather: Vec<ConditionSection>,
}

#[derive(Debug, Deserialize)]
struct MainSection {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct WindSection {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionSection {
    description: String,
}

/// The service returns `cod` as a number on success and a string on error.
fn deserialize_cod<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cod {
        Number(i64),
        Text(String),
    }

    match Cod::deserialize(deserializer)? {
        Cod::Number(code) => Ok(code),
        Cod::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

impl WeatherResponse {
    fn into_report(self) -> Result<WeatherReport, FetchError> {
        if self.cod != 200 {
            return Err(FetchError::CityNotFound(self.cod));
        }
        let main = self
            .main
            .ok_or_else(|| FetchError::Malformed(String::from("missing main section")))?;
        let wind = self
            .wind
            .ok_or_else(|| FetchError::Malformed(String::from("missing wind section")))?;
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Malformed(String::from("empty weather array")))?;

        Ok(WeatherReport {
            temperature: main.temp,
            humidity: main.humidity,
            wind_speed: wind.speed,
            description: condition.description,
        })
    }
}

/// Check that a city resolves, discarding the report.
///
/// Used by the settings prompt. No units or language parameters are sent;
/// the display performs its own fetch with the full query after launch.
pub fn validate_city(city: &str) -> Result<(), FetchError> {
    let url = format!(
        "{}?q={}&appid={}",
        API_HOST,
        urlencoding::encode(city),
        API_KEY
    );
    request(&url, VALIDATE_TIMEOUT).map(|_| ())
}

/// Fetch current conditions in metric units with a localized description.
pub fn fetch_current(city: &str, service_code: &str) -> Result<WeatherReport, FetchError> {
    let url = format!(
        "{}?q={}&appid={}&units=metric&lang={}",
        API_HOST,
        urlencoding::encode(city),
        API_KEY,
        service_code
    );
    request(&url, REFRESH_TIMEOUT)
}

fn request(url: &str, timeout: Duration) -> Result<WeatherReport, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| FetchError::Network(err.to_string()))?;

    let response = client
        .get(url)
        .send()
        .map_err(|err| FetchError::Network(err.to_string()))?;

    let body: WeatherResponse = response
        .json()
        .map_err(|err| FetchError::Malformed(err.to_string()))?;

    body.into_report()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> WeatherResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_cod_as_number() {
        let response = parse(
            r#"{"cod":200,"main":{"temp":15.4,"humidity":80},"wind":{"speed":3.2},"weather":[{"description":"light rain"}]}"#,
        );
        let report = response.into_report().unwrap();
        assert_eq!(report.temperature, 15.4);
        assert_eq!(report.humidity, 80);
        assert_eq!(report.wind_speed, 3.2);
        assert_eq!(report.description, "light rain");
    }

    #[test]
    fn test_cod_as_string() {
        let response = parse(r#"{"cod":"404","message":"city not found"}"#);
        match response.into_report() {
            Err(FetchError::CityNotFound(404)) => {}
            other => panic!("expected CityNotFound(404), got {:?}", other),
        }
    }

    #[test]
    fn test_success_without_body_is_malformed() {
        let response = parse(r#"{"cod":200}"#);
        assert!(matches!(
            response.into_report(),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_empty_weather_array_is_malformed() {
        let response = parse(
            r#"{"cod":200,"main":{"temp":1.0,"humidity":50},"wind":{"speed":1.0},"weather":[]}"#,
        );
        assert!(matches!(
            response.into_report(),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_non_numeric_cod_fails_to_parse() {
        assert!(serde_json::from_str::<WeatherResponse>(r#"{"cod":"oops"}"#).is_err());
    }
}
