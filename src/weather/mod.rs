//! Current-weather lookup and formatting

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::pipeline::WeatherProvider;
use crate::{Error, Result};

/// Default weather API base URL
const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com";

/// Fixed apology when no snapshot could be retrieved
pub const WEATHER_APOLOGY: &str = "I'm sorry, I couldn't retrieve the weather information.";

/// Response from the weather API
#[derive(Deserialize)]
struct WeatherResponse {
    current: CurrentConditions,
}

#[derive(Deserialize)]
struct CurrentConditions {
    condition: Condition,
    temp_c: f64,
    feelslike_c: f64,
}

#[derive(Deserialize)]
struct Condition {
    text: String,
}

/// A point-in-time weather reading for one location
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Condition description (e.g. "Sunny")
    pub condition: String,

    /// Temperature in °C
    pub temp_c: f64,

    /// Feels-like temperature in °C
    pub feelslike_c: f64,
}

/// Format a snapshot as one natural-language sentence.
///
/// Pure: the same snapshot always yields the same sentence; `None` always
/// yields the fixed apology.
#[must_use]
pub fn format_weather(snapshot: Option<&WeatherSnapshot>) -> String {
    snapshot.map_or_else(
        || WEATHER_APOLOGY.to_string(),
        |s| {
            format!(
                "The current weather is {} with a temperature of {}°C, feeling like {}°C.",
                s.condition, s.temp_c, s.feelslike_c
            )
        },
    )
}

/// Queries current conditions for a city
#[derive(Debug)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    /// Create a new weather client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(client: Client, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("weather API key required".to_string()));
        }

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Fetch current conditions for `city`
    ///
    /// # Errors
    ///
    /// Returns error on any non-success status or malformed response
    pub async fn current(&self, city: &str) -> Result<WeatherSnapshot> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .get(format!("{}/v1/current.json", self.base_url))
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", city),
                ("aqi", "yes"),
                ("lang", "en"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Weather(format!("weather API error {status}")));
        }

        let parsed: WeatherResponse = response
            .json()
            .await
            .map_err(|e| Error::Weather(format!("malformed weather response: {e}")))?;

        tracing::debug!(
            city,
            elapsed_ms = start.elapsed().as_millis(),
            condition = %parsed.current.condition.text,
            "weather lookup complete"
        );

        Ok(WeatherSnapshot {
            condition: parsed.current.condition.text,
            temp_c: parsed.current.temp_c,
            feelslike_c: parsed.current.feelslike_c,
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn current(&self, city: &str) -> Result<WeatherSnapshot> {
        Self::current(self, city).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sunny() -> WeatherSnapshot {
        WeatherSnapshot {
            condition: "Sunny".to_string(),
            temp_c: 20.0,
            feelslike_c: 18.0,
        }
    }

    #[test]
    fn formats_snapshot_as_sentence() {
        assert_eq!(
            format_weather(Some(&sunny())),
            "The current weather is Sunny with a temperature of 20°C, feeling like 18°C."
        );
    }

    #[test]
    fn fractional_temperatures_keep_their_decimals() {
        let snapshot = WeatherSnapshot {
            condition: "Partly cloudy".to_string(),
            temp_c: 21.5,
            feelslike_c: 19.5,
        };
        assert_eq!(
            format_weather(Some(&snapshot)),
            "The current weather is Partly cloudy with a temperature of 21.5°C, feeling like 19.5°C."
        );
    }

    #[test]
    fn missing_snapshot_yields_fixed_apology() {
        assert_eq!(
            format_weather(None),
            "I'm sorry, I couldn't retrieve the weather information."
        );
    }

    #[test]
    fn formatting_is_idempotent() {
        let snapshot = sunny();
        assert_eq!(
            format_weather(Some(&snapshot)),
            format_weather(Some(&snapshot))
        );
    }

    #[test]
    fn parses_weather_response() {
        let json = r#"{
            "location": {"name": "Berlin"},
            "current": {
                "temp_c": 20.0,
                "feelslike_c": 18.0,
                "condition": {"text": "Sunny", "code": 1000}
            }
        }"#;
        let parsed: WeatherResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.current.condition.text, "Sunny");
        assert!((parsed.current.temp_c - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_empty_api_key() {
        let err = WeatherClient::new(Client::new(), String::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
