// src/tools/weather.rs

use crate::tools::Tool;
use serde::Deserialize;
use serde_json::Number;
use thiserror::Error;

/// Open-Meteo `current=` fields, in display order.
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,wind_speed_10m,wind_direction_10m";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not find location: {0}")]
    LocationNotFound(String),
}

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub results: Option<Vec<Place>>,
}

/// First geocoding candidate, or `LocationNotFound` naming the query.
pub fn first_place(query: &str, response: GeocodingResponse) -> Result<Place, WeatherError> {
    response
        .results
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| WeatherError::LocationNotFound(query.to_string()))
}

/// Current conditions; every metric is optional upstream.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentConditions {
    pub temperature_2m: Option<Number>,
    pub apparent_temperature: Option<Number>,
    pub relative_humidity_2m: Option<Number>,
    pub precipitation: Option<Number>,
    pub wind_speed_10m: Option<Number>,
    pub wind_direction_10m: Option<Number>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ForecastResponse {
    #[serde(default)]
    pub current: Option<CurrentConditions>,
}

fn or_na(value: &Option<Number>) -> String {
    value
        .as_ref()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Six fixed lines, metric units, `N/A` for anything missing.
pub fn format_report(location: &str, current: &CurrentConditions) -> String {
    let mut report = format!("Current weather for {location}:\n\n");
    report.push_str(&format!("Temperature: {}°C\n", or_na(&current.temperature_2m)));
    report.push_str(&format!("Feels like: {}°C\n", or_na(&current.apparent_temperature)));
    report.push_str(&format!("Humidity: {}%\n", or_na(&current.relative_humidity_2m)));
    report.push_str(&format!("Precipitation: {} mm\n", or_na(&current.precipitation)));
    report.push_str(&format!("Wind: {} km/h\n", or_na(&current.wind_speed_10m)));
    report.push_str(&format!("Wind direction: {}°\n", or_na(&current.wind_direction_10m)));
    report
}

/// Geocoding plus current-conditions lookups.
pub trait WeatherApi {
    fn geocode(&self, location: &str) -> Result<Place, WeatherError>;
    fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions, WeatherError>;
}

/// Open-Meteo geocoding and forecast client.
pub struct OpenMeteoClient {
    client: reqwest::blocking::Client,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new(geocoding_url: &str, forecast_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            client,
            geocoding_url: geocoding_url.to_string(),
            forecast_url: forecast_url.to_string(),
        })
    }
}

impl WeatherApi for OpenMeteoClient {
    fn geocode(&self, location: &str) -> Result<Place, WeatherError> {
        let response: GeocodingResponse = self
            .client
            .get(&self.geocoding_url)
            .query(&[
                ("name", location),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        first_place(location, response)
    }

    fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions, WeatherError> {
        let latitude = latitude.to_string();
        let longitude = longitude.to_string();
        let response: ForecastResponse = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("temperature_unit", "celsius"),
                ("wind_speed_unit", "kmh"),
                ("precipitation_unit", "mm"),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.current.unwrap_or_default())
    }
}

pub struct WeatherTool<A = OpenMeteoClient> {
    api: A,
}

impl<A: WeatherApi> WeatherTool<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn report(&self, location: &str) -> Result<String, WeatherError> {
        let place = self.api.geocode(location.trim())?;
        tracing::debug!(?place, "geocoded location");
        let current = self.api.current(place.latitude, place.longitude)?;
        Ok(format_report(&place.display_name(), &current))
    }
}

impl<A: WeatherApi> Tool for WeatherTool<A> {
    fn name(&self) -> &str {
        "WeatherTool"
    }

    fn description(&self) -> &str {
        "Useful for getting current weather conditions for a specific location. Input should be a city name or location (e.g., \"New York\", \"Paris, France\"). Use this when you need real-time weather information."
    }

    fn execute(&self, input: &str) -> String {
        match self.report(input) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, location = input, "weather lookup failed");
                format!("Error retrieving weather information: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeApi {
        place: Option<Place>,
        current: CurrentConditions,
    }

    impl WeatherApi for FakeApi {
        fn geocode(&self, location: &str) -> Result<Place, WeatherError> {
            self.place
                .clone()
                .ok_or_else(|| WeatherError::LocationNotFound(location.to_string()))
        }

        fn current(&self, _latitude: f64, _longitude: f64) -> Result<CurrentConditions, WeatherError> {
            Ok(self.current.clone())
        }
    }

    fn london() -> Place {
        Place {
            name: "London".into(),
            country: "United Kingdom".into(),
            latitude: 51.50853,
            longitude: -0.12574,
        }
    }

    #[test]
    fn partial_conditions_render_all_six_lines() {
        let current: CurrentConditions =
            serde_json::from_str(r#"{"temperature_2m": 22.5, "wind_speed_10m": 10.2}"#).unwrap();
        let report = format_report("London, United Kingdom", &current);

        assert!(report.contains("Temperature: 22.5°C"));
        assert!(report.contains("Wind: 10.2 km/h"));
        assert!(report.contains("Humidity: N/A%"));
        assert!(report.contains("Feels like: N/A°C"));
        assert!(report.contains("Precipitation: N/A mm"));
        assert!(report.contains("Wind direction: N/A°"));
        assert_eq!(report.lines().filter(|l| l.contains(": ")).count(), 6);
    }

    #[test]
    fn full_conditions_render_in_fixed_order() {
        let current: CurrentConditions = serde_json::from_str(
            r#"{"time":"2024-05-01T12:00","interval":900,"temperature_2m":14.3,"relative_humidity_2m":71,"apparent_temperature":12.9,"precipitation":0.0,"wind_speed_10m":18.4,"wind_direction_10m":240}"#,
        )
        .unwrap();

        assert_eq!(
            format_report("London, United Kingdom", &current),
            "Current weather for London, United Kingdom:\n\n\
             Temperature: 14.3°C\n\
             Feels like: 12.9°C\n\
             Humidity: 71%\n\
             Precipitation: 0.0 mm\n\
             Wind: 18.4 km/h\n\
             Wind direction: 240°\n"
        );
    }

    #[test]
    fn zero_geocoding_results_names_the_query() {
        let response: GeocodingResponse = serde_json::from_str(r#"{"generationtime_ms":0.5}"#).unwrap();
        let err = first_place("Atlantis", response).unwrap_err();

        assert!(matches!(err, WeatherError::LocationNotFound(_)));
        assert!(err.to_string().contains("Atlantis"));

        let empty: GeocodingResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(first_place("Atlantis", empty).unwrap_err().to_string().contains("Atlantis"));
    }

    #[test]
    fn single_geocoding_result_is_returned_verbatim() {
        let response: GeocodingResponse = serde_json::from_str(
            r#"{"results":[{"id":2643743,"name":"London","latitude":51.50853,"longitude":-0.12574,"country":"United Kingdom","timezone":"Europe/London"}]}"#,
        )
        .unwrap();

        assert_eq!(first_place("London", response).unwrap(), london());
    }

    #[test]
    fn place_without_country_displays_name_only() {
        let place: Place =
            serde_json::from_str(r#"{"name":"Null Island","latitude":0.0,"longitude":0.0}"#).unwrap();
        assert_eq!(place.display_name(), "Null Island");
    }

    #[test]
    fn tool_formats_report_for_geocoded_place() {
        let tool = WeatherTool::new(FakeApi {
            place: Some(london()),
            current: CurrentConditions::default(),
        });

        let output = tool.execute("London");
        assert!(output.starts_with("Current weather for London, United Kingdom:\n\n"));
        assert!(output.contains("Temperature: N/A°C"));
    }

    #[test]
    fn unknown_location_becomes_error_text() {
        let tool = WeatherTool::new(FakeApi {
            place: None,
            current: CurrentConditions::default(),
        });

        assert_eq!(
            tool.execute("Atlantis"),
            "Error retrieving weather information: Could not find location: Atlantis"
        );
    }
}
