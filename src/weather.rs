//! Simulated weather tools and resources.
//!
//! Nothing here talks to a real weather service. [`compute_payload`] draws a
//! plausible report at random, and [`GetWeather`] exposes it as a tool.

use crate::mcp::resources::{Resource, ResourceReadError};
use crate::mcp::tools::{Argument, ArgumentType, Arguments, InputSchema, Tool, ToolCallError};
use crate::registry::{Registry, RegistryError, ServerInfo};
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use std::time::Duration;

/// Cities served by the `weather://cities` resource.
pub const CITIES: [&str; 5] = ["New York", "London", "Tokyo", "Sydney", "Paris"];

/// Uri of the [`Cities`] resource.
pub const CITIES_URI: &str = "weather://cities";

/// Temperature scale of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Celsius,
    Fahrenheit,
}

impl Units {
    fn parse(s: &str) -> Option<Units> {
        match s {
            "celsius" => Some(Units::Celsius),
            "fahrenheit" => Some(Units::Fahrenheit),
            _ => None,
        }
    }
}

/// Sky conditions a report can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
}

const CONDITIONS: [Condition; 4] = [
    Condition::Sunny,
    Condition::Cloudy,
    Condition::Rainy,
    Condition::Snowy,
];

/// One simulated observation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub city: String,
    pub temperature: i64,
    pub units: Units,
    pub condition: Condition,
    /// Relative humidity, percent.
    pub humidity: u32,
    /// Simulated wind speed, not converted by `units`.
    pub wind_speed: u32,
    /// RFC 3339, UTC, millisecond precision.
    pub timestamp: String,
}

/// Draws a random report for `city`.
///
/// The base temperature is 5..=34 °C; fahrenheit reports convert and round it.
pub fn compute_payload(city: &str, units: Units) -> WeatherReport {
    let mut rng = rand::rng();
    let base: i64 = rng.random_range(5..35);
    let temperature = match units {
        Units::Celsius => base,
        Units::Fahrenheit => (base as f64 * 9.0 / 5.0 + 32.0).round() as i64,
    };
    WeatherReport {
        city: city.to_string(),
        temperature,
        units,
        condition: CONDITIONS[rng.random_range(0..CONDITIONS.len())],
        humidity: rng.random_range(30..70),
        wind_speed: rng.random_range(5..25),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Knobs for the simulated backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherConfig {
    /// How long each lookup blocks before answering.
    pub latency: Duration,
}

/// The `get_weather` tool.
///
/// The same handler is registered under more than one name so that clients
/// pinned to an older tool name keep working.
#[derive(Debug, Clone)]
pub struct GetWeather {
    name: String,
    latency: Duration,
}

impl GetWeather {
    pub fn new(name: impl Into<String>, config: &WeatherConfig) -> Self {
        GetWeather {
            name: name.into(),
            latency: config.latency,
        }
    }
}

impl Tool for GetWeather {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Get current weather for a city"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new(vec![
            Argument::new("city", ArgumentType::String, "The city name", true),
            Argument::new("units", ArgumentType::String, "Temperature units", false)
                .one_of(["celsius", "fahrenheit"])
                .with_default("celsius"),
        ])
    }

    fn call(&self, arguments: Arguments) -> Result<serde_json::Value, ToolCallError> {
        let city = arguments
            .get("city")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolCallError::new("city must be a string"))?;
        let units = match arguments.get("units").and_then(|v| v.as_str()) {
            None => Units::Celsius,
            Some(units) => Units::parse(units)
                .ok_or_else(|| ToolCallError::new(format!("unsupported units: {units}")))?,
        };
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        serde_json::to_value(compute_payload(city, units))
            .map_err(|e| ToolCallError::new(e.to_string()))
    }
}

/// The `weather://cities` resource.
#[derive(Debug, Clone, Default)]
pub struct Cities;

impl Resource for Cities {
    fn uri(&self) -> &str {
        CITIES_URI
    }

    fn name(&self) -> &str {
        "Available Cities"
    }

    fn description(&self) -> &str {
        "List of cities with weather data"
    }

    fn mime_type(&self) -> &str {
        "application/json"
    }

    fn read(&self) -> Result<String, ResourceReadError> {
        serde_json::to_string_pretty(&CITIES).map_err(|e| ResourceReadError::new(e.to_string()))
    }
}

/// Builds the registry the `weather-server` binary serves.
pub fn registry(info: ServerInfo, config: &WeatherConfig) -> Result<Registry, RegistryError> {
    Registry::builder(info)
        .tool(GetWeather::new("get_weather", config))
        .tool(GetWeather::new("get_weather_2", config))
        .resource(Cities)
        .build()
}
