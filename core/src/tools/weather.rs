use crate::agent::ExecContext;
use crate::schema::{FieldType, ObjectSchema};
use crate::traits::TypedTool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Mock weather lookup: deterministic per city, no network.
pub struct WeatherTool;

#[derive(Debug, Deserialize)]
pub struct WeatherArgs {
    pub city: String,
    pub units: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WeatherOutput {
    pub city: String,
    pub temperature: f64,
    pub conditions: String,
    pub units: String,
}

const CONDITIONS: &[&str] = &["clear", "partly cloudy", "overcast", "light rain"];

#[async_trait]
impl TypedTool for WeatherTool {
    type Input = WeatherArgs;
    type Output = WeatherOutput;

    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Get the current weather for a city"
    }

    fn input_schema(&self) -> ObjectSchema {
        ObjectSchema::new()
            .field("city", FieldType::String, "City name")
            .optional(
                "units",
                FieldType::String,
                "Temperature units: celsius (default) or fahrenheit",
            )
    }

    async fn invoke(
        &self,
        input: WeatherArgs,
        _ctx: &ExecContext,
    ) -> anyhow::Result<WeatherOutput> {
        let seed: u64 = input
            .city
            .to_lowercase()
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let celsius = (seed % 35) as f64 - 5.0;
        let conditions = CONDITIONS[(seed / 35 % CONDITIONS.len() as u64) as usize];

        let units = input.units.unwrap_or_else(|| "celsius".to_string());
        let temperature = match units.as_str() {
            "celsius" => celsius,
            "fahrenheit" => celsius * 9.0 / 5.0 + 32.0,
            other => anyhow::bail!("unknown units '{}'", other),
        };

        Ok(WeatherOutput {
            city: input.city,
            temperature,
            conditions: conditions.to_string(),
            units,
        })
    }
}
