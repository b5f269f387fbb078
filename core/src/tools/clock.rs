use crate::agent::ExecContext;
use crate::schema::ObjectSchema;
use crate::traits::{Empty, TypedTool};
use async_trait::async_trait;
use serde::Serialize;

pub struct ClockTool;

#[derive(Debug, Serialize)]
pub struct ClockOutput {
    pub time: String,
}

#[async_trait]
impl TypedTool for ClockTool {
    type Input = Empty;
    type Output = ClockOutput;

    fn name(&self) -> &str {
        "clock"
    }

    fn description(&self) -> &str {
        "Get the current local date and time"
    }

    fn input_schema(&self) -> ObjectSchema {
        ObjectSchema::new()
    }

    async fn invoke(&self, _input: Empty, _ctx: &ExecContext) -> anyhow::Result<ClockOutput> {
        Ok(ClockOutput {
            time: chrono::Local::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Tool;

    #[tokio::test]
    async fn works_with_no_arguments() {
        let ctx = ExecContext::default();
        let out = ClockTool.execute_json("", &ctx).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["time"].as_str().unwrap().contains('T'));
    }
}
