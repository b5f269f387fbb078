use crate::agent::ExecContext;
use crate::schema::{FieldType, ObjectSchema};
use crate::traits::TypedTool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub struct CalculatorTool;

#[derive(Debug, Deserialize)]
pub struct CalculatorArgs {
    pub operation: String,
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Serialize)]
pub struct CalculatorOutput {
    pub result: f64,
    pub operation: String,
}

#[async_trait]
impl TypedTool for CalculatorTool {
    type Input = CalculatorArgs;
    type Output = CalculatorOutput;

    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Perform basic arithmetic: add, subtract, multiply, or divide two numbers"
    }

    fn input_schema(&self) -> ObjectSchema {
        ObjectSchema::new()
            .field(
                "operation",
                FieldType::String,
                "One of: add, subtract, multiply, divide",
            )
            .field("a", FieldType::Number, "First operand")
            .field("b", FieldType::Number, "Second operand")
    }

    async fn invoke(
        &self,
        input: CalculatorArgs,
        _ctx: &ExecContext,
    ) -> anyhow::Result<CalculatorOutput> {
        let result = match input.operation.as_str() {
            "add" => input.a + input.b,
            "subtract" => input.a - input.b,
            "multiply" => input.a * input.b,
            "divide" => {
                if input.b == 0.0 {
                    anyhow::bail!("divide by zero");
                }
                input.a / input.b
            }
            other => anyhow::bail!("unknown operation '{}'", other),
        };
        Ok(CalculatorOutput {
            result,
            operation: input.operation,
        })
    }
}
