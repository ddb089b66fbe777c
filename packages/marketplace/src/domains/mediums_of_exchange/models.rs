use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeType {
    /// Non-monetary bases such as time banking or pay-it-forward
    Base,
    #[default]
    Currency,
}

impl std::fmt::Display for ExchangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExchangeType::Base => write!(f, "base"),
            ExchangeType::Currency => write!(f, "currency"),
        }
    }
}

impl std::str::FromStr for ExchangeType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(ExchangeType::Base),
            "currency" => Ok(ExchangeType::Currency),
            _ => Err(anyhow::anyhow!("Invalid exchange type: {}", s)),
        }
    }
}

/// Something a request or offer can be paid in (EUR, hours, pay it forward)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediumOfExchange {
    /// Short unique code, e.g. `EUR` or `PAY_IT_FORWARD`
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub exchange_type: ExchangeType,
    pub resource_spec_hrea_id: Option<String>,
}

impl MediumOfExchange {
    pub fn new(code: impl Into<String>, name: impl Into<String>, exchange_type: ExchangeType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
            exchange_type,
            resource_spec_hrea_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("MediumOfExchange code cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("MediumOfExchange name cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_and_name_are_required() {
        assert!(MediumOfExchange::new("EUR", "Euro", ExchangeType::Currency)
            .validate()
            .is_ok());
        assert!(MediumOfExchange::new("", "Euro", ExchangeType::Currency)
            .validate()
            .is_err());
        assert!(MediumOfExchange::new("TIME", " ", ExchangeType::Base)
            .validate()
            .is_err());
    }

    #[test]
    fn exchange_type_parses() {
        assert_eq!("base".parse::<ExchangeType>().unwrap(), ExchangeType::Base);
        assert!("barter".parse::<ExchangeType>().is_err());
        assert_eq!(
            serde_json::to_value(ExchangeType::Currency).unwrap(),
            serde_json::json!("currency")
        );
    }
}
