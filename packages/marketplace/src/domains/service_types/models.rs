use serde::{Deserialize, Serialize};

/// A kind of service people request or offer ("Web Development", "Tutoring")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceType {
    pub name: String,
    pub description: String,
    /// Technical services (software, hardware) versus everything else
    pub technical: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ServiceType {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            technical: false,
            tags: Vec::new(),
        }
    }

    pub fn technical(mut self) -> Self {
        self.technical = true;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("ServiceType name cannot be empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("ServiceType description cannot be empty".to_string());
        }
        Ok(())
    }
}
