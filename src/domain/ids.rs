//! Domain identifier types with proper encapsulation.

use std::fmt;

/// Subgraph deployment identifier (IPFS hash) - newtype for type safety.
///
/// The inner String is private to ensure all construction goes through
/// the defined constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeploymentId(String);

impl DeploymentId {
    /// Create a new DeploymentId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the deployment ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeploymentId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for DeploymentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_id_new_and_as_str() {
        let id = DeploymentId::new("QmTest");
        assert_eq!(id.as_str(), "QmTest");
    }

    #[test]
    fn deployment_id_from_string() {
        let id = DeploymentId::from("QmHello".to_string());
        assert_eq!(id.as_str(), "QmHello");
    }

    #[test]
    fn deployment_id_display() {
        let id = DeploymentId::new("QmDisplay");
        assert_eq!(format!("{}", id), "QmDisplay");
    }
}
