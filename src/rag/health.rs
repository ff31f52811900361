//! Health report returned by the service.

use serde::{Deserialize, Serialize};

/// Overall or per-component status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Construction state of a lazily built component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    Deferred,
    Initialized,
}

impl ComponentState {
    pub fn from_loaded(loaded: bool) -> Self {
        if loaded {
            ComponentState::Initialized
        } else {
            ComponentState::Deferred
        }
    }
}

/// Vector store reachability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QdrantHealth {
    Reachable {
        status: HealthStatus,
        collections: Vec<String>,
        target_collection_exists: bool,
    },
    Unreachable {
        status: HealthStatus,
        error: String,
    },
}

/// State of a lazily built model or client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentState,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub qdrant: QdrantHealth,
    pub embedding_model: ComponentHealth,
    pub openai: ComponentHealth,
}

/// Aggregated health of the service and its dependencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub components: Components,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
