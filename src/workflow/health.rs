use tracing::{info, warn};

use crate::backend::{ResponseBody, Transport};

/// Result of probing the backend root endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendHealth {
    pub reachable: bool,
    pub status: Option<u16>,
    /// Body text on success, error description otherwise.
    pub message: String,
}

impl BackendHealth {
    pub fn is_healthy(&self) -> bool {
        self.reachable && self.status.is_some_and(|s| (200..300).contains(&s))
    }
}

/// `GET /` against the backend. Never fails; unreachable backends are reported in the result.
pub async fn check_backend<T: Transport>(transport: &T) -> BackendHealth {
    let reply = match transport.get("").await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Backend health check failed: {}", e);
            return BackendHealth {
                reachable: false,
                status: None,
                message: e.to_string(),
            };
        }
    };

    let status = reply.status;
    let body = reply.body.read_all().await.unwrap_or_default();
    let message = String::from_utf8_lossy(&body).trim().to_string();
    info!("Backend health check: HTTP {} '{}'", status, message);

    BackendHealth {
        reachable: true,
        status: Some(status),
        message: if message.is_empty() {
            format!("HTTP {}", status)
        } else {
            message
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_requires_success_status() {
        let health = BackendHealth {
            reachable: true,
            status: Some(500),
            message: "boom".to_string(),
        };
        assert!(!health.is_healthy());

        let health = BackendHealth {
            reachable: true,
            status: Some(200),
            message: "The Flask server is running!".to_string(),
        };
        assert!(health.is_healthy());
    }
}
