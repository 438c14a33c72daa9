use leptos::prelude::*;

use crate::workflow::BackendHealth;

/// Badge tone for a backend health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendTone {
    /// Answered with a 2xx status.
    Healthy,
    /// Answered, but not with success.
    Degraded,
    Unreachable,
}

impl BackendTone {
    pub fn of(health: &BackendHealth) -> Self {
        if health.is_healthy() {
            BackendTone::Healthy
        } else if health.reachable {
            BackendTone::Degraded
        } else {
            BackendTone::Unreachable
        }
    }

    fn icon_and_class(self) -> (&'static str, &'static str) {
        match self {
            BackendTone::Healthy => ("\u{2713}", "status-badge status-pass"),
            BackendTone::Degraded => ("!", "status-badge status-unknown"),
            BackendTone::Unreachable => ("\u{2717}", "status-badge status-fail"),
        }
    }
}

/// `HTTP 200: The Flask server is running!`, or the transport error when nothing answered.
pub fn health_detail(health: &BackendHealth) -> String {
    match health.status {
        Some(code) => format!("HTTP {}: {}", code, health.message),
        None => health.message.clone(),
    }
}

#[component]
pub fn BackendBadge(
    /// Backend address that was checked.
    #[prop(into)]
    url: String,
    health: BackendHealth,
) -> impl IntoView {
    let (icon, class) = BackendTone::of(&health).icon_and_class();

    view! {
        <div class="health-item">
            <span class=class>{icon}</span>
            <span class="health-name">{format!("ML backend ({})", url)}</span>
            <span class="health-detail">{health_detail(&health)}</span>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health(reachable: bool, status: Option<u16>, message: &str) -> BackendHealth {
        BackendHealth {
            reachable,
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_tone_follows_health_check_outcome() {
        let ok = health(true, Some(200), "The Flask server is running!");
        assert_eq!(BackendTone::of(&ok), BackendTone::Healthy);
        assert_eq!(health_detail(&ok), "HTTP 200: The Flask server is running!");

        let broken = health(true, Some(500), "HTTP 500");
        assert_eq!(BackendTone::of(&broken), BackendTone::Degraded);

        let down = health(false, None, "Request failed: connection refused");
        assert_eq!(BackendTone::of(&down), BackendTone::Unreachable);
        assert_eq!(health_detail(&down), "Request failed: connection refused");
    }
}
