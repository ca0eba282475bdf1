use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

struct Window {
    opened: Instant,
    seen: u32,
}

/// Fixed one-second admission window shared across all callers of the
/// group it is layered onto.
#[derive(Clone)]
pub struct RequestBudget {
    limit: u32,
    window: Arc<Mutex<Window>>,
}

impl RequestBudget {
    pub fn per_second(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            window: Arc::new(Mutex::new(Window {
                opened: Instant::now(),
                seen: 0,
            })),
        }
    }

    fn admit(&self) -> bool {
        let mut guard = self.window.lock().expect("request budget mutex poisoned");
        let now = Instant::now();
        if now.duration_since(guard.opened) >= Duration::from_secs(1) {
            guard.opened = now;
            guard.seen = 0;
        }
        if guard.seen < self.limit {
            guard.seen += 1;
            true
        } else {
            false
        }
    }
}

pub async fn throttle(
    State(budget): State<RequestBudget>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !budget.admit() {
        return (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded").into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_the_limit_then_refuses() {
        let budget = RequestBudget::per_second(3);
        assert!(budget.admit());
        assert!(budget.admit());
        assert!(budget.admit());
        assert!(!budget.admit());
    }

    #[test]
    fn zero_limit_still_admits_one() {
        let budget = RequestBudget::per_second(0);
        assert!(budget.admit());
        assert!(!budget.admit());
    }
}
