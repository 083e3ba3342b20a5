//! Scripted adapter for tests
//!
//! The node takes ownership of its adapter, so the mock keeps its state
//! behind a shared handle that the test holds on to.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::ClientAdapter;
use crate::utils::ConnectionError;

/// One recorded adapter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    SetAddress(String),
    SetPort(u16),
    Connect,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    /// Outcomes for upcoming `connect` calls; falls back to `default_ok`
    outcomes: VecDeque<Result<(), String>>,
    default_ok: bool,
    connected: bool,
}

/// Test double implementing `ClientAdapter`
#[derive(Debug)]
pub struct MockAdapter {
    state: Arc<Mutex<MockState>>,
}

/// Inspection handle sharing state with a `MockAdapter`
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockAdapter {
    fn with_default(default_ok: bool) -> (Self, MockHandle) {
        let state = Arc::new(Mutex::new(MockState {
            default_ok,
            ..MockState::default()
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockHandle { state },
        )
    }

    /// Every `connect` succeeds
    pub fn succeeding() -> (Self, MockHandle) {
        Self::with_default(true)
    }

    /// Every `connect` fails with `ConnectionError::Backend`
    pub fn failing() -> (Self, MockHandle) {
        Self::with_default(false)
    }
}

impl MockHandle {
    /// Queue the outcome of the next unscripted `connect`
    pub fn push_outcome(&self, outcome: Result<(), String>) {
        self.state.lock().outcomes.push_back(outcome);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    /// Last address pushed into the adapter
    pub fn address(&self) -> Option<String> {
        self.state.lock().calls.iter().rev().find_map(|c| match c {
            MockCall::SetAddress(a) => Some(a.clone()),
            _ => None,
        })
    }

    /// Last port pushed into the adapter
    pub fn port(&self) -> Option<u16> {
        self.state.lock().calls.iter().rev().find_map(|c| match c {
            MockCall::SetPort(p) => Some(*p),
            _ => None,
        })
    }

    pub fn connect_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| **c == MockCall::Connect)
            .count()
    }
}

impl ClientAdapter for MockAdapter {
    fn set_address(&mut self, address: &str) {
        self.state
            .lock()
            .calls
            .push(MockCall::SetAddress(address.to_string()));
    }

    fn set_port(&mut self, port: u16) {
        self.state.lock().calls.push(MockCall::SetPort(port));
    }

    fn connect(&mut self) -> Result<(), ConnectionError> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::Connect);

        let outcome = match state.outcomes.pop_front() {
            Some(outcome) => outcome,
            None if state.default_ok => Ok(()),
            None => Err("connection refused".to_string()),
        };

        state.connected = outcome.is_ok();
        outcome.map_err(ConnectionError::Backend)
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn backend(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls_in_order() {
        let (mut mock, handle) = MockAdapter::succeeding();
        mock.set_address("10.0.0.1");
        mock.set_port(26379);
        mock.connect().unwrap();

        assert_eq!(
            handle.calls(),
            vec![
                MockCall::SetAddress("10.0.0.1".to_string()),
                MockCall::SetPort(26379),
                MockCall::Connect,
            ]
        );
    }

    #[test]
    fn test_scripted_outcomes_then_default() {
        let (mut mock, handle) = MockAdapter::failing();
        handle.push_outcome(Ok(()));

        assert!(mock.connect().is_ok());
        assert!(mock.is_connected());

        let err = mock.connect().unwrap_err();
        assert!(matches!(err, ConnectionError::Backend(_)));
        assert!(!mock.is_connected());
        assert_eq!(handle.connect_count(), 2);
    }
}
