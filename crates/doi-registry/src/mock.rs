//! Scripted transport for tests.
//!
//! Responses are served in the order they were queued and every request is
//! recorded, so tests can assert on call counts and ordering.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and body.
    pub fn respond(&self, status: u16, body: impl Into<String>) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(ApiResponse::new(status, body)));
        self
    }

    /// Queues a transport failure.
    pub fn fail(&self, message: impl Into<String>) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(Err(TransportError::new(message)));
        self
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    /// Methods of every request sent so far, in order.
    pub fn methods(&self) -> Vec<Method> {
        self.requests.borrow().iter().map(|r| r.method).collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    /// Responses queued but never consumed.
    pub fn remaining(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted response left")))
    }
}
