//! Shared doubles for the client integration tests.

#![allow(dead_code)]

use mf_client::{ApiError, ApiRequest, ApiResponse, Transport};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Replies with queued responses in order and records every request.
/// Clones share the same script and log.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    replies: Rc<RefCell<VecDeque<Result<ApiResponse, ApiError>>>>,
    seen: Rc<RefCell<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: serde_json::Value) -> Self {
        self.replies
            .borrow_mut()
            .push_back(Ok(ApiResponse::json_body(status, &body)));
        self
    }

    pub fn fail(self, error: ApiError) -> Self {
        self.replies.borrow_mut().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.borrow().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.seen.borrow().iter().map(|r| r.path.clone()).collect()
    }

    pub fn remaining(&self) -> usize {
        self.replies.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.seen.borrow_mut().push(request.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted request to {}", request.path))
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
