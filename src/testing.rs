//! Transport double shared by the unit tests: replays queued responses and
//! records every request it sees.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Value;
use ureq::http::Method;

use crate::client::HttpTransport;
use crate::error::ApiResult;

pub(crate) struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub(crate) struct MockTransport {
    pub calls: RefCell<Vec<RecordedCall>>,
    responses: RefCell<VecDeque<ApiResult<Vec<u8>>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_json(self, body: Value) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(body.to_string().into_bytes()));
        self
    }

    pub fn reply_bytes(self, bytes: &[u8]) -> Self {
        self.responses.borrow_mut().push_back(Ok(bytes.to_vec()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.url.clone()).collect()
    }
}

impl HttpTransport for MockTransport {
    fn execute(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<&Value>,
    ) -> ApiResult<Vec<u8>> {
        self.calls.borrow_mut().push(RecordedCall {
            method,
            url: url.to_string(),
            headers: headers.to_vec(),
            body: body.cloned(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request: {url}"))
    }
}
