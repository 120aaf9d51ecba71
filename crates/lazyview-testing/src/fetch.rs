use std::cell::RefCell;
use std::collections::VecDeque;

use lazyview_core::{FetchCallback, FetchError, FetchRequest, Fetcher};
use rustc_hash::FxHashMap;

/// A [`Fetcher`] answering from canned responses.
///
/// Immediate fetchers answer inside `fetch`. Deferred ones queue the
/// callbacks until [`FakeFetcher::complete_next`] or
/// [`FakeFetcher::complete_all`] runs them. Unknown addresses fail with a
/// 404 status.
#[derive(Default)]
pub struct FakeFetcher {
    responses: RefCell<FxHashMap<String, Result<String, FetchError>>>,
    requests: RefCell<Vec<FetchRequest>>,
    queued: RefCell<VecDeque<(String, FetchCallback)>>,
    deferred: bool,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deferred() -> Self {
        Self {
            deferred: true,
            ..Self::default()
        }
    }

    pub fn respond(&self, url: &str, body: &str) {
        self.responses
            .borrow_mut()
            .insert(url.to_string(), Ok(body.to_string()));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.responses.borrow_mut().insert(
            url.to_string(),
            Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
        );
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }

    pub fn queued(&self) -> usize {
        self.queued.borrow().len()
    }

    /// Answers the oldest queued request. Returns `false` if none is queued.
    pub fn complete_next(&self) -> bool {
        let next = self.queued.borrow_mut().pop_front();
        match next {
            Some((url, callback)) => {
                callback(self.response_for(&url));
                true
            }
            None => false,
        }
    }

    pub fn complete_all(&self) {
        while self.complete_next() {}
    }

    fn response_for(&self, url: &str) -> Result<String, FetchError> {
        self.responses
            .borrow()
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            })
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, request: FetchRequest, on_done: FetchCallback) {
        let url = request.url.clone();
        self.requests.borrow_mut().push(request);
        if self.deferred {
            self.queued.borrow_mut().push_back((url, on_done));
        } else {
            on_done(self.response_for(&url));
        }
    }
}
