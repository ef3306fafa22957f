use std::{cell::RefCell, collections::VecDeque};

use crate::{Error, filters::SearchRequest, query::ExpenseSource};

/// Answers searches from a queue of canned responses and records the URLs it
/// was asked for.
pub(crate) struct StaticSource {
    responses: RefCell<VecDeque<Result<String, Error>>>,
    requests: RefCell<Vec<String>>,
}

impl StaticSource {
    pub(crate) fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<String, Error>>,
    {
        Self {
            responses: RefCell::new(responses.into_iter().collect()),
            requests: RefCell::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl ExpenseSource for StaticSource {
    async fn fetch(&self, request: &SearchRequest) -> Result<String, Error> {
        self.requests.borrow_mut().push(request.url().to_owned());

        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Fetch("no response queued".to_owned())))
    }
}
