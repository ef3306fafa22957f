#![allow(missing_docs)]

pub(crate) mod page;
pub(crate) mod source;

pub(crate) use page::{FakeListener, FakePage};
pub(crate) use source::StaticSource;
