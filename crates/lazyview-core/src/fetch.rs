//! Host HTTP access used by the `ajax` and error-detecting `iframe` loaders.

use crate::error::FetchError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FetchMethod {
    #[default]
    Get,
    Post,
    Put,
}

impl FetchMethod {
    /// Parses a method name case-insensitively. Anything but POST and PUT
    /// is sent as GET.
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("post") {
            FetchMethod::Post
        } else if name.eq_ignore_ascii_case("put") {
            FetchMethod::Put
        } else {
            FetchMethod::Get
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FetchMethod::Get => "GET",
            FetchMethod::Post => "POST",
            FetchMethod::Put => "PUT",
        }
    }

    pub fn has_body(self) -> bool {
        matches!(self, FetchMethod::Post | FetchMethod::Put)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub method: FetchMethod,
    pub body: Option<String>,
    /// Expected response type, `html` unless the markup says otherwise.
    pub data_type: String,
    pub with_credentials: bool,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: FetchMethod::Get,
            body: None,
            data_type: "html".to_string(),
            with_credentials: false,
        }
    }
}

pub type FetchCallback = Box<dyn FnOnce(Result<String, FetchError>)>;

/// Performs requests on behalf of loader strategies.
///
/// The callback may run synchronously or at any later point.
pub trait Fetcher {
    fn fetch(&self, request: FetchRequest, on_done: FetchCallback);
}
