use super::method::HttpMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    None,
    Raw(String),
    Form(Vec<(String, String)>),
}

/// A fully resolved request, ready to send.
#[derive(Debug, Clone)]
pub struct RequestInput {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}
