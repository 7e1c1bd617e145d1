//! S3 request routing: path-style bucket/key extraction and operation
//! identification.
//!
//! Only path-style addressing is supported: the first path segment is the
//! bucket and the remainder, if any, is the key.

use http::Method;
use metalstack_s3_model::S3Operation;
use metalstack_s3_model::error::S3Error;
use percent_encoding::percent_decode_str;

/// Path-style S3 router.
#[derive(Debug, Clone, Copy, Default)]
pub struct S3Router;

/// The result of routing an HTTP request to an S3 operation.
#[derive(Debug, Clone)]
pub struct RoutingContext {
    /// The resolved bucket name, if any.
    pub bucket: Option<String>,
    /// The resolved object key, if any.
    pub key: Option<String>,
    /// The identified S3 operation.
    pub operation: S3Operation,
    /// Parsed query parameters from the request URI.
    pub query_params: Vec<(String, String)>,
}

impl S3Router {
    /// Create a router.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolve an HTTP request to the S3 operation it names.
    ///
    /// # Errors
    ///
    /// Returns `MethodNotAllowed` when the method has no meaning for the
    /// addressed resource, and `NotImplemented` for sub-resources the server
    /// does not support.
    pub fn resolve<B>(&self, req: &http::Request<B>) -> Result<RoutingContext, S3Error> {
        let query_params = parse_query_params(req.uri().query().unwrap_or(""));
        let (bucket, key) = parse_path(req.uri().path());
        let operation =
            identify_operation(req.method(), bucket.as_ref(), key.as_ref(), &query_params)?;

        Ok(RoutingContext {
            bucket,
            key,
            operation,
            query_params,
        })
    }
}

/// Parse the URI path into an optional bucket and optional key.
///
/// Path format: `/{bucket}` or `/{bucket}/{key...}`
fn parse_path(path: &str) -> (Option<String>, Option<String>) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return (None, None);
    }

    match trimmed.split_once('/') {
        Some((bucket, "")) => (Some(decode_uri_component(bucket)), None),
        Some((bucket, key)) => (
            Some(decode_uri_component(bucket)),
            Some(decode_uri_component(key)),
        ),
        None => (Some(decode_uri_component(trimmed)), None),
    }
}

/// Decode a percent-encoded URI component.
fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Parse a query string into key-value pairs.
fn parse_query_params(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (
                decode_uri_component(&k.replace('+', " ")),
                decode_uri_component(&v.replace('+', " ")),
            ),
            None => (decode_uri_component(pair), String::new()),
        })
        .collect()
}

/// Whether a query parameter is present.
fn query_has_key(params: &[(String, String)], key: &str) -> bool {
    params.iter().any(|(k, _)| k == key)
}

/// Look up a query parameter by name.
pub(crate) fn query_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn identify_operation(
    method: &Method,
    bucket: Option<&String>,
    key: Option<&String>,
    params: &[(String, String)],
) -> Result<S3Operation, S3Error> {
    match (bucket.is_some(), key.is_some()) {
        (false, _) => match *method {
            Method::GET => Ok(S3Operation::ListBuckets),
            _ => Err(S3Error::method_not_allowed(method.as_str())),
        },
        (true, false) => match *method {
            Method::GET => Ok(S3Operation::ListObjectsV2),
            Method::PUT => Ok(S3Operation::CreateBucket),
            Method::HEAD => Ok(S3Operation::HeadBucket),
            _ => Err(S3Error::method_not_allowed(method.as_str())),
        },
        (true, true) => match *method {
            Method::GET if query_has_key(params, "acl") => Ok(S3Operation::GetObjectAcl),
            Method::GET => Ok(S3Operation::GetObject),
            Method::HEAD => Ok(S3Operation::HeadObject),
            Method::PUT if query_has_key(params, "acl") => {
                Err(S3Error::not_implemented("PutObjectAcl"))
            }
            Method::PUT => Ok(S3Operation::PutObject),
            _ => Err(S3Error::method_not_allowed(method.as_str())),
        },
    }
}
