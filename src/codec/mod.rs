//! Pure encoding helpers shared by the transport and the API calls.
//!
//! - [`build_query`] form-encodes request parameters
//! - [`CookieJar`], [`build_cookie_header`] and [`read_set_cookie_headers`]
//!   carry the session cookies between requests
//! - [`primitive_string`] reads scalar JSON fields the API may send as
//!   either strings or numbers

mod cookies;
mod json;
mod query;

pub use cookies::{
    CookieJar, CookieWhitelist, WIKIA_SESSION_COOKIES, build_cookie_header,
    read_set_cookie_headers,
};
pub use json::{non_empty_string, primitive_string};
pub use query::build_query;
