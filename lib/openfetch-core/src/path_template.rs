//! Path template substitution.
//!
//! OpenAPI path templates use `{identifier}` tokens, one substitution per
//! distinct identifier: `/pet/{petId}` with `petId = 1` becomes `/pet/1`.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Percent-encoding set for path segments.
///
/// Allows unreserved characters (`A-Z a-z 0-9 - . _ ~`) and sub-delims, but
/// encodes separators and specials like spaces, `?`, `/`, `{`, `}`.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'%');

/// Replaces `{key}` placeholders in `template` with percent-encoded values.
///
/// Each key substitutes at most one occurrence (placeholders are unique per
/// OpenAPI convention). Placeholders without a matching param are left intact;
/// required path parameters are a compile-time obligation of the call site,
/// not a runtime check. With an empty param map this is the identity.
///
/// # Example
///
/// ```
/// use openfetch_core::fill_path;
///
/// let path = fill_path("/pet/{petId}", &[("petId".to_string(), "1".to_string())]);
/// assert_eq!(path, "/pet/1");
/// ```
#[must_use]
pub fn fill_path(template: &str, params: &[(String, String)]) -> String {
    let mut path = template.to_string();
    for (key, value) in params {
        let placeholder = format!("{{{key}}}");
        let encoded = utf8_percent_encode(value, PATH_SEGMENT_ENCODE_SET).to_string();
        path = path.replacen(&placeholder, &encoded, 1);
    }
    path
}
