//! Shared proptest generators.
//!
//! Roles are produced as plain strings so that this crate stays independent
//! of the services that consume it.

use proptest::prelude::*;

/// Every portal role, in namespace order.
pub const ROLES: [&str; 3] = ["admin", "doctor", "patient"];

/// Generate a portal role name.
pub fn role_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("admin".to_string()),
        Just("doctor".to_string()),
        Just("patient".to_string()),
    ]
}

/// Generate two distinct roles: the credential's role and a foreign namespace.
pub fn mismatched_roles_strategy() -> impl Strategy<Value = (String, String)> {
    (0usize..3, 1usize..3).prop_map(|(own, shift)| {
        (ROLES[own].to_string(), ROLES[(own + shift) % 3].to_string())
    })
}

/// Generate a single lowercase path segment.
pub fn path_segment_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9-]{0,15}"
}

/// Generate a path inside the given role namespace, e.g. `/doctor/appointments/42`.
pub fn role_path_strategy(role: String) -> impl Strategy<Value = String> {
    prop::collection::vec(path_segment_strategy(), 0..4).prop_map(move |segments| {
        if segments.is_empty() {
            format!("/{role}")
        } else {
            format!("/{role}/{}", segments.join("/"))
        }
    })
}

/// Generate a `(role, path)` pair where the path lies in that role's namespace.
pub fn protected_path_strategy() -> impl Strategy<Value = (String, String)> {
    role_strategy().prop_flat_map(|role| (Just(role.clone()), role_path_strategy(role)))
}

/// Generate a static image path that the edge matcher must skip.
pub fn image_path_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(path_segment_strategy(), 0..3),
        "[a-z0-9_-]{1,12}",
        prop_oneof![
            Just("svg"),
            Just("png"),
            Just("jpg"),
            Just("jpeg"),
            Just("gif"),
            Just("webp"),
        ],
    )
        .prop_map(|(dirs, stem, ext)| {
            let mut path = String::new();
            for dir in dirs {
                path.push('/');
                path.push_str(&dir);
            }
            format!("{path}/{stem}.{ext}")
        })
}

/// Generate a non-empty query string such as `page=2&sort=name`.
pub fn query_string_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(("[a-z]{1,10}", "[a-z0-9]{1,10}"), 1..4).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    })
}

/// Generate HTTP status codes an origin commonly answers with.
pub fn http_status_code_strategy() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(200u16),
        Just(201u16),
        Just(400u16),
        Just(401u16),
        Just(403u16),
        Just(404u16),
        Just(409u16),
        Just(422u16),
        Just(500u16),
        Just(502u16),
        Just(503u16),
    ]
}

/// Generate strings that can never decode as a three-segment credential.
pub fn malformed_credential_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_-]{1,40}",
        "[a-zA-Z0-9_-]{1,20}\\.[a-zA-Z0-9_-]{1,20}",
        "[a-z]{4,10}\\.!{1,4}\\.[a-z]{4,10}",
    ]
}
