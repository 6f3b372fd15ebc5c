//! Naming convention utilities for code generation.
//!
//! Schema field names are lower snake case (`login_req`). Emitters derive every
//! per-language identifier from that form with the functions below.
//!
//! # Supported Conversions
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `login_req` | [`to_camel_case`] | `loginReq` |
//! | `login_req` | [`to_pascal_case`] | `LoginReq` |
//! | `login_req` | [`to_upper_snake_case`] | `LOGIN_REQ` |
//! | `game.net` | [`package_segments`] | `["Game", "Net"]` |
//! | `login_2fa` | [`go_camel_case`] | `Login_2Fa` |
//! | `login_2fa` | [`proto_pascal_case`] | `Login2Fa` |
//! | `login_2fa` | [`proto_camel_case`] | `login2Fa` |
//!
//! Handler and send method names are socketgen's own and use
//! [`to_pascal_case`]. Members of protobuf-generated classes follow each
//! runtime's own mangling, reproduced by [`go_camel_case`],
//! [`proto_pascal_case`] and [`proto_camel_case`].
//!
//! All functions are total: they never fail, and empty input yields empty
//! output. Runs of underscores collapse, so no empty segment produces a
//! spurious capital.

/// Convert snake_case to camelCase.
///
/// The first letter of the first segment is lowercased, every later segment
/// is capitalized, and underscores are dropped.
///
/// # Examples
///
/// ```
/// use socketgen_core::naming::to_camel_case;
///
/// assert_eq!(to_camel_case("login_req"), "loginReq");
/// assert_eq!(to_camel_case("chat__msg"), "chatMsg");
/// assert_eq!(to_camel_case("already"), "already");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let mut segments = s.split('_').filter(|seg| !seg.is_empty());

    match segments.next() {
        None => String::new(),
        Some(first) => {
            let mut result = lowercase_first(first);
            for segment in segments {
                result.push_str(&capitalize(segment));
            }
            result
        }
    }
}

/// Convert snake_case to PascalCase.
///
/// # Examples
///
/// ```
/// use socketgen_core::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("login_req"), "LoginReq");
/// assert_eq!(to_pascal_case("payload"), "Payload");
/// assert_eq!(to_pascal_case(""), "");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .filter(|seg| !seg.is_empty())
        .map(capitalize)
        .collect()
}

/// Convert snake_case to SCREAMING_SNAKE_CASE, as used for Java oneof case constants.
///
/// # Examples
///
/// ```
/// use socketgen_core::naming::to_upper_snake_case;
///
/// assert_eq!(to_upper_snake_case("login_req"), "LOGIN_REQ");
/// ```
pub fn to_upper_snake_case(s: &str) -> String {
    s.to_uppercase()
}

/// Capitalize the first letter of a string.
///
/// # Examples
///
/// ```
/// use socketgen_core::naming::capitalize;
///
/// assert_eq!(capitalize("hello"), "Hello");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lowercase the first letter of a string.
pub fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Split a dotted schema package into PascalCase namespace segments.
///
/// Used for C# namespaces, PHP namespaces and Ruby modules, which the
/// respective protobuf runtimes derive the same way.
///
/// # Examples
///
/// ```
/// use socketgen_core::naming::package_segments;
///
/// assert_eq!(package_segments("game.net_v2"), vec!["Game", "NetV2"]);
/// assert!(package_segments("").is_empty());
/// ```
pub fn package_segments(package: &str) -> Vec<String> {
    package
        .split('.')
        .filter(|seg| !seg.is_empty())
        .map(to_pascal_case)
        .collect()
}

/// Go identifier for a schema name, as protoc-gen-go derives it.
///
/// Words start at an underscore followed by a lowercase letter or at an
/// uppercase letter; an underscore before anything else is kept. Dots between
/// nested message names become underscores.
///
/// # Examples
///
/// ```
/// use socketgen_core::naming::go_camel_case;
///
/// assert_eq!(go_camel_case("login_req"), "LoginReq");
/// assert_eq!(go_camel_case("login_2fa"), "Login_2Fa");
/// assert_eq!(go_camel_case("chat__msg"), "Chat_Msg");
/// assert_eq!(go_camel_case("Lobby.JoinReq"), "Lobby_JoinReq");
/// ```
pub fn go_camel_case(s: &str) -> String {
    let bytes = s.as_bytes();
    let next_is_lower = |i: usize| bytes.get(i + 1).is_some_and(|b| b.is_ascii_lowercase());
    let mut out = String::with_capacity(s.len());

    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'.' if next_is_lower(i) => {}
            b'.' => out.push('_'),
            b'_' if i == 0 || bytes[i - 1] == b'.' => out.push('X'),
            b'_' if next_is_lower(i) => {}
            c if c.is_ascii_digit() => out.push(char::from(c)),
            c => {
                out.push(char::from(c.to_ascii_uppercase()));
                while next_is_lower(i) {
                    i += 1;
                    out.push(char::from(bytes[i]));
                }
            }
        }
        i += 1;
    }

    out
}

/// PascalCase member name as protobuf-java, Google.Protobuf and the PHP
/// runtime derive it: a letter after a digit or a separator is capitalized.
///
/// # Examples
///
/// ```
/// use socketgen_core::naming::proto_pascal_case;
///
/// assert_eq!(proto_pascal_case("login_req"), "LoginReq");
/// assert_eq!(proto_pascal_case("login_2fa"), "Login2Fa");
/// assert_eq!(proto_pascal_case("chat__msg"), "ChatMsg");
/// ```
pub fn proto_pascal_case(s: &str) -> String {
    underscores_to_camel_case(s, true)
}

/// lowerCamel variant of [`proto_pascal_case`], the Kotlin property name of a
/// protobuf-java field.
///
/// # Examples
///
/// ```
/// use socketgen_core::naming::proto_camel_case;
///
/// assert_eq!(proto_camel_case("login_2fa"), "login2Fa");
/// ```
pub fn proto_camel_case(s: &str) -> String {
    underscores_to_camel_case(s, false)
}

fn underscores_to_camel_case(s: &str, cap_first: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut cap_next = cap_first;

    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_lowercase() {
            out.push(if cap_next { c.to_ascii_uppercase() } else { c });
            cap_next = false;
        } else if c.is_ascii_uppercase() {
            out.push(if i == 0 && !cap_first { c.to_ascii_lowercase() } else { c });
            cap_next = false;
        } else if c.is_ascii_digit() {
            out.push(c);
            cap_next = true;
        } else {
            cap_next = true;
        }
    }

    out
}

/// Whether `s` is a plain ASCII identifier (`[A-Za-z_][A-Za-z0-9_]*`).
///
/// Every language target accepts this set, so emitters reject anything else
/// up front instead of producing source that does not compile.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
