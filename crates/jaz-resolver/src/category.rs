//! Declaration categories.
//!
//! Every declaration carries exactly one category bit; lookups filter by a
//! mask so one name can denote, say, a field and a type in the same scope
//! without collision.

pub const PACKAGE: u16 = 1 << 0;
pub const CLASS: u16 = 1 << 1;
pub const INTERFACE: u16 = 1 << 2;
pub const FIELD: u16 = 1 << 3;
pub const METHOD: u16 = 1 << 4;
pub const CONSTRUCTOR: u16 = 1 << 5;
pub const LOCAL_VAR: u16 = 1 << 6;
pub const PARAMETER: u16 = 1 << 7;
pub const LABEL: u16 = 1 << 8;

/// Everything a type name may resolve to.
pub const TYPE: u16 = CLASS | INTERFACE;
/// Everything a bare identifier in value position may resolve to.
pub const VALUE: u16 = FIELD | LOCAL_VAR | PARAMETER;

pub fn describe(mask: u16) -> String {
    const NAMES: [(u16, &str); 9] = [
        (PACKAGE, "package"),
        (CLASS, "class"),
        (INTERFACE, "interface"),
        (FIELD, "field"),
        (METHOD, "method"),
        (CONSTRUCTOR, "constructor"),
        (LOCAL_VAR, "local variable"),
        (PARAMETER, "parameter"),
        (LABEL, "label"),
    ];
    let parts: Vec<&str> = NAMES
        .iter()
        .filter(|(bit, _)| mask & bit != 0)
        .map(|(_, n)| *n)
        .collect();
    if parts.is_empty() {
        "nothing".to_string()
    } else {
        parts.join(" or ")
    }
}
