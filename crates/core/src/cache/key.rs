//! Key derivation for the two cache namespaces.

const TEXT_SUFFIX: &str = "_TEXT";
const BYTE_SUFFIX: &str = "_BYTE";

/// Namespace a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Text,
    Binary,
}

impl Namespace {
    pub fn suffix(self) -> &'static str {
        match self {
            Namespace::Text => TEXT_SUFFIX,
            Namespace::Binary => BYTE_SUFFIX,
        }
    }
}

/// Full store key for a request identifier in a namespace.
pub struct CacheKey;

impl CacheKey {
    pub fn text(id: &str) -> String {
        Self::for_namespace(id, Namespace::Text)
    }

    pub fn binary(id: &str) -> String {
        Self::for_namespace(id, Namespace::Binary)
    }

    pub fn for_namespace(id: &str, namespace: Namespace) -> String {
        format!("{}{}", id, namespace.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_carry_namespace_suffix() {
        assert_eq!(CacheKey::text("42"), "42_TEXT");
        assert_eq!(CacheKey::binary("42"), "42_BYTE");
    }

    #[test]
    fn test_namespaces_never_collide() {
        assert_ne!(CacheKey::text("7"), CacheKey::binary("7"));
    }
}
