//! Declaration modifier flags.

use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// Modifier bitset carried by type, field, and method declarations.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        const PUBLIC       = 1 << 0;
        const PROTECTED    = 1 << 1;
        const PRIVATE      = 1 << 2;
        const STATIC       = 1 << 3;
        const ABSTRACT     = 1 << 4;
        const FINAL        = 1 << 5;
        const NATIVE       = 1 << 6;
        const SYNCHRONIZED = 1 << 7;
        const TRANSIENT    = 1 << 8;
        const VOLATILE     = 1 << 9;
        const STRICTFP     = 1 << 10;
    }
}

impl Modifiers {
    /// Parse a single modifier keyword.
    pub fn from_keyword(kw: &str) -> Option<Modifiers> {
        Some(match kw {
            "public" => Modifiers::PUBLIC,
            "protected" => Modifiers::PROTECTED,
            "private" => Modifiers::PRIVATE,
            "static" => Modifiers::STATIC,
            "abstract" => Modifiers::ABSTRACT,
            "final" => Modifiers::FINAL,
            "native" => Modifiers::NATIVE,
            "synchronized" => Modifiers::SYNCHRONIZED,
            "transient" => Modifiers::TRANSIENT,
            "volatile" => Modifiers::VOLATILE,
            "strictfp" => Modifiers::STRICTFP,
            _ => return None,
        })
    }

    /// Keywords in canonical source order, for regeneration and dumps.
    pub fn keywords(&self) -> Vec<&'static str> {
        const ORDER: [(Modifiers, &str); 11] = [
            (Modifiers::PUBLIC, "public"),
            (Modifiers::PROTECTED, "protected"),
            (Modifiers::PRIVATE, "private"),
            (Modifiers::ABSTRACT, "abstract"),
            (Modifiers::STATIC, "static"),
            (Modifiers::FINAL, "final"),
            (Modifiers::NATIVE, "native"),
            (Modifiers::SYNCHRONIZED, "synchronized"),
            (Modifiers::TRANSIENT, "transient"),
            (Modifiers::VOLATILE, "volatile"),
            (Modifiers::STRICTFP, "strictfp"),
        ];
        ORDER
            .iter()
            .filter(|(m, _)| self.contains(*m))
            .map(|(_, kw)| *kw)
            .collect()
    }
}

impl Serialize for Modifiers {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.keywords())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_round_trip() {
        let m = Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL;
        assert_eq!(m.keywords(), vec!["public", "static", "final"]);
        let rebuilt = m
            .keywords()
            .iter()
            .map(|kw| Modifiers::from_keyword(kw).unwrap())
            .fold(Modifiers::empty(), |acc, m| acc | m);
        assert_eq!(rebuilt, m);
    }

    #[test]
    fn unknown_keyword_is_none() {
        assert_eq!(Modifiers::from_keyword("class"), None);
    }
}
