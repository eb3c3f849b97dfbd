//! Record data model for password manager exports: the five-field `Record`,
//! the `IdentityKey` derived from its identity fields, and the available key
//! encodings.
//!
//! Two records describe the same logical entry when `name`, `url`,
//! `username` and `note` all match. `password` is the only value compared
//! during reconciliation and never takes part in the key.
use std::fmt;

use serde::Serialize;

/// Column names in the fixed output order.
pub const FIELDS: [&str; 5] = ["name", "url", "username", "password", "note"];

/// Separator used by [`KeyEncoding::Joined`].
pub const KEY_SEPARATOR: char = '|';

/// One exported credential entry. All fields are kept verbatim; empty strings
/// are valid values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    pub name: String,
    pub url: String,
    pub username: String,
    pub password: String,
    pub note: String,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            username: username.into(),
            password: password.into(),
            note: note.into(),
        }
    }

    /// Identity fields in key order: name, url, username, note.
    pub fn identity_fields(&self) -> [&str; 4] {
        [&self.name, &self.url, &self.username, &self.note]
    }

    /// All five values in [`FIELDS`] order.
    pub fn values(&self) -> [&str; 5] {
        [
            &self.name,
            &self.url,
            &self.username,
            &self.password,
            &self.note,
        ]
    }

    pub fn key(&self, encoding: KeyEncoding) -> IdentityKey {
        IdentityKey(encoding.encode(self.identity_fields()))
    }

    /// Human-readable identity, always `|`-joined regardless of encoding.
    pub fn identity_label(&self) -> String {
        KeyEncoding::Joined.encode(self.identity_fields())
    }
}

/// How the four identity fields are folded into a single key string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyEncoding {
    /// `name|url|username|note`. Fields containing `|` can collide.
    #[default]
    Joined,
    /// Each field prefixed by its byte length, e.g. `4:site0:5:alice0:`.
    /// Collision-free for arbitrary field contents.
    LengthPrefixed,
}

impl KeyEncoding {
    pub fn encode(self, fields: [&str; 4]) -> String {
        match self {
            KeyEncoding::Joined => {
                let mut s = String::new();
                for (i, f) in fields.iter().enumerate() {
                    if i > 0 {
                        s.push(KEY_SEPARATOR);
                    }
                    s.push_str(f);
                }
                s
            }
            KeyEncoding::LengthPrefixed => {
                let mut s = String::new();
                for f in fields {
                    s.push_str(&f.len().to_string());
                    s.push(':');
                    s.push_str(f);
                }
                s
            }
        }
    }
}

/// Composite identity key. Ordering is plain lexicographic over the encoded
/// string, which is what makes conflict order reproducible.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_key_uses_identity_fields_in_order() {
        let r = Record::new("GitHub", "https://github.com", "alice", "pw", "work");
        assert_eq!(
            r.key(KeyEncoding::Joined).as_str(),
            "GitHub|https://github.com|alice|work"
        );
    }

    #[test]
    fn password_is_not_part_of_key() {
        let a = Record::new("n", "u", "usr", "pw1", "note");
        let b = Record::new("n", "u", "usr", "pw2", "note");
        assert_eq!(a.key(KeyEncoding::Joined), b.key(KeyEncoding::Joined));
        assert_eq!(
            a.key(KeyEncoding::LengthPrefixed),
            b.key(KeyEncoding::LengthPrefixed)
        );
    }

    #[test]
    fn joined_encoding_collides_on_separator() {
        let a = Record::new("a|b", "c", "", "", "");
        let b = Record::new("a", "b|c", "", "", "");
        assert_eq!(a.key(KeyEncoding::Joined), b.key(KeyEncoding::Joined));
    }

    #[test]
    fn length_prefixed_encoding_does_not_collide() {
        let a = Record::new("a|b", "c", "", "", "");
        let b = Record::new("a", "b|c", "", "", "");
        assert_ne!(
            a.key(KeyEncoding::LengthPrefixed),
            b.key(KeyEncoding::LengthPrefixed)
        );
        assert_eq!(a.key(KeyEncoding::LengthPrefixed).as_str(), "3:a|b1:c0:0:");
    }

    #[test]
    fn label_is_joined_for_any_encoding() {
        let r = Record::new("n", "u", "usr", "pw", "");
        assert_eq!(r.identity_label(), "n|u|usr|");
    }
}
