// ============================================================================
// observable-map - Keys
// Integer-or-string keys with canonical integer normalization
// ============================================================================
//
// A map key is either an integer index or a name. Names that spell a
// canonical i64 ("0", "42", "-7") are stored as indices so that "5" and 5
// address the same entry. "05", "-0", "+5" and " 5" stay names.
//
// The representation is private: every way of building a `Key` or a
// `KeyRef` goes through the same classification, so no name key can ever
// spell an integer.
//
// Owned keys live in the map; lookups borrow through `KeyRef`, which hashes
// identically to `Key` and is `Equivalent` to it, so `get("name")` never
// allocates.
// ============================================================================

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::Equivalent;
use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};

// =============================================================================
// KEY
// =============================================================================

/// An owned entry key: an integer index or a non-integer name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key(Repr);

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Repr {
    Index(i64),
    Name(String),
}

impl Key {
    /// An integer key, as produced by positional appends.
    pub fn index(i: i64) -> Self {
        Key(Repr::Index(i))
    }

    /// A key from a string. Canonical integer strings become index keys.
    pub fn name(name: impl Into<String>) -> Self {
        let name = name.into();
        match parse_index(&name) {
            Some(i) => Key::index(i),
            None => Key(Repr::Name(name)),
        }
    }

    /// Borrow this key for lookups.
    pub fn as_key_ref(&self) -> KeyRef<'_> {
        match &self.0 {
            Repr::Index(i) => KeyRef(RefRepr::Index(*i)),
            Repr::Name(name) => KeyRef(RefRepr::Name(name)),
        }
    }

    /// The integer value, if this is an index key.
    pub fn as_index(&self) -> Option<i64> {
        match &self.0 {
            Repr::Index(i) => Some(*i),
            Repr::Name(_) => None,
        }
    }

    /// The name, if this is a name key.
    pub fn as_name(&self) -> Option<&str> {
        match &self.0 {
            Repr::Index(_) => None,
            Repr::Name(name) => Some(name),
        }
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key_ref().hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Index(i) => write!(f, "{i}"),
            Repr::Name(name) => write!(f, "{name:?}"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Index(i) => write!(f, "{i}"),
            Repr::Name(name) => f.write_str(name),
        }
    }
}

// =============================================================================
// KEY REF
// =============================================================================

/// A borrowed key, used for allocation-free lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyRef<'a>(RefRepr<'a>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RefRepr<'a> {
    Index(i64),
    Name(&'a str),
}

impl<'a> KeyRef<'a> {
    /// Classify a string, normalizing canonical integers to an index.
    pub fn classify(s: &'a str) -> Self {
        match parse_index(s) {
            Some(i) => KeyRef(RefRepr::Index(i)),
            None => KeyRef(RefRepr::Name(s)),
        }
    }

    pub fn index(i: i64) -> Self {
        KeyRef(RefRepr::Index(i))
    }

    pub fn to_key(self) -> Key {
        match self.0 {
            RefRepr::Index(i) => Key(Repr::Index(i)),
            RefRepr::Name(name) => Key(Repr::Name(name.to_owned())),
        }
    }
}

impl Equivalent<Key> for KeyRef<'_> {
    fn equivalent(&self, key: &Key) -> bool {
        *self == key.as_key_ref()
    }
}

/// Parse `s` as an index only if it is the canonical decimal form of an i64.
fn parse_index(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if digits == "0" && digits.len() != s.len() {
        // "-0"
        return None;
    }
    s.parse().ok()
}

// =============================================================================
// AS KEY
// =============================================================================

/// Anything that can be looked up in a map without building an owned `Key`.
pub trait AsKey {
    fn as_key_ref(&self) -> KeyRef<'_>;
}

impl AsKey for Key {
    fn as_key_ref(&self) -> KeyRef<'_> {
        Key::as_key_ref(self)
    }
}

impl AsKey for KeyRef<'_> {
    fn as_key_ref(&self) -> KeyRef<'_> {
        *self
    }
}

impl AsKey for str {
    fn as_key_ref(&self) -> KeyRef<'_> {
        KeyRef::classify(self)
    }
}

impl AsKey for String {
    fn as_key_ref(&self) -> KeyRef<'_> {
        KeyRef::classify(self)
    }
}

impl<T: AsKey + ?Sized> AsKey for &T {
    fn as_key_ref(&self) -> KeyRef<'_> {
        (**self).as_key_ref()
    }
}

macro_rules! int_keys {
    ($($t:ty),*) => {
        $(
            impl AsKey for $t {
                fn as_key_ref(&self) -> KeyRef<'_> {
                    KeyRef::index(i64::from(*self))
                }
            }

            impl From<$t> for Key {
                fn from(i: $t) -> Self {
                    Key::index(i64::from(i))
                }
            }
        )*
    };
}

int_keys!(i8, i16, i32, i64, u8, u16, u32);

// usize only overflows i64 on exotic targets; saturate rather than wrap.
impl AsKey for usize {
    fn as_key_ref(&self) -> KeyRef<'_> {
        KeyRef::index(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::index(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        KeyRef::classify(s).to_key()
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::from(s.as_str())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::name(s)
    }
}

impl From<KeyRef<'_>> for Key {
    fn from(key: KeyRef<'_>) -> Self {
        key.to_key()
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

// =============================================================================
// SERDE
// =============================================================================

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Repr::Index(i) => serializer.serialize_i64(*i),
            Repr::Name(name) => serializer.serialize_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(KeyVisitor)
    }
}

struct KeyVisitor;

impl Visitor<'_> for KeyVisitor {
    type Value = Key;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a string key")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Key, E> {
        Ok(Key::index(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Key, E> {
        i64::try_from(v)
            .map(Key::index)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Key, E> {
        Ok(Key::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Key, E> {
        Ok(Key::name(v))
    }
}

// =============================================================================
// TESTS
// =============================================================================
