// ============================================================================
// observable-map - Macros
// ============================================================================

/// Build ordered [`Entries`](crate::Entries) from `key => value` pairs.
///
/// Keys go through [`Key::from`](crate::Key), so string and integer keys mix
/// freely and canonical integer strings become indices.
///
/// # Usage
///
/// ```rust
/// use observable_map::{entries, Key, ObservableMap};
///
/// let initial = entries! {
///     "name" => "ada",
///     0 => "first",
/// };
/// let map = ObservableMap::from_entries(initial);
///
/// assert_eq!(map.get("name"), Some(&"ada"));
/// assert_eq!(map.keys().last(), Some(&Key::index(0)));
/// ```
#[macro_export]
macro_rules! entries {
    () => {
        $crate::Entries::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut entries = $crate::Entries::new();
        $( entries.insert($crate::Key::from($key), $value); )+
        entries
    }};
}
