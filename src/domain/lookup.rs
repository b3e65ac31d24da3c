//! Case and whitespace insensitive name lookup over a fixed set of variants

/// Normalizes a name for lookup: trimmed, uppercased, whitespace runs become `_`.
pub fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .map(|part| part.to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Static mapping from normalized name to variant
#[derive(Debug, Clone)]
pub struct NameTable<T: Copy + 'static> {
    entries: &'static [(&'static str, T)],
}

impl<T: Copy + 'static> NameTable<T> {
    /// Keys must already be in normalized form.
    pub const fn new(entries: &'static [(&'static str, T)]) -> Self {
        Self { entries }
    }

    /// Looks a name up, returning `None` when nothing matches.
    pub fn lookup(&self, name: &str) -> Option<T> {
        let key = normalize_key(name);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Maps every name to its variant, dropping names that don't resolve.
    pub fn map_names<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<T> {
        names.into_iter().filter_map(|n| self.lookup(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Color {
        Red,
        DarkBlue,
    }

    const COLORS: NameTable<Color> = NameTable::new(&[("RED", Color::Red), ("DARK_BLUE", Color::DarkBlue)]);

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("dark blue"), "DARK_BLUE");
        assert_eq!(normalize_key("  dark \t  blue "), "DARK_BLUE");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn test_lookup() {
        assert_eq!(COLORS.lookup("red"), Some(Color::Red));
        assert_eq!(COLORS.lookup("Dark Blue"), Some(Color::DarkBlue));
        assert_eq!(COLORS.lookup("DARK_BLUE"), Some(Color::DarkBlue));
        assert_eq!(COLORS.lookup("green"), None);
    }

    #[test]
    fn test_map_names_drops_unknown() {
        let mapped = COLORS.map_names(["red", "purple", "dark blue"]);
        assert_eq!(mapped, vec![Color::Red, Color::DarkBlue]);
    }
}
