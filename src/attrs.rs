/// Ordered Graphviz attribute list.
///
/// Setting a key that is already present replaces its value in place, so the
/// first-declared position is kept and output stays deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    entries: Vec<(String, String)>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set_opt(&mut self, key: &str, value: Option<impl ToString>) {
        if let Some(v) = value {
            self.set(key, v.to_string());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Overlay `other` on top of `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &Attrs) {
        for (k, v) in &other.entries {
            self.set(k.clone(), v.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attrs::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_replaces_in_place() {
        let mut attrs = Attrs::new().with("color", "red").with("penwidth", "2");
        attrs.set("color", "blue");
        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("color", "blue"), ("penwidth", "2")]);
    }

    #[test]
    fn merge_overrides_and_appends() {
        let mut base: Attrs = [("fontsize", "13"), ("shape", "box")].into_iter().collect();
        let user: Attrs = [("fontsize", "28"), ("fillcolor", "#2c3e50")].into_iter().collect();
        base.merge(&user);
        assert_eq!(base.get("fontsize"), Some("28"));
        assert_eq!(base.get("fillcolor"), Some("#2c3e50"));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn set_opt_skips_none() {
        let mut attrs = Attrs::new();
        attrs.set_opt("width", None::<f32>);
        attrs.set_opt("height", Some(4.5));
        assert!(!attrs.contains("width"));
        assert_eq!(attrs.get("height"), Some("4.5"));
    }
}
