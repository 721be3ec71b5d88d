//! Column-alias bookkeeping for one statement.
//!
//! Aliases are derived from `(node position, column)`, bounded by the
//! dialect's identifier limit, collision-free within the statement, and
//! reversible so the emitter can decode rows without positional knowledge.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    forward: HashMap<(usize, String), String>,
    reverse: HashMap<String, (usize, String)>,
}

impl AliasMap {
    pub fn new() -> Self {
        AliasMap::default()
    }

    /// Assigns (or returns the existing) alias for a node column.
    pub fn assign(&mut self, node: usize, column: &str, max_len: usize) -> String {
        if let Some(alias) = self.forward.get(&(node, column.to_string())) {
            return alias.clone();
        }
        let base = format!("a{node}_{column}");
        let mut alias = truncate(&base, max_len);
        let mut disambiguator = 1usize;
        while self.reverse.contains_key(&alias) {
            let suffix = format!("_{disambiguator}");
            alias = format!(
                "{}{}",
                truncate(&base, max_len.saturating_sub(suffix.len())),
                suffix
            );
            disambiguator += 1;
        }
        self.forward
            .insert((node, column.to_string()), alias.clone());
        self.reverse
            .insert(alias.clone(), (node, column.to_string()));
        alias
    }

    pub fn alias_of(&self, node: usize, column: &str) -> Option<&str> {
        self.forward
            .get(&(node, column.to_string()))
            .map(String::as_str)
    }

    /// Recovers `(node, column)` from an alias.
    pub fn resolve(&self, alias: &str) -> Option<(usize, &str)> {
        self.reverse
            .get(alias)
            .map(|(node, column)| (*node, column.as_str()))
    }

    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.reverse.keys().map(String::as_str)
    }

    /// Discards all assignments; called once a statement's rows have been
    /// fully consumed.
    pub fn reset(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }
}

fn truncate(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        value.to_string()
    } else {
        value[..max_len].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_reversible() {
        let mut map = AliasMap::new();
        let alias = map.assign(2, "name", 63);
        assert_eq!(alias, "a2_name");
        assert_eq!(map.resolve("a2_name"), Some((2, "name")));
        assert_eq!(map.alias_of(2, "name"), Some("a2_name"));
    }

    #[test]
    fn assignment_is_idempotent() {
        let mut map = AliasMap::new();
        let first = map.assign(0, "ID", 63);
        let second = map.assign(0, "ID", 63);
        assert_eq!(first, second);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn truncation_keeps_aliases_unique() {
        let mut map = AliasMap::new();
        let first = map.assign(0, "a_very_long_column_name", 8);
        let second = map.assign(0, "a_very_long_column_other", 8);
        assert_ne!(first, second);
        assert!(first.len() <= 8);
        assert!(second.len() <= 8);
        assert_eq!(
            map.resolve(&second),
            Some((0, "a_very_long_column_other"))
        );
    }

    #[test]
    fn reset_clears_both_directions() {
        let mut map = AliasMap::new();
        map.assign(0, "ID", 63);
        map.reset();
        assert!(map.is_empty());
        assert_eq!(map.resolve("a0_ID"), None);
    }
}
