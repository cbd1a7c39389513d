//! Table identity key.

use std::fmt;

/// Identifies a logical table by name and owning database.
///
/// Identity is compared by value: two `TableId`s naming the same table in
/// the same database are equal no matter where their strings were
/// allocated. The buffer pool keys resident frames on
/// `(TableId, BlockId)`, so this comparison is what makes frame lookup
/// well-defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableId {
    name: String,
    database: String,
}

impl TableId {
    /// Create a new table identity.
    pub fn new(name: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database: database.into(),
        }
    }

    /// The table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning database name.
    #[inline]
    pub fn database(&self) -> &str {
        &self.database
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_value_equality() {
        // Equality must hold across distinct allocations of the same text.
        let a = TableId::new("persons", "testdb");
        let b = TableId::new(String::from("persons"), String::from("testdb"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_inequality() {
        assert_ne!(
            TableId::new("persons", "testdb"),
            TableId::new("persons", "otherdb")
        );
        assert_ne!(
            TableId::new("persons", "testdb"),
            TableId::new("orders", "testdb")
        );
    }

    #[test]
    fn test_usable_as_map_key() {
        let mut map = HashMap::new();
        map.insert(TableId::new("persons", "testdb"), 7);

        let probe = TableId::new(String::from("persons"), "testdb");
        assert_eq!(map.get(&probe), Some(&7));
    }

    #[test]
    fn test_display() {
        let id = TableId::new("persons", "testdb");
        assert_eq!(format!("{}", id), "testdb.persons");
    }
}
