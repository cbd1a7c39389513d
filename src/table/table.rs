//! Table handles - the identity and backing file the storage core keys on.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, MutexGuard};

use crate::common::{BlockId, Result, TableId};
use crate::storage::BlockStore;
use crate::table::Schema;

/// A handle to one table: its identity, schema, and backing file.
///
/// The storage core treats a table as an opaque identity key plus a source
/// of a file handle for block I/O; it never owns the table's lifecycle.
/// The backing file lives at `<root>/<database>/<name>.tbl`.
///
/// # Thread Safety
/// The [`BlockStore`] is wrapped in a mutex; the buffer pool borrows it
/// for the duration of one load or flush.
pub struct Table {
    id: TableId,
    schema: Schema,
    store: Mutex<BlockStore>,
}

impl Table {
    /// Create a new table with an empty backing file.
    ///
    /// Creates the database directory under `root` if needed.
    ///
    /// # Errors
    /// Returns an error if the backing file already exists or cannot be
    /// created.
    pub fn create<P: AsRef<Path>>(
        root: P,
        name: &str,
        database: &str,
        schema: Schema,
    ) -> Result<Table> {
        let dir = root.as_ref().join(database);
        fs::create_dir_all(&dir)?;

        let store = BlockStore::create(Self::file_path(root.as_ref(), name, database))?;
        Ok(Table {
            id: TableId::new(name, database),
            schema,
            store: Mutex::new(store),
        })
    }

    /// Open an existing table's backing file.
    pub fn open<P: AsRef<Path>>(
        root: P,
        name: &str,
        database: &str,
        schema: Schema,
    ) -> Result<Table> {
        let store = BlockStore::open(Self::file_path(root.as_ref(), name, database))?;
        Ok(Table {
            id: TableId::new(name, database),
            schema,
            store: Mutex::new(store),
        })
    }

    /// Open an existing table, or create it if its file doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(
        root: P,
        name: &str,
        database: &str,
        schema: Schema,
    ) -> Result<Table> {
        if Self::file_path(root.as_ref(), name, database).exists() {
            Self::open(root, name, database, schema)
        } else {
            Self::create(root, name, database, schema)
        }
    }

    /// Path of the backing file for `database`.`name` under `root`.
    pub fn file_path(root: &Path, name: &str, database: &str) -> PathBuf {
        root.join(database).join(format!("{}.tbl", name))
    }

    /// The table's identity key.
    #[inline]
    pub fn id(&self) -> &TableId {
        &self.id
    }

    /// The table's record layout.
    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Borrow the backing block store for one I/O operation.
    pub(crate) fn store(&self) -> MutexGuard<'_, BlockStore> {
        self.store.lock()
    }

    /// Append a zero-filled block to the backing file.
    pub fn append_block(&self) -> Result<BlockId> {
        self.store().append_block()
    }

    /// Number of blocks in the backing file.
    pub fn block_count(&self) -> Result<u64> {
        self.store().block_count()
    }

    /// Flush the backing file to stable storage.
    pub fn sync(&self) -> Result<()> {
        self.store().sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Field;
    use tempfile::tempdir;

    fn person_schema() -> Schema {
        Schema::new(vec![Field::int(), Field::chars(20), Field::int()])
    }

    #[test]
    fn test_create_table() {
        let dir = tempdir().unwrap();
        let table = Table::create(dir.path(), "persons", "testdb", person_schema()).unwrap();

        assert_eq!(table.id(), &TableId::new("persons", "testdb"));
        assert_eq!(table.block_count().unwrap(), 0);
        assert!(dir.path().join("testdb").join("persons.tbl").exists());
    }

    #[test]
    fn test_create_existing_fails() {
        let dir = tempdir().unwrap();
        Table::create(dir.path(), "persons", "testdb", person_schema()).unwrap();
        assert!(Table::create(dir.path(), "persons", "testdb", person_schema()).is_err());
    }

    #[test]
    fn test_append_and_count() {
        let dir = tempdir().unwrap();
        let table = Table::create(dir.path(), "persons", "testdb", person_schema()).unwrap();

        assert_eq!(table.append_block().unwrap(), BlockId::new(0));
        assert_eq!(table.append_block().unwrap(), BlockId::new(1));
        assert_eq!(table.block_count().unwrap(), 2);
    }

    #[test]
    fn test_open_or_create_round_trip() {
        let dir = tempdir().unwrap();

        {
            let table =
                Table::open_or_create(dir.path(), "persons", "testdb", person_schema()).unwrap();
            table.append_block().unwrap();
        }

        let table =
            Table::open_or_create(dir.path(), "persons", "testdb", person_schema()).unwrap();
        assert_eq!(table.block_count().unwrap(), 1);
    }
}
