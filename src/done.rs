/// The summary of a statement that has finished executing: the trailing
/// counters of the last OK packet seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MySqlDone {
    pub(crate) rows_affected: u64,
    pub(crate) last_insert_id: u64,
}

impl MySqlDone {
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    pub fn last_insert_id(&self) -> u64 {
        self.last_insert_id
    }
}
