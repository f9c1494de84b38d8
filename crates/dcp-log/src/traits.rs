use dcp_types::TransparencyLogEntry;

use crate::error::Result;

/// Ordered, append-only storage behind a transparency log.
///
/// `append` is all-or-nothing: when it returns an error the store holds
/// exactly the entries it held before the call. Entries are read back in
/// append order.
pub trait LogStore: Send + Sync {
    fn append(&self, entry: &TransparencyLogEntry) -> Result<()>;

    fn get(&self, index: u64) -> Result<Option<TransparencyLogEntry>>;

    fn len(&self) -> Result<u64>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read_all(&self) -> Result<Vec<TransparencyLogEntry>>;
}

impl<S: LogStore + ?Sized> LogStore for Box<S> {
    fn append(&self, entry: &TransparencyLogEntry) -> Result<()> {
        (**self).append(entry)
    }

    fn get(&self, index: u64) -> Result<Option<TransparencyLogEntry>> {
        (**self).get(index)
    }

    fn len(&self) -> Result<u64> {
        (**self).len()
    }

    fn read_all(&self) -> Result<Vec<TransparencyLogEntry>> {
        (**self).read_all()
    }
}
