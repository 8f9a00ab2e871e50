//! Address → symbol lookup used when printing addresses.

use std::collections::BTreeMap;

/// Sorted map from symbol start address to name.
#[derive(Debug, Clone, Default)]
pub struct SymbolMap {
    by_addr: BTreeMap<u32, Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    /// Extent in bytes; `0` when unknown.
    size: u32,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol. A later insert at the same address replaces the
    /// earlier name.
    pub fn insert(&mut self, addr: u32, name: impl Into<String>) {
        self.insert_sized(addr, 0, name);
    }

    /// Add a symbol covering `size` bytes from `addr`. Addresses past
    /// the end are not attributed to it; a `size` of 0 means unbounded.
    pub fn insert_sized(
        &mut self,
        addr: u32,
        size: u32,
        name: impl Into<String>,
    ) {
        let name = name.into();
        self.by_addr.insert(addr, Entry { name, size });
    }

    /// Nearest symbol at or below `addr`, with the offset into it.
    pub fn lookup(&self, addr: u32) -> Option<(&str, u32)> {
        let (&start, entry) = self.by_addr.range(..=addr).next_back()?;
        let off = addr - start;
        if entry.size != 0 && off >= entry.size {
            return None;
        }
        Some((entry.name.as_str(), off))
    }

    /// Symbol starting exactly at `addr`.
    pub fn get(&self, addr: u32) -> Option<&str> {
        self.by_addr.get(&addr).map(|e| e.name.as_str())
    }

    /// Address of the first symbol called `name`.
    pub fn find(&self, name: &str) -> Option<u32> {
        self.by_addr
            .iter()
            .find(|(_, e)| e.name == name)
            .map(|(&addr, _)| addr)
    }

    pub fn len(&self) -> usize {
        self.by_addr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_addr.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for SymbolMap {
    fn from_iter<T: IntoIterator<Item = (u32, S)>>(iter: T) -> Self {
        let mut map = SymbolMap::new();
        for (addr, name) in iter {
            map.insert(addr, name);
        }
        map
    }
}
