//! Arena of priced instruments.

use crate::types::{InstrumentId, PricedInstrument};
use crate::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REGISTRY_TAG: AtomicU64 = AtomicU64::new(0);

/// Owns instruments and hands out stable ids for them.
///
/// Instruments are never removed, so an id stays valid for the life of the
/// registry. Ids carry the tag of the registry that issued them and do not
/// resolve anywhere else. Any number of [`Holdings`](crate::Holdings) can
/// borrow the same registry.
#[derive(Debug, Clone)]
pub struct InstrumentRegistry {
    tag: u64,
    instruments: Vec<PricedInstrument>,
}

impl InstrumentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tag: NEXT_REGISTRY_TAG.fetch_add(1, Ordering::Relaxed),
            instruments: Vec::new(),
        }
    }

    fn id(&self, index: usize) -> InstrumentId {
        InstrumentId {
            registry: self.tag,
            index,
        }
    }

    /// Add an instrument and return its id.
    ///
    /// Names must be unique within a registry.
    pub fn register(&mut self, instrument: PricedInstrument) -> Result<InstrumentId> {
        if self.find(instrument.name()).is_some() {
            return Err(Error::DuplicateInstrument(instrument.name().to_string()));
        }

        let id = self.id(self.instruments.len());
        self.instruments.push(instrument);
        Ok(id)
    }

    /// Look up an instrument by id. Ids from another registry return `None`.
    pub fn get(&self, id: InstrumentId) -> Option<&PricedInstrument> {
        if id.registry != self.tag {
            return None;
        }
        self.instruments.get(id.index)
    }

    /// Find the id of the instrument with the given name.
    pub fn find(&self, name: &str) -> Option<InstrumentId> {
        self.instruments
            .iter()
            .position(|i| i.name() == name)
            .map(|idx| self.id(idx))
    }

    /// Iterate over `(id, instrument)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (InstrumentId, &PricedInstrument)> {
        self.instruments
            .iter()
            .enumerate()
            .map(|(idx, i)| (self.id(idx), i))
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl Default for InstrumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(name: &str) -> PricedInstrument {
        PricedInstrument::new(name, [("2024-01-01", 100.0)])
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut registry = InstrumentRegistry::new();
        let a = registry.register(stock("Stock A")).unwrap();
        let b = registry.register(stock("Stock B")).unwrap();

        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(a).unwrap().name(), "Stock A");
        assert_eq!(registry.get(b).unwrap().name(), "Stock B");
    }

    #[test]
    fn test_register_duplicate_name() {
        let mut registry = InstrumentRegistry::new();
        registry.register(stock("Stock A")).unwrap();

        let result = registry.register(stock("Stock A"));
        assert!(matches!(result, Err(Error::DuplicateInstrument(name)) if name == "Stock A"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_find() {
        let mut registry = InstrumentRegistry::new();
        let a = registry.register(stock("Stock A")).unwrap();

        assert_eq!(registry.find("Stock A"), Some(a));
        assert_eq!(registry.find("stock a"), None);
    }

    #[test]
    fn test_get_unknown_id() {
        let registry = InstrumentRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(registry.id(0)).is_none());
    }

    #[test]
    fn test_ids_do_not_resolve_in_other_registries() {
        let mut penny = InstrumentRegistry::new();
        let mut mega = InstrumentRegistry::new();
        penny.register(stock("Penny")).unwrap();
        let mega_id = mega.register(stock("Mega")).unwrap();

        assert_eq!(mega.get(mega_id).unwrap().name(), "Mega");
        assert!(penny.get(mega_id).is_none());
    }

    #[test]
    fn test_clone_keeps_ids_valid() {
        let mut registry = InstrumentRegistry::new();
        let a = registry.register(stock("Stock A")).unwrap();

        let copy = registry.clone();
        assert_eq!(copy.get(a).unwrap().name(), "Stock A");
    }

    #[test]
    fn test_iter_in_registration_order() {
        let mut registry = InstrumentRegistry::new();
        registry.register(stock("Zeta")).unwrap();
        registry.register(stock("Alpha")).unwrap();

        let names: Vec<_> = registry.iter().map(|(_, i)| i.name()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }
}
