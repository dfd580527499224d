//! Shared lookup-table cache keyed by `(width, poly, refin)`.
//!
//! # Caching Strategy
//!
//! - The key map sits behind a `Mutex` that is held only long enough to fetch
//!   or insert a per-key slot.
//! - Each slot is an `OnceLock`, so a table is built at most once per key even
//!   when many threads ask for it at the same time, and the build itself runs
//!   outside the map lock.
//! - Published tables are handed out as `Arc<LookupTable>` and never mutated.

use std::{
  collections::HashMap,
  fmt,
  sync::{
    Arc, Mutex, OnceLock, PoisonError,
    atomic::{AtomicUsize, Ordering},
  },
};

use crate::{
  params::{CrcParams, TableKey},
  table::LookupTable,
};

type Slot = Arc<OnceLock<Arc<LookupTable>>>;

/// Build-or-fetch cache of lookup tables.
///
/// The cache is owned by the caller; the engines never consult it on their
/// own. Share it by reference (it is `Sync`) or wrap it in an `Arc`.
///
/// # Examples
///
/// ```
/// use crcmodel::{CrcParams, TableCache};
///
/// let cache = TableCache::new();
/// let a = cache.get_or_build(&CrcParams::CRC_16_KERMIT);
/// // Different init/xorout, same (width, poly, refin): same table.
/// let b = cache.get_or_build(&CrcParams::new(16, 0x1021, 0xFFFF, true, true, 0xFFFF).unwrap());
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// assert_eq!(cache.builds(), 1);
/// ```
#[derive(Default)]
pub struct TableCache {
  slots: Mutex<HashMap<TableKey, Slot>>,
  builds: AtomicUsize,
}

impl TableCache {
  /// Create an empty cache.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Fetch the table for `params`, building it on first use.
  #[must_use]
  pub fn get_or_build(&self, params: &CrcParams) -> Arc<LookupTable> {
    let slot = self.slot(params.table_key());
    Arc::clone(slot.get_or_init(|| {
      self.builds.fetch_add(1, Ordering::Relaxed);
      Arc::new(LookupTable::build(params))
    }))
  }

  /// Fetch an already-built table without building one.
  #[must_use]
  pub fn get(&self, key: &TableKey) -> Option<Arc<LookupTable>> {
    let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    slots.get(key).and_then(|slot| slot.get().cloned())
  }

  /// Number of keys with a slot (built or being built).
  #[must_use]
  pub fn len(&self) -> usize {
    self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Total number of tables built over the cache's lifetime.
  #[must_use]
  pub fn builds(&self) -> usize {
    self.builds.load(Ordering::Relaxed)
  }

  fn slot(&self, key: TableKey) -> Slot {
    let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(slots.entry(key).or_default())
  }
}

impl fmt::Debug for TableCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TableCache")
      .field("len", &self.len())
      .field("builds", &self.builds())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builds_once_per_key() {
    let cache = TableCache::new();
    assert!(cache.is_empty());

    let a = cache.get_or_build(&CrcParams::CRC_32_ISO_HDLC);
    let b = cache.get_or_build(&CrcParams::CRC_32_ISCSI);
    let c = cache.get_or_build(&CrcParams::CRC_32_ISO_HDLC);

    assert!(Arc::ptr_eq(&a, &c));
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.builds(), 2);
  }

  #[test]
  fn refin_is_part_of_the_key() {
    let cache = TableCache::new();
    let normal = cache.get_or_build(&CrcParams::CRC_32_BZIP2);
    let reflected = cache.get_or_build(&CrcParams::CRC_32_ISO_HDLC);
    assert_ne!(normal.key(), reflected.key());
    assert_eq!(cache.builds(), 2);
  }

  #[test]
  fn get_does_not_build() {
    let cache = TableCache::new();
    let key = CrcParams::CRC_8_SMBUS.table_key();
    assert!(cache.get(&key).is_none());
    assert_eq!(cache.builds(), 0);

    let built = cache.get_or_build(&CrcParams::CRC_8_SMBUS);
    let fetched = cache.get(&key).unwrap();
    assert!(Arc::ptr_eq(&built, &fetched));
  }

  #[test]
  fn cached_table_equals_fresh_table() {
    let cache = TableCache::new();
    let p = CrcParams::CRC_64_XZ;
    assert_eq!(*cache.get_or_build(&p), LookupTable::build(&p));
  }

  #[test]
  fn concurrent_callers_share_one_build() {
    let cache = TableCache::new();
    let params = [
      CrcParams::CRC_16_IBM_3740,
      CrcParams::CRC_16_XMODEM, // same key as IBM-3740
      CrcParams::CRC_32_ISO_HDLC,
      CrcParams::CRC_64_NVME,
    ];

    std::thread::scope(|s| {
      for t in 0..8 {
        let cache = &cache;
        s.spawn(move || {
          for i in 0..50 {
            let p = &params[(t + i) % params.len()];
            let table = cache.get_or_build(p);
            assert!(table.serves(p));
          }
        });
      }
    });

    assert_eq!(cache.len(), 3);
    assert_eq!(cache.builds(), 3);
  }

  #[test]
  fn cache_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TableCache>();
  }
}
