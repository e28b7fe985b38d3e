use crate::domain::ports::AccountStore;
use crate::domain::purchase::PurchaseRecord;
use crate::error::{PurchaseError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Column Family for storing completed purchases.
pub const CF_PURCHASES: &str = "purchases";

/// A persistent account store backed by RocksDB.
///
/// Purchases are keyed by a big-endian sequence number so that iteration
/// returns them in the order they were stored, across restarts.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBAccountStore {
    db: Arc<DB>,
    next_key: Arc<AtomicU64>,
}

impl RocksDBAccountStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_purchases = ColumnFamilyDescriptor::new(CF_PURCHASES, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_purchases])?;

        let next_key = {
            let cf = purchases_cf(&db)?;
            match db.iterator_cf(cf, IteratorMode::End).next() {
                Some(item) => {
                    let (key, _) = item?;
                    decode_key(&key)? + 1
                }
                None => 0,
            }
        };

        Ok(Self {
            db: Arc::new(db),
            next_key: Arc::new(AtomicU64::new(next_key)),
        })
    }
}

fn purchases_cf(db: &DB) -> Result<&ColumnFamily> {
    db.cf_handle(CF_PURCHASES).ok_or_else(|| {
        PurchaseError::InternalError(Box::new(std::io::Error::other(
            "Purchases column family not found",
        )))
    })
}

fn decode_key(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key.try_into().map_err(|_| {
        PurchaseError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Unexpected purchase key length: {}", key.len()),
        )))
    })?;
    Ok(u64::from_be_bytes(bytes))
}

#[async_trait]
impl AccountStore for RocksDBAccountStore {
    async fn store(&self, purchase: PurchaseRecord) -> Result<()> {
        let cf = purchases_cf(&self.db)?;
        let key = self.next_key.fetch_add(1, Ordering::SeqCst).to_be_bytes();
        let value = serde_json::to_vec(&purchase)?;

        self.db.put_cf(cf, key, value)?;

        Ok(())
    }

    async fn purchases(&self) -> Result<Vec<PurchaseRecord>> {
        let cf = purchases_cf(&self.db)?;

        let mut purchases = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let purchase: PurchaseRecord = serde_json::from_slice(&value)?;
            purchases.push(purchase);
        }

        Ok(purchases)
    }
}
