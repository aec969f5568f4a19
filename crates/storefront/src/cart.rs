//! Local cart store.
//!
//! An insertion-ordered list of line items mirrored to a JSON file on every
//! mutation. The in-memory list is authoritative for the session: loading a
//! missing or corrupt file yields an empty cart, and a failed persist is
//! logged and swallowed rather than surfaced to the shopper.
//!
//! The store is an explicit instance (constructed with its path) so tests
//! and multiple storefront instances can each own one; there is no
//! module-level state.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use kukoro_core::{CartLineItem, ProductKey};

/// File-backed cart store.
pub struct CartStore {
    path: PathBuf,
    items: Mutex<Vec<CartLineItem>>,
}

impl CartStore {
    /// Open the store at `path`, loading any previously persisted cart.
    ///
    /// Never fails: unreadable or malformed contents yield an empty cart.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = load_items(&path);
        debug!(path = %path.display(), lines = items.len(), "cart store opened");
        Self {
            path,
            items: Mutex::new(items),
        }
    }

    /// Current line items in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.lock().clone()
    }

    /// Quantity currently reserved in the cart for a product.
    #[must_use]
    pub fn reserved(&self, key: &ProductKey) -> u32 {
        self.lock()
            .iter()
            .find(|item| item.key == *key)
            .map_or(0, |item| item.quantity)
    }

    /// Add a line item, merging with an existing line for the same product
    /// by incrementing its quantity.
    pub fn add(&self, item: CartLineItem) {
        {
            let mut items = self.lock();
            if let Some(existing) = items.iter_mut().find(|i| i.key == item.key) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            } else {
                items.push(item);
            }
        }
        self.persist();
    }

    /// Set the quantity of an existing line. Returns false when no line
    /// with that key exists; a quantity of zero removes the line.
    pub fn set_quantity(&self, key: &ProductKey, quantity: u32) -> bool {
        let changed = {
            let mut items = self.lock();
            if quantity == 0 {
                let before = items.len();
                items.retain(|i| i.key != *key);
                items.len() != before
            } else if let Some(item) = items.iter_mut().find(|i| i.key == *key) {
                item.quantity = quantity;
                true
            } else {
                false
            }
        };
        if changed {
            self.persist();
        }
        changed
    }

    /// Remove one line. Returns false when no line with that key exists.
    pub fn remove(&self, key: &ProductKey) -> bool {
        let changed = {
            let mut items = self.lock();
            let before = items.len();
            items.retain(|i| i.key != *key);
            items.len() != before
        };
        if changed {
            self.persist();
        }
        changed
    }

    /// Remove every line whose key appears in `keys`.
    pub fn remove_many<'a>(&self, keys: impl IntoIterator<Item = &'a ProductKey>) {
        let keys: Vec<&ProductKey> = keys.into_iter().collect();
        if keys.is_empty() {
            return;
        }
        {
            let mut items = self.lock();
            items.retain(|i| !keys.contains(&&i.key));
        }
        self.persist();
    }

    /// Atomically replace the entire cart.
    pub fn replace_all(&self, new_items: Vec<CartLineItem>) {
        *self.lock() = new_items;
        self.persist();
    }

    /// Empty the cart.
    pub fn clear(&self) {
        self.lock().clear();
        self.persist();
    }

    /// Serialize the current items to the backing file.
    ///
    /// Idempotent. Writes to a sibling temp file then renames, so a crash
    /// mid-write never corrupts the previous cart. Failures are logged at
    /// warn; the in-memory cart stays authoritative for the session.
    pub fn persist(&self) {
        let snapshot = self.items();
        if let Err(err) = write_items(&self.path, &snapshot) {
            warn!(path = %self.path.display(), error = %err, "cart persist failed");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CartLineItem>> {
        // A poisoned lock means a panic mid-mutation; the cart list itself
        // is always left in a consistent state, so keep serving it.
        self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn load_items(path: &Path) -> Vec<CartLineItem> {
    let Ok(raw) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<CartLineItem>>(&raw) {
        Ok(items) => items,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cart file unreadable, starting empty");
            Vec::new()
        }
    }
}

fn write_items(path: &Path, items: &[CartLineItem]) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(items)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kukoro-cart-{name}-{}.json", std::process::id()))
    }

    fn item(row: &str, qty: u32) -> CartLineItem {
        let mut item = CartLineItem::new(
            ProductKey::new("comics", row),
            format!("Item {row}"),
            Decimal::from(10),
        );
        item.quantity = qty;
        item
    }

    #[test]
    fn test_round_trip_through_disk() {
        let path = temp_path("round-trip");
        let store = CartStore::open(&path);
        store.replace_all(vec![item("1", 2), item("2", 1)]);

        let reopened = CartStore::open(&path);
        let items = reopened.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].key, ProductKey::new("comics", "1"));
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].quantity, 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_file_yields_empty_cart() {
        let path = temp_path("malformed");
        fs::write(&path, "{not json!").expect("write garbage");
        let store = CartStore::open(&path);
        assert!(store.items().is_empty());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_yields_empty_cart() {
        let store = CartStore::open(temp_path("does-not-exist"));
        assert!(store.items().is_empty());
    }

    #[test]
    fn test_add_merges_on_identity() {
        let path = temp_path("merge");
        let store = CartStore::open(&path);
        store.add(item("1", 1));
        store.add(item("1", 2));
        let items = store.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(store.reserved(&ProductKey::new("comics", "1")), 3);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let path = temp_path("set-zero");
        let store = CartStore::open(&path);
        store.add(item("1", 2));
        assert!(store.set_quantity(&ProductKey::new("comics", "1"), 0));
        assert!(store.items().is_empty());
        assert!(!store.set_quantity(&ProductKey::new("comics", "9"), 1));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_remove_many_keeps_order_of_rest() {
        let path = temp_path("remove-many");
        let store = CartStore::open(&path);
        store.replace_all(vec![item("1", 1), item("2", 1), item("3", 1)]);
        let gone = [ProductKey::new("comics", "1"), ProductKey::new("comics", "3")];
        store.remove_many(gone.iter());
        let items = store.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, ProductKey::new("comics", "2"));
        let _ = fs::remove_file(&path);
    }
}
