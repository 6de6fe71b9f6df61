//! Cache key layout.

/// Key holding the serialized item listing.
pub const COLLECTION_KEY: &str = "items";

/// Key holding one serialized item.
pub fn item_key(id: i64) -> String {
    format!("item:{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_key() {
        assert_eq!(item_key(42), "item:42");
    }

    #[test]
    fn test_item_keys_never_collide_with_collection() {
        assert_ne!(item_key(0), COLLECTION_KEY);
    }
}
