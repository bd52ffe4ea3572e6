//! Property-based test generators using proptest.

use proptest::prelude::*;

/// Strategy for generating keys, including the empty key.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9_]{0,12}").expect("Invalid regex")
}

/// Strategy for generating values of arbitrary unicode text.
pub fn value_strategy() -> impl Strategy<Value = String> {
    any::<String>()
}

/// Strategy for generating a batch of writes with frequent key collisions.
pub fn writes_strategy(max_len: usize) -> impl Strategy<Value = Vec<(String, String)>> {
    let key = prop::string::string_regex("[a-c]{1,2}").expect("Invalid regex");
    prop::collection::vec((key, value_strategy()), 1..max_len.max(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvtx_core::Store;
    use std::collections::HashMap;

    proptest! {
        #[test]
        fn store_matches_model(writes in writes_strategy(32)) {
            let store = Store::new();
            let mut model = HashMap::new();

            store.update(|tx| {
                for (key, value) in &writes {
                    tx.set(key.as_str(), value.as_str())?;
                }
                Ok(())
            }).unwrap();
            for (key, value) in &writes {
                model.insert(key.clone(), value.clone());
            }

            let observed = store.view(|tx| {
                Ok(model.keys().map(|k| (k.clone(), tx.get(k))).collect::<HashMap<_, _>>())
            }).unwrap();
            prop_assert_eq!(observed, model);
        }

        #[test]
        fn keys_are_accepted(key in key_strategy(), value in value_strategy()) {
            let store = Store::new();
            store.update(|tx| tx.set(key.as_str(), value.as_str())).unwrap();

            let read = store.view(|tx| Ok(tx.get(&key))).unwrap();
            prop_assert_eq!(read, value);
        }
    }
}
