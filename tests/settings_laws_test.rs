/*!
 * Settings and Event Law Tests
 * Property checks for pool fallback and event name matching
 */

use proptest::prelude::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use webdesk::events::{EventHandler, EventOutcome};
use webdesk::settings::SettingsManager;

fn key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}"
}

proptest! {
    /// A value set in one turn is observable by a get in the same turn.
    #[test]
    fn prop_set_then_get(pool in key(), k in key(), value in any::<i64>()) {
        let mgr = SettingsManager::new();
        prop_assert!(mgr.set_key(&pool, &k, json!(value)));
        prop_assert_eq!(mgr.get_key(&pool, &k), Some(json!(value)));
    }

    /// A non-empty live pool answers every key; defaults never leak through.
    #[test]
    fn prop_live_pool_suppresses_defaults(
        pool in key(),
        live_key in key(),
        default_key in key(),
        value in any::<i64>(),
    ) {
        prop_assume!(live_key != default_key);
        let mgr = SettingsManager::new();
        mgr.defaults(&pool, json!({ default_key.clone(): "fallback" }));
        mgr.set_key(&pool, &live_key, json!(value));

        prop_assert_eq!(mgr.get_key(&pool, &live_key), Some(json!(value)));
        prop_assert_eq!(mgr.get_key(&pool, &default_key), None);
    }

    /// Whole-pool set replaces, never merges.
    #[test]
    fn prop_set_replaces_pool(pool in key(), a in key(), b in key()) {
        prop_assume!(a != b);
        let mgr = SettingsManager::new();
        mgr.set(&pool, json!({ a.clone(): 1 }));
        mgr.set(&pool, json!({ b.clone(): 2 }));

        prop_assert_eq!(mgr.get_key(&pool, &a), None);
        prop_assert_eq!(mgr.get_key(&pool, &b), Some(json!(2)));
    }

    /// A prefix pattern subscribes to exactly the names sharing the prefix.
    #[test]
    fn prop_prefix_pattern_matches(prefix in key(), suffixes in prop::collection::hash_set(key(), 1..5)) {
        prop_assume!(prefix != "other");
        let handler = EventHandler::new("prop");
        for suffix in &suffixes {
            handler.on(&format!("{prefix}:{suffix}"), |_| Ok(EventOutcome::Pass)).unwrap();
        }
        handler.on("other:event", |_| Ok(EventOutcome::Pass)).unwrap();

        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        handler.on(&format!("{prefix}:*"), move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(EventOutcome::Pass)
        }).unwrap();

        for suffix in &suffixes {
            handler.emit(&format!("{prefix}:{suffix}"), &[]);
        }
        handler.emit("other:event", &[]);
        prop_assert_eq!(counter.load(Ordering::SeqCst), suffixes.len());
    }
}
