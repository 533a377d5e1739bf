//! The ordered key/value option bag attached to each shape.
//!
//! Low-frequency extensible attributes (door permissions, teleport
//! settings, render-skip flag, vector-asset reference) live in an ordered
//! sequence of `(key, value)` pairs rather than dedicated columns. The
//! sequence is serialized verbatim as a JSON array of `[key, value]`
//! pairs, so insertion order among distinct keys is preserved and
//! serialization stays deterministic.
//!
//! Duplicate keys are tolerated by design and never deduplicated:
//! [`OptionBag::upsert`] replaces the *first* match, while
//! [`OptionBag::detach_last`] removes the *most recently appended* match.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Well-known option bag keys.
pub mod keys {
    /// Door interaction permissions.
    pub const DOOR: &str = "door";
    /// Teleport zone settings (permissions, target, `immediate` flag).
    pub const TELEPORT: &str = "teleport";
    /// Skip the shape during rendering.
    pub const SKIP_DRAW: &str = "skipDraw";
    /// Vector asset reference backing the shape.
    pub const SVG_ASSET: &str = "svgAsset";
    /// Cached vector path data, detached together with [`SVG_ASSET`].
    pub const SVG_PATHS: &str = "svgPaths";
    /// Cached vector width, detached together with [`SVG_ASSET`].
    pub const SVG_WIDTH: &str = "svgWidth";
    /// Cached vector height, detached together with [`SVG_ASSET`].
    pub const SVG_HEIGHT: &str = "svgHeight";
}

/// An ordered sequence of `(key, value)` option pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(transparent)]
pub struct OptionBag(Vec<(String, Value)>);

impl OptionBag {
    /// Create an empty option bag.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of stored pairs (duplicates counted).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Return the value of the first pair whose key matches.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Replace the value of the first pair whose key matches; if none
    /// match, append a new pair at the end.
    ///
    /// Existing duplicates of `key` beyond the first are left untouched.
    pub fn upsert(&mut self, key: &str, value: Value) {
        if let Some((_, slot)) = self.0.iter_mut().find(|(k, _)| k == key) {
            *slot = value;
        } else {
            self.0.push((key.to_owned(), value));
        }
    }

    /// Mutate the stored value of every pair whose key matches, in place.
    ///
    /// Used for nested-field patches such as flipping the `immediate`
    /// flag inside the teleport settings object. Returns the number of
    /// pairs visited.
    pub fn patch<F>(&mut self, key: &str, mut f: F) -> usize
    where
        F: FnMut(&mut Value),
    {
        let mut touched = 0usize;
        for (_, value) in self.0.iter_mut().filter(|(k, _)| k == key) {
            f(value);
            touched = touched.saturating_add(1);
        }
        touched
    }

    /// Remove the most recently appended pair with the given key and
    /// return its value.
    ///
    /// Scans from the end of the sequence; earlier pairs with the same
    /// key survive. This is the last-write-wins cleanup used when a set
    /// of related keys is detached together.
    pub fn detach_last(&mut self, key: &str) -> Option<Value> {
        let index = self.0.iter().rposition(|(k, _)| k == key)?;
        Some(self.0.remove(index).1)
    }
}

impl FromIterator<(String, Value)> for OptionBag {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn bag(pairs: &[(&str, Value)]) -> OptionBag {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn upsert_replaces_first_match_only() {
        let mut options = bag(&[
            ("svgAsset", json!("a.svg")),
            ("skipDraw", json!(true)),
            ("svgAsset", json!("b.svg")),
        ]);

        options.upsert("svgAsset", json!("c.svg"));

        let values: Vec<_> = options.iter().map(|(k, v)| (k.to_owned(), v.clone())).collect();
        assert_eq!(
            values,
            vec![
                (String::from("svgAsset"), json!("c.svg")),
                (String::from("skipDraw"), json!(true)),
                (String::from("svgAsset"), json!("b.svg")),
            ]
        );
    }

    #[test]
    fn upsert_appends_unknown_key_at_end() {
        let mut options = bag(&[("door", json!({"enabled": []}))]);
        options.upsert("skipDraw", json!(false));

        let keys: Vec<_> = options.iter().map(|(k, _)| k.to_owned()).collect();
        assert_eq!(keys, vec!["door", "skipDraw"]);
    }

    #[test]
    fn detach_last_removes_most_recently_appended_pair() {
        // The scenario from the sync test plan: detaching the asset must
        // remove "b.svg" and leave "a.svg" untouched.
        let mut options = bag(&[
            ("svgAsset", json!("a.svg")),
            ("skipDraw", json!(true)),
            ("svgAsset", json!("b.svg")),
        ]);

        let removed = options.detach_last("svgAsset");
        assert_eq!(removed, Some(json!("b.svg")));

        let values: Vec<_> = options.iter().map(|(k, v)| (k.to_owned(), v.clone())).collect();
        assert_eq!(
            values,
            vec![
                (String::from("svgAsset"), json!("a.svg")),
                (String::from("skipDraw"), json!(true)),
            ]
        );
    }

    #[test]
    fn detach_last_on_absent_key_is_noop() {
        let mut options = bag(&[("skipDraw", json!(true))]);
        assert_eq!(options.detach_last("svgAsset"), None);
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn patch_mutates_every_matching_pair_in_place() {
        let mut options = bag(&[
            ("teleport", json!({"immediate": false})),
            ("skipDraw", json!(true)),
            ("teleport", json!({"immediate": false})),
        ]);

        let touched = options.patch("teleport", |value| {
            if let Some(object) = value.as_object_mut() {
                object.insert(String::from("immediate"), json!(true));
            }
        });

        assert_eq!(touched, 2);
        for (key, value) in options.iter() {
            if key == "teleport" {
                assert_eq!(value.get("immediate"), Some(&json!(true)));
            }
        }
    }

    #[test]
    fn serialization_preserves_insertion_order() {
        let options = bag(&[
            ("svgAsset", json!("a.svg")),
            ("skipDraw", json!(true)),
            ("svgAsset", json!("b.svg")),
        ]);

        let encoded = serde_json::to_string(&options).ok();
        assert_eq!(
            encoded.as_deref(),
            Some(r#"[["svgAsset","a.svg"],["skipDraw",true],["svgAsset","b.svg"]]"#)
        );

        let decoded: Result<OptionBag, _> =
            serde_json::from_str(encoded.as_deref().unwrap_or(""));
        assert_eq!(decoded.ok(), Some(options));
    }
}
