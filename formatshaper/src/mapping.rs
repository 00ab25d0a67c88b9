/// Key of one mapping entry: a namespace tag plus the standard parameter name.
///
/// `kind` partitions the table (e.g. parameter-name mappings vs
/// parameter-value mappings); `name` is the standard-vocabulary key being
/// translated. Using a two-field key rather than a delimited string means no
/// character is reserved in either field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct MappingKey {
    /// Namespace tag (e.g. "feature", "parameter", "value").
    pub kind: String,
    /// Standard-vocabulary parameter name.
    pub name: String,
}

impl MappingKey {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

/// One exported translation, with the requested direction already applied.
///
/// Forward exports carry `from` = standard key, `to` = codec-specific value;
/// reverse exports carry the inverse.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct MappingPair {
    pub from: String,
    pub to: String,
}

/// Bidirectional parameter translation table for one codec.
///
/// Entries are kept in insertion order; bulk export walks the table in that
/// order. Insertion is first-write-wins: re-registering an existing
/// `(kind, name)` pair never replaces the value installed during setup.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct MappingTable {
    entries: Vec<(MappingKey, String)>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Install a translation from the standard-vocabulary `key` to the
    /// codec-specific `value`, namespaced by `kind`.
    ///
    /// First-write-wins: if the `(kind, key)` pair is already present the
    /// call is a no-op and the existing value stays authoritative.
    pub fn insert(&mut self, kind: &str, key: &str, value: &str) {
        log::trace!("insert({kind},{key},{value})");
        if self.entries.iter().any(|(k, _)| k.kind == kind && k.name == key) {
            log::trace!("already mapped, keeping existing value");
            return;
        }
        self.entries.push((MappingKey::new(kind, key), value.to_string()));
    }

    /// Translate `key` within namespace `kind`.
    ///
    /// Returns the codec-specific value when a mapping exists, otherwise
    /// `key` unchanged. An unmapped parameter passes through as-is so
    /// callers never need a "not found" branch.
    pub fn lookup<'a>(&'a self, key: &'a str, kind: &str) -> &'a str {
        log::trace!("lookup(key {key}, kind {kind})");
        match self
            .entries
            .iter()
            .find(|(k, _)| k.kind == kind && k.name == key)
        {
            Some((_, value)) => {
                log::trace!("lookup({key}, {kind}) -> {value}");
                value
            }
            None => {
                log::trace!("no mapping, returning unchanged key");
                key
            }
        }
    }

    /// Export every entry of namespace `kind` (or all entries when `kind`
    /// is empty) as a sequence of translation pairs in storage order.
    ///
    /// When `reverse` is false pairs run standard key → codec value; when
    /// true, codec value → standard key (for translating codec output back
    /// into the standard vocabulary).
    ///
    /// Returns `None` when there is nothing to export — an empty table and
    /// a filter that matches no entry are both that same, benign outcome.
    pub fn export(&self, kind: &str, reverse: bool) -> Option<Vec<MappingPair>> {
        log::trace!("export(kind {kind}, reverse {reverse})");
        if self.entries.is_empty() {
            log::trace!("empty mappings");
            return None;
        }

        let mut pairs = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            if !kind.is_empty() && kind != key.kind {
                log::debug!("kinds don't match: want '{}' got '{}'", kind, key.kind);
                continue;
            }
            let pair = if reverse {
                MappingPair {
                    from: value.clone(),
                    to: key.name.clone(),
                }
            } else {
                MappingPair {
                    from: key.name.clone(),
                    to: value.clone(),
                }
            };
            log::trace!(" {} -> {}", pair.from, pair.to);
            pairs.push(pair);
        }

        if pairs.is_empty() {
            None
        } else {
            Some(pairs)
        }
    }

    /// Log the full table contents at debug level. Diagnostic only.
    pub fn show(&self) {
        log::debug!("Mappings:");
        let mut count = 0;
        for (key, value) in &self.entries {
            count += 1;
            log::debug!("'{}-{}' -> '{}'", key.kind, key.name, value);
        }
        log::debug!("total {count} mappings");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_lookup() {
        let mut table = MappingTable::new();
        table.insert("parameter", "bitrate-mode", "bm");
        assert_eq!(table.lookup("bitrate-mode", "parameter"), "bm");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_lookup_miss_echoes_key() {
        let mut table = MappingTable::new();
        table.insert("parameter", "bitrate-mode", "bm");
        assert_eq!(table.lookup("unknown", "parameter"), "unknown");
        // Same key under a different kind is also a miss.
        assert_eq!(table.lookup("bitrate-mode", "value"), "bitrate-mode");
        // Empty table echoes too.
        assert_eq!(MappingTable::new().lookup("x", "k"), "x");
    }

    #[test]
    fn test_first_write_wins() {
        let mut table = MappingTable::new();
        table.insert("k", "a", "v1");
        table.insert("k", "a", "v2");
        assert_eq!(table.lookup("a", "k"), "v1");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_export_directions() {
        let mut table = MappingTable::new();
        table.insert("parameter", "bitrate-mode", "bm");

        let fwd = table.export("parameter", false).unwrap();
        assert_eq!(
            fwd,
            vec![MappingPair {
                from: "bitrate-mode".into(),
                to: "bm".into()
            }]
        );

        let rev = table.export("parameter", true).unwrap();
        assert_eq!(
            rev,
            vec![MappingPair {
                from: "bm".into(),
                to: "bitrate-mode".into()
            }]
        );
    }

    #[test]
    fn test_export_filters_by_kind() {
        let mut table = MappingTable::new();
        table.insert("parameter", "bitrate-mode", "bm");
        table.insert("value", "vbr", "1");
        table.insert("parameter", "i-frame-interval", "keyint");

        let pairs = table.export("parameter", false).unwrap();
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.from != "vbr"));
    }

    #[test]
    fn test_export_empty_kind_takes_everything() {
        let mut table = MappingTable::new();
        table.insert("parameter", "bitrate-mode", "bm");
        table.insert("value", "vbr", "1");

        let pairs = table.export("", false).unwrap();
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_export_nothing_is_absent() {
        let table = MappingTable::new();
        assert!(table.export("", false).is_none());

        let mut table = MappingTable::new();
        table.insert("parameter", "bitrate-mode", "bm");
        // Filter matches nothing: same absent signal as an empty table.
        assert!(table.export("other", false).is_none());
    }

    #[test]
    fn test_export_preserves_insertion_order() {
        let mut table = MappingTable::new();
        table.insert("parameter", "z-last-alphabetically", "z");
        table.insert("parameter", "a-first-alphabetically", "a");

        let pairs = table.export("parameter", false).unwrap();
        assert_eq!(pairs[0].from, "z-last-alphabetically");
        assert_eq!(pairs[1].from, "a-first-alphabetically");
    }

    #[test]
    fn test_kind_may_contain_any_character() {
        // A structured key has no reserved separator.
        let mut table = MappingTable::new();
        table.insert("odd-kind", "key", "v");
        assert_eq!(table.lookup("key", "odd-kind"), "v");

        let pairs = table.export("odd-kind", false).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].from, "key");
    }
}
