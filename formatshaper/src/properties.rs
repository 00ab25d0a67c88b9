use crate::mapping::{MappingPair, MappingTable};

/// Quality-related properties and parameter translations for one codec.
///
/// Created once per codec during discovery; a setup phase populates the
/// scalar attributes and mapping entries, after which the instance is
/// treated as read-mostly. There is no internal locking: an owner sharing
/// an instance across threads must serialize access itself.
#[derive(Debug, Clone, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct CodecProperties {
    name: String,
    media_type: String,
    /// Quality floor (e.g. VMAF score) the codec meets at default settings.
    /// 0 = unset.
    minimum_quality: i32,
    /// Maximum quantization parameter used for quality shaping. 0 = unset.
    target_qp_max: i32,
    /// Platform API generation this codec's behavior was validated against.
    /// Vendor-side codecs may lag the platform here. 0 = unset.
    api: i32,
    mappings: MappingTable,
}

impl CodecProperties {
    /// Create properties for the codec `name` handling `media_type`, with
    /// an empty mapping table and all scalar attributes unset.
    ///
    /// The identifiers are stored verbatim; no validation is performed.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            minimum_quality: 0,
            target_qp_max: 0,
            api: 0,
            mappings: MappingTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn supported_minimum_quality(&self) -> i32 {
        self.minimum_quality
    }

    pub fn set_supported_minimum_quality(&mut self, vmaf: i32) {
        self.minimum_quality = vmaf;
    }

    pub fn target_qp_max(&self) -> i32 {
        self.target_qp_max
    }

    pub fn set_target_qp_max(&mut self, qp_max: i32) {
        self.target_qp_max = qp_max;
    }

    /// API generation this codec was validated against. Populated during
    /// codec discovery, not through this type's public surface.
    pub fn supported_api(&self) -> i32 {
        self.api
    }

    #[cfg(test)]
    pub(crate) fn set_supported_api(&mut self, api: i32) {
        self.api = api;
    }

    /// Install a standard → codec-specific translation.
    /// See [`MappingTable::insert`] for the duplicate-key contract.
    pub fn set_mapping(&mut self, kind: &str, key: &str, value: &str) {
        self.mappings.insert(kind, key, value);
    }

    /// Translate `key` within `kind`, echoing `key` back when unmapped.
    pub fn mapping<'a>(&'a self, key: &'a str, kind: &str) -> &'a str {
        self.mappings.lookup(key, kind)
    }

    /// Bulk directional export of the mapping table.
    /// See [`MappingTable::export`].
    pub fn mappings(&self, kind: &str, reverse: bool) -> Option<Vec<MappingPair>> {
        self.mappings.export(kind, reverse)
    }

    pub fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    /// Log the full mapping table at debug level. Diagnostic only.
    pub fn show_mappings(&self) {
        self.mappings.show();
    }
}
