use crate::tags::TagName;
use std::collections::BTreeMap;

/// Nested tag directory whose keys have not been resolved to names yet.
pub type RawBlock = BTreeMap<u16, TagValue>;

/// Typed value of a single metadata tag.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Integers(Vec<i64>),
    /// Rationals, signed rationals and floating point values
    Reals(Vec<f64>),
    Text(String),
    Bytes(Vec<u8>),
    Block(RawBlock),
}

impl TagValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// First integer of an integer list.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            TagValue::Integers(values) => values.first().copied(),
            _ => None,
        }
    }

    /// Numeric components as floats; integer lists are widened.
    pub fn as_reals(&self) -> Option<Vec<f64>> {
        match self {
            TagValue::Reals(values) => Some(values.clone()),
            TagValue::Integers(values) => Some(values.iter().map(|&v| v as f64).collect()),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&RawBlock> {
        match self {
            TagValue::Block(block) => Some(block),
            _ => None,
        }
    }
}

/// Tag name to value mapping decoded from one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagMap {
    entries: BTreeMap<TagName, TagValue>,
}

/// Every tag of the primary image directory, GPS directory kept as a raw block.
pub type MetadataMap = TagMap;
/// Named GPS sub-tags.
pub type GeoTagMap = TagMap;

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: TagName, value: TagValue) {
        self.entries.insert(name, value);
    }

    pub fn get(&self, name: &'static str) -> Option<&TagValue> {
        self.entries.get(&TagName::Named(name))
    }

    pub fn get_raw(&self, tag_id: u16) -> Option<&TagValue> {
        self.entries.get(&TagName::Raw(tag_id))
    }

    pub fn contains(&self, name: &'static str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TagName, &TagValue)> {
        self.entries.iter()
    }
}

impl FromIterator<(TagName, TagValue)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (TagName, TagValue)>>(iter: I) -> Self {
        TagMap {
            entries: iter.into_iter().collect(),
        }
    }
}
