use std::collections::BTreeMap;

use serde_json::Value;

/// Attribute mapping carried by nodes and marks. Values must be JSON-safe.
pub type Attrs = BTreeMap<String, Value>;

/// A named formatting annotation on inline content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    name: String,
    attrs: Attrs,
}

impl Mark {
    /// Create a mark without consulting a schema. Prefer `Schema::mark`,
    /// which fills in attribute defaults.
    pub fn new(name: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            name: name.into(),
            attrs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Look up a single attribute, treating `null` as absent
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key).filter(|value| !value.is_null())
    }
}

/// An order-independent set of marks, unique by name.
///
/// Marks are kept sorted by name so that derived equality is set equality.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkSet {
    marks: Vec<Mark>,
}

impl MarkSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from marks in order; a later mark replaces an earlier one
    /// with the same name.
    pub fn from_marks<I: IntoIterator<Item = Mark>>(marks: I) -> Self {
        marks
            .into_iter()
            .fold(MarkSet::empty(), |set, mark| set.add(mark))
    }

    /// Return a new set containing `mark`, replacing any mark of the same name
    pub fn add(&self, mark: Mark) -> Self {
        let mut marks = self.marks.clone();
        match marks.binary_search_by(|m| m.name.as_str().cmp(mark.name())) {
            Ok(index) => marks[index] = mark,
            Err(index) => marks.insert(index, mark),
        }
        Self { marks }
    }

    /// Return a new set without the mark called `name`
    pub fn remove(&self, name: &str) -> Self {
        Self {
            marks: self
                .marks
                .iter()
                .filter(|m| m.name != name)
                .cloned()
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Mark> {
        self.marks
            .binary_search_by(|m| m.name.as_str().cmp(name))
            .ok()
            .map(|index| &self.marks[index])
    }

    /// True when this exact mark (name and attributes) is in the set
    pub fn contains(&self, mark: &Mark) -> bool {
        self.get(mark.name()) == Some(mark)
    }

    pub fn has_named(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter()
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<T: IntoIterator<Item = Mark>>(iter: T) -> Self {
        MarkSet::from_marks(iter)
    }
}

impl<'a> IntoIterator for &'a MarkSet {
    type Item = &'a Mark;
    type IntoIter = std::slice::Iter<'a, Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.marks.iter()
    }
}
