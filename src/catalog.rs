use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, RlistError};

/// A named stack of integers.
///
/// Elements are only ever pushed onto, or popped off of, the tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    /// the name of the list, also its key within the [`Catalog`]
    #[serde(alias = "Nome")]
    pub name: String,

    /// the elements of the list, oldest first
    #[serde(alias = "Itens", default, deserialize_with = "null_as_empty")]
    pub items: Vec<i64>,
}

impl List {
    /// creates a new, empty list called `name`
    pub fn new(name: impl Into<String>) -> Self {
        List {
            name: name.into(),
            items: Vec::new(),
        }
    }
}

/// The complete set of named lists.
///
/// A `Catalog` only lives for the duration of a single operation: it is loaded from a
/// [`CatalogStore`], changed, saved back, and dropped.
///
/// It serializes as a JSON object keyed by list name:
/// `{"numbers":{"name":"numbers","items":[5,7]}}`
///
/// [`CatalogStore`]: ./store/trait.CatalogStore.html
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    lists: BTreeMap<String, List>,
}

impl Catalog {
    /// creates an empty catalog
    pub fn new() -> Self {
        Catalog::default()
    }

    /// pushes `value` onto the tail of list `name`, creating the list if it does not exist
    pub fn append(&mut self, name: &str, value: i64) {
        self.lists
            .entry(name.to_owned())
            .or_insert_with(|| List::new(name))
            .items
            .push(value);
    }

    /// returns the tail element of list `name`
    ///
    /// # Errors
    /// `RlistError::NotFound` if the list was never created,
    /// `RlistError::EmptyList` if it has no elements
    pub fn last(&self, name: &str) -> Result<i64> {
        let list = self.list(name)?;
        list.items
            .last()
            .copied()
            .ok_or_else(|| RlistError::EmptyList(name.to_owned()))
    }

    /// removes and returns the tail element of list `name`
    ///
    /// # Errors
    /// same as [`Catalog::last`]
    pub fn pop(&mut self, name: &str) -> Result<i64> {
        let list = self
            .lists
            .get_mut(name)
            .ok_or_else(|| RlistError::NotFound(name.to_owned()))?;
        list.items
            .pop()
            .ok_or_else(|| RlistError::EmptyList(name.to_owned()))
    }

    /// returns the number of elements in list `name`. An existing empty list has a size of 0.
    ///
    /// # Errors
    /// `RlistError::NotFound` if the list was never created
    pub fn size(&self, name: &str) -> Result<usize> {
        Ok(self.list(name)?.items.len())
    }

    /// returns the names of every list in the catalog, empty ones included
    pub fn names(&self) -> BTreeSet<String> {
        self.lists.keys().cloned().collect()
    }

    /// returns the list called `name`, if it exists
    pub fn get(&self, name: &str) -> Option<&List> {
        self.lists.get(name)
    }

    /// the number of lists in the catalog
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// returns `true` if no list has ever been created
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// makes every list's `name` field agree with the key it is stored under.
    /// The key is authoritative; older files could disagree.
    pub(crate) fn normalize_names(&mut self) {
        for (key, list) in self.lists.iter_mut() {
            if &list.name != key {
                list.name = key.clone();
            }
        }
    }

    fn list(&self, name: &str) -> Result<&List> {
        self.lists
            .get(name)
            .ok_or_else(|| RlistError::NotFound(name.to_owned()))
    }
}

// files written by the previous server contain `null` for a list that was never filled
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<i64>>::deserialize(deserializer)?.unwrap_or_default())
}
