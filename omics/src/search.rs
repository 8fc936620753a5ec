//! Free-text search over the annotation columns of a [`CleanedTable`]
use super::*;
use memchr::memmem;
use rayon::prelude::*;

/// An occurrence directly preceded by this prefix does not count as a hit
const NEGATION: &[u8] = b"non-";

/// Which columns a [`SearchFilter`] scans
#[derive(Clone, Debug, PartialEq)]
pub enum Locations {
    /// Only the named columns. Every name must exist in the table.
    Columns(Vec<String>),
    /// Every text column of the table
    Universal,
}

impl Default for Locations {
    fn default() -> Self {
        Locations::Universal
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchFilter {
    terms: Vec<String>,
    locations: Locations,
    restrict: bool,
}

/// Does `needle` occur in `haystack` anywhere other than right after "non-"?
///
/// Only the characters immediately before an occurrence are inspected, so
/// "non-autophagy" is rejected but "non-selective autophagy" still hits.
fn guarded_contains(haystack: &str, needle: &str) -> bool {
    let hay = haystack.as_bytes();
    memmem::find_iter(hay, needle.as_bytes()).any(|pos| !hay[..pos].ends_with(NEGATION))
}

impl SearchFilter {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        terms
            .into_iter()
            .fold(SearchFilter::default(), |f, t| f.add_term(t))
    }

    /// Add a case-insensitive search term, matched as an exact substring
    /// (surrounding spaces included). Blank terms are ignored.
    pub fn add_term<S: AsRef<str>>(mut self, term: S) -> Self {
        let term = term.as_ref().to_lowercase();
        if !term.trim().is_empty() && !self.terms.contains(&term) {
            self.terms.push(term);
        }
        self
    }

    pub fn locations(mut self, locations: Locations) -> Self {
        self.locations = locations;
        self
    }

    /// Drop rows that do not hit
    pub fn restrict(mut self, restrict: bool) -> Self {
        self.restrict = restrict;
        self
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// With no terms every row is a hit
    pub fn is_vacuous(&self) -> bool {
        self.terms.is_empty()
    }

    /// Does a single cell of text hit any term?
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.terms.iter().any(|t| guarded_contains(&text, t))
    }

    fn columns(&self, layout: &Layout) -> Result<Vec<ColumnRef>> {
        match &self.locations {
            Locations::Universal => Ok(layout.text_columns()),
            Locations::Columns(names) => names
                .iter()
                .map(|name| {
                    layout
                        .resolve(name)
                        .ok_or_else(|| Error::ColumnNotFound(name.clone()))
                })
                .collect(),
        }
    }

    /// Flag every row of `table` with `search_hit`, and return the flags
    /// alongside the table. With `restrict` set, only hits are kept, in
    /// their original order; the returned mask still covers the input rows.
    pub fn apply(&self, mut table: CleanedTable) -> Result<(CleanedTable, Vec<bool>)> {
        let columns = self.columns(&table.layout)?;

        let mask = if self.is_vacuous() {
            vec![true; table.len()]
        } else {
            table
                .records
                .par_iter()
                .map(|record| {
                    columns
                        .iter()
                        .filter_map(|&col| record.text(col))
                        .any(|text| self.matches(text))
                })
                .collect::<Vec<bool>>()
        };

        for (record, &hit) in table.records.iter_mut().zip(&mask) {
            record.search_hit = Some(hit);
        }
        table.layout.searched = true;

        let hits = mask.iter().filter(|&&h| h).count();
        info!(
            "search for {:?}: {} of {} rows hit",
            self.terms,
            hits,
            mask.len()
        );

        if self.restrict {
            table.records.retain(|r| r.search_hit == Some(true));
        }
        Ok((table, mask))
    }
}
