//! Cross-reference between nucleotide accessions, UniProt identifiers
//! and gene names
//!
//! # File format
//!
//! Files should be comma delimited, with 3 fields: accession, UniProt ID and
//! gene name. Each association appears on it's own line in the file, and no
//! header should be present. Whitespace around each field is ignored.
//!
//! ```text
//! $ cat id_dump.csv
//! ...
//! NP_009475.1,P38182,ATG8
//! NP_014176.2,P53104,ATG1
//! ...
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! # use uniprot::{DuplicatePolicy, Index};
//! let index = Index::load("id_dump.csv", DuplicatePolicy::LastWriteWins)?;
//! let acc = index.resolve_accession("P38182")?;
//! assert_eq!(index.resolve_gene_name(acc)?, "ATG8");
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, prelude::*};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

pub mod xref;

pub use xref::{parse_entries, strip_version};

#[derive(Debug, Error)]
pub enum Error {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("malformed cross-reference at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, PartialEq, Clone)]
/// One association read from the cross-reference source
pub struct Entry {
    /// UniProt identifier, the join key on the protein side
    pub external_id: String,
    /// Nucleotide/protein database accession
    pub accession: String,
    /// Gene name reported by UniProt
    pub gene_name: String,
}

impl Entry {
    pub fn new<S: Into<String>>(external_id: S, accession: S, gene_name: S) -> Entry {
        Entry {
            external_id: external_id.into(),
            accession: accession.into(),
            gene_name: gene_name.into(),
        }
    }
}

/// What to do when a key shows up more than once while building an [`Index`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Later entries overwrite earlier ones, in input order
    LastWriteWins,
    /// A repeated external ID, or an accession re-mapped to a different gene
    /// name, is an error
    Strict,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        DuplicatePolicy::LastWriteWins
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
/// Wraps two hashtables: external ID -> accession, and accession -> gene name
///
/// The index is never mutated after construction.
pub struct Index {
    accessions: HashMap<String, String>,
    genes: HashMap<String, String>,
}

impl Index {
    /// Build an [`Index`] from an ordered sequence of entries
    pub fn build<I>(entries: I, policy: DuplicatePolicy) -> Result<Index>
    where
        I: IntoIterator<Item = Entry>,
    {
        let mut index = Index::default();
        let mut overwritten = 0;

        for entry in entries {
            if let Some(prev) = index.accessions.get(&entry.external_id) {
                if policy == DuplicatePolicy::Strict {
                    return Err(Error::DuplicateKey(entry.external_id));
                }
                if prev != &entry.accession {
                    overwritten += 1;
                }
            }
            if let Some(prev) = index.genes.get(&entry.accession) {
                if prev != &entry.gene_name {
                    if policy == DuplicatePolicy::Strict {
                        return Err(Error::DuplicateKey(entry.accession));
                    }
                    overwritten += 1;
                }
            }

            index
                .accessions
                .insert(entry.external_id, entry.accession.clone());
            index.genes.insert(entry.accession, entry.gene_name);
        }

        if overwritten > 0 {
            debug!("{} cross-reference entries overwritten by later lines", overwritten);
        }
        Ok(index)
    }

    /// Parse a comma-delimited cross-reference buffer into an [`Index`]
    pub fn parse(buf: &[u8], policy: DuplicatePolicy) -> Result<Index> {
        Index::build(parse_entries(buf)?, policy)
    }

    /// Load a cross-reference file to build an [`Index`]
    pub fn load<P: AsRef<Path>>(path: P, policy: DuplicatePolicy) -> Result<Index> {
        let mut buffer = Vec::new();
        File::open(path.as_ref())?.read_to_end(&mut buffer)?;
        let index = Index::parse(&buffer, policy)?;
        info!(
            "loaded {} external IDs and {} accessions from {}",
            index.accessions.len(),
            index.genes.len(),
            path.as_ref().display()
        );
        Ok(index)
    }

    /// Look up the accession for a UniProt identifier
    pub fn accession_of(&self, external_id: &str) -> Option<&str> {
        self.accessions.get(external_id).map(|s| s as &str)
    }

    /// Look up the gene name for an accession
    pub fn gene_name_of(&self, accession: &str) -> Option<&str> {
        self.genes.get(accession).map(|s| s as &str)
    }

    /// Like [`Index::accession_of`], but a miss is an error. Callers are
    /// expected to filter out unknown identifiers first.
    pub fn resolve_accession(&self, external_id: &str) -> Result<&str> {
        self.accession_of(external_id)
            .ok_or_else(|| Error::KeyNotFound(external_id.into()))
    }

    /// Like [`Index::gene_name_of`], but a miss is an error
    pub fn resolve_gene_name(&self, accession: &str) -> Result<&str> {
        self.gene_name_of(accession)
            .ok_or_else(|| Error::KeyNotFound(accession.into()))
    }

    /// Return the key under which `accession` is stored: the accession
    /// itself, or failing that, the accession without its `.N` version tail
    pub fn canonical_accession<'a>(&'a self, accession: &str) -> Option<&'a str> {
        if let Some((key, _)) = self.genes.get_key_value(accession) {
            return Some(key);
        }
        let bare = strip_version(accession);
        if bare != accession {
            return self.genes.get_key_value(bare).map(|(key, _)| key as &str);
        }
        None
    }

    pub fn contains_accession(&self, accession: &str) -> bool {
        self.genes.contains_key(accession)
    }

    /// Number of external IDs in the index
    pub fn len(&self) -> usize {
        self.accessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessions.is_empty()
    }
}
