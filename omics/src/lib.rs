//! A library for linking RNA-seq transcript abundances with SILAC
//! protein abundances, gene by gene.
//!
//! This library's API is based around several types that form
//! a data analysis pipeline.
//!
//! Raw delimited files are read into a [`Table`], which is cleaned into a
//! [`CleanedTable`] of typed [`GeneRecord`]s: replicate means and standard
//! deviations, log2 fold changes, and an accession and unique gene name
//! pulled from the free-text annotation.
//!
//! ```rust,ignore
//! # use omics::*;
//! let cfg = DomainConfig::load("pipeline.toml")?;
//! let rna = clean(Table::load("bulk_rna_seq.tsv", b'\t')?, &cfg.rna)?;
//! let protein = clean(Table::load("silac.tsv", b'\t')?, &cfg.protein)?;
//! ```
//!
//! The RNA table can be flagged, or restricted, by free-text search terms
//! with a [`SearchFilter`]
//!
//! ```rust,ignore
//! # use omics::*;
//! let (rna, hits) = SearchFilter::new(vec!["autophagy"])
//!     .locations(Locations::Columns(vec!["Nr Description".into()]))
//!     .restrict(false)
//!     .apply(rna)?;
//! ```
//!
//! Finally, [`link`] joins the two tables through a [`uniprot::Index`] of
//! accession / UniProt ID / gene name associations. Only accessions that
//! resolve on both sides, and occur exactly once in the RNA table, make it
//! into the [`CombinedTable`].
//!
//! ```rust,ignore
//! # use omics::*;
//! let index = uniprot::Index::load("id_dump.csv", cfg.link.duplicate_policy())?;
//! let combined = link(&rna, &protein, &index, &cfg.link)?;
//! combined.to_table(&cfg.link)?.save("combined.tsv", b'\t')?;
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::{self, prelude::*};
use std::path::Path;

use tracing::{debug, info, warn};

mod clean;
mod combined;
mod config;
mod error;
pub mod identity;
mod link;
mod record;
mod search;
pub mod stats;
mod table;

pub use clean::clean;
pub use combined::{CombinedRecord, CombinedTable};
pub use config::{Condition, DomainConfig, LinkConfig, SearchConfig, TableConfig};
pub use error::{Error, Result};
pub use link::{link, LinkReport};
pub use record::*;
pub use search::{Locations, SearchFilter};
pub use table::{Table, Value, MISSING};
