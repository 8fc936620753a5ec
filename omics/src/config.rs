//! Pipeline-specific column configuration, deserialized from TOML
use super::*;
use serde::Deserialize;

/// A named group of replicate columns
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Condition {
    pub name: String,
    pub replicates: Vec<String>,
}

/// How to clean one raw measurement table
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Free-text column holding `accession//gene name [species]` or
    /// `Full=name;` annotations
    pub annotation_column: String,
    /// Column holding the identifier used to look the row up in the
    /// cross-reference index (protein side)
    pub external_id_column: Option<String>,
    /// Redundant columns, removed before renaming
    pub drop: Vec<String>,
    pub rename: BTreeMap<String, String>,
    pub conditions: Vec<Condition>,
    /// Ordered (A, B) pairs for log2 fold-change columns. Empty means every
    /// ordered pair of distinct conditions.
    pub comparisons: Vec<(String, String)>,
    /// Explicit output column order. Empty means the canonical order.
    pub output_order: Vec<String>,
    /// Development runs only: keep a uniform random subset of this many rows
    pub sample: Option<usize>,
    pub seed: Option<u64>,
    /// Remove rows without an annotation before any other processing
    pub drop_unannotated: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            annotation_column: String::from("Description"),
            external_id_column: None,
            drop: Vec::new(),
            rename: BTreeMap::new(),
            conditions: Vec::new(),
            comparisons: Vec::new(),
            output_order: Vec::new(),
            sample: None,
            seed: None,
            drop_unannotated: false,
        }
    }
}

/// Free-text search over the cleaned RNA table
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub terms: Vec<String>,
    /// Columns to scan; all text columns when empty or `universal` is set
    pub locations: Vec<String>,
    pub universal: bool,
    /// Keep only rows that hit
    pub restrict: bool,
}

impl SearchConfig {
    pub fn filter(&self) -> SearchFilter {
        let locations = if self.universal || self.locations.is_empty() {
            Locations::Universal
        } else {
            Locations::Columns(self.locations.clone())
        };
        SearchFilter::new(self.terms.iter().cloned())
            .locations(locations)
            .restrict(self.restrict)
    }
}

/// How to link and lay out the combined table
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub rna_prefix: String,
    pub protein_prefix: String,
    /// Drop raw replicate columns, which are superseded by their means
    pub drop_replicates: bool,
    /// Further disposable columns, named after prefixing
    pub drop: Vec<String>,
    /// Source columns matching this pattern are positional index leftovers
    pub unnamed_pattern: String,
    pub rename: BTreeMap<String, String>,
    pub output_order: Vec<String>,
    /// Retry RNA accessions missing from the index without their `.N` tail
    pub match_unversioned: bool,
    /// Reject duplicate keys in the cross-reference source
    pub strict_index: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            rna_prefix: String::from("rna_"),
            protein_prefix: String::from("protein_"),
            drop_replicates: true,
            drop: Vec::new(),
            unnamed_pattern: String::from(r"^Unnamed: ?\d+$"),
            rename: BTreeMap::new(),
            output_order: Vec::new(),
            match_unversioned: false,
            strict_index: false,
        }
    }
}

impl LinkConfig {
    pub fn duplicate_policy(&self) -> uniprot::DuplicatePolicy {
        if self.strict_index {
            uniprot::DuplicatePolicy::Strict
        } else {
            uniprot::DuplicatePolicy::LastWriteWins
        }
    }

    /// Name of the row key column after renaming
    pub fn key_column(&self) -> &str {
        self.rename
            .get(GENE_NAME)
            .map(|s| s.as_str())
            .unwrap_or(GENE_NAME)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    pub rna: TableConfig,
    pub protein: TableConfig,
    pub search: SearchConfig,
    pub link: LinkConfig,
}

impl DomainConfig {
    pub fn from_toml_str(s: &str) -> Result<DomainConfig> {
        Ok(toml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<DomainConfig> {
        DomainConfig::from_toml_str(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = DomainConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, DomainConfig::default());
        assert_eq!(cfg.link.key_column(), "gene_name");
        assert!(cfg.link.drop_replicates);
    }

    #[test]
    fn from_toml() {
        let cfg = DomainConfig::from_toml_str(
            r#"
            [rna]
            annotation_column = "Nr Description"
            drop = ["Swissprot Description"]
            comparisons = [["wt", "atg1"]]
            sample = 100
            seed = 7

            [rna.rename]
            "WT-1" = "wt_1"

            [[rna.conditions]]
            name = "wt"
            replicates = ["wt_1", "wt_2"]

            [[rna.conditions]]
            name = "atg1"
            replicates = ["atg1_1", "atg1_2"]

            [protein]
            annotation_column = "Fasta headers"
            external_id_column = "Protein IDs"

            [search]
            terms = ["autophagy"]
            universal = true

            [link]
            strict_index = true
            [link.rename]
            gene_name = "Gene"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.rna.annotation_column, "Nr Description");
        assert_eq!(cfg.rna.rename.get("WT-1").unwrap(), "wt_1");
        assert_eq!(cfg.rna.conditions.len(), 2);
        assert_eq!(
            cfg.rna.comparisons,
            vec![("wt".to_string(), "atg1".to_string())]
        );
        assert_eq!(cfg.rna.sample, Some(100));
        assert_eq!(
            cfg.protein.external_id_column.as_deref(),
            Some("Protein IDs")
        );
        assert!(cfg.search.universal);
        assert_eq!(cfg.link.key_column(), "Gene");
        assert_eq!(
            cfg.link.duplicate_policy(),
            uniprot::DuplicatePolicy::Strict
        );
        assert_eq!(cfg.link.rna_prefix, "rna_");
    }

    #[test]
    fn bad_toml() {
        assert!(matches!(
            DomainConfig::from_toml_str("[rna]\nsample = \"many\""),
            Err(Error::Config(_))
        ));
    }
}
