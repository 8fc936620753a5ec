//! Gene identity from free-text annotations
//!
//! RNA-seq annotations look like `XP_001.1//autophagy protein 8 [Saccharomyces
//! cerevisiae]`; protein FASTA headers carry `Full=Autophagy protein 8;`.
use super::*;
use once_cell::sync::Lazy;
use regex::Regex;

/// `<prefix>//<gene name> [species]`
static SLASHED: Lazy<Regex> = Lazy::new(|| Regex::new(r"//\s*([^\[]*?)\s*\[").unwrap());

/// `Full=<gene name>;`
static FULL_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"Full=([^;]*);").unwrap());

/// Extract a gene name, trying the `//name [species]` form before `Full=name;`
///
/// Returns [`MISSING`] if neither form is present
pub fn gene_name(annotation: &str) -> String {
    [&*SLASHED, &*FULL_NAME]
        .iter()
        .filter_map(|re| re.captures(annotation))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|name| !name.is_empty())
        .unwrap_or(MISSING)
        .to_string()
}

/// Everything before the first `//`, or [`MISSING`]
pub fn accession(annotation: &str) -> String {
    match annotation.find("//") {
        Some(idx) if !annotation[..idx].trim().is_empty() => annotation[..idx].trim().into(),
        _ => MISSING.into(),
    }
}

/// Rename repeated names to `"<name> (<n>)"`, where `n` counts the repeats of
/// that name seen so far. The first occurrence keeps its bare name.
///
/// Output names are unique: if a generated name is already taken (e.g. the
/// input literally contains `"X (1)"`), the counter keeps advancing.
pub fn deduplicate<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for name in names {
        let repeat = counts.contains_key(&name);
        let mut n = counts.get(&name).copied().unwrap_or(0);
        let mut candidate = name.clone();
        if repeat || taken.contains(&candidate) {
            loop {
                n += 1;
                candidate = format!("{} ({})", name, n);
                if !taken.contains(&candidate) {
                    break;
                }
            }
        }
        counts.insert(name, n);
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! names {
        ($($s:expr),*) => {
            vec![$(String::from($s)),*]
        };
    }

    #[test]
    fn slashed() {
        let ann = "ACC123//Atg8 [Saccharomyces cerevisiae]";
        assert_eq!(accession(ann), "ACC123");
        assert_eq!(gene_name(ann), "Atg8");

        let ann = "XP_018.1//autophagy-related protein 8 [Candida glabrata] [x]";
        assert_eq!(accession(ann), "XP_018.1");
        assert_eq!(gene_name(ann), "autophagy-related protein 8");
    }

    #[test]
    fn full_name() {
        let ann = "Full=Autophagy protein 8; Other=x";
        assert_eq!(gene_name(ann), "Autophagy protein 8");
        assert_eq!(accession(ann), "NaN");

        // No species tag, so the first rule does not apply
        let ann = "ACC9//RecName: Full=Serine kinase; Flags";
        assert_eq!(accession(ann), "ACC9");
        assert_eq!(gene_name(ann), "Serine kinase");
    }

    #[test]
    fn no_identity() {
        assert_eq!(gene_name("hypothetical protein"), "NaN");
        assert_eq!(accession("hypothetical protein"), "NaN");
        assert_eq!(accession("//Atg8 [S. cerevisiae]"), "NaN");
        assert_eq!(gene_name("ACC//  [S. cerevisiae]"), "NaN");
        assert_eq!(gene_name("Full=;"), "NaN");
    }

    #[test]
    fn dedup() {
        assert_eq!(
            deduplicate(names!("X", "X", "X")),
            names!("X", "X (1)", "X (2)")
        );
        assert_eq!(
            deduplicate(names!("A", "B", "A", "C", "B", "A")),
            names!("A", "B", "A (1)", "C", "B (1)", "A (2)")
        );
        assert_eq!(deduplicate(names!("NaN", "NaN")), names!("NaN", "NaN (1)"));
    }

    #[test]
    fn dedup_collision() {
        let out = deduplicate(names!("X", "X", "X (1)", "X (1)"));
        assert_eq!(out, names!("X", "X (1)", "X (1) (1)", "X (1) (2)"));
        let unique = out.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), out.len());
    }
}
