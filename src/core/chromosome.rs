use crate::core::types::{Chromosome, SkipReason};

/// Canonical numbers for the non-numeric primary chromosomes
const NAMED_CHROMOSOMES: &[(&str, u8)] = &[("X", 23), ("Y", 24), ("M", 25), ("MT", 25)];

/// Map a raw chromosome label to its canonical number.
///
/// Accepts both UCSC (`chr1`, `chrX`, `chrM`) and NCBI (`1`, `X`, `MT`) naming.
/// Unplaced scaffolds, alt contigs and anything else without a fixed numeric
/// slot (`chrUn_gl000220`, `chr1_KI270706v1_random`, `HLA-A*01:01`) are not
/// resolvable.
///
/// # Errors
///
/// Returns `SkipReason::UnknownChromosome` for labels that do not resolve to
/// a number in `[1, 25]`.
pub fn normalize_chromosome(label: &str) -> Result<Chromosome, SkipReason> {
    let trimmed = label.trim();
    let bare = strip_chr_prefix(trimmed);

    if let Some(&(_, number)) = NAMED_CHROMOSOMES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(bare))
    {
        return Chromosome::new(number)
            .ok_or_else(|| SkipReason::UnknownChromosome(label.to_string()));
    }

    bare.parse::<u8>()
        .ok()
        .and_then(Chromosome::new)
        .ok_or_else(|| SkipReason::UnknownChromosome(label.to_string()))
}

fn strip_chr_prefix(label: &str) -> &str {
    match label.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &label[3..],
        _ => label,
    }
}
