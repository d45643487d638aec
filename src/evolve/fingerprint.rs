//! Content hashes for genomes.
//!
//! Evolved weights are not persisted, so reports carry a BLAKE3 digest of
//! the winning genome instead: two folds that print the same fingerprint
//! converged to bit-identical parameters.

/// A 256-bit BLAKE3 digest of a genome's little-endian gene bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenomeHash(blake3::Hash);

/// Hex digits shown by the short form (32 bits).
const SHORT_LEN: usize = 8;

impl GenomeHash {
    pub fn of(genome: &[f64]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(genome.len() as u64).to_le_bytes());
        for gene in genome {
            hasher.update(&gene.to_le_bytes());
        }
        Self(hasher.finalize())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// All 64 hex digits, as written to CSV.
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }

    /// Leading hex digits, for console tables and logs.
    pub fn to_short(&self) -> String {
        self.0.to_hex()[..SHORT_LEN].to_string()
    }
}

impl std::fmt::Debug for GenomeHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GenomeHash({})", self.to_short())
    }
}

impl std::fmt::Display for GenomeHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let g = vec![0.5, -0.25, 3.0];
        assert_eq!(GenomeHash::of(&g), GenomeHash::of(&g));
    }

    #[test]
    fn sensitive_to_every_gene() {
        let a = vec![0.5; 100];
        let mut b = a.clone();
        b[99] = 0.5000000001;
        assert_ne!(GenomeHash::of(&a), GenomeHash::of(&b));
    }

    #[test]
    fn length_is_part_of_the_digest() {
        assert_ne!(GenomeHash::of(&[]), GenomeHash::of(&[0.0]));
    }

    #[test]
    fn short_form_is_a_hex_prefix() {
        let h = GenomeHash::of(&[1.0, 2.0]);
        let hex = h.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(h.to_short(), &hex[..8]);
        assert_eq!(h.to_string(), h.to_short());
        assert_eq!(format!("{:?}", h), format!("GenomeHash({})", &hex[..8]));
    }

    #[test]
    fn hex_matches_digest_bytes() {
        let h = GenomeHash::of(&[0.25]);
        let from_bytes: String = h.as_bytes().iter().map(|b| format!("{:02x}", b)).collect();
        assert_eq!(h.to_hex(), from_bytes);
    }
}
