//! Nucleotide sequence helpers.

/// Complement lookup table covering the IUPAC nucleotide codes, upper and
/// lower case. Bytes with no defined complement map to themselves.
static COMPLEMENT_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];

    let mut i = 0;
    while i < 256 {
        table[i] = i as u8;
        i += 1;
    }

    // (base, complement) pairs; the loop below also inserts the lowercase form
    let pairs: &[(u8, u8)] = &[
        (b'A', b'T'),
        (b'C', b'G'),
        (b'G', b'C'),
        (b'T', b'A'),
        (b'U', b'A'),
        (b'R', b'Y'),
        (b'Y', b'R'),
        (b'S', b'S'),
        (b'W', b'W'),
        (b'K', b'M'),
        (b'M', b'K'),
        (b'B', b'V'),
        (b'V', b'B'),
        (b'D', b'H'),
        (b'H', b'D'),
        (b'N', b'N'),
    ];

    let mut j = 0;
    while j < pairs.len() {
        let (base, comp) = pairs[j];
        table[base as usize] = comp;
        table[(base + 32) as usize] = comp + 32;
        j += 1;
    }

    table
};

/// Returns the complement of a single nucleotide, preserving case.
#[inline]
pub fn complement(base: u8) -> u8 {
    COMPLEMENT_TABLE[base as usize]
}

/// Reverse complement a nucleotide sequence into a newly allocated buffer.
///
/// # Examples
///
/// ```
/// use libmappy::seq::revcomp;
///
/// assert_eq!(revcomp(b"AAACCCTTTGGGA"), b"TCCCAAAGGGTTT");
/// ```
pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revcomp() {
        assert_eq!(revcomp(b"AAACCCTTTGGGA"), b"TCCCAAAGGGTTT");
    }

    #[test]
    fn test_revcomp_twice_is_identity() {
        let seq = b"ACGTRYSWKMBDHVNacgtn";
        assert_eq!(revcomp(&revcomp(seq)), seq);
    }

    #[test]
    fn test_revcomp_empty() {
        assert!(revcomp(b"").is_empty());
    }

    #[test]
    fn test_revcomp_preserves_case() {
        assert_eq!(revcomp(b"acgtN"), b"Nacgt");
    }

    #[test]
    fn test_complement_ambiguity_codes() {
        assert_eq!(complement(b'R'), b'Y');
        assert_eq!(complement(b'K'), b'M');
        assert_eq!(complement(b'N'), b'N');
        // no defined complement, maps to itself
        assert_eq!(complement(b'-'), b'-');
    }
}
