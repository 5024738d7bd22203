//! Named minimap2 presets.
use std::fmt;
use std::str::FromStr;

use crate::error::MappyError;

/// Preset options for minimap2, mirroring the `-x` flag of the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Align noisy long reads of ~10% error rate to a reference genome. This is the default mode.
    MapOnt,
    /// Align PacBio high-fidelity (HiFi) reads to a reference genome.
    MapHifi,
    /// Align older PacBio continuous long (CLR) reads to a reference genome (-Hk19).
    MapPb,
    /// Accurate long reads (error rate <1%) against a reference genome.
    LongReadHq,
    /// Long assembly to reference mapping, up to 5% sequence divergence.
    Asm5,
    /// Long assembly to reference mapping, up to 10% sequence divergence.
    Asm10,
    /// Long assembly to reference mapping, up to 20% sequence divergence.
    Asm20,
    /// Long-read spliced alignment; long deletions are taken as introns.
    Splice,
    /// Long-read spliced alignment for PacBio CCS reads.
    SpliceHq,
    /// Short single-end reads without splicing.
    ShortRead,
    /// PacBio CLR all-vs-all overlap mapping.
    AvaPb,
    /// Oxford Nanopore all-vs-all overlap mapping.
    AvaOnt,
}

impl Preset {
    /// The preset name as a null-terminated byte literal, for minimap2's
    /// `mm_set_opt` function.
    pub(crate) fn as_bytes(&self) -> &[u8] {
        match self {
            Preset::MapOnt => b"map-ont\0",
            Preset::MapHifi => b"map-hifi\0",
            Preset::MapPb => b"map-pb\0",
            Preset::LongReadHq => b"lr:hq\0",
            Preset::Asm5 => b"asm5\0",
            Preset::Asm10 => b"asm10\0",
            Preset::Asm20 => b"asm20\0",
            Preset::Splice => b"splice\0",
            Preset::SpliceHq => b"splice:hq\0",
            Preset::ShortRead => b"sr\0",
            Preset::AvaPb => b"ava-pb\0",
            Preset::AvaOnt => b"ava-ont\0",
        }
    }

    /// The preset name as minimap2 spells it.
    pub fn name(&self) -> &'static str {
        match self {
            Preset::MapOnt => "map-ont",
            Preset::MapHifi => "map-hifi",
            Preset::MapPb => "map-pb",
            Preset::LongReadHq => "lr:hq",
            Preset::Asm5 => "asm5",
            Preset::Asm10 => "asm10",
            Preset::Asm20 => "asm20",
            Preset::Splice => "splice",
            Preset::SpliceHq => "splice:hq",
            Preset::ShortRead => "sr",
            Preset::AvaPb => "ava-pb",
            Preset::AvaOnt => "ava-ont",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = MappyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "map-ont" => Ok(Preset::MapOnt),
            "map-hifi" => Ok(Preset::MapHifi),
            "map-pb" => Ok(Preset::MapPb),
            "lr:hq" => Ok(Preset::LongReadHq),
            "asm5" => Ok(Preset::Asm5),
            "asm10" => Ok(Preset::Asm10),
            "asm20" => Ok(Preset::Asm20),
            "splice" => Ok(Preset::Splice),
            "splice:hq" => Ok(Preset::SpliceHq),
            "sr" => Ok(Preset::ShortRead),
            "ava-pb" => Ok(Preset::AvaPb),
            "ava-ont" => Ok(Preset::AvaOnt),
            _ => Err(MappyError::InvalidOption(format!("unknown preset: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_roundtrip() {
        for preset in [
            Preset::MapOnt,
            Preset::MapHifi,
            Preset::MapPb,
            Preset::LongReadHq,
            Preset::Asm5,
            Preset::Asm10,
            Preset::Asm20,
            Preset::Splice,
            Preset::SpliceHq,
            Preset::ShortRead,
            Preset::AvaPb,
            Preset::AvaOnt,
        ] {
            assert_eq!(preset.name().parse::<Preset>().unwrap(), preset);
        }
    }

    #[test]
    fn test_from_str_unknown() {
        assert!("map-out".parse::<Preset>().is_err());
    }

    #[test]
    fn test_as_bytes_null_terminated() {
        assert_eq!(Preset::MapOnt.as_bytes().last(), Some(&0u8));
    }
}
