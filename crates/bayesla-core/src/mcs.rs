//! # MCS Catalog
//!
//! Ordered list of modulation-and-coding schemes. Index 0 is the most
//! robust entry and is the fallback whenever no MCS meets the BLER target.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Resource elements carried by one transport block. Packet sizes are
/// expressed in bits over this many REs, so `packet_size / 1024` is the
/// spectral efficiency in bit/symbol.
pub const RESOURCE_ELEMENTS_PER_BLOCK: f64 = 1024.0;

/// Spectral efficiencies of the LTE 4-bit CQI table (CQI 1..=15).
const LTE_EFFICIENCIES: [f64; 15] = [
    0.1523, 0.2344, 0.3770, 0.6016, 0.8770, 1.1758, 1.4766, 1.9141, 2.4063, 2.7305, 3.3223,
    3.9023, 4.5234, 5.1152, 5.5547,
];

/// Modulation orders (bits per symbol) matching [`LTE_EFFICIENCIES`].
const LTE_MODORDERS: [u8; 15] = [2, 2, 2, 2, 2, 2, 4, 4, 4, 6, 6, 6, 6, 6, 6];

/// A single modulation-and-coding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mcs {
    /// Bits delivered when the transmission is acknowledged.
    pub packet_size: u32,
    /// Bits per modulation symbol (2 = QPSK, 4 = 16QAM, 6 = 64QAM).
    pub modulation_order: u8,
}

impl Mcs {
    /// Spectral efficiency in bit/symbol.
    pub fn spectral_efficiency(&self) -> f64 {
        self.packet_size as f64 / RESOURCE_ELEMENTS_PER_BLOCK
    }
}

/// Immutable, non-empty MCS table. Indices are stable for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct McsCatalog {
    entries: Vec<Mcs>,
}

impl McsCatalog {
    pub fn new(packet_sizes: &[u32], modorders: &[u8]) -> Result<Self, ConfigError> {
        if packet_sizes.len() != modorders.len() {
            return Err(ConfigError::CatalogLengthMismatch {
                packet_sizes: packet_sizes.len(),
                modorders: modorders.len(),
            });
        }
        if packet_sizes.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let entries = packet_sizes
            .iter()
            .zip(modorders)
            .map(|(&packet_size, &modulation_order)| Mcs {
                packet_size,
                modulation_order,
            })
            .collect();
        Ok(McsCatalog { entries })
    }

    /// The 15-entry catalog derived from the LTE CQI table.
    pub fn lte() -> Self {
        let entries = LTE_EFFICIENCIES
            .iter()
            .zip(LTE_MODORDERS)
            .map(|(&eff, modulation_order)| Mcs {
                packet_size: (eff * RESOURCE_ELEMENTS_PER_BLOCK).round() as u32,
                modulation_order,
            })
            .collect();
        McsCatalog { entries }
    }

    /// Number of MCS entries (`nrof_rates`).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; construction rejects empty catalogs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, mcs: usize) -> Option<&Mcs> {
        self.entries.get(mcs)
    }

    /// Packet size of `mcs`, saturating to the last entry for out-of-range
    /// indices.
    pub fn packet_size(&self, mcs: usize) -> u32 {
        let idx = mcs.min(self.entries.len() - 1);
        self.entries[idx].packet_size
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mcs> {
        self.entries.iter()
    }

    pub fn packet_sizes(&self) -> Vec<u32> {
        self.entries.iter().map(|m| m.packet_size).collect()
    }

    pub fn modorders(&self) -> Vec<u8> {
        self.entries.iter().map(|m| m.modulation_order).collect()
    }
}

impl Default for McsCatalog {
    fn default() -> Self {
        Self::lte()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lte_catalog_shape() {
        let cat = McsCatalog::lte();
        assert_eq!(cat.len(), 15);
        assert_eq!(cat.packet_size(0), 156);
        assert_eq!(cat.packet_size(14), 5688);
        assert_eq!(cat.get(9).unwrap().modulation_order, 6);
        let sizes = cat.packet_sizes();
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn rejects_empty_catalog() {
        assert_eq!(McsCatalog::new(&[], &[]), Err(ConfigError::EmptyCatalog));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = McsCatalog::new(&[100, 200], &[2]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::CatalogLengthMismatch {
                packet_sizes: 2,
                modorders: 1
            }
        );
    }

    #[test]
    fn packet_size_saturates() {
        let cat = McsCatalog::new(&[100, 200], &[2, 4]).unwrap();
        assert_eq!(cat.packet_size(7), 200);
    }
}
