//! Read-only link model shared by every experiment: AWGN table, MCS catalog
//! and the CQI mapping derived from them.

use crate::awgn::{AwgnTable, Clamped};
use crate::cqi::CqiMapper;
use crate::error::{ConfigError, Error};
use crate::mcs::McsCatalog;

#[derive(Debug, Clone)]
pub struct LinkModel {
    table: AwgnTable,
    catalog: McsCatalog,
    cqi: CqiMapper,
}

impl LinkModel {
    /// Fails if the table's MCS columns do not match the catalog or the CQI
    /// threshold is not a probability in `(0, 1)`.
    pub fn new(table: AwgnTable, catalog: McsCatalog, cqi_bler_threshold: f64) -> Result<Self, Error> {
        if !(cqi_bler_threshold > 0.0 && cqi_bler_threshold < 1.0) {
            return Err(ConfigError::InvalidCqiThreshold(cqi_bler_threshold).into());
        }
        table.check_catalog(&catalog)?;
        let cqi = CqiMapper::new(&table, cqi_bler_threshold);
        Ok(LinkModel {
            table,
            catalog,
            cqi,
        })
    }

    pub fn table(&self) -> &AwgnTable {
        &self.table
    }

    pub fn catalog(&self) -> &McsCatalog {
        &self.catalog
    }

    pub fn cqi_mapper(&self) -> &CqiMapper {
        &self.cqi
    }

    pub fn nrof_rates(&self) -> usize {
        self.catalog.len()
    }

    pub fn estimate_sinr_from_cqi(&self, cqi: u8) -> Clamped<f64> {
        self.cqi.estimate_sinr_from_cqi(cqi)
    }

    pub fn determine_bler_at_sinr(&self, snr_db: f64) -> Clamped<&[f64]> {
        self.table.determine_bler_at_sinr(snr_db)
    }

    pub fn cqi_from_snr(&self, snr_db: f64) -> Clamped<u8> {
        self.cqi.cqi_from_snr(&self.table, snr_db)
    }

    pub fn prior_bler(&self, cqi: u8) -> &[f64] {
        self.cqi.prior_bler(cqi)
    }
}
