use bayesla_core::cqi::DEFAULT_CQI_BLER_THRESHOLD;
use bayesla_core::{AwgnTable, LinkModel, McsCatalog};

/// LTE catalog over the synthetic logistic AWGN table.
pub fn lte_model() -> LinkModel {
    let catalog = McsCatalog::lte();
    let table = AwgnTable::logistic_default(&catalog).expect("synthetic table");
    LinkModel::new(table, catalog, DEFAULT_CQI_BLER_THRESHOLD).expect("link model")
}
