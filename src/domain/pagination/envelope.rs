use super::descriptor::QueryDescriptor;
use crate::domain::record::repository::Record;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Counters {
    pub items_from: u64,
    pub items_to: u64,
    pub items_total: u64,
    pub items_per_page: u64,
    pub page_total: u64,
}

/// One page of records plus the counters describing where it sits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaginationEnvelope {
    pub counters: Counters,
    pub items: Vec<Record>,
}

/// Wraps fetched records with their paging counters. Pure; never fails.
pub fn assemble(items: Vec<Record>, total: u64, descriptor: &QueryDescriptor) -> PaginationEnvelope {
    let counters = Counters {
        items_from: descriptor.skip,
        items_to: descriptor.skip.saturating_add(items.len() as u64),
        items_total: total,
        items_per_page: descriptor.limit,
        page_total: total.div_ceil(descriptor.limit),
    };

    PaginationEnvelope { counters, items }
}
