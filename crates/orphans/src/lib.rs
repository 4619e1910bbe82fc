//! offgc orphans: scan a filled index for resources whose only owner is
//! not present in it.
//!
//! Resources with zero owner references are roots and never reported.
//! Resources with more than one owner reference are skipped entirely.

#![forbid(unsafe_code)]

use metrics::counter;
use offgc_core::{Directive, Resource};
use offgc_store::ResourceIndex;
use tracing::{debug, info};

/// Orphaned resources sorted by namespace, kind (lowercased), name, then
/// apiVersion, so output is stable across runs and ingestion orders.
pub fn find_orphans(index: &ResourceIndex) -> Vec<&Resource> {
    let mut out: Vec<&Resource> = index
        .all()
        .filter(|r| {
            let Some(owner) = r.sole_owner() else { return false };
            let owner_key = owner.key(r.namespace());
            let missing = !index.contains(&owner_key);
            if missing {
                debug!(resource = %r.key(), owner = %owner_key, "owner not in index");
            }
            missing
        })
        .collect();
    out.sort_by_cached_key(|r| {
        (r.namespace().to_string(), r.kind.to_lowercase(), r.name().to_string(), r.api_version.clone())
    });
    counter!("offgc_orphans_total", out.len() as u64);
    info!(scanned = index.len(), orphans = out.len(), "orphan scan complete");
    out
}

/// Delete directives for every orphan, in [`find_orphans`] order.
pub fn directives(index: &ResourceIndex) -> Vec<Directive> {
    find_orphans(index).into_iter().map(Directive::from).collect()
}
