use std::sync::Arc;

use educhain_core::{CredentialRecord, HolderLookup};
use educhain_ledger::{Entry, Ledger, Namespace};

use crate::error::{RegistryError, Subject};
use crate::store::decode_record;

/// Stored field name the substrate index is queried on.
const HOLDER_FIELD: &str = "holderId";

/// Resolves every credential issued to a holder.
pub struct HolderIndex {
    ledger: Arc<dyn Ledger>,
    lookup: HolderLookup,
    /// Credentials are keyed by holder id (natural-key issuance).
    natural_keys: bool,
    page_size: usize,
}

impl HolderIndex {
    /// Create a holder index. `page_size` bounds each range-scan call.
    pub fn new(
        ledger: Arc<dyn Ledger>,
        lookup: HolderLookup,
        natural_keys: bool,
        page_size: usize,
    ) -> Self {
        Self {
            ledger,
            lookup,
            natural_keys,
            page_size: page_size.max(1),
        }
    }

    /// All credentials whose `holderId` matches, in substrate key order.
    ///
    /// An empty result is reported as `NotFound`, never as an empty list.
    pub fn find_by_holder(&self, holder_id: &str) -> Result<Vec<CredentialRecord>, RegistryError> {
        if holder_id.is_empty() {
            return Err(RegistryError::InvalidInput("holder id must not be empty".into()));
        }

        let records = match self.lookup {
            HolderLookup::Auto if self.natural_keys => self.point_lookup(holder_id)?,
            HolderLookup::Auto | HolderLookup::Indexed => self.indexed(holder_id)?,
            HolderLookup::Scan => self.scan(holder_id)?,
        };

        if records.is_empty() {
            return Err(RegistryError::NotFound(Subject::Holder(holder_id.to_string())));
        }

        tracing::debug!(holder_id = %holder_id, count = records.len(), "holder lookup");
        Ok(records)
    }

    fn point_lookup(&self, holder_id: &str) -> Result<Vec<CredentialRecord>, RegistryError> {
        match self.ledger.get(Namespace::Credentials, holder_id)? {
            Some(raw) => {
                let record = decode_record(holder_id, &raw)?;
                Ok(if record.holder_id == holder_id {
                    vec![record]
                } else {
                    Vec::new()
                })
            }
            None => Ok(Vec::new()),
        }
    }

    fn indexed(&self, holder_id: &str) -> Result<Vec<CredentialRecord>, RegistryError> {
        match self
            .ledger
            .query_field(Namespace::Credentials, HOLDER_FIELD, holder_id)?
        {
            Some(entries) => collect_matches(entries, holder_id),
            None => {
                tracing::debug!(holder_id = %holder_id, "no substrate field index, scanning");
                self.scan(holder_id)
            }
        }
    }

    /// Page through the whole credential keyspace.
    fn scan(&self, holder_id: &str) -> Result<Vec<CredentialRecord>, RegistryError> {
        let mut found = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.ledger.range_scan(
                Namespace::Credentials,
                cursor.as_deref(),
                None,
                self.page_size,
            )?;
            pages += 1;
            found.extend(collect_matches(page.entries, holder_id)?);
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!(holder_id = %holder_id, pages, "holder scan complete");
        Ok(found)
    }
}

fn collect_matches(
    entries: Vec<Entry>,
    holder_id: &str,
) -> Result<Vec<CredentialRecord>, RegistryError> {
    let mut matches = Vec::new();
    for (key, raw) in entries {
        let record = decode_record(&key, &raw)?;
        if record.holder_id == holder_id {
            matches.push(record);
        }
    }
    Ok(matches)
}
