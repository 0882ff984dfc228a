//! Splitting components into bounded aggregator queries

use crate::aggregator::PartQuery;
use parts_common::{sku_qty_field, PartRecord, MANF_QTY_FIELD};

/// Maximum number of part queries in one aggregator request
pub const MAX_PARTS_PER_QUERY: usize = 20;

/// Pick the identifier a component is queried by.
///
/// The manufacturer part number wins. Otherwise the first SKU found among
/// `known` distributors is used, and that distributor's sub-quantity (if any)
/// becomes the part's generic `manf#_qty`. Returns `None` when the component
/// has neither.
pub fn select_query(reference: usize, part: &mut PartRecord, known: &[&str]) -> Option<PartQuery> {
    if let Some(mpn) = part.manf_num() {
        return Some(PartQuery::mpn(reference, mpn));
    }

    let (dist, sku) = known
        .iter()
        .find_map(|dist| part.sku(dist).map(|sku| (*dist, sku.to_string())))?;

    if let Some(qty) = part.field(&sku_qty_field(dist)).map(str::to_string) {
        log::warn!(
            "Associated {} quantity to '{}' due \"{}#={}:{}\".",
            qty,
            part.refs(),
            dist,
            qty,
            sku
        );
        part.fields.insert(MANF_QTY_FIELD.to_string(), qty);
    }

    Some(PartQuery::sku(reference, &sku))
}

/// Select queries for every component, keeping one slot per component
pub fn select_queries(parts: &mut [PartRecord], known: &[&str]) -> Vec<Option<PartQuery>> {
    parts
        .iter_mut()
        .enumerate()
        .map(|(reference, part)| select_query(reference, part, known))
        .collect()
}

/// Queries sent in one aggregator request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBatch {
    pub queries: Vec<PartQuery>,
    /// Input components this batch accounts for, skipped ones included
    pub advanced: usize,
}

/// Lazily groups per-component selections into batches of at most
/// `batch_size` queries.
///
/// Components without a query take no slot but are still counted in
/// `advanced`, so the `advanced` values of all batches add up to the number
/// of components. Skipped components after the last query end up in a
/// trailing batch with no queries.
pub struct QueryBatcher<I> {
    selections: I,
    batch_size: usize,
    exhausted: bool,
}

impl<I> QueryBatcher<I>
where
    I: Iterator<Item = Option<PartQuery>>,
{
    pub fn new<S>(selections: S, batch_size: usize) -> Self
    where
        S: IntoIterator<IntoIter = I>,
    {
        Self {
            selections: selections.into_iter(),
            batch_size: batch_size.max(1),
            exhausted: false,
        }
    }
}

impl<I> Iterator for QueryBatcher<I>
where
    I: Iterator<Item = Option<PartQuery>>,
{
    type Item = QueryBatch;

    fn next(&mut self) -> Option<QueryBatch> {
        if self.exhausted {
            return None;
        }

        let mut queries = Vec::with_capacity(self.batch_size);
        let mut advanced = 0;

        while queries.len() < self.batch_size {
            match self.selections.next() {
                Some(selection) => {
                    advanced += 1;
                    queries.extend(selection);
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        (advanced > 0).then_some(QueryBatch { queries, advanced })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::QueryKey;
    use parts_common::{sku_field, MANF_FIELD};
    use std::collections::BTreeMap;

    fn part(fields: &[(&str, &str)]) -> PartRecord {
        let fields: BTreeMap<String, String> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PartRecord::new(fields)
    }

    fn with_mpn(mpn: &str) -> PartRecord {
        part(&[(MANF_FIELD, mpn)])
    }

    const KNOWN: &[&str] = &["digikey", "mouser"];

    #[test]
    fn prefers_manufacturer_number() {
        let mut p = part(&[("manf#", "LM358DR"), ("digikey#", "296-1395-1-ND")]);
        let query = select_query(7, &mut p, KNOWN).unwrap();
        assert_eq!(query, PartQuery::mpn(7, "LM358DR"));
    }

    #[test]
    fn falls_back_to_first_known_sku() {
        let mut p = part(&[("mouser#", "595-LM358DR"), ("digikey#", "296-1395-1-ND")]);
        let query = select_query(2, &mut p, KNOWN).unwrap();
        assert_eq!(query.key, QueryKey::Sku("296-1395-1-ND".to_string()));
        assert_eq!(query.reference, 2);
    }

    #[test]
    fn ignores_sku_of_unknown_distributor() {
        let mut p = part(&[("lcsc#", "C7950")]);
        assert!(select_query(0, &mut p, KNOWN).is_none());
    }

    #[test]
    fn sku_quantity_becomes_generic_quantity() {
        let mut p = part(&[
            ("refs", "R1"),
            ("mouser#", "71-CRCW0603-10K"),
            ("mouser#_qty", "1/2"),
        ]);
        select_query(0, &mut p, KNOWN).unwrap();
        assert_eq!(p.field(MANF_QTY_FIELD), Some("1/2"));
    }

    #[test]
    fn component_without_identifiers_is_untouched() {
        let mut p = part(&[("refs", "TP1"), ("mouser#_qty", "3")]);
        let before = p.clone();
        assert!(select_query(0, &mut p, KNOWN).is_none());
        assert_eq!(p, before);
    }

    #[test]
    fn batches_respect_size_and_account_for_every_component() {
        let mut parts: Vec<PartRecord> = (0..47)
            .map(|i| {
                if i % 5 == 0 {
                    PartRecord::default()
                } else {
                    with_mpn(&format!("MPN-{i}"))
                }
            })
            .collect();

        let selections = select_queries(&mut parts, KNOWN);
        let batches: Vec<QueryBatch> = QueryBatcher::new(selections, 20).collect();

        assert!(batches.iter().all(|b| b.queries.len() <= 20));
        assert_eq!(batches.iter().map(|b| b.advanced).sum::<usize>(), 47);
        assert_eq!(batches.iter().map(|b| b.queries.len()).sum::<usize>(), 37);
        assert_eq!(batches[0].queries.len(), 20);
        assert_eq!(batches[1].queries.len(), 17);
        assert!(batches.iter().flat_map(|b| &b.queries).all(|q| q.reference % 5 != 0));
    }

    #[test]
    fn trailing_skipped_components_get_an_empty_batch() {
        let mut parts: Vec<PartRecord> = (0..4).map(|i| with_mpn(&i.to_string())).collect();
        parts.push(PartRecord::default());
        parts.push(part(&[(sku_field("tme").as_str(), "X")]));

        let selections = select_queries(&mut parts, KNOWN);
        let batches: Vec<QueryBatch> = QueryBatcher::new(selections, 2).collect();

        let sizes: Vec<(usize, usize)> =
            batches.iter().map(|b| (b.queries.len(), b.advanced)).collect();
        assert_eq!(sizes, vec![(2, 2), (2, 2), (0, 2)]);
    }

    #[test]
    fn exact_multiple_has_no_extra_batch() {
        let mut parts: Vec<PartRecord> = (0..40).map(|i| with_mpn(&i.to_string())).collect();
        let selections = select_queries(&mut parts, KNOWN);
        let batches: Vec<QueryBatch> =
            QueryBatcher::new(selections, MAX_PARTS_PER_QUERY).collect();
        assert_eq!(batches.len(), 2);
    }

    #[test]
    fn empty_input_has_no_batches() {
        let batches: Vec<QueryBatch> = QueryBatcher::new(Vec::<Option<PartQuery>>::new(), 20).collect();
        assert!(batches.is_empty());
    }

    #[test]
    fn references_keep_input_order() {
        let mut parts: Vec<PartRecord> = (0..5).map(|i| with_mpn(&i.to_string())).collect();
        let selections = select_queries(&mut parts, KNOWN);
        let refs: Vec<usize> = QueryBatcher::new(selections, 3)
            .flat_map(|b| b.queries)
            .map(|q| q.reference)
            .collect();
        assert_eq!(refs, vec![0, 1, 2, 3, 4]);
    }
}
