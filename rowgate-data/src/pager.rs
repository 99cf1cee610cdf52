use std::marker::PhantomData;
use std::time::Duration;

use crate::config::DataConfig;
use crate::entity::Entity;
use crate::error::DataError;
use crate::filter::FilterSpec;
use crate::page::{Page, PageRequest};
use crate::plan::{CountPlan, SelectPlan};
use crate::query::QueryError;
use crate::store::{bounded, RecordStore};

/// Filtered, ordered, offset-paged reads of one entity.
///
/// Each call issues three independent statements: the filtered count, the
/// unfiltered count and the page itself. A write landing between them is
/// visible to some and not others; no snapshot spans the three.
///
/// # Example
///
/// ```ignore
/// let pager = Pager::<Product, _>::new(store.clone(), &config);
/// let page = pager.paginate(&filter, &PageRequest::new(2, 5)).await?;
/// ```
pub struct Pager<E, S> {
    store: S,
    timeout: Duration,
    _marker: PhantomData<E>,
}

impl<E, S> Pager<E, S>
where
    E: Entity,
    S: RecordStore,
{
    pub fn new(store: S, config: &DataConfig) -> Self {
        Self {
            store,
            timeout: config.statement_timeout(),
            _marker: PhantomData,
        }
    }

    /// Fetch one page of records matching `filter`.
    ///
    /// The request, the ordering key and the filter are all checked before
    /// the store is contacted.
    pub async fn paginate(
        &self,
        filter: &FilterSpec,
        request: &PageRequest,
    ) -> Result<Page<E>, DataError> {
        let window = request.validate()?;
        let order_key = E::order_key().ok_or(QueryError::MissingOrderingKey {
            table: E::table_name(),
        })?;
        let predicate = filter.compose()?;

        let filtered = CountPlan::new(E::table_name(), predicate.clone());
        let filtered_total =
            bounded("count_filtered", self.timeout, self.store.count(&filtered)).await?;

        let everything = CountPlan::all(E::table_name());
        let unfiltered_total =
            bounded("count_all", self.timeout, self.store.count(&everything)).await?;

        let plan = SelectPlan::for_entity::<E>(predicate)
            .order_by(order_key, true)
            .limit(window.page_size)
            .offset(window.offset);
        let rows = bounded("fetch_page", self.timeout, self.store.fetch(&plan)).await?;
        if rows.len() as u64 > window.page_size {
            return Err(DataError::DataIntegrityViolation(format!(
                "store returned {} rows for a page of {}",
                rows.len(),
                window.page_size
            )));
        }
        let items = rows
            .into_iter()
            .map(E::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            table = E::table_name(),
            page = window.page,
            page_size = window.page_size,
            filtered_total,
            unfiltered_total,
            returned = items.len(),
            "page fetched"
        );
        Ok(Page::new(items, &window, filtered_total, unfiltered_total))
    }
}

impl<E, S: Clone> Clone for Pager<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            timeout: self.timeout,
            _marker: PhantomData,
        }
    }
}
