use crate::error::ApiResult;
use crate::model::Library;
use crate::storage::StorageProvider;
use std::collections::HashMap;

/// Case id → order within one suite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderCache {
    orders: HashMap<u64, i64>,
}

impl OrderCache {
    /// Load the ordering index for the suite named by a `for_suite` parameter.
    ///
    /// Returns `None` when no suite was requested. A value that is not a suite id,
    /// or names a suite without cases, yields an empty index. When a case appears
    /// in the suite more than once the row with the highest id wins.
    pub async fn load<S: StorageProvider>(
        library: &Library<S>,
        for_suite: Option<&str>,
    ) -> ApiResult<Option<Self>> {
        let Some(raw) = for_suite else {
            return Ok(None);
        };

        let suite_id = match raw.trim().parse::<u64>() {
            Ok(id) => id,
            Err(_) => {
                log::debug!("for_suite '{}' is not a suite id, nothing is selected", raw);
                return Ok(Some(Self::default()));
            }
        };

        let rows = library.suitecases_for_suite(suite_id).await?;
        log::debug!(
            "Loaded {} suite case orders for suite {}",
            rows.len(),
            suite_id
        );
        Ok(Some(
            rows.into_iter()
                .map(|suitecase| (suitecase.case_id, suitecase.order))
                .collect(),
        ))
    }

    pub fn order_of(&self, case_id: u64) -> Option<i64> {
        self.orders.get(&case_id).copied()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl FromIterator<(u64, i64)> for OrderCache {
    fn from_iter<I: IntoIterator<Item = (u64, i64)>>(iter: I) -> Self {
        Self {
            orders: iter.into_iter().collect(),
        }
    }
}
