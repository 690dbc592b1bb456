use crate::resource::Bundle;
use serde::Serialize;
use serde_json::Value;

/// Records split by suite membership.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition<T> {
    /// In the suite, ascending by order; ties keep query order.
    pub selected: Vec<T>,
    /// Not in the suite, in query order.
    pub unselected: Vec<T>,
}

/// Split items on whether `order_of` yields an order.
pub fn partition_by<T, F>(items: Vec<T>, order_of: F) -> Partition<T>
where
    F: Fn(&T) -> Option<i64>,
{
    let (mut selected, unselected): (Vec<T>, Vec<T>) =
        items.into_iter().partition(|item| order_of(item).is_some());
    // sort_by_key is stable, so equal orders keep query order
    selected.sort_by_key(|item| order_of(item));
    Partition {
        selected,
        unselected,
    }
}

/// Split annotated bundles on their `order` field.
pub fn partition(bundles: Vec<Bundle>) -> Partition<Value> {
    let Partition {
        selected,
        unselected,
    } = partition_by(bundles, |bundle| {
        bundle.data.get("order").and_then(Value::as_i64)
    });
    Partition {
        selected: selected.into_iter().map(Bundle::into_json).collect(),
        unselected: unselected.into_iter().map(Bundle::into_json).collect(),
    }
}
