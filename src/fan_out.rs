use futures::stream::{self, StreamExt};
use std::future::Future;

/// Run `task` on every item with at most `width` futures in flight and
/// return the outputs in input order.
///
/// A finished future frees its slot right away, so one slow item only ever
/// holds the slot it runs in.
pub(crate) async fn ordered_fan_out<I, F, Fut>(items: I, width: usize, mut task: F) -> Vec<Fut::Output>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future,
{
    let mut settled: Vec<(usize, Fut::Output)> = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| {
            let fut = task(item);
            async move { (index, fut.await) }
        })
        .buffer_unordered(width.max(1))
        .collect()
        .await;

    settled.sort_by_key(|(index, _)| *index);
    settled.into_iter().map(|(_, output)| output).collect()
}
