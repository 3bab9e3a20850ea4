mod fixtures;

use anyhow::Result;
use claim::*;
use futures::TryStreamExt;
use numflow::elements::{CancellationSignal, DelayRange, GenerationRequest, NumberSample, ScriptedRandomness};
use numflow::graph::stage::{Filter, Fold, StreamSource};
use numflow::graph::{Connect, Graph, SinkShape, SourceShape};
use numflow::{is_odd, NumberSequence};
use pretty_assertions::assert_eq;
use tracing::Instrument;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_graph_filters_same_samples_as_pull() -> Result<()> {
    once_cell::sync::Lazy::force(&numflow::tracing::TEST_TRACING);
    let main_span = tracing::info_span!("test_graph_filters_same_samples_as_pull");
    async move {
        let request = GenerationRequest::new(50, DelayRange::none());

        let expected: Vec<u8> = NumberSequence::new(request, fixtures::seeded(11), CancellationSignal::new())
            .into_stream()
            .try_filter(|sample| futures::future::ready(is_odd(sample)))
            .map_ok(|sample| sample.value())
            .try_collect()
            .await?;

        let sequence = NumberSequence::new(request, fixtures::seeded(11), CancellationSignal::new());
        let source = StreamSource::new("numbers", sequence.into_stream());
        let odd = Filter::new("odd_numbers", is_odd);
        let mut collect = Fold::new("collect", Vec::new(), |mut acc: Vec<u8>, sample: NumberSample| {
            acc.push(sample.value());
            acc
        });
        let rx_collected = assert_some!(collect.take_final_rx());

        (source.outlet(), odd.inlet()).connect().await;
        (odd.outlet(), collect.inlet()).connect().await;

        let mut g = Graph::default();
        g.push_back(Box::new(source)).await;
        g.push_back(Box::new(odd)).await;
        g.push_back(Box::new(collect)).await;
        g.run().await?;

        let actual = rx_collected.await?;
        assert_eq!(actual, expected);
        assert!(actual.iter().all(|v| v % 2 == 1));
        Ok::<(), anyhow::Error>(())
    }
    .instrument(main_span)
    .await
}

#[tokio::test]
async fn test_graph_run_fails_when_generation_fails() -> Result<()> {
    once_cell::sync::Lazy::force(&numflow::tracing::TEST_TRACING);

    let randomness = ScriptedRandomness::new([2, 4])?;
    let sequence = NumberSequence::new(GenerationRequest::new(3, DelayRange::none()), randomness, CancellationSignal::new());

    let source = StreamSource::new("numbers", sequence.into_stream());
    let mut count = Fold::new("count", 0_usize, |acc, _sample: NumberSample| acc + 1);
    let _rx_count = count.take_final_rx();
    (source.outlet(), count.inlet()).connect().await;

    let mut g = Graph::default();
    g.push_back(Box::new(source)).await;
    g.push_back(Box::new(count)).await;

    let err = assert_err!(g.run().await);
    tracing::info!(error=?err, "graph run failed as expected");
    Ok(())
}

#[tokio::test]
async fn test_graph_on_cancelled_sequence_is_empty() -> Result<()> {
    once_cell::sync::Lazy::force(&numflow::tracing::TEST_TRACING);

    let request = GenerationRequest::new(10, DelayRange::default());
    let sequence = NumberSequence::new(request, fixtures::seeded(4), CancellationSignal::cancelled_now());

    let source = StreamSource::new("numbers", sequence.into_stream());
    let mut count = Fold::new("count", 0_usize, |acc, _sample: NumberSample| acc + 1);
    let rx_count = assert_some!(count.take_final_rx());
    (source.outlet(), count.inlet()).connect().await;

    let mut g = Graph::default();
    g.push_back(Box::new(source)).await;
    g.push_back(Box::new(count)).await;
    g.run().await?;

    assert_eq!(rx_count.await?, 0);
    Ok(())
}
