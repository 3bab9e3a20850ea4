use std::io;

use anyhow::Result;
use criterion::{black_box, criterion_group, BenchmarkId, Criterion};
use numflow::elements::{CancellationSignal, DelayRange, GenerationRequest, NumberSample, SeededRandomness};
use numflow::flow::{consume, Outcome, TextOutput};
use numflow::graph::stage::{Filter, Fold, StreamSource};
use numflow::graph::{Connect, Graph, SinkShape, SourceShape};
use numflow::{is_odd, NumberSequence};

const SEED: u64 = 42;

fn sequence(count: usize) -> NumberSequence<SeededRandomness> {
    let request = GenerationRequest::new(count, DelayRange::none());
    NumberSequence::new(request, SeededRandomness::seeded(SEED), CancellationSignal::new())
}

async fn run_pull(count: usize) -> Result<Outcome> {
    let output = TextOutput::new(io::sink());
    Ok(consume(sequence(count).into_stream(), is_odd, output).await?)
}

async fn run_graph(count: usize) -> Result<usize> {
    let source = StreamSource::new("numbers", sequence(count).into_stream());
    let odd = Filter::new("odd_numbers", is_odd);
    let mut tally = Fold::new("tally", 0_usize, |acc, _sample: NumberSample| acc + 1);
    let rx_tally = tally.take_final_rx();

    (source.outlet(), odd.inlet()).connect().await;
    (odd.outlet(), tally.inlet()).connect().await;

    let mut g = Graph::default();
    g.push_back(Box::new(source)).await;
    g.push_back(Box::new(odd)).await;
    g.push_back(Box::new(tally)).await;
    g.run().await?;

    match rx_tally {
        Some(rx) => Ok(rx.await?),
        None => anyhow::bail!("tally receiver already taken"),
    }
}

fn benchmark_pipelines(c: &mut Criterion) {
    let mut group = c.benchmark_group("odd_number_pipeline");

    for count in [10_usize, 1_000] {
        group.bench_with_input(BenchmarkId::new("pull", count), &count, |b, &count| {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            b.to_async(rt)
                .iter(|| async move { black_box(run_pull(count).await.expect("pull scenario failed")) })
        });

        group.bench_with_input(BenchmarkId::new("graph", count), &count, |b, &count| {
            let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();
            b.to_async(rt)
                .iter(|| async move { black_box(run_graph(count).await.expect("graph scenario failed")) })
        });
    }

    group.finish();
}

criterion_group!(pipelines, benchmark_pipelines);
