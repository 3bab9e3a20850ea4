use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future;
use futures::stream::TryStreamExt;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use super::{bridge, consume, is_odd, NumberSequence, Outcome, Pipeline, TextOutput};
use crate::elements::{CancellationSignal, GenerationRequest, NumberSample, Randomness};
use crate::error::PipelineError;
use crate::graph::stage::{Filter, Foreach, StreamSource};
use crate::graph::{Connect, Graph, SinkShape, SourceShape};
use crate::NumflowResult;

/// The production and consumption styles the demo contrasts. Every variant filters odd samples
/// and writes them to the same output, so with the same randomness they print the same text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Variant {
    /// consumer-driven async iteration over the sample stream.
    Pull,
    /// driver-owned task pushing samples into a subscriber.
    Push,
    /// pull-mode stream adapted into a push-mode subscription.
    Bridge,
    /// stream combinators with per-sample callbacks.
    Callback,
    /// reactive stage graph: stream source, filter stage, foreach sink.
    Graph,
}

impl Variant {
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// Runs one pipeline: generates `request.count()` samples (fewer if `signal` is cancelled), writes
/// the odd ones to `output` and finishes with the completion marker.
#[tracing::instrument(level = "info", skip(randomness, signal, output))]
pub async fn run_variant<R, W>(
    variant: Variant, request: GenerationRequest, randomness: R, signal: CancellationSignal, output: TextOutput<W>,
) -> NumflowResult<Outcome>
where
    R: Randomness + 'static,
    W: Write + Send + 'static,
{
    let sequence = NumberSequence::new(request, randomness, signal);

    let outcome = match variant {
        Variant::Pull => run_pull(sequence, output).await?,
        Variant::Push => run_push(sequence, output).await?,
        Variant::Bridge => run_bridge(sequence, output).await?,
        Variant::Callback => run_callback(sequence, output).await?,
        Variant::Graph => run_graph(sequence, output).await?,
    };

    tracing::info!(?outcome, "variant run finished");
    Ok(outcome)
}

async fn run_pull<R, W>(sequence: NumberSequence<R>, output: TextOutput<W>) -> Result<Outcome, PipelineError>
where
    R: Randomness + 'static,
    W: Write + Send + 'static,
{
    consume(sequence.into_stream(), is_odd, output).await
}

async fn run_push<R, W>(sequence: NumberSequence<R>, output: TextOutput<W>) -> Result<Outcome, PipelineError>
where
    R: Randomness + 'static,
    W: Write + Send + 'static,
{
    let pipeline = sequence.spawn(Pipeline::new(is_odd, output)).await??;
    Ok(pipeline.outcome())
}

async fn run_bridge<R, W>(sequence: NumberSequence<R>, output: TextOutput<W>) -> Result<Outcome, PipelineError>
where
    R: Randomness + 'static,
    W: Write + Send + 'static,
{
    let pipeline = bridge(sequence.into_stream())
        .subscribe(Pipeline::new(is_odd, output))
        .await?;
    Ok(pipeline.outcome())
}

async fn run_callback<R, W>(sequence: NumberSequence<R>, output: TextOutput<W>) -> Result<Outcome, PipelineError>
where
    R: Randomness + 'static,
    W: Write + Send + 'static,
{
    let mut observed = 0;
    let mut passed = 0;

    sequence
        .into_stream()
        .map_err(PipelineError::from)
        .inspect_ok(|_| observed += 1)
        .try_filter(|sample| future::ready(is_odd(sample)))
        .try_for_each(|sample| {
            passed += 1;
            future::ready(output.write_sample(sample))
        })
        .await?;

    output.write_completed()?;
    Ok(Outcome { observed, passed, completed: true })
}

async fn run_graph<R, W>(sequence: NumberSequence<R>, output: TextOutput<W>) -> NumflowResult<Outcome>
where
    R: Randomness + 'static,
    W: Write + Send + 'static,
{
    let observed = Arc::new(AtomicUsize::new(0));

    let source = StreamSource::new("numbers", sequence.into_stream());

    let filter_observed = Arc::clone(&observed);
    let odd = Filter::new("odd_numbers", move |sample: &NumberSample| {
        filter_observed.fetch_add(1, Ordering::Relaxed);
        is_odd(sample)
    });

    let sink_output = output.clone();
    let mut print = Foreach::new("print", move |sample: NumberSample| sink_output.write_sample(sample));
    let rx_complete = print.take_completion_rx();

    (source.outlet(), odd.inlet()).connect().await;
    (odd.outlet(), print.inlet()).connect().await;

    let mut g = Graph::default();
    g.push_back(Box::new(source)).await;
    g.push_back(Box::new(odd)).await;
    g.push_back(Box::new(print)).await;
    g.run().await?;

    let passed = match rx_complete {
        Some(rx) => rx.await.map_err(|err| PipelineError::Action(err.into()))?,
        None => 0,
    };

    output.write_completed()?;
    Ok(Outcome {
        observed: observed.load(Ordering::Relaxed),
        passed,
        completed: true,
    })
}

#[cfg(test)]
mod tests {
    use claim::*;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::elements::{DelayRange, ScriptedRandomness};
    use crate::error::MetricLabel;

    const SCRIPT: [u8; 10] = [3, 4, 7, 2, 5, 0, 1, 8, 9, 6];

    struct ClosedWriter;

    impl Write for ClosedWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "output closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_variant_names() {
        let names: Vec<String> = Variant::all().iter().map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["pull", "push", "bridge", "callback", "graph"]);
    }

    #[tokio::test]
    async fn test_every_variant_prints_odd_samples() {
        for variant in Variant::all() {
            let output = TextOutput::buffer();
            let randomness = assert_ok!(ScriptedRandomness::new(SCRIPT));
            let request = GenerationRequest::new(10, DelayRange::none());

            let outcome = assert_ok!(
                run_variant(variant, request, randomness, CancellationSignal::new(), output.clone()).await
            );

            assert_eq!(outcome, Outcome { observed: 10, passed: 5, completed: true }, "variant {}", variant);
            assert_eq!(assert_ok!(output.contents()), "3 7 5 1 9 Completed", "variant {}", variant);
        }
    }

    #[tokio::test]
    async fn test_cancelled_variants_print_only_completed() {
        for variant in Variant::all() {
            let output = TextOutput::buffer();
            let randomness = assert_ok!(ScriptedRandomness::new(SCRIPT));
            let request = GenerationRequest::new(10, DelayRange::default());

            let outcome = assert_ok!(
                run_variant(variant, request, randomness, CancellationSignal::cancelled_now(), output.clone()).await
            );

            assert_eq!(outcome, Outcome { observed: 0, passed: 0, completed: true }, "variant {}", variant);
            assert_eq!(assert_ok!(output.contents()), "Completed", "variant {}", variant);
        }
    }

    #[tokio::test]
    async fn test_exhausted_randomness_fails_run() {
        for variant in Variant::all() {
            let output = TextOutput::buffer();
            let randomness = assert_ok!(ScriptedRandomness::new([1, 3]));
            let request = GenerationRequest::new(5, DelayRange::none());

            assert_err!(run_variant(variant, request, randomness, CancellationSignal::new(), output.clone()).await);
            assert_eq!(assert_ok!(output.contents()), "1 3 ", "variant {}", variant);
        }
    }

    #[tokio::test]
    async fn test_output_failure_is_reported_by_every_variant() {
        for variant in Variant::all() {
            let randomness = assert_ok!(ScriptedRandomness::new(SCRIPT));
            let request = GenerationRequest::new(10, DelayRange::none());
            let output = TextOutput::new(ClosedWriter);

            let err = assert_err!(run_variant(variant, request, randomness, CancellationSignal::new(), output).await);
            assert!(!err.is_port_disconnect(), "variant {}: {}", variant, err);
            assert!(err.label().ends_with("pipeline::output"), "variant {}: {}", variant, err.label());
        }
    }
}
