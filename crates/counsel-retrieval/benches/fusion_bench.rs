use criterion::{black_box, criterion_group, criterion_main, Criterion};

use counsel_core::config::{FusionConfig, RouterConfig};
use counsel_core::models::{AdviceQuery, AdviceRequest, Insight, RetrievalMode};
use counsel_retrieval::fusion::{FusionDoc, FusionScorer};
use counsel_retrieval::RetrievalRouter;

const TOPICS: &[&str] = &[
    "database migrations", "git rebase", "flaky pytest", "css grid", "docker deploy",
    "secret rotation", "kafka offsets", "cache invalidation", "parser recovery", "log rotation",
];

/// A 1K-document corpus with repeated topics.
fn build_corpus(n: usize) -> Vec<Insight> {
    (0..n)
        .map(|i| {
            let topic = TOPICS[i % TOPICS.len()];
            Insight::new(
                format!("k{i}"),
                "bench",
                format!("When working on {topic} check the {topic} runbook before step {i}"),
                0.5,
            )
        })
        .collect()
}

fn bench_score_batch(c: &mut Criterion) {
    let corpus = build_corpus(1_000);
    let docs: Vec<FusionDoc<'_>> = corpus.iter().map(|i| FusionDoc::lexical(&i.text)).collect();
    let scorer = FusionScorer::new(FusionConfig::default());

    c.bench_function("fusion_score_batch_1k", |b| {
        b.iter(|| scorer.score_batch(black_box("rebase the git branch before deploy"), &docs));
    });
}

fn bench_route_primary(c: &mut Criterion) {
    let corpus = build_corpus(1_000);
    let router = RetrievalRouter::new(
        RouterConfig {
            mode: RetrievalMode::EmbeddingsOnly,
            ..RouterConfig::default()
        },
        FusionConfig::default(),
    );
    let query = AdviceQuery::from_request(
        &AdviceRequest::new("Bash", serde_json::json!({"command": "alembic upgrade head"}), "database migrations"),
        None,
    );

    c.bench_function("route_primary_1k_prefiltered", |b| {
        b.iter(|| router.route(black_box(&query), &corpus));
    });
}

criterion_group!(benches, bench_score_batch, bench_route_primary);
criterion_main!(benches);
