use hai_sweep::{analyze, run_sweep, AnalysisOutcome, FeatureMatrix, MetricKind, SweepConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Three Gaussian blobs, swept across and past the blob size.
    // Run with RUST_LOG=info to see the sweep summary.
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 0.6)?;
    let centers = [(0.0, 0.0), (8.0, 1.0), (4.0, 7.0)];

    let mut rows = Vec::new();
    let mut truth = Vec::new();
    for (label, (cx, cy)) in centers.into_iter().enumerate() {
        for _ in 0..30 {
            rows.push(vec![cx + noise.sample(&mut rng), cy + noise.sample(&mut rng)]);
            truth.push(label as i32);
        }
    }
    let features = FeatureMatrix::from_rows(&rows)?;

    let config = SweepConfig::new(2, 45)
        .with_step(3)
        .with_metric(MetricKind::Euclidean);
    let outcome = run_sweep(&features, &config)?;

    println!("param  clusters  noise  ARI    AMI    NMI");
    for (param, run) in &outcome.runs {
        let scores = run.external_scores(&truth)?;
        println!(
            "{param:>5}  {:>8}  {:>5}  {:.3}  {:.3}  {:.3}",
            run.n_clusters(),
            run.noise_points(),
            scores.ari,
            scores.ami,
            scores.nmi
        );
    }
    for (param, err) in &outcome.skipped {
        println!("{param:>5}  skipped: {err}");
    }

    let result = AnalysisOutcome::from(analyze(&outcome));
    if let AnalysisOutcome::Analysis(analysis) = &result {
        println!("\nrepresentative parameter values:");
        for (label, param) in &analysis.medoids {
            println!("  meta-cluster {label}: {param}");
        }
    }
    println!("\n{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
