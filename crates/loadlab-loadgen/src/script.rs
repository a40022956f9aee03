use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::client::ApiClient;

#[derive(Debug, Clone)]
pub struct ScriptConfig {
    pub base_url: String,
    /// Concurrent user creations in the bulk-create phase.
    pub users: usize,
    /// Concurrent post creations in the dependent-create phase.
    pub posts: usize,
    /// Posts cycle their owner through ids `1..=owner_pool`.
    pub owner_pool: usize,
    /// Iterations of the burst compute phase.
    pub compute_ops: usize,
    /// Wall-clock duration of the continuous mixed-load phase.
    pub mixed_secs: u64,
    /// Pause between mixed-load iterations.
    pub pause: Duration,
}

impl ScriptConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_or("LOADGEN_BASE_URL", "http://localhost:8000"),
            users: env_parse("LOADGEN_USERS", 10),
            posts: env_parse("LOADGEN_POSTS", 20),
            owner_pool: 5,
            compute_ops: env_parse("LOADGEN_COMPUTE_OPS", 20),
            mixed_secs: env_parse("LOADGEN_MIXED_SECS", 60),
            pause: Duration::from_millis(100),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug)]
pub struct PhaseOutcome {
    pub name: &'static str,
    pub ok: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct ScriptReport {
    pub probe_ok: bool,
    pub phases: Vec<PhaseOutcome>,
    pub mixed_iterations: u64,
}

impl ScriptReport {
    pub fn completed_phases(&self) -> usize {
        self.phases.len()
    }
}

/// Runs the full load script. Within a phase every call is issued before
/// any join, each outcome is captured, and no individual failure aborts
/// the phase. Only a failed initial probe is fatal; nothing is retried
/// and nothing in flight is ever cancelled.
pub async fn run(client: &ApiClient, cfg: &ScriptConfig) -> ScriptReport {
    let mut report = ScriptReport {
        probe_ok: false,
        phases: Vec::new(),
        mixed_iterations: 0,
    };

    // Probe: later phases assume a reachable service.
    match client.health().await {
        Ok(h) => {
            info!("Health probe ok: {} / {}", h.status, h.database);
            report.probe_ok = true;
        }
        Err(e) => {
            error!("Health probe failed, aborting script: {}", e);
            return report;
        }
    }

    // Bulk user creation.
    let mut tasks = Vec::with_capacity(cfg.users);
    for i in 0..cfg.users {
        let c = client.clone();
        tasks.push(tokio::spawn(async move { c.create_user(i).await.map(|_| ()) }));
    }
    report.phases.push(join_phase("bulk-create", tasks).await);

    // Dependent creates, owners cycling through a small pool.
    let mut tasks = Vec::with_capacity(cfg.posts);
    for i in 0..cfg.posts {
        let c = client.clone();
        let owner_id = (i % cfg.owner_pool + 1) as i64;
        tasks.push(tokio::spawn(async move {
            c.create_post(owner_id, i).await.map(|_| ())
        }));
    }
    report.phases.push(join_phase("dependent-create", tasks).await);

    // Burst compute with randomized parameters from fixed ranges.
    let mut tasks = Vec::with_capacity(cfg.compute_ops * 2);
    for i in 0..cfg.compute_ops {
        let c = client.clone();
        let n = rand::random_range(30..=35);
        tasks.push(tokio::spawn(async move { c.fibonacci(n).await.map(|_| ()) }));

        if i % 2 == 0 {
            let c = client.clone();
            let n = rand::random_range(1_000_000..=5_000_000);
            tasks.push(tokio::spawn(async move { c.sum(n).await.map(|_| ()) }));
        }
    }
    report.phases.push(join_phase("burst-compute", tasks).await);

    // Continuous mixed load until the wall-clock deadline. The final
    // in-flight iteration completes; termination only means "stop
    // issuing new iterations".
    let started = Instant::now();
    let deadline = Duration::from_secs(cfg.mixed_secs);
    let (mut ok, mut failed) = (0, 0);
    while started.elapsed() < deadline {
        let mut tasks = Vec::new();

        let c = client.clone();
        tasks.push(tokio::spawn(async move { c.health().await.map(|_| ()) }));

        if report.mixed_iterations % 3 == 0 {
            let c = client.clone();
            tasks.push(tokio::spawn(
                async move { c.list_users(0, 20).await.map(|_| ()) },
            ));
        }

        if report.mixed_iterations % 5 == 0 {
            let c = client.clone();
            let n = rand::random_range(25..=30);
            tasks.push(tokio::spawn(async move { c.fibonacci(n).await.map(|_| ()) }));
        }

        let (iter_ok, iter_failed) = settle(tasks).await;
        ok += iter_ok;
        failed += iter_failed;
        report.mixed_iterations += 1;

        tokio::time::sleep(cfg.pause).await;
    }
    info!(
        "Completed {} operation cycles in {:.1?}",
        report.mixed_iterations,
        started.elapsed()
    );
    report.phases.push(PhaseOutcome {
        name: "mixed-load",
        ok,
        failed,
    });

    report
}

/// Awaits every task, counting each settled outcome. A failing call never
/// cancels its siblings.
async fn settle(tasks: Vec<JoinHandle<anyhow::Result<()>>>) -> (usize, usize) {
    let mut ok = 0;
    let mut failed = 0;
    for result in join_all(tasks).await {
        match result {
            Ok(Ok(())) => ok += 1,
            Ok(Err(e)) => {
                failed += 1;
                debug!("Call failed: {}", e);
            }
            Err(e) => {
                failed += 1;
                warn!("Task join error: {}", e);
            }
        }
    }
    (ok, failed)
}

async fn join_phase(
    name: &'static str,
    tasks: Vec<JoinHandle<anyhow::Result<()>>>,
) -> PhaseOutcome {
    let issued = tasks.len();
    let (ok, failed) = settle(tasks).await;
    info!(
        "Phase {} complete: {}/{} ok, {} failed",
        name, ok, issued, failed
    );
    PhaseOutcome { name, ok, failed }
}
