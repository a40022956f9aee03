use std::sync::Arc;
use std::time::Duration;

use loadlab_api::{AppState, router};
use loadlab_db::Database;
use loadlab_loadgen::client::ApiClient;
use loadlab_loadgen::script::{self, ScriptConfig};

async fn serve() -> (String, Arc<Database>) {
    let db = Arc::new(Database::open_in_memory().expect("open in-memory db"));
    let app = router(AppState { db: db.clone() });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{}", addr), db)
}

fn small_cfg(base_url: String) -> ScriptConfig {
    ScriptConfig {
        base_url,
        users: 4,
        posts: 6,
        owner_pool: 2,
        compute_ops: 1,
        mixed_secs: 1,
        pause: Duration::from_millis(50),
    }
}

#[tokio::test]
async fn probe_failure_aborts_before_any_phase() {
    // Bind then drop to get an address nothing is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let base_url = format!("http://{}", addr);
    let client = ApiClient::new(base_url.clone());
    let report = script::run(&client, &small_cfg(base_url)).await;

    assert!(!report.probe_ok);
    assert_eq!(report.completed_phases(), 0);
    assert_eq!(report.mixed_iterations, 0);
}

#[tokio::test]
async fn script_runs_every_phase_against_a_live_service() {
    let (base_url, db) = serve().await;
    let client = ApiClient::new(base_url.clone());

    let report = script::run(&client, &small_cfg(base_url)).await;

    assert!(report.probe_ok);
    assert_eq!(report.completed_phases(), 4);

    let bulk = &report.phases[0];
    assert_eq!(bulk.name, "bulk-create");
    assert_eq!(bulk.ok, 4);
    assert_eq!(bulk.failed, 0);

    let posts = &report.phases[1];
    assert_eq!(posts.name, "dependent-create");
    assert_eq!(posts.ok, 6);
    assert_eq!(posts.failed, 0);

    let burst = &report.phases[2];
    assert_eq!(burst.name, "burst-compute");
    assert_eq!(burst.failed, 0);

    assert!(report.mixed_iterations >= 1);

    // The service really absorbed the traffic.
    assert_eq!(db.list_users(0, 100).expect("list users").len(), 4);
    assert_eq!(db.list_posts(0, 100).expect("list posts").len(), 6);
}

#[tokio::test]
async fn individual_failures_do_not_abort_a_phase() {
    let (base_url, db) = serve().await;
    let client = ApiClient::new(base_url.clone());
    let cfg = small_cfg(base_url);

    // First run seeds users; the second run's bulk-create phase then
    // fails wholesale on duplicate emails but still completes, and the
    // dependent-create phase still runs after it.
    let first = script::run(&client, &cfg).await;
    assert_eq!(first.phases[0].ok, 4);

    let second = script::run(&client, &cfg).await;
    assert_eq!(second.completed_phases(), 4);
    assert_eq!(second.phases[0].ok, 0);
    assert_eq!(second.phases[0].failed, 4);
    assert_eq!(second.phases[1].ok, 6);

    assert_eq!(db.list_users(0, 100).expect("list users").len(), 4);
    assert_eq!(db.list_posts(0, 100).expect("list posts").len(), 12);
}
