//! Headless race soak for the edit → debounce → save pipeline: a configurable
//! swarm of entities receives keystroke storms while saves run against an
//! artificial-latency backend, then the run is checked for lost edits,
//! duplicate in-flight saves and payload ordering.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use shukatsu_lib::application::ports::job_board::EntityPatch;
use shukatsu_lib::application::services::{DebounceScheduler, EditBuffer, SaveCoordinator, SavePerformer};
use shukatsu_lib::domain::value_objects::{EntityId, FieldName, FieldValue};
use shukatsu_lib::shared::error::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone)]
struct HarnessConfig {
    entities: usize,
    keystrokes: usize,
    type_interval: Duration,
    debounce: Duration,
    save_latency: Duration,
    fail_every: u64,
    report_path: Option<String>,
}

impl HarnessConfig {
    fn from_env() -> Self {
        Self {
            entities: read_env("SYNC_HARNESS_ENTITIES", 4),
            keystrokes: read_env("SYNC_HARNESS_KEYSTROKES", 40),
            type_interval: Duration::from_millis(read_env("SYNC_HARNESS_TYPE_INTERVAL_MS", 25)),
            debounce: Duration::from_millis(read_env("SYNC_HARNESS_DEBOUNCE_MS", 250)),
            save_latency: Duration::from_millis(read_env("SYNC_HARNESS_SAVE_LATENCY_MS", 120)),
            fail_every: read_env("SYNC_HARNESS_FAIL_EVERY", 0),
            report_path: std::env::var("SYNC_HARNESS_REPORT").ok().filter(|v| !v.is_empty()),
        }
    }
}

fn read_env<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Backend stand-in: sleeps for the configured latency, optionally fails
/// every N-th save, and records every payload it accepted in order.
struct SoakPerformer {
    latency: Duration,
    fail_every: u64,
    calls: AtomicU64,
    concurrent: AtomicU64,
    max_concurrent_per_entity: Mutex<HashMap<EntityId, u64>>,
    accepted: Mutex<HashMap<EntityId, Vec<String>>>,
    in_flight: Mutex<HashMap<EntityId, u64>>,
}

impl SoakPerformer {
    fn new(latency: Duration, fail_every: u64) -> Self {
        Self {
            latency,
            fail_every,
            calls: AtomicU64::new(0),
            concurrent: AtomicU64::new(0),
            max_concurrent_per_entity: Mutex::new(HashMap::new()),
            accepted: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SavePerformer for SoakPerformer {
    async fn perform_save(&self, id: &EntityId, patch: EntityPatch) -> Result<(), AppError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.concurrent.fetch_add(1, Ordering::SeqCst);
        {
            let mut in_flight = self.in_flight.lock().expect("in flight lock");
            let entry = in_flight.entry(id.clone()).or_insert(0);
            *entry += 1;
            let mut maxima = self
                .max_concurrent_per_entity
                .lock()
                .expect("maxima lock");
            let max = maxima.entry(id.clone()).or_insert(0);
            *max = (*max).max(*entry);
        }

        tokio::time::sleep(self.latency).await;

        {
            let mut in_flight = self.in_flight.lock().expect("in flight lock");
            if let Some(entry) = in_flight.get_mut(id) {
                *entry -= 1;
            }
        }
        self.concurrent.fetch_sub(1, Ordering::SeqCst);

        if self.fail_every > 0 && call % self.fail_every == 0 {
            return Err(AppError::Network("injected failure".to_string()));
        }

        let note = patch
            .get(&FieldName::new("note".to_string()).expect("field"))
            .and_then(|value| value.as_str().map(ToString::to_string))
            .unwrap_or_default();
        self.accepted
            .lock()
            .expect("accepted lock")
            .entry(id.clone())
            .or_default()
            .push(note);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct EntityReport {
    entity: String,
    keystrokes: usize,
    saves_accepted: usize,
    final_payload_matches_last_keystroke: bool,
    max_concurrent_saves: u64,
}

#[derive(Debug, Serialize)]
struct HarnessReport {
    started_at: String,
    elapsed_ms: u128,
    entities: usize,
    keystrokes_per_entity: usize,
    total_saves: u64,
    entity_reports: Vec<EntityReport>,
    all_final_payloads_correct: bool,
    no_concurrent_saves_per_entity: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    shukatsu_lib::init_logging();
    let config = HarnessConfig::from_env();
    info!(?config, "starting sync harness");

    let started_at = Utc::now();
    let start = Instant::now();

    let performer = Arc::new(SoakPerformer::new(config.save_latency, config.fail_every));
    let coordinator = Arc::new(SaveCoordinator::new(
        performer.clone() as Arc<dyn SavePerformer>,
    ));
    let buffer = Arc::new(Mutex::new(EditBuffer::new()));
    let scheduler = Arc::new(DebounceScheduler::new());

    let note = FieldName::new("note".to_string()).expect("field");
    let base_revision = Utc::now();

    // 1エンティティ = 1人の編集セッション。キーストロークごとにバッファへ
    // 書き、デバウンスを叩く。
    let typists = (0..config.entities).map(|index| {
        let buffer = Arc::clone(&buffer);
        let scheduler = Arc::clone(&scheduler);
        let coordinator = Arc::clone(&coordinator);
        let note = note.clone();
        let config = config.clone();

        tokio::spawn(async move {
            let id = EntityId::new(format!("entity-{index}")).expect("entity id");
            for stroke in 1..=config.keystrokes {
                let text = format!("entity-{index}:draft-{stroke}");
                buffer
                    .lock()
                    .expect("buffer lock")
                    .set(&id, &note, FieldValue::text(text), base_revision);

                let fire_buffer = Arc::clone(&buffer);
                let fire_coordinator = Arc::clone(&coordinator);
                let fire_id = id.clone();
                scheduler.touch(id.clone(), config.debounce, move || async move {
                    let patch = fire_buffer
                        .lock()
                        .expect("buffer lock")
                        .snapshot(&fire_id);
                    let _ = fire_coordinator.commit(fire_id, patch).await;
                });

                tokio::time::sleep(config.type_interval).await;
            }
            id
        })
    });

    let ids: Vec<EntityId> = futures::future::join_all(typists)
        .await
        .into_iter()
        .collect::<std::result::Result<_, _>>()?;

    // Drain: wait for the trailing debounce fire and its save to land.
    tokio::time::sleep(config.debounce + config.save_latency * 3 + Duration::from_millis(200)).await;
    while ids.iter().any(|id| coordinator.is_in_flight(id)) || scheduler.pending_count() > 0 {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let accepted = performer.accepted.lock().expect("accepted lock").clone();
    let maxima = performer
        .max_concurrent_per_entity
        .lock()
        .expect("maxima lock")
        .clone();

    let entity_reports: Vec<EntityReport> = ids
        .iter()
        .map(|id| {
            let payloads = accepted.get(id).cloned().unwrap_or_default();
            let expected_final = format!("{id}:draft-{}", config.keystrokes);
            EntityReport {
                entity: id.to_string(),
                keystrokes: config.keystrokes,
                saves_accepted: payloads.len(),
                final_payload_matches_last_keystroke: payloads.last()
                    == Some(&expected_final),
                max_concurrent_saves: maxima.get(id).copied().unwrap_or(0),
            }
        })
        .collect();

    let report = HarnessReport {
        started_at: started_at.to_rfc3339(),
        elapsed_ms: start.elapsed().as_millis(),
        entities: config.entities,
        keystrokes_per_entity: config.keystrokes,
        total_saves: performer.calls.load(Ordering::SeqCst),
        all_final_payloads_correct: entity_reports
            .iter()
            .all(|r| r.final_payload_matches_last_keystroke),
        no_concurrent_saves_per_entity: entity_reports
            .iter()
            .all(|r| r.max_concurrent_saves <= 1),
        entity_reports,
    };

    let rendered = serde_json::to_string_pretty(&report)?;
    match &config.report_path {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            info!(path = %path, "report written");
        }
        None => println!("{rendered}"),
    }

    // 失敗注入なしの走行でのみ「最終ペイロード＝最後のキーストローク」を
    // 強制する。注入ありでは失敗した保存はリトライされない。
    if config.fail_every == 0 && !report.all_final_payloads_correct {
        anyhow::bail!("lost edits detected: a final payload does not match the last keystroke");
    }
    if !report.no_concurrent_saves_per_entity {
        anyhow::bail!("overlapping saves detected for a single entity");
    }
    info!(
        total_saves = report.total_saves,
        elapsed_ms = report.elapsed_ms as u64,
        "sync harness passed"
    );
    Ok(())
}
