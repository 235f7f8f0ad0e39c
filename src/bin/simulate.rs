use anyhow::Context;
use clap::Parser;
use maze_chase::autopilot::{Autopilot, InputSource};
use maze_chase::config::GameConfig;
use maze_chase::constants::TICK_MS;
use maze_chase::engine::GameEngine;
use maze_chase::render::NullRenderer;
use maze_chase::score::BestScoreStore;
use maze_chase::store::{JsonBestScoreStore, MemoryBestScoreStore};
use maze_chase::types::{GameOverReason, GamePhase, ItemKind, RuntimeEvent, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_MAX_TICKS: u64 = 60 * 60 * 10;

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs seeded autopilot games headlessly")]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 2)]
    scenarios: usize,
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: u64,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    best_score_file: Option<PathBuf>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    #[arg(long)]
    run_id: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u64,
    #[serde(rename = "maxTicks")]
    max_ticks: u64,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u64,
    /// `None` when the tick ceiling was reached first.
    reason: Option<GameOverReason>,
    #[serde(rename = "finalScore")]
    final_score: u64,
    #[serde(rename = "bestScore")]
    best_score: u64,
    level: u32,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    #[serde(rename = "dotsEaten")]
    dots_eaten: u32,
    #[serde(rename = "itemsCollected")]
    items_collected: u32,
    #[serde(rename = "enemiesDefeated")]
    enemies_defeated: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    #[serde(rename = "levelsCleared")]
    levels_cleared: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u64,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => GameConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed_hint, run_started_at_ms));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({ "maxTicks": scenario.max_ticks }),
        );
        let store = open_store(cli.best_score_file.as_deref());
        let scenario_run = run_scenario(&scenario, config.clone(), store);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        *reason_counts
            .entry(reason_key(scenario_run.result.reason))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "reason": scenario_run.result.reason,
                "finalScore": scenario_run.result.final_score,
                "level": scenario_run.result.level,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).context("serializing scenario result")?
        );
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        run_id.clone(),
        run_started_at_ms,
        now_ms(),
        scenario_results,
        reason_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "reasonCounts": summary.reason_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
    Ok(())
}

fn open_store(path: Option<&Path>) -> Box<dyn BestScoreStore> {
    match path {
        Some(path) => Box::new(JsonBestScoreStore::new(path.to_path_buf())),
        None => Box::new(MemoryBestScoreStore::default()),
    }
}

#[derive(Debug, Default)]
struct EventTally {
    dots_eaten: u32,
    items_collected: u32,
    enemies_defeated: u32,
    lives_lost: u32,
    levels_cleared: u32,
}

impl EventTally {
    fn record(&mut self, event: &RuntimeEvent) {
        match event {
            RuntimeEvent::ItemCollected { kind, .. } => {
                self.items_collected += 1;
                if *kind == ItemKind::Dot {
                    self.dots_eaten += 1;
                }
            }
            RuntimeEvent::EnemyDefeated { .. } => self.enemies_defeated += 1,
            RuntimeEvent::LifeLost { .. } => self.lives_lost += 1,
            RuntimeEvent::LevelCompleted { .. } => self.levels_cleared += 1,
            _ => {}
        }
    }
}

fn run_scenario(
    scenario: &Scenario,
    config: GameConfig,
    store: Box<dyn BestScoreStore>,
) -> ScenarioRunResult {
    let mut engine = GameEngine::new(config, scenario.seed, store);
    let mut pilot = Autopilot::default();
    let mut renderer = NullRenderer;
    let mut tally = EventTally::default();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut previous_score = 0u64;
    let mut last_tick = 0u64;

    while !engine.is_ended() {
        if last_tick >= scenario.max_ticks {
            log::info!("{}: tick ceiling {} reached", scenario.name, scenario.max_ticks);
            break;
        }
        let input = pilot.next_input(&engine);
        engine.step(TICK_MS, &input);
        let snapshot = engine.present(&mut renderer);
        last_tick = snapshot.tick;
        for message in collect_snapshot_anomalies(&engine, &snapshot, previous_score) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        previous_score = snapshot.hud.score;
        for event in &snapshot.events {
            tally.record(event);
        }
    }

    let summary = engine.build_summary();
    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            reason: summary.reason,
            final_score: summary.final_score,
            best_score: summary.best_score,
            level: summary.level,
            duration_ms: summary.duration_ms,
            dots_eaten: tally.dots_eaten,
            items_collected: tally.items_collected,
            enemies_defeated: tally.enemies_defeated,
            lives_lost: tally.lives_lost,
            levels_cleared: tally.levels_cleared,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    }
}

fn collect_snapshot_anomalies(
    engine: &GameEngine,
    snapshot: &Snapshot,
    previous_score: u64,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.hud.score < previous_score {
        anomalies.push(format!(
            "score decreased: {previous_score} -> {}",
            snapshot.hud.score
        ));
    }
    if snapshot.hud.best_score < snapshot.hud.score {
        anomalies.push(format!(
            "best score {} behind score {}",
            snapshot.hud.best_score, snapshot.hud.score
        ));
    }
    if snapshot.hud.lives == 0 && snapshot.phase != GamePhase::GameOver {
        anomalies.push(format!("no lives left in phase {:?}", snapshot.phase));
    }
    if !snapshot.player.x.is_finite() || !snapshot.player.y.is_finite() {
        anomalies.push("player position is not finite".to_string());
    }
    for enemy in snapshot.enemies.iter().filter(|enemy| enemy.active) {
        if !enemy.x.is_finite() || !enemy.y.is_finite() {
            anomalies.push(format!("enemy {} position is not finite", enemy.id));
            continue;
        }
        let cell = engine.cell_at(glam::Vec2::new(enemy.x, enemy.y));
        if !engine.maze().is_open(cell) {
            anomalies.push(format!(
                "enemy {} inside wall at ({}, {})",
                enemy.id, cell.x, cell.y
            ));
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = cli.seed.unwrap_or_else(now_ms);
    (0..cli.scenarios.max(1))
        .map(|index| {
            let scenario_seed = seed.wrapping_add(index as u64);
            Scenario {
                name: format!("autopilot-{}", index + 1),
                seed: scenario_seed,
                max_ticks: cli.max_ticks,
            }
        })
        .collect()
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u64, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    reason_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let total_score: u64 = scenarios.iter().map(|scenario| scenario.final_score).sum();
    let average_score = if scenario_count == 0 {
        0
    } else {
        total_score / scenario_count as u64
    };
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        average_score,
        reason_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    scenario: Option<&str>,
    seed: Option<u64>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(text) => eprintln!("{text}"),
        Err(error) => log::error!("structured log failed to serialize: {error}"),
    }
}

fn reason_key(reason: Option<GameOverReason>) -> String {
    match reason {
        Some(GameOverReason::Victory) => "victory",
        Some(GameOverReason::OutOfLives) => "out_of_lives",
        None => "tick_limit",
    }
    .to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_scenario_result(reason: Option<GameOverReason>, final_score: u64) -> ScenarioResultLine {
        ScenarioResultLine {
            scenario: "test".to_string(),
            seed: 42,
            reason,
            final_score,
            best_score: final_score,
            level: 1,
            duration_ms: 60_000,
            dots_eaten: 0,
            items_collected: 0,
            enemies_defeated: 0,
            lives_lost: 0,
            levels_cleared: 0,
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn default_run_id_contains_seed_and_timestamp() {
        assert_eq!(default_run_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn build_run_summary_calculates_average_score() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            1,
            2,
            vec![
                make_scenario_result(Some(GameOverReason::OutOfLives), 1_000),
                make_scenario_result(None, 3_000),
            ],
            BTreeMap::from([
                ("out_of_lives".to_string(), 1usize),
                ("tick_limit".to_string(), 1usize),
            ]),
            0,
        );
        assert_eq!(summary.average_score, 2_000);
        assert_eq!(summary.scenario_count, 2);
    }

    #[test]
    fn scenarios_use_consecutive_seeds() {
        let cli = Cli::parse_from(["simulate", "--seed", "10", "--scenarios", "3"]);
        let scenarios = resolve_scenarios(&cli);
        let seeds: Vec<u64> = scenarios.iter().map(|scenario| scenario.seed).collect();
        assert_eq!(seeds, vec![10, 11, 12]);
        assert_eq!(scenarios[2].name, "autopilot-3");
        assert_eq!(scenarios[0].max_ticks, DEFAULT_MAX_TICKS);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("maze-chase-missing-{}", now_ms()))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            1,
            2,
            vec![make_scenario_result(None, 0)],
            BTreeMap::from([("tick_limit".to_string(), 1usize)]),
            0,
        );
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut records, &mut seen, 10, "same".to_string());
        push_anomaly(&mut anomalies, &mut records, &mut seen, 11, "same".to_string());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn short_autopilot_run_is_clean() {
        let scenario = Scenario {
            name: "smoke".to_string(),
            seed: 7,
            max_ticks: 900,
        };
        let run = run_scenario(
            &scenario,
            GameConfig::default(),
            Box::new(MemoryBestScoreStore::default()),
        );
        assert!(run.result.anomalies.is_empty(), "{:?}", run.result.anomalies);
        assert!(run.result.items_collected > 0);
        assert!(run.finished_tick <= 900);
        assert!(!reason_key(run.result.reason).is_empty());
    }
}
