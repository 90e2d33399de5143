use chrono::{Datelike, Duration as ChronoDuration, Utc, Weekday};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Barrier};
use tokio::task::JoinSet;

const STAGE_SECS: u64 = 10;
const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const CONCURRENT_BOOKERS: usize = 50;

#[derive(Default)]
struct RaceOutcome {
    created: usize,
    duplicates: usize,
    other: Vec<String>,
    latencies: Vec<Duration>,
}

#[tokio::main]
async fn main() {
    let base_url = std::env::var("RACE_PROBE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

    println!("{}", "💈 Booking race probe".bold().green());
    println!("Target URL: {}", base_url);

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client");

    if client.get(format!("{}/health", base_url)).send().await.is_err() {
        eprintln!("{}", format!("❌ Server is NOT reachable at {}. Please start it first.", base_url).red().bold());
        return;
    }

    let service_id = first_id(&client, &format!("{}/api/v1/services", base_url)).await;
    let barber_id = first_id(&client, &format!("{}/api/v1/barbers", base_url)).await;
    let Some((date, time)) = find_open_slot(&client, &base_url, &barber_id, &service_id).await else {
        eprintln!("{}", "❌ No free slot found in the next months.".red().bold());
        return;
    };

    println!("\n{}", "=".repeat(60));
    println!("Same-slot burst: {} bookers → barber {} on {} at {}", CONCURRENT_BOOKERS, barber_id.cyan(), date, time.cyan());
    println!("{}", "=".repeat(60));

    let outcome = same_slot_burst(&client, &base_url, &barber_id, &service_id, &date, &time).await;
    report_race(&outcome);

    println!("\n{}", "=".repeat(60));
    println!("Slot listing under load: {}", format!("{}/api/v1/availability/slots", base_url).cyan().bold());
    println!("{}", "=".repeat(60));
    println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
    println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

    let slots_url = format!(
        "{}/api/v1/availability/slots?barber_id={}&service_id={}&date={}",
        base_url, barber_id, service_id, date
    );
    for rps in [10, 50, 200, 1000] {
        run_stage(&client, &slots_url, rps).await;
    }
}

async fn first_id(client: &Client, url: &str) -> String {
    let body: Value = client.get(url).send().await
        .expect("Catalog request failed")
        .json().await
        .expect("Catalog response is not JSON");

    body.as_array()
        .and_then(|items| items.first())
        .and_then(|item| item["id"].as_str())
        .expect("Catalog is empty")
        .to_string()
}

/// First free slot on a random open weekday a few weeks out, so repeated runs rarely collide.
async fn find_open_slot(client: &Client, base_url: &str, barber_id: &str, service_id: &str) -> Option<(String, String)> {
    let offset = rand::thread_rng().gen_range(14..120);
    let mut date = Utc::now().date_naive() + ChronoDuration::days(offset);

    for _ in 0..60 {
        if !matches!(date.weekday(), Weekday::Sun | Weekday::Fri) {
            let url = format!(
                "{}/api/v1/availability/slots?barber_id={}&service_id={}&date={}",
                base_url, barber_id, service_id, date
            );
            if let Ok(res) = client.get(&url).send().await {
                let body: Value = res.json().await.unwrap_or_default();
                if let Some(slot) = body["slots"].as_array().and_then(|s| s.first()).and_then(Value::as_str) {
                    return Some((date.to_string(), slot.to_string()));
                }
            }
        }
        date += ChronoDuration::days(1);
    }
    None
}

async fn same_slot_burst(client: &Client, base_url: &str, barber_id: &str, service_id: &str, date: &str, time: &str) -> RaceOutcome {
    let barrier = Arc::new(Barrier::new(CONCURRENT_BOOKERS));
    let mut set = JoinSet::new();

    for i in 0..CONCURRENT_BOOKERS {
        let client = client.clone();
        let barrier = barrier.clone();
        let url = format!("{}/api/v1/bookings", base_url);
        let body = json!({
            "service_id": service_id,
            "barber_id": barber_id,
            "date": date,
            "time": time,
            "customer_name": format!("Probe {}", i),
            "customer_phone": format!("9{:07}", i),
        });

        set.spawn(async move {
            barrier.wait().await;
            let started = Instant::now();
            let res = client.post(&url).json(&body).send().await;
            let latency = started.elapsed();

            match res {
                Ok(r) => {
                    let status = r.status();
                    let payload: Value = r.json().await.unwrap_or_default();
                    (status, payload["code"].as_str().map(str::to_string), latency)
                }
                Err(e) => (StatusCode::SERVICE_UNAVAILABLE, Some(e.to_string()), latency),
            }
        });
    }

    let mut outcome = RaceOutcome::default();
    while let Some(joined) = set.join_next().await {
        let Ok((status, code, latency)) = joined else { continue };
        outcome.latencies.push(latency);
        match (status, code.as_deref()) {
            (StatusCode::CREATED, _) => outcome.created += 1,
            (StatusCode::CONFLICT, Some("DUPLICATE_BOOKING")) => outcome.duplicates += 1,
            (status, code) => outcome.other.push(format!("{} {}", status, code.unwrap_or("-"))),
        }
    }
    outcome
}

fn report_race(outcome: &RaceOutcome) {
    let mut histogram = Histogram::<u64>::new(3).expect("Histogram bounds");
    for latency in &outcome.latencies {
        let _ = histogram.record(latency.as_micros() as u64);
    }

    println!("{:<22} {}", "Confirmed:", outcome.created);
    println!("{:<22} {}", "Duplicate rejections:", outcome.duplicates);
    println!("{:<22} {}", "Other responses:", outcome.other.len());
    for other in &outcome.other {
        println!("    {}", other.yellow());
    }
    println!(
        "{:<22} mean {:.2} ms, p99 {:.2} ms",
        "Latency:",
        histogram.mean() / 1000.0,
        histogram.value_at_quantile(0.99) as f64 / 1000.0
    );

    if outcome.created == 1 {
        println!("{}", "✅ Exactly one booking won the slot.".green().bold());
    } else {
        println!("{}", format!("❌ {} bookings were confirmed for the same slot.", outcome.created).red().bold());
    }
}

async fn run_stage(client: &Client, url: &str, rps: u32) {
    let Some(per_second) = NonZeroU32::new(rps) else { return };
    let limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(STAGE_SECS);

    while start_time.elapsed() <= duration {
        if limiter.check().is_ok() {
            let client = client.clone();
            let url = url.to_string();
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let success = matches!(client.get(&url).send().await, Ok(r) if r.status().is_success());
                let _ = tx.send((req_start.elapsed(), success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).expect("Histogram bounds");
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        let _ = histogram.record(latency.as_micros() as u64);
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}
