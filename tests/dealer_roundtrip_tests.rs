//! End-to-end rounds against a scripted dealer on a loopback socket.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::JoinHandle;

use qjack::train::runner::{RunConfig, Trainer};
use qjack::train::schedule::{DecayType, EpsilonSchedule};

fn temp_path(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("qjack_dealer_tests");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

/// Serves `rounds` connections. Deals a fixed opening hand, then answers
/// whatever the client plays: HIT draws a 2 (busting after enough of them),
/// RETRY swaps in a 3, and the closing actions settle at fixed rates.
fn spawn_dealer(rounds: u32) -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = std::thread::spawn(move || {
        for _ in 0..rounds {
            let (stream, _) = listener.accept().unwrap();
            serve_round(stream);
        }
    });
    (port, handle)
}

fn serve_round(stream: TcpStream) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut writer = stream;

    writeln!(writer, "{{\"shuffled\": false}}").unwrap();
    writeln!(writer, "{{\"dealer_card\": 5, \"player_cards\": [10, 6]}}").unwrap();

    let mut score: u32 = 16;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap() == 0 {
            return;
        }
        match line.trim() {
            "hit" => {
                score += 2;
                if score > 21 {
                    writeln!(
                        writer,
                        "{{\"player_card\": 2, \"score\": {}, \"status\": \"bust\", \"rate\": -1.0, \"dealer_cards\": [10]}}",
                        score
                    )
                    .unwrap();
                    return;
                }
                writeln!(
                    writer,
                    "{{\"player_card\": 2, \"score\": {}, \"status\": \"continue\", \"rate\": 0.0, \"dealer_cards\": []}}",
                    score
                )
                .unwrap();
            }
            "retry" => {
                writeln!(
                    writer,
                    "{{\"player_card\": 3, \"score\": {}, \"status\": \"continue\", \"rate\": 0.0, \"dealer_cards\": []}}",
                    score
                )
                .unwrap();
            }
            "stand" => {
                writeln!(
                    writer,
                    "{{\"score\": {}, \"status\": \"win\", \"rate\": 1.0, \"dealer_cards\": [10, 2]}}",
                    score
                )
                .unwrap();
                return;
            }
            "double_down" => {
                writeln!(
                    writer,
                    "{{\"player_card\": 4, \"score\": {}, \"status\": \"win\", \"rate\": 1.0, \"dealer_cards\": [10, 2]}}",
                    score + 4
                )
                .unwrap();
                return;
            }
            "surrender" => {
                writeln!(
                    writer,
                    "{{\"score\": {}, \"status\": \"surrendered\", \"rate\": -0.5, \"dealer_cards\": [10]}}",
                    score
                )
                .unwrap();
                return;
            }
            other => panic!("dealer received unknown token: {:?}", other),
        }
    }
}

fn base_config(port: u16, games: u32, history: &str) -> RunConfig {
    RunConfig {
        games,
        dealer_host: "127.0.0.1".to_string(),
        port,
        initial_money: 1000,
        bet: 20,
        alpha: 0.1,
        gamma: 0.9,
        schedule: EpsilonSchedule::new(DecayType::Const, 0.3, 0.05, 1000),
        retry_max: 10,
        retry_penalty_scale: 0.3,
        test_mode: false,
        quiet: true,
        seed: Some(12345),
        load_path: None,
        save_path: None,
        history_path: temp_path(history).to_string_lossy().into_owned(),
        eps_log_path: None,
    }
}

#[test]
fn testmode_greedy_rounds_are_deterministic() {
    // Greedy on an empty table always picks HIT (first in the tie order).
    // The scripted dealer busts the third hit from 16: 18, 20, 22.
    let (port, dealer) = spawn_dealer(2);
    let mut config = base_config(port, 2, "testmode_history.csv");
    config.test_mode = true;

    let mut trainer = Trainer::new(config.clone());
    let summary = trainer.run().unwrap();
    dealer.join().unwrap();

    assert_eq!(summary.games_played, 2);
    // Two busted rounds at the basic bet.
    assert_eq!(summary.total_reward, -40);
    assert_eq!(summary.final_money, 960);
    // Test mode never writes Q-values.
    assert_eq!(summary.q_entries, 0);

    let history = std::fs::read_to_string(&config.history_path).unwrap();
    let rows: Vec<&str> = history.lines().collect();
    // Header plus three hits per round.
    assert_eq!(rows.len(), 1 + 6);
    assert!(rows[1].starts_with("16,2,0,hit,continue,0"));
    assert!(rows[3].ends_with("hit,bust,-20"));
    std::fs::remove_file(&config.history_path).ok();
}

#[test]
fn training_run_learns_and_persists() {
    let (port, dealer) = spawn_dealer(30);
    let mut config = base_config(port, 30, "training_history.csv");
    let save_path = temp_path("trained_qtable.json");
    config.save_path = Some(save_path.to_string_lossy().into_owned());
    let eps_log_path = temp_path("training_eps.csv");
    config.eps_log_path = Some(eps_log_path.to_string_lossy().into_owned());

    let mut trainer = Trainer::new(config.clone());
    let summary = trainer.run().unwrap();
    dealer.join().unwrap();

    assert_eq!(summary.games_played, 30);
    assert!(summary.q_entries > 0, "training must write Q-values");

    // The saved artifact loads back with the same entry count.
    let reloaded =
        qjack::QTable::load_from_file(save_path.to_str().unwrap(), 0.0);
    assert_eq!(reloaded.len(), summary.q_entries);

    // Metadata documents the run.
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&save_path).unwrap()).unwrap();
    assert_eq!(json["meta"]["games"], 30);
    assert_eq!(json["meta"]["eps_decay_type"], "const");

    // One epsilon-log row per game, all at the constant epsilon.
    let eps_log = std::fs::read_to_string(&eps_log_path).unwrap();
    assert_eq!(eps_log.lines().count(), 1 + 30);
    assert!(eps_log.lines().nth(1).unwrap().starts_with("1,0.3,"));

    std::fs::remove_file(&config.history_path).ok();
    std::fs::remove_file(&save_path).ok();
    std::fs::remove_file(&eps_log_path).ok();
}

#[test]
fn seeded_training_runs_are_reproducible() {
    let (port_a, dealer_a) = spawn_dealer(10);
    let config_a = base_config(port_a, 10, "repro_a.csv");
    let summary_a = Trainer::new(config_a.clone()).run().unwrap();
    dealer_a.join().unwrap();

    let (port_b, dealer_b) = spawn_dealer(10);
    let mut config_b = base_config(port_b, 10, "repro_b.csv");
    config_b.port = port_b;
    let summary_b = Trainer::new(config_b.clone()).run().unwrap();
    dealer_b.join().unwrap();

    assert_eq!(summary_a.total_reward, summary_b.total_reward);
    assert_eq!(summary_a.final_money, summary_b.final_money);
    assert_eq!(summary_a.q_entries, summary_b.q_entries);

    let history_a = std::fs::read_to_string(&config_a.history_path).unwrap();
    let history_b = std::fs::read_to_string(&config_b.history_path).unwrap();
    assert_eq!(history_a, history_b);

    std::fs::remove_file(&config_a.history_path).ok();
    std::fs::remove_file(&config_b.history_path).ok();
}
