//! Job lifecycle tests
//!
//! Templates flowing through the job manager: new blocks, stale templates,
//! same-height updates, retention and the events each one produces.

use aion_pool_core::config::{Config, RewardType};
use aion_pool_core::core::{AlgorithmRegistry, HeaderOnlyVerifier};
use aion_pool_core::job::{JobEvent, JobManager, JobManagerOptions, RawTemplate};
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

fn template(previous: &str, height: u64) -> RawTemplate {
    serde_json::from_value(json!({
        "previousblockhash": previous.repeat(32),
        "height": height,
        "target": "000000000000ffff000000000000000000000000000000000000000000000000",
        "reward": 1_500_000_000u64,
        "blockHeader": {
            "parentHash": previous.repeat(32),
            "coinBase": "a1".repeat(32),
            "stateRoot": "b2".repeat(32),
            "txTrieRoot": "c3".repeat(32),
            "receiptTrieRoot": "d4".repeat(32),
            "logsBloom": "00".repeat(256),
            "difficulty": "0x1f3a9c",
            "timestamp": 1_540_000_000u64,
            "number": height,
            "extraData": "",
            "energyConsumed": 0,
            "energyLimit": 15_000_000u64
        }
    }))
    .unwrap()
}

fn manager(max_valid_jobs: usize) -> (JobManager, UnboundedReceiver<JobEvent>) {
    let options = JobManagerOptions {
        instance_id: Some(2),
        max_valid_jobs,
        ..JobManagerOptions::default()
    };
    let registry = AlgorithmRegistry::standard(Arc::new(HeaderOnlyVerifier));
    JobManager::channel(options, &registry).unwrap()
}

fn drain(rx: &mut UnboundedReceiver<JobEvent>) -> Vec<JobEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

#[test]
fn test_first_template_creates_job() {
    let (manager, mut rx) = manager(0);
    assert!(manager.current_job().is_none());

    assert!(manager.process_template(template("01", 100)).unwrap());

    let job = manager.current_job().unwrap();
    assert_eq!(job.job_id(), "1");
    assert_eq!(job.height(), 100);
    assert_eq!(job.difficulty(), 65536.0);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], JobEvent::NewBlock(j) if Arc::ptr_eq(j, &job)));
}

#[test]
fn test_duplicate_and_stale_templates_are_ignored() {
    let (manager, mut rx) = manager(0);
    manager.process_template(template("01", 100)).unwrap();
    drain(&mut rx);

    assert!(!manager.process_template(template("01", 101)).unwrap());
    assert!(!manager.process_template(template("02", 99)).unwrap());

    assert_eq!(manager.current_job().unwrap().job_id(), "1");
    assert_eq!(manager.valid_job_count(), 1);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_new_block_keeps_previous_jobs_valid() {
    let (manager, mut rx) = manager(0);
    manager.process_template(template("01", 100)).unwrap();
    manager.process_template(template("02", 101)).unwrap();
    manager.process_template(template("03", 101)).unwrap();

    assert_eq!(manager.current_job().unwrap().job_id(), "3");
    assert_eq!(manager.valid_job_count(), 3);
    for id in ["1", "2", "3"] {
        assert!(manager.job(id).is_some(), "job {} should be valid", id);
    }
    assert_eq!(drain(&mut rx).len(), 3);
}

#[test]
fn test_update_replaces_current_job() {
    let (manager, mut rx) = manager(0);
    manager.process_template(template("01", 100)).unwrap();
    drain(&mut rx);

    let updated = manager.update_current_job(template("01", 100)).unwrap();
    assert_eq!(updated.job_id(), "2");
    assert!(Arc::ptr_eq(&manager.current_job().unwrap(), &updated));
    assert!(manager.job("1").is_some());

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    match &events[0] {
        JobEvent::UpdatedBlock { job, clean_jobs } => {
            assert_eq!(job.job_id(), "2");
            assert!(*clean_jobs);
        }
        other => panic!("expected UpdatedBlock, got {:?}", other),
    }
}

#[test]
fn test_malformed_template_is_rejected() {
    let (manager, mut rx) = manager(0);

    let mut raw = template("01", 100);
    raw.block_header.tx_trie_root = None;
    let err = manager.process_template(raw).unwrap_err();
    assert_eq!(err.category(), "template");

    let mut raw = template("01", 100);
    raw.target = None;
    assert!(manager.update_current_job(raw).is_err());

    assert!(manager.current_job().is_none());
    assert_eq!(manager.valid_job_count(), 0);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_retention_bound() {
    let (manager, _rx) = manager(3);
    for (i, prev) in ["01", "02", "03", "04", "05"].iter().enumerate() {
        manager.process_template(template(prev, 100 + i as u64)).unwrap();
    }

    assert_eq!(manager.valid_job_count(), 3);
    assert!(manager.job("1").is_none());
    assert!(manager.job("2").is_none());
    assert!(manager.job("5").is_some());
    assert_eq!(manager.current_job().unwrap().job_id(), "5");
}

#[test]
fn test_job_params_for_broadcast() {
    let (manager, _rx) = manager(0);
    manager.process_template(template("01", 100)).unwrap();
    let job = manager.current_job().unwrap();

    let params: Vec<Value> = job.job_params().to_vec();
    assert_eq!(params.len(), 15);
    assert_eq!(params[0], json!("1"));
    assert_eq!(params[1], json!("01".repeat(32)));
    assert_eq!(params[7], json!(format!("{}1f3a9c", "00".repeat(13))));
    assert_eq!(params[10], json!("00".repeat(32)));
    assert_eq!(params[12], json!(hex::encode(15_000_000u64.to_be_bytes())));
    assert_eq!(params[13], json!(true));
    assert_eq!(
        params[14],
        json!("000000000000ffff000000000000000000000000000000000000000000000000")
    );
}

#[test]
fn test_pos_coin_from_config() {
    let config = Config::try_parse_from(vec!["aion-pool-core", "--reward", "POS"]).unwrap();
    let options = config.job_manager_options();
    assert_eq!(options.coin.reward, RewardType::Pos);

    let registry = AlgorithmRegistry::standard(Arc::new(HeaderOnlyVerifier));
    let (manager, _rx) = JobManager::channel(options, &registry).unwrap();
    manager.process_template(template("01", 100)).unwrap();

    let job = manager.current_job().unwrap();
    let block = job.serialize_block(&[0xaa], &[]);
    // header, tx count, trailing signature byte
    assert_eq!(block, vec![0xaa, 0x01, 0x00]);
}
