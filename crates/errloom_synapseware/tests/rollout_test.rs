//! Tests for running one program over many rows concurrently.

use async_trait::async_trait;
use errloom_core::Tapestry;
use errloom_error::{ErrloomErrorKind, ErrloomResult, LoomError, SynaphorErrorKind};
use errloom_interface::{Loom, MockLoom, SampleOptions};
use errloom_synapseware::{
    ClassRegistry, ClassSpan, Environment, RolloutRunner, Synapse, Synaphor, Synapseware,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Copies the dataset row into the environment.
struct RowReader;

impl Synapse for RowReader {
    fn synapse(&mut self, synaphor: &mut Synaphor, _span: &ClassSpan) -> ErrloomResult<String> {
        let question = synaphor.tapestry().row()["question"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        synaphor.env_mut().set("question", question.as_str());
        Ok(format!("Q: {}", question))
    }
}

/// Fails rows whose prompt mentions "fail", answers the others after a
/// delay that shrinks with the row number, so later rows finish first.
struct SlowLoom;

#[async_trait]
impl Loom for SlowLoom {
    async fn sample(
        &self,
        tapestry: &Tapestry,
        _stop_sequences: &[String],
        _options: &SampleOptions,
    ) -> ErrloomResult<String> {
        let delay = tapestry.row()["delay_ms"].as_u64().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if tapestry.to_text().contains("fail") {
            return Err(LoomError::new("refused").into());
        }
        Ok(format!("answer to {}", tapestry.row()["question"]))
    }

    fn name(&self) -> &str {
        "slow"
    }
}

fn registry() -> Arc<ClassRegistry> {
    let mut registry = ClassRegistry::new();
    registry.register("RowReader", |_, _| Ok(RowReader));
    Arc::new(registry)
}

fn program() -> Arc<Synapseware> {
    Arc::new(
        Synapseware::parse("<|o_o|><|RowReader|><|@_@:answer <>answer|>")
            .expect("Failed to parse synapseware"),
    )
}

#[tokio::test]
async fn test_results_in_row_order() {
    let runner = RolloutRunner::new(program(), Arc::new(SlowLoom))
        .with_registry(registry())
        .with_max_concurrent(4);

    let rows = (0..6)
        .map(|i| json!({"question": format!("q{}", i), "delay_ms": (6 - i) * 10}))
        .collect();
    let rollouts = runner.run(rows).await;

    assert_eq!(rollouts.len(), 6);
    for (index, rollout) in rollouts.iter().enumerate() {
        assert_eq!(rollout.row_index, index);
        assert!(rollout.is_ok(), "rollout {} failed", index);
        let expected = format!("q{}", index);
        assert_eq!(
            rollout.environment.get("question").map(|v| v.render()),
            Some(expected.clone())
        );
        assert_eq!(rollout.tapestry.row()["question"], json!(expected));
    }
}

#[tokio::test]
async fn test_rollouts_do_not_share_state() {
    let runner = RolloutRunner::new(program(), Arc::new(MockLoom::default()))
        .with_registry(registry());

    let rollouts = runner
        .run(vec![json!({"question": "a"}), json!({"question": "b"})])
        .await;

    assert!(rollouts.iter().all(|r| r.is_ok()));
    for rollout in &rollouts {
        assert_eq!(rollout.tapestry.contexts().len(), 1);
        assert_eq!(rollout.tapestry.samples().len(), 1);
    }
    assert_eq!(rollouts[0].tapestry.to_text(), "Q: a<answer>mocked_sample</answer>");
    assert_eq!(rollouts[1].tapestry.to_text(), "Q: b<answer>mocked_sample</answer>");
}

#[tokio::test]
async fn test_failure_is_isolated() {
    let runner = RolloutRunner::new(program(), Arc::new(SlowLoom))
        .with_registry(registry())
        .with_max_concurrent(1);

    let rollouts = runner
        .run(vec![
            json!({"question": "ok"}),
            json!({"question": "please fail"}),
            json!({"question": "fine"}),
        ])
        .await;

    assert!(rollouts[0].is_ok());
    assert!(rollouts[2].is_ok());

    let failed = &rollouts[1];
    match &failed.outcome {
        Err(e) => assert!(matches!(e.kind(), ErrloomErrorKind::Loom(_))),
        Ok(()) => panic!("rollout with failing loom should fail"),
    }
    assert_eq!(failed.tapestry.to_text(), "Q: please fail<answer>");
    assert!(!failed.environment.contains("answer"));
}

#[tokio::test]
async fn test_shared_environment_and_sampling_args() {
    let code = Arc::new(
        Synapseware::parse("<|^_^|>Style: <|style|>").expect("Failed to parse synapseware"),
    );
    let environment: Environment = [("style", "terse")].into_iter().collect();
    let mut sampling_args = serde_json::Map::new();
    sampling_args.insert("temperature".to_string(), json!(0.2));

    let runner = RolloutRunner::new(code, Arc::new(MockLoom::default()))
        .with_environment(environment)
        .with_sampling_args(sampling_args.clone());
    let rollouts = runner.run(vec![json!({}), json!({})]).await;

    for rollout in &rollouts {
        assert!(rollout.is_ok());
        assert_eq!(rollout.tapestry.sampling_args(), &sampling_args);
        assert_eq!(rollout.tapestry.to_text(), "Style: <obj id=style>terse</obj>");
    }
}

#[tokio::test]
async fn test_unknown_class_fails_every_rollout() {
    let runner = RolloutRunner::new(program(), Arc::new(MockLoom::default()));

    let rollouts = runner.run(vec![json!({}), json!({})]).await;

    for rollout in rollouts {
        let err = rollout.outcome.expect_err("missing class should fail");
        match err.into_kind() {
            ErrloomErrorKind::Synaphor(e) => {
                assert_eq!(e.kind, SynaphorErrorKind::UnknownClass("RowReader".to_string()))
            }
            other => panic!("expected a synaphor error, got: {}", other),
        }
    }
}

#[tokio::test]
async fn test_no_rows() {
    let runner = RolloutRunner::new(program(), Arc::new(MockLoom::default()));
    assert!(runner.run(Vec::new()).await.is_empty());
}

#[tokio::test]
async fn test_json_report() {
    let runner = RolloutRunner::new(program(), Arc::new(SlowLoom)).with_registry(registry());
    let rollouts = runner
        .run(vec![json!({"question": "hi"}), json!({"question": "fail me"})])
        .await;

    let ok: serde_json::Value =
        serde_json::from_str(&rollouts[0].to_json().expect("report")).expect("valid json");
    assert_eq!(ok["row_index"], json!(0));
    assert_eq!(ok["environment"]["question"], json!("hi"));
    assert_eq!(ok["tapestry"]["row"]["question"], json!("hi"));
    assert!(ok.get("error").is_none());

    let failed: serde_json::Value =
        serde_json::from_str(&rollouts[1].to_json().expect("report")).expect("valid json");
    assert!(failed["error"].as_str().unwrap_or_default().contains("refused"));
}
