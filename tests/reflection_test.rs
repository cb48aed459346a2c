//! Reflection engine tests: the tolerant parser and the
//! reflect-and-revise loop, all against `MockBackend`.

use agentloop::llm::{LlmClient, MockBackend, MockRequestLog, Provider};
use agentloop::{parse_reflection, AgentBuilder, ChatResponse, Agent};
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Test helpers
// ─────────────────────────────────────────────────────────────────────────────

fn mock_client(responses: Vec<ChatResponse>) -> (Arc<LlmClient>, MockRequestLog) {
    let backend = MockBackend::new(responses);
    let log     = backend.request_log();
    let mut client = LlmClient::new();
    client.register(Provider::OpenAi, Box::new(backend));
    (Arc::new(client), log)
}

fn plain_agent(client: Arc<LlmClient>) -> Agent {
    AgentBuilder::new("writer")
        .system_prompt("You write content.")
        .model("gpt-4o")
        .client(client)
        .build()
        .expect("builder should succeed")
}

fn critique(score: &str, revised: &str) -> String {
    format!(
        "SCORE: {score}\n\
         STRENGTHS:\n- well structured\n- on topic\n\
         WEAKNESSES:\n- a bit thin\n\
         IMPROVEMENTS:\n- add detail\n\
         REVISED OUTPUT:\n{revised}"
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Parser
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn parses_fully_formed_critique() {
    let raw = critique("7.5", "A better draft.");
    let result = parse_reflection(&raw);

    assert_eq!(result.score, 7.5);
    assert_eq!(result.strengths, vec!["well structured", "on topic"]);
    assert_eq!(result.weaknesses, vec!["a bit thin"]);
    assert_eq!(result.improvements, vec!["add detail"]);
    assert_eq!(result.revised_output.as_deref(), Some("A better draft."));
    assert_eq!(result.raw, raw);
}

#[test]
fn no_major_revisions_means_absent_revision() {
    let raw = critique("9", "No major revisions needed");
    let result = parse_reflection(&raw);

    assert_eq!(result.score, 9.0);
    assert!(result.revised_output.is_none());
}

#[test]
fn missing_sections_yield_empty_fields_not_errors() {
    let result = parse_reflection("The model ignored the format entirely.");

    assert_eq!(result.score, 0.0);
    assert!(result.strengths.is_empty());
    assert!(result.weaknesses.is_empty());
    assert!(result.improvements.is_empty());
    assert!(result.revised_output.is_none());
    assert_eq!(result.raw, "The model ignored the format entirely.");
}

#[test]
fn one_missing_section_does_not_abort_the_others() {
    let raw = "SCORE: 6\nWEAKNESSES:\n- vague\nREVISED OUTPUT:\nTightened text";
    let result = parse_reflection(raw);

    assert_eq!(result.score, 6.0);
    assert!(result.strengths.is_empty(), "missing STRENGTHS stays empty");
    assert_eq!(result.weaknesses, vec!["vague"]);
    assert_eq!(result.revised_output.as_deref(), Some("Tightened text"));
}

#[test]
fn parser_is_deterministic_over_raw_text() {
    let raw = critique("8.25", "Improved once.");
    let first  = parse_reflection(&raw);
    let second = parse_reflection(&first.raw);
    assert_eq!(first, second, "re-parsing raw must yield identical structured fields");
}

#[test]
fn labels_are_case_insensitive() {
    let raw = "score: 4.5\nstrengths:\n- concise\nweaknesses:\n- shallow\n\
               improvements:\n- expand\nrevised output:\nLonger version";
    let result = parse_reflection(raw);

    assert_eq!(result.score, 4.5);
    assert_eq!(result.strengths, vec!["concise"]);
    assert_eq!(result.revised_output.as_deref(), Some("Longer version"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Isolation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reflect_never_mutates_the_live_conversation() {
    let (client, _) = mock_client(vec![
        ChatResponse::text("Draft A"),
        ChatResponse::text(critique("8", "No major revisions needed")),
    ]);
    let mut agent = plain_agent(client);

    let output = agent.run("write something").await.unwrap();
    let before: Vec<_> = agent.history().to_vec();

    let result = agent.reflect(&output).await.expect("reflect should succeed");
    assert_eq!(result.score, 8.0);

    assert_eq!(agent.history(), before.as_slice(),
        "message count and content must be identical before and after reflect()");
}

#[tokio::test]
async fn reflect_runs_against_a_reset_log() {
    let (client, log) = mock_client(vec![
        ChatResponse::text("Draft A"),
        ChatResponse::text(critique("8", "No major revisions needed")),
    ]);
    let mut agent = plain_agent(client);

    let output = agent.run("write something").await.unwrap();
    agent.reflect(&output).await.unwrap();

    // The critique call saw only the system prompt plus the critique turn.
    let request = log.request(1).expect("reflection request recorded");
    assert_eq!(request.messages.len(), 2);
    let prompt = request.messages[1].content.as_deref().unwrap_or_default();
    assert!(prompt.contains("OUTPUT TO EVALUATE"), "critique prompt shape");
    assert!(prompt.contains("Draft A"), "candidate output embedded in the prompt");
    assert!(prompt.contains("1. Accuracy and correctness"), "numbered default criteria");
}

#[tokio::test]
async fn reflect_restores_history_when_the_call_fails() {
    // Only the primary run is scripted; the reflection call errors.
    let (client, _) = mock_client(vec![ChatResponse::text("Draft A")]);
    let mut agent = plain_agent(client);

    let output = agent.run("write something").await.unwrap();
    let before: Vec<_> = agent.history().to_vec();

    let result = agent.reflect(&output).await;
    assert!(result.is_err());
    assert_eq!(agent.history(), before.as_slice(),
        "the live log must be restored on the error path too");
}

// ─────────────────────────────────────────────────────────────────────────────
// run_with_reflection
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn adopts_revision_then_stops_on_high_score() {
    let (client, log) = mock_client(vec![
        ChatResponse::text("Draft A"),
        ChatResponse::text(critique("6.0", "Draft B")),
        ChatResponse::text(critique("9.5", "No major revisions needed")),
    ]);
    let mut agent = plain_agent(client);

    let outcome = agent.run_with_reflection("write", true, 2).await.unwrap();

    assert_eq!(outcome.output, "Draft B", "the 6.0-scored revision must be adopted");
    assert_eq!(outcome.iterations, 1, "the 9.5 reflection stops the loop without adopting");
    assert_eq!(log.call_count(), 3);

    let last = outcome.reflection.expect("last reflection retained");
    assert_eq!(last.score, 9.5);
}

#[tokio::test]
async fn auto_improve_false_reflects_once_for_reporting() {
    let (client, log) = mock_client(vec![
        ChatResponse::text("Draft A"),
        ChatResponse::text(critique("5.0", "Draft B")),
    ]);
    let mut agent = plain_agent(client);

    let outcome = agent.run_with_reflection("write", false, 2).await.unwrap();

    assert_eq!(outcome.output, "Draft A", "original output returned unchanged");
    assert_eq!(outcome.iterations, 0);
    assert_eq!(log.call_count(), 2, "one run + exactly one reflection");
    assert_eq!(outcome.reflection.unwrap().score, 5.0);
}

#[tokio::test]
async fn makes_at_most_max_iterations_plus_one_calls() {
    // Every reflection offers a low-scored revision, so the loop only
    // stops when max_iterations is spent.
    let (client, log) = mock_client(vec![
        ChatResponse::text("Draft A"),
        ChatResponse::text(critique("5.0", "Draft B")),
        ChatResponse::text(critique("6.0", "Draft C")),
    ]);
    let mut agent = plain_agent(client);

    let outcome = agent.run_with_reflection("write", true, 2).await.unwrap();

    assert_eq!(log.call_count(), 3, "1 run + max_iterations reflections");
    assert_eq!(outcome.output, "Draft C");
    assert_eq!(outcome.iterations, 2);
}

#[tokio::test]
async fn early_high_score_skips_all_revision() {
    let (client, log) = mock_client(vec![
        ChatResponse::text("Draft A"),
        ChatResponse::text(critique("9.2", "Draft B")),
    ]);
    let mut agent = plain_agent(client);

    let outcome = agent.run_with_reflection("write", true, 2).await.unwrap();

    assert_eq!(outcome.output, "Draft A", "a 9.0+ score keeps the original output");
    assert_eq!(outcome.iterations, 0);
    assert_eq!(log.call_count(), 2, "the second reflection is never made");
}
