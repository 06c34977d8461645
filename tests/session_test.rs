mod common;

use brand_board::error::{AppError, BusinessError};
use brand_board::models::catalog::BRAND_DNA_ID;
use brand_board::{BrandInput, BrandSession, GateOutcome, SchedulerState, SECTION_CATALOG};
use common::{five_sections, CountingGate, ScriptedClient};
use std::sync::Arc;
use std::time::Duration;

const NEW_LOGO: &str = "data:image/png;base64,TkVXTE9HTw==";

fn session(client: &Arc<ScriptedClient>, gate: &Arc<CountingGate>) -> BrandSession {
    BrandSession::new(client.clone(), gate.clone(), 3)
}

#[tokio::test]
async fn test_start_uses_suggested_prototype_when_absent() {
    let client = Arc::new(ScriptedClient::new(Some("柴犬")));
    let gate = Arc::new(CountingGate::new(true));
    let session = session(&client, &gate);

    let outcome = session
        .start(&BrandInput::new("沐阳", "茶饮行业"), None)
        .await
        .unwrap();
    let report = outcome.into_option().unwrap();

    let profile = session.store().profile().unwrap();
    assert_eq!(profile.prototype, "柴犬");
    assert_eq!(profile.name, "沐阳");
    assert!(profile.logo_reference.starts_with("https://picsum.photos/seed/"));

    let calls = client.analyze_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prototype, None);
    assert_eq!(calls[0].logo, None);

    assert_eq!(report.groups_run, 6);
    assert!(report.failed.is_empty());
    assert_eq!(session.snapshot().ready_count(), SECTION_CATALOG.len());
    assert_eq!(session.scheduler_state(), SchedulerState::Completed);
    assert_eq!(gate.requests(), 0);
}

#[tokio::test]
async fn test_user_prototype_wins_over_suggestion() {
    let client = Arc::new(ScriptedClient::new(Some("柴犬")));
    let gate = Arc::new(CountingGate::new(true));
    let session = session(&client, &gate).with_catalog(five_sections());

    session
        .start(&BrandInput::new("沐阳", "茶饮行业").with_prototype("熊猫"), None)
        .await
        .unwrap();

    assert_eq!(session.store().profile().unwrap().prototype, "熊猫");
    assert_eq!(client.analyze_calls()[0].prototype.as_deref(), Some("熊猫"));
    // 区块正文基于最终原型
    assert_eq!(session.store().section("a").unwrap().content, "熊猫 的 A 技术说明");
}

#[tokio::test]
async fn test_brand_dna_content_is_profile_summary() {
    let client = Arc::new(ScriptedClient::new(Some("柴犬")));
    let gate = Arc::new(CountingGate::new(true));
    let session = session(&client, &gate).with_catalog(SECTION_CATALOG[..3].to_vec());

    session
        .start(&BrandInput::new("沐阳", "茶饮行业"), None)
        .await
        .unwrap();

    let dna = session.store().section(BRAND_DNA_ID).unwrap();
    let profile = session.store().profile().unwrap();
    assert_eq!(dna.content, profile.dna_summary());
    assert!(dna.content.contains("形象原型: 柴犬"));
}

#[tokio::test]
async fn test_failed_section_leaves_rest_of_board() {
    let client = Arc::new(ScriptedClient::new(None).fail_text("C"));
    let gate = Arc::new(CountingGate::new(true));
    let session = session(&client, &gate).with_catalog(five_sections());

    let report = session
        .start(&BrandInput::new("沐阳", "茶饮行业"), None)
        .await
        .unwrap()
        .into_option()
        .unwrap();

    let snapshot = session.snapshot();
    assert!(snapshot.section("a").is_some());
    assert!(snapshot.section("b").is_some());
    assert!(snapshot.section("c").is_none());
    assert!(snapshot.section("d").is_some());
    assert_eq!(report.failed, vec!["c".to_string()]);
}

#[tokio::test]
async fn test_analysis_failure_writes_nothing() {
    let client = Arc::new(ScriptedClient::new(None).fail_analysis());
    let gate = Arc::new(CountingGate::new(true));
    let session = session(&client, &gate);

    let result = session.start(&BrandInput::new("沐阳", "茶饮行业"), None).await;

    assert!(result.is_err());
    assert!(session.store().profile().is_none());
    assert_eq!(session.snapshot().ready_count(), 0);
    assert_eq!(client.total_text_calls(), 0);
    assert_eq!(session.scheduler_state(), SchedulerState::Idle);
}

#[tokio::test]
async fn test_reanalyze_only_refreshes_profile_and_dna() {
    let client = Arc::new(ScriptedClient::new(Some("柴犬")));
    let gate = Arc::new(CountingGate::new(true));
    let session = session(&client, &gate);

    session
        .start(&BrandInput::new("沐阳", "茶饮行业"), None)
        .await
        .unwrap();
    let before = session.snapshot();
    let text_calls_before = client.total_text_calls();

    let profile = session
        .reanalyze(Some(NEW_LOGO))
        .await
        .unwrap()
        .into_option()
        .unwrap();

    // 只有一次新的分析调用，没有区块调用
    let calls = client.analyze_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].logo.as_deref(), Some(NEW_LOGO));
    assert_eq!(calls[1].prototype.as_deref(), Some("柴犬"));
    assert_eq!(client.total_text_calls(), text_calls_before);

    assert_eq!(profile.logo_reference, NEW_LOGO);
    let after = session.snapshot();
    assert_eq!(after.profile.as_ref().unwrap().logo_reference, NEW_LOGO);

    let dna = after.section(BRAND_DNA_ID).unwrap();
    assert_eq!(dna.image_reference, NEW_LOGO);
    assert_eq!(dna.content, profile.dna_summary());

    for descriptor in SECTION_CATALOG.iter().filter(|d| d.id != BRAND_DNA_ID) {
        assert_eq!(
            before.section(descriptor.id),
            after.section(descriptor.id),
            "区块 {} 不应被重新分析改动",
            descriptor.id
        );
    }
}

#[tokio::test]
async fn test_reanalyze_rejected_while_generating() {
    let client = Arc::new(ScriptedClient::new(Some("柴犬")).delay("品牌DNA分析", 200));
    let gate = Arc::new(CountingGate::new(true));
    let session = session(&client, &gate).with_catalog(SECTION_CATALOG[..3].to_vec());
    let input = BrandInput::new("沐阳", "茶饮行业");

    let (started, reanalyzed) = tokio::join!(session.start(&input, None), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.reanalyze(Some(NEW_LOGO)).await
    });

    assert!(matches!(started, Ok(GateOutcome::Done(_))));
    assert!(matches!(
        reanalyzed,
        Err(AppError::Business(BusinessError::GenerationInProgress))
    ));
    assert_eq!(client.analyze_calls().len(), 1);

    // 生成结束后再上传，新 Logo 留在 brand-dna
    session.reanalyze(Some(NEW_LOGO)).await.unwrap();
    let dna = session.store().section(BRAND_DNA_ID).unwrap();
    assert_eq!(dna.image_reference, NEW_LOGO);
    assert_eq!(session.store().profile().unwrap().logo_reference, NEW_LOGO);
}

#[tokio::test]
async fn test_reanalyze_without_new_logo_skips_placeholder() {
    let client = Arc::new(ScriptedClient::new(Some("柴犬")));
    let gate = Arc::new(CountingGate::new(true));
    let session = session(&client, &gate).with_catalog(five_sections());

    session
        .start(&BrandInput::new("沐阳", "茶饮行业"), None)
        .await
        .unwrap();
    session.reanalyze(None).await.unwrap();

    assert_eq!(client.analyze_calls()[1].logo, None);
}

#[tokio::test]
async fn test_reanalyze_requires_profile() {
    let client = Arc::new(ScriptedClient::new(None));
    let gate = Arc::new(CountingGate::new(true));
    let session = session(&client, &gate);

    let result = session.reanalyze(Some(NEW_LOGO)).await;

    assert!(matches!(
        result,
        Err(AppError::Business(BusinessError::ProfileMissing))
    ));
    assert!(client.analyze_calls().is_empty());
}

#[tokio::test]
async fn test_missing_credential_prompts_before_start() {
    let client = Arc::new(ScriptedClient::new(None));
    let gate = Arc::new(CountingGate::new(false));
    let session = session(&client, &gate).with_catalog(five_sections());

    let outcome = session
        .start(&BrandInput::new("沐阳", "茶饮行业"), None)
        .await
        .unwrap();

    assert!(matches!(outcome, GateOutcome::Done(_)));
    assert_eq!(gate.requests(), 1);
    assert_eq!(client.analyze_calls().len(), 1);
}

#[tokio::test]
async fn test_rejected_credential_reprompts_and_aborts() {
    let client = Arc::new(ScriptedClient::new(None).reject_text("B"));
    let gate = Arc::new(CountingGate::new(true));
    let session = session(&client, &gate).with_catalog(five_sections());

    let outcome = session
        .start(&BrandInput::new("沐阳", "茶饮行业"), None)
        .await
        .unwrap();

    assert_eq!(outcome, GateOutcome::CredentialReselected);
    assert_eq!(gate.requests(), 1);
    assert_eq!(session.scheduler_state(), SchedulerState::Aborted);
    assert_eq!(client.text_calls("D"), 0);
}

#[tokio::test]
async fn test_concurrent_start_is_rejected() {
    let client = Arc::new(ScriptedClient::new(None).default_delay(20));
    let gate = Arc::new(CountingGate::new(true));
    let session = session(&client, &gate).with_catalog(five_sections());
    let input = BrandInput::new("沐阳", "茶饮行业");

    let (first, second) = tokio::join!(session.start(&input, None), session.start(&input, None));

    assert!(matches!(first, Ok(GateOutcome::Done(_))));
    assert!(matches!(
        second,
        Err(AppError::Business(BusinessError::GenerationInProgress))
    ));
    assert_eq!(client.analyze_calls().len(), 1);
}

#[tokio::test]
async fn test_reset_clears_board() {
    let client = Arc::new(ScriptedClient::new(None));
    let gate = Arc::new(CountingGate::new(true));
    let session = session(&client, &gate).with_catalog(five_sections());

    session
        .start(&BrandInput::new("沐阳", "茶饮行业"), None)
        .await
        .unwrap();
    session.reset().unwrap();

    assert!(session.store().profile().is_none());
    assert_eq!(session.snapshot().ready_count(), 0);
}
