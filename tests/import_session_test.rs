// ==========================================
// ImportSession 集成测试
// ==========================================
// 测试目标: 验证 选择文件 → 解析 → 预览确认 → 提交 → 汇总 的完整流程
// 持久化协作方使用可编排的 ScriptedRepository
// ==========================================


use crm_lead_import::config::ImportConfig;
use crm_lead_import::importer::{
    ImportError, ImportSession, ParseError, RowOutcome, SessionError, SessionState,
    ANONYMOUS_IMPORTER,
};
use crm_lead_import::logging;
use crm_lead_import::{EmailPolicy, InMemorySessionProvider, LeadStatus, PersistError};
use std::sync::Arc;
use test_helpers::{create_csv_file, csv_with_rows, test_user, ScriptedRepository};

fn create_session(
    repo: Arc<ScriptedRepository>,
    config: ImportConfig,
) -> ImportSession<Arc<ScriptedRepository>> {
    ImportSession::new(repo, config).expect("Failed to create ImportSession")
}

/// 走完 选择 → 解析 → 确认 三步
fn prepare(session: &mut ImportSession<Arc<ScriptedRepository>>, csv: &str) {
    session
        .select_file(csv, Some("leads.csv".to_string()))
        .expect("select_file failed");
    session.parse().expect("parse failed");
    session.confirm().expect("confirm failed");
}

#[tokio::test]
async fn test_missing_name_row_is_reported() {
    logging::init_test();

    let repo = Arc::new(ScriptedRepository::new());
    let mut session = create_session(repo.clone(), ImportConfig::default());
    prepare(&mut session, "name,email\nAna,ana@x.com\n,bob@x.com");

    let summary = session.submit().await.unwrap();

    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.error_pairs(), vec![(2, "MissingName")]);
    assert!(!summary.cancelled);

    // 映射失败的行不会到达持久化协作方
    assert_eq!(repo.submitted(), vec!["Ana".to_string()]);
    assert_eq!(session.state(), SessionState::Completed);
}

#[tokio::test]
async fn test_empty_file_stays_idle() {
    let repo = Arc::new(ScriptedRepository::new());
    let mut session = create_session(repo.clone(), ImportConfig::default());

    session.select_file("", None).unwrap();
    let err = session.parse().unwrap_err();

    assert!(matches!(err, ImportError::Parse(ParseError::Empty)));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.preview().is_none());

    // 回到 Idle 后可以重新选择文件
    session.select_file("name\nAna", None).unwrap();
    assert_eq!(session.parse().unwrap(), 1);
    assert!(repo.submitted().is_empty());
}

#[tokio::test]
async fn test_preview_is_bounded_by_limit() {
    let repo = Arc::new(ScriptedRepository::new());

    let mut small = create_session(repo.clone(), ImportConfig::default());
    small.select_file(csv_with_rows(3), None).unwrap();
    small.parse().unwrap();
    let preview = small.confirm().unwrap();
    assert_eq!(preview.sample.len(), 3);
    assert!(!preview.is_truncated());

    let mut large = create_session(repo.clone(), ImportConfig::default());
    large.select_file(csv_with_rows(20), None).unwrap();
    large.parse().unwrap();
    let preview = large.confirm().unwrap();
    assert_eq!(preview.sample.len(), 10);
    assert_eq!(preview.total_data_rows, 20);
    assert!(preview.is_truncated());
    assert!(preview.sample.iter().all(|row| row[0] != "name"));

    // 预览仅用于展示，提交处理全部 20 行
    let summary = large.submit().await.unwrap();
    assert_eq!(summary.succeeded, 20);
    assert_eq!(repo.submitted().len(), 20);
}

#[tokio::test]
async fn test_conflict_does_not_stop_following_rows() {
    let repo = Arc::new(
        ScriptedRepository::new()
            .fail_on("Ana", PersistError::Conflict("email ana@x.com 已存在".to_string())),
    );
    let mut session = create_session(repo.clone(), ImportConfig::default());
    prepare(&mut session, "name,email\nAna,ana@x.com\nBob,bob@x.com");

    let summary = session.submit().await.unwrap();

    assert!(matches!(
        session.outcome(1),
        Some(RowOutcome::Failed(PersistError::Conflict(_)))
    ));
    assert!(matches!(
        session.outcome(2),
        Some(RowOutcome::Persisted { .. })
    ));
    assert_eq!(summary.error_pairs(), vec![(1, "conflict")]);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn test_outcomes_are_recorded_in_ascending_order() {
    let csv = "name,email,status\n\
               Ana,ana@x.com,new\n\
               ,nobody@x.com,new\n\
               Cid,cid@x.com\n\
               Dee,dee@x.com,archived\n\
               Eve,eve@x.com,qualified\n\
               Fay,fay@x.com,lost";
    let repo = Arc::new(
        ScriptedRepository::new().fail_on("Eve", PersistError::Rejected("blocked".to_string())),
    );
    let mut session = create_session(repo.clone(), ImportConfig::default());
    prepare(&mut session, csv);

    let summary = session.submit().await.unwrap();

    assert_eq!(summary.succeeded + summary.failed, summary.total_rows);
    assert_eq!(summary.total_rows, 6);
    assert!(session.ledger().is_complete());

    let order = session.ledger().completion_order().to_vec();
    assert_eq!(order, vec![1, 2, 3, 4, 5, 6]);

    assert_eq!(
        summary.error_pairs(),
        vec![
            (2, "MissingName"),
            (3, "ColumnCountMismatch"),
            (4, "InvalidStatus"),
            (5, "rejected"),
        ]
    );
    assert_eq!(repo.submitted(), vec!["Ana", "Eve", "Fay"]);
}

#[tokio::test]
async fn test_invalid_email_strict_rejects_row() {
    let repo = Arc::new(ScriptedRepository::new());
    let mut session = create_session(repo.clone(), ImportConfig::default());
    prepare(&mut session, "name,email\nAna,not-an-email");

    let summary = session.submit().await.unwrap();

    assert_eq!(summary.error_pairs(), vec![(1, "InvalidEmail")]);
    assert!(summary.warnings.is_empty());
    assert!(repo.submitted().is_empty());
}

#[tokio::test]
async fn test_invalid_email_lenient_keeps_row_without_email() {
    let repo = Arc::new(ScriptedRepository::new());
    let config = ImportConfig::default().with_email_policy(EmailPolicy::Lenient);
    let mut session = create_session(repo.clone(), config);
    prepare(&mut session, "name,email\nAna,not-an-email\nBob,bob@x.com");

    let summary = session.submit().await.unwrap();

    assert_eq!(summary.succeeded, 2);
    assert!(summary.errors.is_empty());
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].row, 1);
    assert_eq!(summary.warnings[0].reason, "InvalidEmail");
    assert!(summary.is_clean());
}

#[tokio::test]
async fn test_cancel_during_submit_skips_remaining_rows() {
    let repo = Arc::new(ScriptedRepository::new());
    let mut session = create_session(repo.clone(), ImportConfig::default());
    prepare(&mut session, &csv_with_rows(5));

    // 第 2 行提交过程中用户点击取消
    repo.cancel_on_call(2, session.cancel_handle());
    let summary = session.submit().await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 3);
    assert_eq!(
        summary.succeeded + summary.failed + summary.skipped,
        summary.total_rows
    );

    // 在途行照常完成并记录结果
    assert!(matches!(
        session.outcome(2),
        Some(RowOutcome::Persisted { .. })
    ));
    for row in 3..=5 {
        assert_eq!(session.outcome(row), Some(&RowOutcome::Skipped));
    }
    assert_eq!(repo.submitted(), vec!["Lead 1", "Lead 2"]);
    assert!(!summary.is_clean());

    // 跳过的行可以导出后重新导入
    let exported = session.export_failed_rows().unwrap();
    assert_eq!(
        exported,
        "name,email,status\n\
         Lead 3,lead3@x.com,new\n\
         Lead 4,lead4@x.com,new\n\
         Lead 5,lead5@x.com,new\n"
    );
}

#[tokio::test]
async fn test_cancel_before_submit_has_no_side_effects() {
    let repo = Arc::new(ScriptedRepository::new());
    let mut session = create_session(repo.clone(), ImportConfig::default());
    let mut states = session.subscribe();

    prepare(&mut session, &csv_with_rows(2));
    assert_eq!(*states.borrow_and_update(), SessionState::PreviewConfirmed);

    session.cancel();

    assert_eq!(*states.borrow_and_update(), SessionState::Idle);
    assert!(session.rows().is_empty());
    assert!(session.ledger().is_empty());
    assert!(repo.submitted().is_empty());

    let err = session.submit().await.unwrap_err();
    assert!(matches!(
        err,
        ImportError::Session(SessionError::InvalidTransition {
            state: SessionState::Idle,
            action: "submit"
        })
    ));
}

#[tokio::test]
async fn test_select_path_reads_csv_file() {
    let file = create_csv_file("Full Name,E-mail,Mobile,Status\nAna,ana@x.com,555-0101,Qualified\n")
        .expect("Failed to create csv file");

    let repo = Arc::new(ScriptedRepository::new());
    let mut session = create_session(repo.clone(), ImportConfig::default());
    session.select_path(file.path()).unwrap();

    let expected_name = file
        .path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    assert_eq!(session.file_name().map(str::to_string), expected_name);

    assert_eq!(session.parse().unwrap(), 1);
    session.confirm().unwrap();
    let summary = session.submit().await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.file_name, expected_name);
}

#[tokio::test]
async fn test_select_path_errors() {
    let repo = Arc::new(ScriptedRepository::new());
    let mut session = create_session(repo, ImportConfig::default());

    let err = session.select_path("/nonexistent/leads.csv").unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));

    let xlsx = tempfile::Builder::new()
        .suffix(".xlsx")
        .tempfile()
        .expect("Failed to create temp file");
    let err = session.select_path(xlsx.path()).unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(ref ext) if ext == "xlsx"));

    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_select_path_rejects_oversized_file_before_reading() {
    let file = create_csv_file(&csv_with_rows(5)).expect("Failed to create csv file");

    let repo = Arc::new(ScriptedRepository::new());
    let config = ImportConfig::default().with_max_file_bytes(32);
    let mut session = create_session(repo, config);

    let err = session.select_path(file.path()).unwrap_err();
    assert!(matches!(
        err,
        ImportError::Parse(ParseError::TooLarge { limit: 32, size }) if size > 32
    ));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.file_name().is_none());
}

#[tokio::test]
async fn test_blank_lines_are_reported_at_their_file_row() {
    let repo = Arc::new(ScriptedRepository::new());
    let mut session = create_session(repo.clone(), ImportConfig::default());
    prepare(&mut session, "name,email\nAna,ana@x.com\n\n,bob@x.com\nCid,cid@x.com\n");

    let summary = session.submit().await.unwrap();

    assert_eq!(summary.total_rows, 4);
    assert_eq!(
        summary.error_pairs(),
        vec![(2, "ColumnCountMismatch"), (3, "MissingName")]
    );
    assert_eq!(repo.submitted(), vec!["Ana", "Cid"]);

    // 导出的失败行与原文件行一致，空行原样保留
    assert_eq!(
        session.export_failed_rows().unwrap(),
        "name,email\n\n,bob@x.com\n"
    );
}

#[tokio::test]
async fn test_custom_delimiter_and_default_status() {
    let repo = Arc::new(ScriptedRepository::new());
    let config = ImportConfig {
        delimiter: ';',
        default_status: LeadStatus::Contacted,
        ..ImportConfig::default()
    };
    let mut session = create_session(repo.clone(), config);
    prepare(&mut session, "name;email\nAna;ana@x.com\nBob;");

    let summary = session.submit().await.unwrap();
    assert_eq!(summary.succeeded, 2);
    assert_eq!(repo.submitted(), vec!["Ana", "Bob"]);

    // 缺失 status 列时使用配置的默认状态；空邮箱视为缺失
    let inputs = repo.submitted_inputs();
    assert_eq!(inputs[0].email.as_deref(), Some("ana@x.com"));
    assert_eq!(inputs[1].email, None);
    assert!(inputs
        .iter()
        .all(|input| input.status == LeadStatus::Contacted));
}

#[tokio::test]
async fn test_imported_by_comes_from_session_provider() {
    let repo = Arc::new(ScriptedRepository::new());

    let mut anonymous = create_session(repo.clone(), ImportConfig::default());
    prepare(&mut anonymous, &csv_with_rows(1));
    let summary = anonymous.submit().await.unwrap();
    assert_eq!(summary.imported_by, ANONYMOUS_IMPORTER);

    let provider = Arc::new(InMemorySessionProvider::new(Some(test_user())));
    let mut signed_in =
        create_session(repo.clone(), ImportConfig::default()).with_session_provider(provider);
    prepare(&mut signed_in, &csv_with_rows(1));
    let summary = signed_in.submit().await.unwrap();
    assert_eq!(summary.imported_by, "Sales Admin");
    assert!(!summary.batch_id.is_empty());
    assert!(summary.completed_at >= summary.started_at);
}
