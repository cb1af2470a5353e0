//! End-to-end workflow runs against the in-memory backend

use std::sync::Arc;
use triage_core::config::SenderConfig;
use triage_core::{InMemoryStore, InMemoryTransport, LetterComposer, SendOptions, TriageClient};
use triage_types::{
    CompanyFilter, CompanyId, CompanyStatus, DeliveryStatus, ErrorCode, LetterFilter,
    LetterStatus, LetterTemplate, SortOrder,
};

fn setup() -> (Arc<InMemoryStore>, TriageClient<InMemoryTransport>) {
    let store = Arc::new(
        InMemoryStore::seeded(LetterComposer::new(SenderConfig::default()))
            .expect("built-in fixtures load"),
    );
    let client = TriageClient::new(InMemoryTransport::new(store.clone()));
    (store, client)
}

#[tokio::test]
async fn test_full_outreach_flow() {
    let (store, client) = setup();
    let company_id = CompanyId::new(1);

    let company = client.approve_company(company_id, None).await.into_data().unwrap();
    assert_eq!(company.status, CompanyStatus::Approved);
    assert_eq!(company.score, 92.0);

    let draft = client
        .generate_letter(company_id, LetterTemplate::Formal)
        .await
        .into_data()
        .unwrap();
    assert_eq!(draft.status, LetterStatus::Draft);
    assert_eq!(draft.company_id, company_id);

    let approved = client
        .approve_letter(draft.handle(), None)
        .await
        .into_data()
        .unwrap();
    assert_eq!(approved.status, LetterStatus::Approved);
    assert!(approved.approved_at.is_some());

    let status = client
        .send_email(company_id, "hr@kontur.ru", SendOptions::default())
        .await
        .into_data()
        .unwrap();
    assert_eq!(status.delivery_status, DeliveryStatus::Delivered);

    let company = client.company(company_id).await.into_data().unwrap();
    assert_eq!(company.status, CompanyStatus::Sent);

    let sent = client.email_status(company_id).await.into_data().unwrap();
    assert_eq!(sent.email, "hr@kontur.ru");

    let log = store.approval_log(company_id);
    assert_eq!(log.len(), 2);
}

#[tokio::test]
async fn test_unknown_company_is_not_found() {
    let (_, client) = setup();

    let envelope = client.company(CompanyId::new(999)).await;

    assert_eq!(envelope.error_code(), Some(&ErrorCode::CompanyNotFound));
}

#[tokio::test]
async fn test_industry_filter() {
    let (_, client) = setup();
    let filter = CompanyFilter {
        industry: Some("Fintech".to_string()),
        ..Default::default()
    };

    let page = client.list_companies(&filter).await.into_result().unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].score, 72.0);
    assert_eq!(page.total, Some(1));
}

#[tokio::test]
async fn test_filters_hold_for_every_result() {
    let (_, client) = setup();
    let filters = [
        CompanyFilter {
            status: Some(CompanyStatus::New),
            ..Default::default()
        },
        CompanyFilter {
            industry: Some("IT".to_string()),
            min_score: Some(86.0),
            ..Default::default()
        },
        CompanyFilter {
            min_score: Some(80.0),
            sort_by: Some(SortOrder::ScoreAsc),
            ..Default::default()
        },
        CompanyFilter {
            status: Some(CompanyStatus::Sent),
            ..Default::default()
        },
    ];

    for filter in &filters {
        let page = client.list_companies(filter).await.into_result().unwrap();

        assert_eq!(page.total, Some(page.data.len() as u64));
        for company in &page.data {
            assert!(filter.status.map_or(true, |s| company.status == s));
            assert!(filter
                .industry
                .as_ref()
                .map_or(true, |i| company.industry.as_ref() == Some(i)));
            assert!(filter.min_score.map_or(true, |m| company.score >= m));
        }
    }
}

#[tokio::test]
async fn test_top_companies_ordering() {
    let (_, client) = setup();

    let top = client.top_companies().await.into_data().unwrap();

    assert!(top.len() <= 20);
    assert!(top.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

#[tokio::test]
async fn test_regenerating_replaces_letter() {
    let (_, client) = setup();
    let company_id = CompanyId::new(3);

    let first = client
        .generate_letter(company_id, LetterTemplate::Formal)
        .await
        .into_data()
        .unwrap();
    let second = client
        .generate_letter(company_id, LetterTemplate::Informal)
        .await
        .into_data()
        .unwrap();

    let current = client.letter(company_id).await.into_data().unwrap().unwrap();
    assert_eq!(current.id, second.id);
    assert_ne!(current.id, first.id);

    let stale = client.approve_letter(first.handle(), None).await;
    assert_eq!(stale.error_code(), Some(&ErrorCode::PolicyViolation));
}

#[tokio::test]
async fn test_missing_letter_is_null() {
    let (_, client) = setup();

    let envelope = client.letter(CompanyId::new(1)).await;

    assert!(envelope.is_success());
    assert_eq!(envelope.into_data(), Some(None));
}

#[tokio::test]
async fn test_reject_letter_requires_reason() {
    let (store, client) = setup();
    let draft = client
        .generate_letter(CompanyId::new(1), LetterTemplate::Formal)
        .await
        .into_data()
        .unwrap();

    let envelope = client.reject_letter(draft.handle(), Some("")).await;
    assert_eq!(envelope.error_code(), Some(&ErrorCode::ValidationError));

    let unchanged = store.letter_for_company(CompanyId::new(1)).unwrap();
    assert_eq!(unchanged.status, LetterStatus::Draft);

    let rejected = client
        .reject_letter(draft.handle(), Some("Too generic"))
        .await
        .into_data()
        .unwrap();
    assert_eq!(rejected.status, LetterStatus::Rejected);
}

#[tokio::test]
async fn test_approve_with_edit_keeps_edited_text() {
    let (_, client) = setup();
    let draft = client
        .generate_letter(CompanyId::new(3), LetterTemplate::Formal)
        .await
        .into_data()
        .unwrap();

    let edited = "Dear Yandex team, a shorter note from us.";
    let approved = client
        .approve_letter(draft.handle(), Some(edited))
        .await
        .into_data()
        .unwrap();
    assert_eq!(approved.body, edited);

    let stored = client.letter(CompanyId::new(3)).await.into_data().unwrap().unwrap();
    assert_eq!(stored.body, edited);
    assert_ne!(stored.body, draft.body);
}

#[tokio::test]
async fn test_update_returns_letter_to_draft() {
    let (_, client) = setup();
    let letter = client.letter(CompanyId::new(2)).await.into_data().unwrap().unwrap();
    assert_eq!(letter.status, LetterStatus::Approved);

    let updated = client
        .update_letter(letter.handle(), "Revised text")
        .await
        .into_data()
        .unwrap();

    assert_eq!(updated.status, LetterStatus::Draft);
    assert!(updated.updated_at.is_some());

    let send = client
        .send_email(CompanyId::new(2), "hr@ozon.ru", SendOptions::default())
        .await;
    assert_eq!(send.error_code(), Some(&ErrorCode::PolicyViolation));
}

#[tokio::test]
async fn test_rejected_company_stays_rejected() {
    let (_, client) = setup();
    let id = CompanyId::new(4);

    let approve = client.approve_company(id, None).await;
    assert_eq!(approve.error_code(), Some(&ErrorCode::PolicyViolation));

    let generate = client.generate_letter(id, LetterTemplate::Formal).await;
    assert_eq!(generate.error_code(), Some(&ErrorCode::PolicyViolation));

    let again = client.reject_company(id, "Not a fit").await.into_data().unwrap();
    assert_eq!(again.status, CompanyStatus::Rejected);
}

#[tokio::test]
async fn test_dry_run_leaves_state_untouched() {
    let (store, client) = setup();
    let id = CompanyId::new(2);

    let preview = client
        .send_email(id, "hr@ozon.ru", SendOptions { dry_run: true })
        .await
        .into_data()
        .unwrap();

    assert_eq!(preview.delivery_status, DeliveryStatus::Pending);
    assert_eq!(store.company(id).unwrap().status, CompanyStatus::Approved);
    assert_eq!(
        client.email_status(id).await.error_code(),
        Some(&ErrorCode::EmailNotFound)
    );
}

#[tokio::test]
async fn test_responded_is_externally_driven() {
    let (store, client) = setup();
    let id = CompanyId::new(2);

    client
        .send_email(id, "hr@ozon.ru", SendOptions::default())
        .await
        .into_data()
        .unwrap();
    store.mark_responded(id).unwrap();

    let company = client.company(id).await.into_data().unwrap();
    assert_eq!(company.status, CompanyStatus::Responded);

    let reject = client.reject_company(id, "changed our mind").await;
    assert_eq!(reject.error_code(), Some(&ErrorCode::PolicyViolation));
}

#[tokio::test]
async fn test_list_letters_by_status() {
    let (_, client) = setup();
    client
        .generate_letter(CompanyId::new(1), LetterTemplate::Informal)
        .await
        .into_data()
        .unwrap();

    let filter = LetterFilter {
        status: Some(LetterStatus::Draft),
        ..Default::default()
    };
    let page = client.list_letters(&filter).await.into_result().unwrap();

    assert_eq!(page.total, Some(1));
    assert_eq!(page.data[0].company_id, CompanyId::new(1));
}

#[tokio::test]
async fn test_letter_of_rejected_company_cannot_be_approved() {
    let (store, client) = setup();
    let id = CompanyId::new(2);

    client.reject_company(id, "Budget freeze").await.into_data().unwrap();

    let letter = client.letter(id).await.into_data().flatten().unwrap();
    let reopened = client
        .update_letter(letter.handle(), "Revised proposal")
        .await
        .into_data()
        .unwrap();
    assert_eq!(reopened.status, LetterStatus::Draft);

    let approve = client.approve_letter(reopened.handle(), None).await;
    let failure = approve.failure().unwrap();
    assert_eq!(failure.error_code, ErrorCode::PolicyViolation);
    assert!(failure.message.contains("rejected"));

    let stored = store.letter_for_company(id).unwrap();
    assert_eq!(stored.status, LetterStatus::Draft);
    assert!(stored.approved_at.is_none());
}
