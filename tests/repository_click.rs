use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use shortener_service::domain::entities::NewClick;
use shortener_service::domain::repositories::ClickRepository;
use shortener_service::infrastructure::persistence::PgClickRepository;

fn click(code: &str) -> NewClick {
    NewClick {
        short_code: code.to_string(),
        ip: Some("203.0.113.7".to_string()),
        user_agent: Some("TestBot/1.0".to_string()),
        referer: None,
        clicked_at: Utc::now(),
    }
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_record_click(pool: PgPool) {
    let repo = PgClickRepository::new(Arc::new(pool));

    let recorded = repo.record_click(click("abc")).await.unwrap();

    assert_eq!(recorded.short_code, "abc");
    assert_eq!(recorded.ip.as_deref(), Some("203.0.113.7"));
    assert_eq!(recorded.user_agent.as_deref(), Some("TestBot/1.0"));
    assert!(recorded.referer.is_none());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_count_clicks(pool: PgPool) {
    let repo = PgClickRepository::new(Arc::new(pool));

    for _ in 0..3 {
        repo.record_click(click("abc")).await.unwrap();
    }
    repo.record_click(click("xyz")).await.unwrap();

    assert_eq!(repo.count(Some("abc".to_string())).await.unwrap(), 3);
    assert_eq!(repo.count(Some("none".to_string())).await.unwrap(), 0);
    assert_eq!(repo.count(None).await.unwrap(), 4);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_click_stats(pool: PgPool) {
    let repo = PgClickRepository::new(Arc::new(pool));

    let empty = repo.stats("abc").await.unwrap();
    assert_eq!(empty.total_clicks, 0);
    assert_eq!(empty.unique_ips, 0);
    assert!(empty.last_click.is_none());

    repo.record_click(click("abc")).await.unwrap();
    repo.record_click(click("abc")).await.unwrap();
    repo.record_click(NewClick {
        ip: None,
        ..click("abc")
    })
    .await
    .unwrap();

    let stats = repo.stats("abc").await.unwrap();
    assert_eq!(stats.total_clicks, 3);
    assert_eq!(stats.unique_ips, 1);
    assert!(stats.last_click.is_some());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_recent_clicks_newest_first(pool: PgPool) {
    let repo = PgClickRepository::new(Arc::new(pool));

    let older = NewClick {
        clicked_at: Utc::now() - chrono::Duration::minutes(5),
        ..click("abc")
    };
    let first = repo.record_click(older).await.unwrap();
    let second = repo.record_click(click("abc")).await.unwrap();
    repo.record_click(click("xyz")).await.unwrap();

    let recent = repo.recent("abc", 10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, second.id);
    assert_eq!(recent[1].id, first.id);

    let limited = repo.recent("abc", 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, second.id);
}
